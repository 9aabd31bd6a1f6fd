//! End-to-end tests for the arbor multibody engine.

use approx::assert_relative_eq;
use arbor::{
    Body, BodyId, Error, ForceSet, IntegratorConfig, Method, MultibodySystem, MultibodyTree,
    Quat, Rotation, Stage, State, TimeStepper, TrajectoryRecorder, Transform, UniformGravity,
    Vec3,
    arbor_math::DVec,
    arbor_rigid::{forward_dynamics_crba, inverse_dynamics, mass_matrix},
};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::sync::Arc;

fn point_mass(mass: f64, com: Vec3) -> Arc<Body> {
    Arc::new(Body::point_mass(mass, com).unwrap())
}

/// Point mass 1 m below a pin about Z.
fn make_pendulum(g: f64) -> (MultibodySystem, BodyId) {
    let mut tree = MultibodyTree::new();
    let bob = tree
        .add_body(
            BodyId::GROUND,
            Transform::identity(),
            point_mass(1.0, Vec3::new(0.0, -1.0, 0.0)),
            Transform::identity(),
            Vec3::z(),
        )
        .unwrap();
    tree.finalize().unwrap();
    let forces = ForceSet::new().with(UniformGravity::new(Vec3::new(0.0, -g, 0.0)));
    (MultibodySystem::new(tree, forces).unwrap(), bob)
}

/// Two uniform rods hanging from each other, both pinned about Z.
fn make_double_pendulum(g: f64) -> (MultibodySystem, [BodyId; 2]) {
    let rod = Arc::new(
        Body::new(
            1.0,
            Vec3::new(0.0, -0.5, 0.0),
            arbor::Mat3::from_diagonal(&Vec3::new(1.0 / 12.0, 0.0, 1.0 / 12.0)),
        )
        .unwrap(),
    );
    let mut tree = MultibodyTree::new();
    let upper = tree
        .add_body(
            BodyId::GROUND,
            Transform::identity(),
            rod.clone(),
            Transform::identity(),
            Vec3::z(),
        )
        .unwrap();
    let lower = tree
        .add_body(
            upper,
            Transform::from_translation(Vec3::new(0.0, -1.0, 0.0)),
            rod,
            Transform::identity(),
            Vec3::z(),
        )
        .unwrap();
    tree.finalize().unwrap();
    let forces = ForceSet::new().with(UniformGravity::new(Vec3::new(0.0, -g, 0.0)));
    (MultibodySystem::new(tree, forces).unwrap(), [upper, lower])
}

fn set_coordinates(system: &MultibodySystem, state: &mut State, q: &[f64], u: &[f64]) {
    state.set_q_vector(&DVec::from_column_slice(q)).unwrap();
    state.set_u_vector(&DVec::from_column_slice(u)).unwrap();
    system.realize(state, Stage::Dynamics).unwrap();
}

#[test]
fn test_pose_at_zero_coordinate_is_pure_translation() {
    let mut tree = MultibodyTree::new();
    let body = tree
        .add_body(
            BodyId::GROUND,
            Transform::from_translation(Vec3::new(0.0, -1.0, 0.0)),
            point_mass(1.0, Vec3::zeros()),
            Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
            Vec3::z(),
        )
        .unwrap();
    tree.finalize().unwrap();
    let system = MultibodySystem::new(tree, ForceSet::new()).unwrap();

    let mut state = system.default_state().unwrap();
    system.realize(&mut state, Stage::Position).unwrap();

    let x = state.body_transform(body).unwrap();
    assert_relative_eq!(*x.rotation_matrix(), arbor::Mat3::identity(), epsilon = 1e-15);
    assert_relative_eq!(x.pos, Vec3::new(0.0, -2.0, 0.0), epsilon = 1e-15);
    assert!(state.body_quaternion(body).unwrap().same_rotation(&Quat::identity(), 1e-12));
}

#[test]
fn test_quaternion_round_trip_for_both_signs() {
    let axes = [
        Vec3::x(),
        Vec3::new(1.0, 2.0, -0.5),
        Vec3::new(-0.3, 0.1, 0.9),
    ];
    let angles = [0.0, 0.4, FRAC_PI_2, 2.5, std::f64::consts::PI - 1e-9];
    for axis in &axes {
        for &angle in &angles {
            let rot = Rotation::about_axis(axis, angle);
            let q = Quat::from_matrix(rot.matrix());
            let flipped = Quat {
                w: -q.w,
                v: -q.v,
            };
            assert_relative_eq!(q.to_matrix(), *rot.matrix(), epsilon = 1e-6);
            assert_relative_eq!(flipped.to_matrix(), *rot.matrix(), epsilon = 1e-6);
            assert!(q.same_rotation(&flipped, 1e-9));
        }
    }
}

#[test]
fn test_incremental_realization_matches_one_shot() {
    let (system, [_, lower]) = make_double_pendulum(9.8);
    let mut base = system.default_state().unwrap();
    base.set_q_vector(&DVec::from_column_slice(&[0.7, -0.4])).unwrap();
    base.set_u_vector(&DVec::from_column_slice(&[1.1, 0.3])).unwrap();

    let mut stepwise = base.clone();
    for stage in Stage::ALL {
        system.realize(&mut stepwise, stage).unwrap();
    }
    let mut direct = base;
    system.realize(&mut direct, Stage::Dynamics).unwrap();

    assert_eq!(stepwise.udot().unwrap(), direct.udot().unwrap());
    assert_eq!(
        stepwise.body_transform(lower).unwrap(),
        direct.body_transform(lower).unwrap()
    );
    assert_eq!(
        stepwise.body_spatial_acceleration(lower).unwrap(),
        direct.body_spatial_acceleration(lower).unwrap()
    );
}

#[test]
fn test_coordinate_write_hides_stale_accelerations() {
    let (system, bob) = make_pendulum(9.8);
    let mut state = system.default_state().unwrap();
    system.tree().set_one_q(&mut state, bob, 0, 0.3).unwrap();
    system.realize(&mut state, Stage::Dynamics).unwrap();
    assert!(state.udot().is_ok());

    system.tree().set_one_q(&mut state, bob, 0, 0.6).unwrap();
    system.realize(&mut state, Stage::Velocity).unwrap();

    assert_eq!(state.stage(), Stage::Velocity);
    assert_eq!(
        state.udot(),
        Err(Error::StageViolation {
            required: Stage::Dynamics,
            realized: Stage::Velocity,
        })
    );
    assert!(state.body_origin_acceleration(bob).is_err());
    // Position-stage results reflect the new coordinate.
    assert_relative_eq!(
        state.body_com_location(bob).unwrap(),
        Vec3::new(0.6_f64.sin(), -0.6_f64.cos(), 0.0),
        epsilon = 1e-12
    );
}

#[test]
fn test_chain_at_rest_without_gravity_does_not_move() {
    let (system, _) = make_double_pendulum(0.0);
    let mut state = system.default_state().unwrap();
    set_coordinates(&system, &mut state, &[0.9, -1.3], &[0.0, 0.0]);
    assert!(state.udot().unwrap().iter().all(|&a| a == 0.0));
}

#[test]
fn test_pendulum_accelerates_back_toward_rest() {
    let (system, bob) = make_pendulum(9.8);
    let mut state = system.default_state().unwrap();
    system.tree().set_one_q(&mut state, bob, 0, FRAC_PI_4).unwrap();

    let mut stepper = TimeStepper::new(system, IntegratorConfig::default()).unwrap();
    stepper.initialize(state).unwrap();
    stepper.step_to(0.001).unwrap();

    stepper.realize(Stage::Dynamics).unwrap();
    let after = stepper.state();
    let q = after.q()[0];
    let udot = after.udot().unwrap()[0];
    assert!(q < FRAC_PI_4);
    assert!(udot < 0.0);
    assert_relative_eq!(udot, -9.8 * q.sin(), epsilon = 1e-9);
}

#[test]
fn test_long_run_conserves_energy() {
    let (system, bob) = make_pendulum(9.8);
    let mut state = system.default_state().unwrap();
    system.tree().set_one_q(&mut state, bob, 0, FRAC_PI_4).unwrap();
    system.realize(&mut state, Stage::Velocity).unwrap();
    let initial = system.total_energy(&state).unwrap();

    for method in [Method::Merson, Method::CashKarp] {
        let accuracy = 1e-8;
        let config = IntegratorConfig::new()
            .with_method(method)
            .with_accuracy(accuracy)
            .with_report_interval(0.5);
        let mut stepper =
            TimeStepper::with_reporter(system.clone(), config, TrajectoryRecorder::new()).unwrap();
        stepper.initialize(state.clone()).unwrap();
        stepper.step_to(10.0).unwrap();

        let final_energy = system.total_energy(stepper.state()).unwrap();
        assert!(
            (final_energy - initial).abs() < 1e4 * accuracy,
            "{method:?} at accuracy {accuracy}: energy drifted from {initial} to {final_energy}"
        );
        assert_eq!(stepper.report_count(), 21);
    }
}

#[test]
fn test_double_pendulum_energy_over_reports() {
    let (system, _) = make_double_pendulum(9.8);
    let mut state = system.default_state().unwrap();
    set_coordinates(&system, &mut state, &[1.0, 0.5], &[0.0, 0.0]);
    let initial = system.total_energy(&state).unwrap();

    let config = IntegratorConfig::new()
        .with_accuracy(1e-9)
        .with_report_interval(0.25);
    let mut stepper =
        TimeStepper::with_reporter(system.clone(), config, TrajectoryRecorder::new()).unwrap();
    stepper.initialize(state).unwrap();
    stepper.step_to(5.0).unwrap();

    let recorder = stepper.reporter();
    assert_eq!(recorder.len(), 21);
    let mut probe = system.default_state().unwrap();
    for sample in recorder.samples() {
        set_coordinates(&system, &mut probe, sample.q.as_slice(), sample.u.as_slice());
        let energy = system.total_energy(&probe).unwrap();
        assert!(
            (energy - initial).abs() < 1e-4,
            "energy {energy} at t={} vs {initial}",
            sample.time
        );
    }
}

#[test]
fn test_articulated_body_matches_mass_matrix_solve() {
    let (system, _) = make_double_pendulum(9.8);
    let tree = system.tree();
    let mut state = system.default_state().unwrap();
    set_coordinates(&system, &mut state, &[0.4, -0.9], &[0.8, -1.7]);

    let applied = system.forces().calc_forces(tree, &state).unwrap();
    let crba = forward_dynamics_crba(tree, &state, &applied).unwrap();
    let aba = state.udot().unwrap();
    assert_relative_eq!(crba, *aba, epsilon = 1e-10);

    let residual = inverse_dynamics(tree, &state, &applied, aba).unwrap();
    assert!(residual.amax() < 1e-10);

    let m = mass_matrix(tree, &state).unwrap();
    assert_relative_eq!(m.clone(), m.transpose(), epsilon = 1e-14);
}

#[test]
fn test_equivalent_chains_with_different_body_frames_agree() {
    // Chain A puts each body frame at its pivot. Chain B puts the upper
    // body's frame at its mass, so both attachments move.
    let build = |upper_at_mass: bool| {
        let mut tree = MultibodyTree::new();
        let (upper_body, upper_bm, lower_pf) = if upper_at_mass {
            (
                point_mass(2.0, Vec3::zeros()),
                Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
                Transform::identity(),
            )
        } else {
            (
                point_mass(2.0, Vec3::new(0.0, -1.0, 0.0)),
                Transform::identity(),
                Transform::from_translation(Vec3::new(0.0, -1.0, 0.0)),
            )
        };
        let upper = tree
            .add_body(
                BodyId::GROUND,
                Transform::identity(),
                upper_body,
                upper_bm,
                Vec3::z(),
            )
            .unwrap();
        let lower = tree
            .add_body(
                upper,
                lower_pf,
                point_mass(1.0, Vec3::new(0.0, -0.8, 0.0)),
                Transform::identity(),
                Vec3::z(),
            )
            .unwrap();
        tree.finalize().unwrap();
        let forces = ForceSet::new().with(UniformGravity::new(Vec3::new(0.0, -9.8, 0.0)));
        let system = MultibodySystem::new(tree, forces).unwrap();
        let mut state = system.default_state().unwrap();
        set_coordinates(&system, &mut state, &[0.3, 1.2], &[-0.5, 2.0]);
        (system, state, [upper, lower])
    };

    let (system_a, a, ids_a) = build(false);
    let (system_b, b, ids_b) = build(true);

    assert_relative_eq!(*a.udot().unwrap(), *b.udot().unwrap(), epsilon = 1e-10);
    for (&ia, &ib) in ids_a.iter().zip(&ids_b) {
        assert_relative_eq!(
            a.body_com_location(ia).unwrap(),
            b.body_com_location(ib).unwrap(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            a.body_rotation(ia).unwrap(),
            b.body_rotation(ib).unwrap(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            a.body_com_velocity(ia).unwrap(),
            b.body_com_velocity(ib).unwrap(),
            epsilon = 1e-12
        );
    }
    assert_relative_eq!(
        system_a.total_energy(&a).unwrap(),
        system_b.total_energy(&b).unwrap(),
        epsilon = 1e-10
    );
}

#[test]
fn test_tiny_tolerance_reports_non_convergence() {
    let (system, bob) = make_pendulum(9.8);
    let mut state = system.default_state().unwrap();
    system.tree().set_one_q(&mut state, bob, 0, FRAC_PI_4).unwrap();

    let config = IntegratorConfig::new()
        .with_accuracy(1e-300)
        .with_min_step(1e-3)
        .with_initial_step(1e-3);
    let mut stepper = TimeStepper::new(system, config).unwrap();
    stepper.initialize(state).unwrap();

    let err = stepper.step_to(1.0).unwrap_err();
    assert!(matches!(err, Error::NumericalNonConvergence { .. }));
    assert_eq!(stepper.time(), 0.0);
    assert_eq!(stepper.state().q()[0], FRAC_PI_4);
    assert_eq!(stepper.report_count(), 1);
}

#[test]
fn test_structural_errors() {
    let mut tree = MultibodyTree::new();
    let first = tree
        .add_body(
            BodyId::GROUND,
            Transform::identity(),
            point_mass(1.0, Vec3::new(0.0, -1.0, 0.0)),
            Transform::identity(),
            Vec3::z(),
        )
        .unwrap();
    assert!(matches!(
        tree.add_body(
            first,
            Transform::identity(),
            point_mass(1.0, Vec3::zeros()),
            Transform::identity(),
            Vec3::zeros(),
        ),
        Err(Error::Structural(_))
    ));
    assert!(matches!(tree.default_state(), Err(Error::Structural(_))));
    assert!(matches!(
        MultibodySystem::new(MultibodyTree::new(), ForceSet::new()),
        Err(Error::Structural(_))
    ));

    tree.finalize().unwrap();
    assert!(matches!(tree.finalize(), Err(Error::Structural(_))));
    assert!(matches!(
        tree.add_body(
            first,
            Transform::identity(),
            point_mass(1.0, Vec3::zeros()),
            Transform::identity(),
            Vec3::z(),
        ),
        Err(Error::Structural(_))
    ));
}

#[test]
fn test_state_from_another_tree_is_rejected() {
    let (system, _) = make_pendulum(9.8);
    let (other, _) = make_pendulum(9.8);
    let mut foreign = other.default_state().unwrap();
    assert!(system.realize(&mut foreign, Stage::Position).is_err());
}

#[test]
fn test_finalized_tree_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MultibodyTree>();
    assert_send_sync::<MultibodySystem>();
    assert_send_sync::<State>();

    let (system, bob) = make_pendulum(9.8);
    let handles: Vec<_> = [0.2, -0.4]
        .into_iter()
        .map(|q| {
            let system = system.clone();
            std::thread::spawn(move || {
                let mut state = system.default_state().unwrap();
                system.tree().set_one_q(&mut state, bob, 0, q).unwrap();
                system.realize(&mut state, Stage::Dynamics).unwrap();
                state.udot().unwrap()[0]
            })
        })
        .collect();
    for (handle, q) in handles.into_iter().zip([0.2_f64, -0.4]) {
        assert_relative_eq!(handle.join().unwrap(), -9.8 * q.sin(), epsilon = 1e-12);
    }
}
