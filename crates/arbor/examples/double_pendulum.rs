//! Two ball links in zero gravity, with the second pin turned a
//! quarter turn about X so the two joint axes are perpendicular.
//!
//! Prints each body's orientation quaternion and origin at every report.

use arbor::{
    Body, BodyId, ForceSet, IntegratorConfig, MultibodySystem, MultibodyTree, Rotation, State,
    TimeStepper, Transform, Vec3, arbor_integrate::from_fn, arbor_math::SpatialInertia,
};
use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> arbor::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Each link is a solid ball centered on its body origin.
    let link = Arc::new(Body::from_inertia(SpatialInertia::sphere(1.0, 0.5))?);

    let mut tree = MultibodyTree::new();
    let first = tree.add_body(
        BodyId::GROUND,
        Transform::identity(),
        link.clone(),
        Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
        Vec3::z(),
    )?;
    let second = tree.add_body(
        first,
        Transform::new(Rotation::about_x(FRAC_PI_2), Vec3::new(0.0, -1.0, 0.0)),
        link,
        Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
        Vec3::z(),
    )?;
    tree.finalize()?;
    let bodies = [first, second];

    let system = MultibodySystem::new(tree, ForceSet::new())?;
    let mut state = system.default_state()?;
    system.tree().set_one_u(&mut state, first, 0, 1.0)?;
    system.tree().set_one_u(&mut state, second, 0, -0.5)?;

    let config = IntegratorConfig::new()
        .with_accuracy(1e-6)
        .with_report_interval(0.5);
    let report = |state: &State| {
        println!("t = {:.2}", state.time());
        for (i, &body) in bodies.iter().enumerate() {
            if let (Ok(q), Ok(p)) = (state.body_quaternion(body), state.body_origin_location(body))
            {
                println!("  body {}: quat {q}  origin [{:+.4} {:+.4} {:+.4}]", i + 1, p.x, p.y, p.z);
            }
        }
    };
    let mut stepper = TimeStepper::with_reporter(system.clone(), config, from_fn(report))?;
    stepper.initialize(state)?;
    stepper.step_to(5.0)?;

    stepper.realize(arbor::Stage::Velocity)?;
    let ke = system.kinetic_energy(stepper.state())?;
    println!("\nKinetic energy at t = {:.1}: {ke:.8}", stepper.time());
    Ok(())
}
