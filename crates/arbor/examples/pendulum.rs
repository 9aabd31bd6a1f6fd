//! Single pendulum -- adaptive integration, energy drift and period.
//!
//! Run with `RUST_LOG=arbor_integrate=debug` to see integrator events.

use arbor::prelude::*;
use arbor::{GRAVITY, TrajectoryRecorder};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> arbor::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let length = 1.0;
    let mass = 1.0;

    // Pin about Z, gravity along -Y, rod hangs in -Y at q=0.
    let rod = Body::new(
        mass,
        Vec3::new(0.0, -length / 2.0, 0.0),
        arbor::Mat3::from_diagonal(&Vec3::new(
            mass * length * length / 12.0,
            0.0,
            mass * length * length / 12.0,
        )),
    )?;
    let mut tree = MultibodyTree::new();
    let link = tree.add_body(
        BodyId::GROUND,
        Transform::identity(),
        Arc::new(rod),
        Transform::identity(),
        Vec3::z(),
    )?;
    tree.finalize()?;

    let forces = ForceSet::new().with(UniformGravity::new(Vec3::new(0.0, -GRAVITY, 0.0)));
    let system = MultibodySystem::new(tree, forces)?;

    let mut state = system.default_state()?;
    system.tree().set_one_q(&mut state, link, 0, 0.1)?;
    system.realize(&mut state, Stage::Velocity)?;
    let e0 = system.total_energy(&state)?;

    // Compound pendulum: T = 2π√(I/(m g d)), I = mL²/3 about the pivot, d = L/2.
    let i_pivot = mass * length * length / 3.0;
    let expected_period =
        2.0 * std::f64::consts::PI * (i_pivot / (mass * GRAVITY * length / 2.0)).sqrt();
    println!("Expected period: {expected_period:.4} s");
    println!("Initial energy:  {e0:.6} J\n");

    let config = IntegratorConfig::new()
        .with_accuracy(1e-8)
        .with_report_interval(0.01);
    let mut stepper = TimeStepper::with_reporter(system.clone(), config, TrajectoryRecorder::new())?;
    stepper.initialize(state)?;
    stepper.step_to(20.0)?;

    println!("time(s)    q(rad)     u(rad/s)   Total E");
    println!("──────────────────────────────────────────────");
    let mut probe = system.default_state()?;
    for sample in stepper.reporter().samples().iter().step_by(200) {
        probe.set_q_vector(&sample.q)?;
        probe.set_u_vector(&sample.u)?;
        system.realize(&mut probe, Stage::Velocity)?;
        println!(
            "{:8.3}   {:+8.5}   {:+8.5}   {:8.6}",
            sample.time,
            sample.q[0],
            sample.u[0],
            system.total_energy(&probe)?
        );
    }

    stepper.realize(Stage::Velocity)?;
    let e_final = system.total_energy(stepper.state())?;
    println!("\nEnergy drift:  {:.2e} (relative)", ((e_final - e0) / e0).abs());

    // Positive-to-negative zero crossings, linearly interpolated between reports.
    let crossings: Vec<f64> = stepper
        .reporter()
        .samples()
        .windows(2)
        .filter(|w| w[0].q[0] > 0.0 && w[1].q[0] <= 0.0)
        .map(|w| {
            let frac = w[0].q[0] / (w[0].q[0] - w[1].q[0]);
            w[0].time + frac * (w[1].time - w[0].time)
        })
        .collect();
    if crossings.len() >= 2 {
        let measured =
            (crossings[crossings.len() - 1] - crossings[0]) / (crossings.len() - 1) as f64;
        println!("Measured period: {measured:.4} s");
        println!(
            "Period error:    {:.2}%",
            ((measured - expected_period) / expected_period).abs() * 100.0
        );
    }

    let stats = stepper.stats();
    println!(
        "\n{} steps accepted, {} rejected, {} dynamics evaluations",
        stats.accepted_steps, stats.rejected_steps, stats.derivative_evaluations
    );
    Ok(())
}
