//! Time integration for arbor multibody systems.
//!
//! Implements:
//! - Embedded Runge-Kutta pairs (Kutta-Merson, Cash-Karp) with local error control
//! - PI step-size controller
//! - Time stepper that lands exactly on fixed reporting intervals

pub mod config;
pub mod controller;
pub mod integrator;
pub mod reporter;
pub mod stepper;
pub mod tableau;

pub use config::{IntegratorConfig, Method};
pub use controller::{StepController, StepDecision};
pub use integrator::{Integrator, IntegratorStats, StepInfo};
pub use reporter::{FnReporter, NullReporter, Reporter, Sample, TrajectoryRecorder, from_fn};
pub use stepper::TimeStepper;
pub use tableau::Tableau;
