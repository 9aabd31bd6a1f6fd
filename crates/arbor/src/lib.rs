//! arbor -- articulated multibody dynamics for pin-jointed trees.
//!
//! This is the umbrella crate that re-exports the engine's layers:
//! - [`arbor_math`]: rotations, transforms and spatial algebra
//! - [`arbor_model`]: topology tree, body descriptors and stage-tagged state
//! - [`arbor_rigid`]: realization, force elements and articulated-body dynamics
//! - [`arbor_integrate`]: adaptive Runge-Kutta integration and time stepping
//!
//! A typical run builds a [`MultibodyTree`], finalizes it, pairs it with a
//! [`ForceSet`] in a [`MultibodySystem`], and drives a [`TimeStepper`] from a
//! state obtained via [`MultibodyTree::default_state`].

pub use arbor_integrate::{
    self, Integrator, IntegratorConfig, IntegratorStats, Method, Reporter, TimeStepper,
    TrajectoryRecorder,
};
pub use arbor_math::{self, GRAVITY, Mat3, Quat, Rotation, SpatialVec, Transform, Vec3};
pub use arbor_model::{
    self, Body, BodyId, Error, MultibodyTree, PinJoint, Result, Stage, State,
};
pub use arbor_rigid::{
    self, ForceElement, ForceSet, MobilityConstantForce, MobilityLinearDamper,
    MobilityLinearSpring, MultibodySystem, UniformGravity, realize,
};

/// The types needed to build and run a simulation.
pub mod prelude {
    pub use crate::{
        Body, BodyId, Error, ForceSet, IntegratorConfig, MultibodySystem, MultibodyTree, Stage,
        State, TimeStepper, Transform, UniformGravity, Vec3,
    };
    pub use arbor_integrate::from_fn;
}
