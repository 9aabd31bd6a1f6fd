//! Rigid-body dynamics for pin-jointed trees.
//!
//! [`realize`] brings a [`State`](arbor_model::State) up to a stage:
//! Position and Velocity by forward kinematics, Dynamics by the
//! articulated-body algorithm. CRBA and RNEA provide the mass matrix and
//! inverse dynamics for cross-checking and analysis.

pub mod aba;
pub mod crba;
pub mod energy;
pub mod forces;
pub mod kinematics;
pub mod realize;
pub mod rnea;
pub mod system;

pub use aba::{AbaSolution, aba};
pub use crba::{forward_dynamics_crba, mass_matrix};
pub use energy::{kinetic_energy, potential_energy, total_energy};
pub use forces::{
    AppliedForces, ForceElement, ForceSet, MobilityConstantForce, MobilityLinearDamper,
    MobilityLinearSpring, UniformGravity,
};
pub use realize::realize;
pub use rnea::{inverse_dynamics, mobilizer_reaction_forces};
pub use system::MultibodySystem;
