//! Topology and state types for the arbor multibody engine.
//!
//! [`MultibodyTree`] is the static description of a pin-jointed tree: bodies,
//! attachment frames and joint axes. [`State`] is the mutable simulation state:
//! generalized coordinates and speeds plus stage-tagged derived quantities.

pub mod body;
pub mod error;
pub mod joint;
pub mod stage;
pub mod state;
pub mod tree;

pub use body::Body;
pub use error::{Error, Result};
pub use joint::PinJoint;
pub use stage::{CacheEntry, Stage};
pub use state::{DynamicsCache, PositionCache, State, VelocityCache};
pub use tree::{BodyId, MobilizedBody, MultibodyTree};
