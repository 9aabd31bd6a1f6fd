//! Rotations, rigid transforms and spatial algebra for the arbor multibody engine.
//!
//! Spatial vectors use Featherstone's [angular; linear] ordering. Rigid
//! transforms are "active": `X_AB` holds the orientation of frame B in A and
//! the location of B's origin measured in A.

pub mod quaternion;
pub mod rotation;
pub mod spatial;
pub mod transform;

pub use quaternion::Quat;
pub use rotation::Rotation;
pub use spatial::{SpatialInertia, SpatialMat, SpatialVec};
pub use transform::Transform;

use nalgebra as na;

/// 3D vector alias.
pub type Vec3 = na::Vector3<f64>;
/// 3x3 matrix alias.
pub type Mat3 = na::Matrix3<f64>;
/// 6D vector alias.
pub type Vec6 = na::Vector6<f64>;
/// 6x6 matrix alias.
pub type Mat6 = na::Matrix6<f64>;
/// Dynamic vector.
pub type DVec = na::DVector<f64>;
/// Dynamic matrix.
pub type DMat = na::DMatrix<f64>;

/// Cross-product matrix: [v]× such that [v]× w = v × w.
#[inline]
pub fn skew(v: &Vec3) -> Mat3 {
    Mat3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

/// Standard gravity (m/s²).
pub const GRAVITY: f64 = 9.80665;
