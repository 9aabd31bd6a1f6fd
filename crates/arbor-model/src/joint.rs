//! Revolute ("pin") mobilizer.

use crate::{Error, Result};
use arbor_math::{Rotation, SpatialVec, Transform, Vec3};

/// Single rotational DOF about a fixed axis.
///
/// The axis is a unit vector expressed in the inboard frame F. Because the
/// outboard frame M only ever rotates about that axis, it has the same
/// coordinates in M.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinJoint {
    axis: Vec3,
}

impl PinJoint {
    /// Create a pin about `axis`. The axis is normalized; a zero axis is rejected.
    pub fn new(axis: Vec3) -> Result<Self> {
        let norm = axis.norm();
        if !norm.is_finite() || norm < 1e-12 {
            return Err(Error::Structural(format!(
                "pin joint axis must be non-zero, got {axis:?}"
            )));
        }
        Ok(Self { axis: axis / norm })
    }

    /// Pin about the Z axis of the joint frames.
    pub fn z() -> Self {
        Self { axis: Vec3::z() }
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Number of generalized coordinates (and speeds) this joint contributes.
    pub fn ndof(&self) -> usize {
        1
    }

    /// `X_FM(q)`: M rotated by `q` radians about the axis, origins coincident.
    pub fn joint_transform(&self, q: f64) -> Transform {
        Transform::from_rotation(Rotation::about_axis(&self.axis, q))
    }

    /// Motion subspace S in M coordinates about M's origin: [axis; 0].
    pub fn motion_subspace(&self) -> SpatialVec {
        SpatialVec::new(self.axis, Vec3::zeros())
    }
}
