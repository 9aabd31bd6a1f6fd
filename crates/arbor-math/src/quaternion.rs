//! Unit quaternions for body orientation.
//!
//! Convention: q = [w; x; y; z] where w is scalar, (x,y,z) is vector part.
//! q and -q describe the same rotation; [`Quat::canonical`] picks w ≥ 0.

use crate::{Mat3, Vec3};
use std::fmt;

/// A unit quaternion representing a 3D rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    /// Scalar part (w).
    pub w: f64,
    /// Vector part (x, y, z).
    pub v: Vec3,
}

impl Quat {
    /// Create a new quaternion from scalar and vector parts.
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self {
            w,
            v: Vec3::new(x, y, z),
        }
    }

    /// Identity quaternion (no rotation).
    pub fn identity() -> Self {
        Self {
            w: 1.0,
            v: Vec3::zeros(),
        }
    }

    /// Quaternion for a rotation of `angle` radians about `axis`.
    ///
    /// `axis` need not be normalized; a zero axis yields the identity.
    pub fn from_axis_angle(axis: &Vec3, angle: f64) -> Self {
        let n = axis.norm();
        if n < 1e-15 {
            return Self::identity();
        }
        let (s, c) = (angle * 0.5).sin_cos();
        Self {
            w: c,
            v: axis * (s / n),
        }
    }

    /// Euclidean norm of all four components.
    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.v.norm_squared()).sqrt()
    }

    /// Normalize this quaternion to unit length.
    pub fn normalize(&self) -> Self {
        let norm = self.norm();
        if norm < 1e-12 {
            return Self::identity();
        }
        Self {
            w: self.w / norm,
            v: self.v / norm,
        }
    }

    /// Sign-flipped copy with a non-negative scalar part.
    pub fn canonical(&self) -> Self {
        if self.w < 0.0 {
            Self {
                w: -self.w,
                v: -self.v,
            }
        } else {
            *self
        }
    }

    /// True when both quaternions describe the same rotation within `tol`,
    /// accepting either sign.
    pub fn same_rotation(&self, other: &Quat, tol: f64) -> bool {
        let same = (self.w - other.w).abs() < tol && (self.v - other.v).amax() < tol;
        let negated = (self.w + other.w).abs() < tol && (self.v + other.v).amax() < tol;
        same || negated
    }

    /// Convert quaternion to 3x3 rotation matrix.
    pub fn to_matrix(&self) -> Mat3 {
        let (w, x, y, z) = (self.w, self.v.x, self.v.y, self.v.z);

        let (x2, y2, z2) = (x * x, y * y, z * z);
        let (xy, xz, yz) = (x * y, x * z, y * z);
        let (wx, wy, wz) = (w * x, w * y, w * z);

        Mat3::new(
            1.0 - 2.0 * (y2 + z2),
            2.0 * (xy - wz),
            2.0 * (xz + wy),
            2.0 * (xy + wz),
            1.0 - 2.0 * (x2 + z2),
            2.0 * (yz - wx),
            2.0 * (xz - wy),
            2.0 * (yz + wx),
            1.0 - 2.0 * (x2 + y2),
        )
    }

    /// Convert a rotation matrix to a quaternion (Shepperd's method).
    ///
    /// The largest of the four diagonal combinations is used as the pivot so
    /// the division never approaches zero.
    pub fn from_matrix(m: &Mat3) -> Quat {
        let trace = m.trace();

        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0; // 4w
            Quat::new(
                0.25 * s,
                (m[(2, 1)] - m[(1, 2)]) / s,
                (m[(0, 2)] - m[(2, 0)]) / s,
                (m[(1, 0)] - m[(0, 1)]) / s,
            )
        } else if m[(0, 0)] > m[(1, 1)] && m[(0, 0)] > m[(2, 2)] {
            let s = (1.0 + m[(0, 0)] - m[(1, 1)] - m[(2, 2)]).sqrt() * 2.0; // 4x
            Quat::new(
                (m[(2, 1)] - m[(1, 2)]) / s,
                0.25 * s,
                (m[(0, 1)] + m[(1, 0)]) / s,
                (m[(0, 2)] + m[(2, 0)]) / s,
            )
        } else if m[(1, 1)] > m[(2, 2)] {
            let s = (1.0 + m[(1, 1)] - m[(0, 0)] - m[(2, 2)]).sqrt() * 2.0; // 4y
            Quat::new(
                (m[(0, 2)] - m[(2, 0)]) / s,
                (m[(0, 1)] + m[(1, 0)]) / s,
                0.25 * s,
                (m[(1, 2)] + m[(2, 1)]) / s,
            )
        } else {
            let s = (1.0 + m[(2, 2)] - m[(0, 0)] - m[(1, 1)]).sqrt() * 2.0; // 4z
            Quat::new(
                (m[(1, 0)] - m[(0, 1)]) / s,
                (m[(0, 2)] + m[(2, 0)]) / s,
                (m[(1, 2)] + m[(2, 1)]) / s,
                0.25 * s,
            )
        };
        q.normalize()
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Quat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.10}, {:.10}, {:.10}, {:.10}]",
            self.w, self.v.x, self.v.y, self.v.z
        )
    }
}
