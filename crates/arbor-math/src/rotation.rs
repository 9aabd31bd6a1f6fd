//! Proper-orthogonal rotation matrices.

use crate::{Mat3, Quat, Vec3, skew};

/// A 3x3 rotation matrix `R_AB`: columns are B's axes expressed in A.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    mat: Mat3,
}

impl Rotation {
    /// Identity rotation.
    pub fn identity() -> Self {
        Self {
            mat: Mat3::identity(),
        }
    }

    /// Wrap a matrix the caller guarantees is proper-orthogonal.
    pub fn from_matrix_unchecked(mat: Mat3) -> Self {
        Self { mat }
    }

    /// Rotation of `angle` radians about `axis` (Rodrigues' formula).
    ///
    /// `axis` need not be normalized; a zero axis yields the identity.
    pub fn about_axis(axis: &Vec3, angle: f64) -> Self {
        let n = axis.norm();
        if n < 1e-15 {
            return Self::identity();
        }
        let (s, c) = angle.sin_cos();
        let ax = skew(&(axis / n));
        Self {
            mat: Mat3::identity() + ax * s + ax * ax * (1.0 - c),
        }
    }

    /// Rotation about the X axis.
    pub fn about_x(angle: f64) -> Self {
        Self::about_axis(&Vec3::x(), angle)
    }

    /// Rotation about the Y axis.
    pub fn about_y(angle: f64) -> Self {
        Self::about_axis(&Vec3::y(), angle)
    }

    /// Rotation about the Z axis.
    pub fn about_z(angle: f64) -> Self {
        Self::about_axis(&Vec3::z(), angle)
    }

    /// Build from a quaternion; the quaternion is normalized first.
    pub fn from_quat(q: &Quat) -> Self {
        Self {
            mat: q.normalize().to_matrix(),
        }
    }

    /// Convert to a unit quaternion with non-negative scalar part.
    pub fn to_quat(&self) -> Quat {
        Quat::from_matrix(&self.mat).canonical()
    }

    /// The underlying matrix.
    #[inline]
    pub fn matrix(&self) -> &Mat3 {
        &self.mat
    }

    /// Inverse rotation (`R_BA` from `R_AB`).
    #[inline]
    pub fn inverse(&self) -> Self {
        Self {
            mat: self.mat.transpose(),
        }
    }

    /// Re-express a vector given in B into A.
    #[inline]
    pub fn apply(&self, v: &Vec3) -> Vec3 {
        self.mat * v
    }

    /// Re-express a vector given in A into B.
    #[inline]
    pub fn apply_inverse(&self, v: &Vec3) -> Vec3 {
        self.mat.tr_mul(v)
    }

    /// Columns orthonormal and determinant +1 within `tol`.
    pub fn is_orthonormal(&self, tol: f64) -> bool {
        let rrt = self.mat * self.mat.transpose();
        (rrt - Mat3::identity()).amax() < tol && (self.mat.determinant() - 1.0).abs() < tol
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Rotation {
    type Output = Rotation;
    #[inline]
    fn mul(self, rhs: Rotation) -> Rotation {
        Rotation {
            mat: self.mat * rhs.mat,
        }
    }
}

impl From<Quat> for Rotation {
    fn from(q: Quat) -> Self {
        Rotation::from_quat(&q)
    }
}
