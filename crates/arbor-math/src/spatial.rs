//! 6D spatial algebra following Featherstone's "Rigid Body Dynamics Algorithms".
//!
//! Convention: spatial vectors are [angular; linear] (Featherstone order).
//! A spatial motion vector (twist): [ω; v]
//! A spatial force vector (wrench): [τ; f]

use crate::{Mat3, Mat6, Transform, Vec3, Vec6, skew};

/// 6D spatial vector — either a motion vector (twist) or force vector (wrench).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialVec {
    /// The underlying 6D vector [angular(3); linear(3)].
    pub data: Vec6,
}

impl SpatialVec {
    /// Create from angular and linear parts.
    #[inline]
    pub fn new(angular: Vec3, linear: Vec3) -> Self {
        Self {
            data: Vec6::new(
                angular.x, angular.y, angular.z, linear.x, linear.y, linear.z,
            ),
        }
    }

    /// Zero spatial vector.
    #[inline]
    pub fn zero() -> Self {
        Self {
            data: Vec6::zeros(),
        }
    }

    /// Angular (top 3) component.
    #[inline]
    pub fn angular(&self) -> Vec3 {
        self.data.fixed_rows::<3>(0).into_owned()
    }

    /// Linear (bottom 3) component.
    #[inline]
    pub fn linear(&self) -> Vec3 {
        self.data.fixed_rows::<3>(3).into_owned()
    }

    /// Spatial cross product for motion vectors: v ×ₘ w
    pub fn cross_motion(&self, other: &SpatialVec) -> SpatialVec {
        let (w, v) = (self.angular(), self.linear());
        let (w2, v2) = (other.angular(), other.linear());
        SpatialVec::new(w.cross(&w2), w.cross(&v2) + v.cross(&w2))
    }

    /// Spatial cross product for force vectors: v ×f f
    pub fn cross_force(&self, other: &SpatialVec) -> SpatialVec {
        let (w, v) = (self.angular(), self.linear());
        let (t, f) = (other.angular(), other.linear());
        SpatialVec::new(w.cross(&t) + v.cross(&f), w.cross(&f))
    }

    /// Dot product of two spatial vectors.
    #[inline]
    pub fn dot(&self, other: &SpatialVec) -> f64 {
        self.data.dot(&other.data)
    }
}

impl Default for SpatialVec {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::ops::Add for SpatialVec {
    type Output = SpatialVec;
    #[inline]
    fn add(self, rhs: SpatialVec) -> SpatialVec {
        SpatialVec {
            data: self.data + rhs.data,
        }
    }
}

impl std::ops::AddAssign for SpatialVec {
    #[inline]
    fn add_assign(&mut self, rhs: SpatialVec) {
        self.data += rhs.data;
    }
}

impl std::ops::Sub for SpatialVec {
    type Output = SpatialVec;
    #[inline]
    fn sub(self, rhs: SpatialVec) -> SpatialVec {
        SpatialVec {
            data: self.data - rhs.data,
        }
    }
}

impl std::ops::Mul<f64> for SpatialVec {
    type Output = SpatialVec;
    #[inline]
    fn mul(self, rhs: f64) -> SpatialVec {
        SpatialVec {
            data: self.data * rhs,
        }
    }
}

impl std::ops::Neg for SpatialVec {
    type Output = SpatialVec;
    #[inline]
    fn neg(self) -> SpatialVec {
        SpatialVec { data: -self.data }
    }
}

/// 6x6 spatial matrix (rigid and articulated inertias, motion transforms).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialMat {
    pub data: Mat6,
}

impl SpatialMat {
    /// Create from a 6x6 nalgebra matrix.
    #[inline]
    pub fn from_mat6(data: Mat6) -> Self {
        Self { data }
    }

    /// Zero matrix.
    #[inline]
    pub fn zero() -> Self {
        Self {
            data: Mat6::zeros(),
        }
    }

    /// Outer product a·bᵀ.
    #[inline]
    pub fn outer(a: &SpatialVec, b: &SpatialVec) -> Self {
        Self {
            data: a.data * b.data.transpose(),
        }
    }

    /// Multiply by a spatial vector.
    #[inline]
    pub fn mul_vec(&self, v: &SpatialVec) -> SpatialVec {
        SpatialVec {
            data: self.data * v.data,
        }
    }

    /// Matrix-matrix multiply.
    #[inline]
    pub fn mul_mat(&self, other: &SpatialMat) -> SpatialMat {
        SpatialMat {
            data: self.data * other.data,
        }
    }

    /// Transpose.
    #[inline]
    pub fn transpose(&self) -> SpatialMat {
        SpatialMat {
            data: self.data.transpose(),
        }
    }
}

impl Default for SpatialMat {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::ops::Add for SpatialMat {
    type Output = SpatialMat;
    #[inline]
    fn add(self, rhs: SpatialMat) -> SpatialMat {
        SpatialMat {
            data: self.data + rhs.data,
        }
    }
}

impl std::ops::Sub for SpatialMat {
    type Output = SpatialMat;
    #[inline]
    fn sub(self, rhs: SpatialMat) -> SpatialMat {
        SpatialMat {
            data: self.data - rhs.data,
        }
    }
}

impl std::ops::Mul<f64> for SpatialMat {
    type Output = SpatialMat;
    #[inline]
    fn mul(self, rhs: f64) -> SpatialMat {
        SpatialMat {
            data: self.data * rhs,
        }
    }
}

/// Mass properties of a rigid body: mass, center of mass, and rotational
/// inertia about the center of mass, all in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialInertia {
    /// Mass of the body.
    pub mass: f64,
    /// Center of mass position.
    pub com: Vec3,
    /// Rotational inertia about the center of mass (3x3 symmetric).
    pub inertia: Mat3,
}

impl SpatialInertia {
    /// Create a spatial inertia with the given mass, CoM offset, and inertia matrix.
    pub fn new(mass: f64, com: Vec3, inertia: Mat3) -> Self {
        Self { mass, com, inertia }
    }

    /// A point mass at `pos`.
    pub fn point_mass(mass: f64, pos: Vec3) -> Self {
        Self {
            mass,
            com: pos,
            inertia: Mat3::zeros(),
        }
    }

    /// Uniform solid sphere centered at origin.
    pub fn sphere(mass: f64, radius: f64) -> Self {
        let i = 2.0 / 5.0 * mass * radius * radius;
        Self {
            mass,
            com: Vec3::zeros(),
            inertia: Mat3::from_diagonal(&Vec3::new(i, i, i)),
        }
    }

    /// Re-express in frame A given `X_AB`, where `self` is expressed in B.
    pub fn reexpress(&self, x_ab: &Transform) -> SpatialInertia {
        let r = x_ab.rotation_matrix();
        SpatialInertia {
            mass: self.mass,
            com: x_ab.transform_point(&self.com),
            inertia: r * self.inertia * r.transpose(),
        }
    }

    /// Convert to 6x6 spatial inertia matrix about the frame origin.
    ///
    /// I_spatial = | I + m[c]×[c]×ᵀ   m[c]× |
    ///             | m[c]×ᵀ             mE    |
    pub fn to_matrix(&self) -> SpatialMat {
        let cx = skew(&self.com);
        let m = self.mass;
        let mcx = cx * m;

        let mut mat = Mat6::zeros();
        let top_left = self.inertia + cx * cx.transpose() * m;
        mat.fixed_view_mut::<3, 3>(0, 0).copy_from(&top_left);
        mat.fixed_view_mut::<3, 3>(0, 3).copy_from(&mcx);
        mat.fixed_view_mut::<3, 3>(3, 0).copy_from(&mcx.transpose());
        mat.fixed_view_mut::<3, 3>(3, 3)
            .copy_from(&(Mat3::identity() * m));

        SpatialMat::from_mat6(mat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rotation;
    use approx::assert_relative_eq;

    #[test]
    fn test_spatial_vec_cross_motion() {
        let v1 = SpatialVec::new(Vec3::z(), Vec3::zeros());
        let v2 = SpatialVec::new(Vec3::x(), Vec3::zeros());
        // [0,0,1] × [1,0,0] = [0,1,0]
        assert_relative_eq!(v1.cross_motion(&v2).angular(), Vec3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_cross_force_is_dual_of_cross_motion() {
        // (v ×f f)·m = -f·(v ×m m)
        let v = SpatialVec::new(Vec3::new(0.1, -0.4, 2.0), Vec3::new(1.0, 0.5, -0.3));
        let f = SpatialVec::new(Vec3::new(-1.0, 0.2, 0.7), Vec3::new(0.0, 3.0, 1.0));
        let m = SpatialVec::new(Vec3::new(0.4, 0.4, -0.1), Vec3::new(2.0, -1.0, 0.5));
        assert_relative_eq!(
            v.cross_force(&f).dot(&m),
            -f.dot(&v.cross_motion(&m)),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_point_mass_matrix() {
        let mat = SpatialInertia::point_mass(2.0, Vec3::new(0.0, 1.0, 0.0)).to_matrix();
        for i in 3..6 {
            assert_relative_eq!(mat.data[(i, i)], 2.0, epsilon = 1e-12);
        }
        // Moment of inertia about x for a point 1 m along y: m r² = 2.
        assert_relative_eq!(mat.data[(0, 0)], 2.0, epsilon = 1e-12);
        assert_relative_eq!(mat.data[(1, 1)], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sphere_inertia() {
        let si = SpatialInertia::sphere(5.0, 0.1);
        let expected_i = 2.0 / 5.0 * 5.0 * 0.01;
        for i in 0..3 {
            assert_relative_eq!(si.inertia[(i, i)], expected_i, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_reexpress_matches_inertia_to_parent() {
        let si = SpatialInertia::new(
            1.5,
            Vec3::new(0.1, -0.2, 0.3),
            Mat3::from_diagonal(&Vec3::new(0.2, 0.3, 0.4)),
        );
        let x_ab = Transform::new(Rotation::about_y(0.7), Vec3::new(0.5, 1.0, -2.0));
        let direct = si.reexpress(&x_ab).to_matrix();
        let via_matrix = x_ab.inertia_to_parent(&si.to_matrix());
        assert_relative_eq!(direct.data, via_matrix.data, epsilon = 1e-10);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::{Quat, Rotation};
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn arb_unit_axis() -> impl Strategy<Value = Vec3> {
        (-1.0..1.0_f64, -1.0..1.0_f64, -1.0..1.0_f64)
            .prop_filter("non-zero axis", |(x, y, z)| x * x + y * y + z * z > 0.01)
            .prop_map(|(x, y, z)| Vec3::new(x, y, z).normalize())
    }

    fn arb_angle() -> impl Strategy<Value = f64> {
        -std::f64::consts::PI..std::f64::consts::PI
    }

    proptest! {
        #[test]
        fn sphere_inertia_matrix_is_symmetric(
            mass in 0.1..100.0_f64,
            radius in 0.01..10.0_f64,
            x in -2.0..2.0_f64,
        ) {
            let mut si = SpatialInertia::sphere(mass, radius);
            si.com = Vec3::new(x, -x, 0.5 * x);
            let mat = si.to_matrix().data;
            prop_assert!((mat - mat.transpose()).amax() < EPS * mass.max(1.0) * 100.0);
        }

        #[test]
        fn quat_to_matrix_is_rotation(axis in arb_unit_axis(), angle in arb_angle()) {
            let m = Quat::from_axis_angle(&axis, angle).to_matrix();
            prop_assert!(Rotation::from_matrix_unchecked(m).is_orthonormal(EPS));
        }

        #[test]
        fn quat_matrix_roundtrip_both_signs(axis in arb_unit_axis(), angle in arb_angle()) {
            let q = Quat::from_axis_angle(&axis, angle);
            let neg = Quat { w: -q.w, v: -q.v };
            for candidate in [q, neg] {
                let m = candidate.to_matrix();
                let q2 = Quat::from_matrix(&m);
                prop_assert!(q2.same_rotation(&candidate, 1e-6), "q={:?} q2={:?}", candidate, q2);
                let m2 = q2.to_matrix();
                prop_assert!((m2 - m).amax() < 1e-6);
            }
        }
    }
}
