//! Rigid transforms between frames, and their action on spatial vectors.

use crate::{Mat3, Mat6, Rotation, SpatialMat, SpatialVec, Vec3, skew};

/// Rigid transform `X_AB`: orientation of frame B in A plus the location of
/// B's origin measured from A's origin, expressed in A.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// `R_AB`.
    pub rot: Rotation,
    /// `p_AB`.
    pub pos: Vec3,
}

impl Transform {
    /// Create from rotation and translation.
    pub fn new(rot: Rotation, pos: Vec3) -> Self {
        Self { rot, pos }
    }

    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            rot: Rotation::identity(),
            pos: Vec3::zeros(),
        }
    }

    /// Pure translation.
    pub fn from_translation(pos: Vec3) -> Self {
        Self {
            rot: Rotation::identity(),
            pos,
        }
    }

    /// Pure rotation.
    pub fn from_rotation(rot: Rotation) -> Self {
        Self {
            rot,
            pos: Vec3::zeros(),
        }
    }

    /// Compose `X_AB · X_BC = X_AC`.
    pub fn compose(&self, other: &Transform) -> Transform {
        Transform {
            rot: self.rot * other.rot,
            pos: self.pos + self.rot.apply(&other.pos),
        }
    }

    /// Inverse: `X_BA` from `X_AB`.
    pub fn inverse(&self) -> Transform {
        let rt = self.rot.inverse();
        Transform {
            rot: rt,
            pos: -rt.apply(&self.pos),
        }
    }

    /// Map a point measured in B to the same point measured in A.
    #[inline]
    pub fn transform_point(&self, p_b: &Vec3) -> Vec3 {
        self.pos + self.rot.apply(p_b)
    }

    /// Rotation matrix `R_AB`.
    #[inline]
    pub fn rotation_matrix(&self) -> &Mat3 {
        self.rot.matrix()
    }

    /// Re-express a motion vector given in A (about A's origin) in B (about B's origin).
    pub fn motion_to_child(&self, v: &SpatialVec) -> SpatialVec {
        let w = v.angular();
        let lin = v.linear() + w.cross(&self.pos);
        SpatialVec::new(self.rot.apply_inverse(&w), self.rot.apply_inverse(&lin))
    }

    /// Re-express a motion vector given in B (about B's origin) in A (about A's origin).
    pub fn motion_to_parent(&self, v: &SpatialVec) -> SpatialVec {
        let w = self.rot.apply(&v.angular());
        let lin = self.rot.apply(&v.linear()) + self.pos.cross(&w);
        SpatialVec::new(w, lin)
    }

    /// Re-express a force vector given in B (moment about B's origin) in A
    /// (moment about A's origin).
    pub fn force_to_parent(&self, f: &SpatialVec) -> SpatialVec {
        let force = self.rot.apply(&f.linear());
        let moment = self.rot.apply(&f.angular()) + self.pos.cross(&force);
        SpatialVec::new(moment, force)
    }

    /// Re-express a force vector given in A (moment about A's origin) in B
    /// (moment about B's origin).
    pub fn force_to_child(&self, f: &SpatialVec) -> SpatialVec {
        let moment = f.angular() - self.pos.cross(&f.linear());
        SpatialVec::new(
            self.rot.apply_inverse(&moment),
            self.rot.apply_inverse(&f.linear()),
        )
    }

    /// 6x6 matrix of [`Transform::motion_to_child`].
    ///
    /// X = |  Rᵀ       0  |
    ///     | -Rᵀ[p]×   Rᵀ |
    pub fn motion_matrix(&self) -> SpatialMat {
        let rt = self.rot.matrix().transpose();
        let neg_rt_px = -rt * skew(&self.pos);

        let mut m = Mat6::zeros();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&rt);
        m.fixed_view_mut::<3, 3>(3, 0).copy_from(&neg_rt_px);
        m.fixed_view_mut::<3, 3>(3, 3).copy_from(&rt);
        SpatialMat::from_mat6(m)
    }

    /// Move an articulated or rigid inertia given in B to A: Xᵀ I X.
    pub fn inertia_to_parent(&self, inertia: &SpatialMat) -> SpatialMat {
        let x = self.motion_matrix();
        x.transpose().mul_mat(inertia).mul_mat(&x)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn arb_pos() -> impl Strategy<Value = Vec3> {
        (-10.0..10.0_f64, -10.0..10.0_f64, -10.0..10.0_f64)
            .prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    fn arb_transform() -> impl Strategy<Value = Transform> {
        (-1.0..1.0_f64, -1.0..1.0_f64, -1.0..1.0_f64, -3.0..3.0_f64, arb_pos())
            .prop_filter("non-zero axis", |(x, y, z, _, _)| x * x + y * y + z * z > 0.01)
            .prop_map(|(x, y, z, angle, pos)| {
                let axis = Vec3::new(x, y, z).normalize();
                Transform::new(Rotation::about_axis(&axis, angle), pos)
            })
    }

    fn arb_spatial_vec() -> impl Strategy<Value = SpatialVec> {
        (arb_pos(), arb_pos()).prop_map(|(a, l)| SpatialVec::new(a, l))
    }

    proptest! {
        #[test]
        fn compose_with_inverse_is_identity(xf in arb_transform()) {
            let result = xf.compose(&xf.inverse());
            prop_assert!((result.rotation_matrix() - Mat3::identity()).amax() < EPS);
            prop_assert!(result.pos.amax() < EPS, "pos = {:?}", result.pos);
        }

        #[test]
        fn compose_is_associative(a in arb_transform(), b in arb_transform(), c in arb_transform()) {
            let ab_c = a.compose(&b).compose(&c);
            let a_bc = a.compose(&b.compose(&c));
            prop_assert!((ab_c.rotation_matrix() - a_bc.rotation_matrix()).amax() < EPS);
            prop_assert!((ab_c.pos - a_bc.pos).amax() < EPS);
        }

        #[test]
        fn motion_to_child_matches_matrix(xf in arb_transform(), v in arb_spatial_vec()) {
            let applied = xf.motion_to_child(&v);
            let by_matrix = xf.motion_matrix().mul_vec(&v);
            prop_assert!((applied.data - by_matrix.data).amax() < EPS);
        }

        #[test]
        fn power_is_frame_invariant(xf in arb_transform(), v in arb_spatial_vec(), f in arb_spatial_vec()) {
            // v·f computed in B equals the same pairing computed in A.
            let in_child = v.dot(&f);
            let in_parent = xf.motion_to_parent(&v).dot(&xf.force_to_parent(&f));
            prop_assert!((in_child - in_parent).abs() < 1e-7 * (1.0 + in_child.abs()));
        }
    }
}
