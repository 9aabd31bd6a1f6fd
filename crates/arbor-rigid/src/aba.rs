//! Articulated Body Algorithm (ABA) -- O(n) forward dynamics.
//!
//! Given a state realized through Velocity and the applied forces, compute
//! generalized accelerations `udot` and each body's spatial acceleration.
//! Everything runs in the bodies' M frames:
//! 1. Backward pass: articulated inertias and bias forces, leaf to root
//! 2. Forward pass: joint and body accelerations, root to leaf
//!
//! Gravity is an applied force, so ground does not accelerate.

use crate::forces::AppliedForces;
use arbor_math::{DVec, SpatialMat, SpatialVec};
use arbor_model::{Error, MultibodyTree, Result, State};

/// Articulated inertias this small about a joint axis leave `udot` undefined.
const MIN_AXIS_INERTIA: f64 = 1e-14;

/// Output of one articulated-body solve.
#[derive(Debug, Clone)]
pub struct AbaSolution {
    /// Generalized accelerations, by mobility index.
    pub udot: DVec,
    /// Spatial acceleration of each body in its M frame (ground at index 0).
    pub a_m: Vec<SpatialVec>,
}

/// Run the Articulated Body Algorithm.
pub fn aba(tree: &MultibodyTree, state: &State, applied: &AppliedForces) -> Result<AbaSolution> {
    let position = state.position_cache()?;
    let velocity = state.velocity_cache()?;
    let f_ext = applied.in_joint_frames(position);

    let nb = tree.num_bodies();
    let mut i_a = vec![SpatialMat::zero(); nb];
    let mut p_a = vec![SpatialVec::zero(); nb];

    // Rigid-body inertias and velocity-product bias forces.
    for (id, node) in tree.mobilized_bodies() {
        let i = id.index();
        let v = &velocity.v_m[i];
        i_a[i] = *node.inertia_m();
        p_a[i] = v.cross_force(&i_a[i].mul_vec(v)) - f_ext[i];
    }

    // -- Pass 1: Backward -- articulated inertias and bias forces --
    let mut u_vec = vec![SpatialVec::zero(); nb];
    let mut d = vec![0.0; nb];
    let mut u_scalar = vec![0.0; nb];

    for (id, node) in tree.mobilized_bodies().rev() {
        let i = id.index();
        let s = node.joint().motion_subspace();
        let k = node.mobility();

        u_vec[i] = i_a[i].mul_vec(&s);
        d[i] = s.dot(&u_vec[i]);
        u_scalar[i] = applied.mobility[k] - s.dot(&p_a[i]);

        if d[i].abs() < MIN_AXIS_INERTIA {
            tracing::warn!(body = i, inertia = d[i], "singular articulated inertia about joint axis");
            return Err(Error::Structural(format!(
                "body {i} and its descendants have no inertia about the joint axis"
            )));
        }

        if node.parent().is_ground() {
            continue;
        }
        let p = node.parent().index();
        let ia = i_a[i] - SpatialMat::outer(&u_vec[i], &u_vec[i]) * (1.0 / d[i]);
        let pa = p_a[i]
            + ia.mul_vec(&velocity.coriolis_m[i])
            + u_vec[i] * (u_scalar[i] / d[i]);

        let x_tree = &position.x_tree[i];
        i_a[p] = i_a[p] + x_tree.inertia_to_parent(&ia);
        p_a[p] = p_a[p] + x_tree.force_to_parent(&pa);
    }

    // -- Pass 2: Forward -- accelerations --
    let mut udot = DVec::zeros(tree.num_mobilities());
    let mut a_m = vec![SpatialVec::zero(); nb];

    for (id, node) in tree.mobilized_bodies() {
        let i = id.index();
        let p = node.parent().index();
        let s = node.joint().motion_subspace();

        let a_prime = position.x_tree[i].motion_to_child(&a_m[p]) + velocity.coriolis_m[i];
        let qdd = (u_scalar[i] - u_vec[i].dot(&a_prime)) / d[i];
        udot[node.mobility()] = qdd;
        a_m[i] = a_prime + s * qdd;
    }

    Ok(AbaSolution { udot, a_m })
}
