//! Recursive Newton-Euler Algorithm (RNEA) -- inverse dynamics.
//!
//! Given (q, u, udot) and the applied forces, compute the extra generalized
//! forces needed to produce `udot`, and the spatial forces carried across
//! each mobilizer.

use crate::forces::{AppliedForces, joint_frame_forces};
use arbor_math::{DVec, SpatialVec};
use arbor_model::{Error, MultibodyTree, PositionCache, Result, State, VelocityCache};

/// Generalized forces that must be added to `applied` to produce `udot`.
///
/// Zero (to round-off) when `udot` is the forward-dynamics solution.
/// Requires Velocity.
pub fn inverse_dynamics(
    tree: &MultibodyTree,
    state: &State,
    applied: &AppliedForces,
    udot: &DVec,
) -> Result<DVec> {
    let n = tree.num_mobilities();
    if udot.len() != n {
        return Err(Error::IndexOutOfRange {
            what: "udot",
            index: udot.len(),
            len: n,
        });
    }
    let position = state.position_cache()?;
    let velocity = state.velocity_cache()?;

    // ── Forward pass: accelerations ──
    let mut a_m = vec![SpatialVec::zero(); tree.num_bodies()];
    for (id, node) in tree.mobilized_bodies() {
        let i = id.index();
        let p = node.parent().index();
        let a_joint = node.joint().motion_subspace() * udot[node.mobility()];
        a_m[i] = position.x_tree[i].motion_to_child(&a_m[p]) + velocity.coriolis_m[i] + a_joint;
    }

    // ── Backward pass: forces and residuals ──
    let f_ext = applied.in_joint_frames(position);
    let forces = transmitted_forces(tree, position, velocity, &f_ext, &a_m);

    let mut tau = DVec::zeros(n);
    for (id, node) in tree.mobilized_bodies() {
        let k = node.mobility();
        tau[k] = node.joint().motion_subspace().dot(&forces[id.index()]) - applied.mobility[k];
    }
    Ok(tau)
}

/// Spatial force each parent exerts on its child through the mobilizer.
///
/// Ground frame, moment about the child's M origin; index 0 (ground) is zero.
/// The component of the moment along the joint axis equals the applied
/// mobility force. Requires Dynamics.
pub fn mobilizer_reaction_forces(tree: &MultibodyTree, state: &State) -> Result<Vec<SpatialVec>> {
    let dynamics = state.dynamics_cache()?;
    let position = state.position_cache()?;
    let velocity = state.velocity_cache()?;

    let f_ext = joint_frame_forces(&dynamics.body_forces, position);
    let forces = transmitted_forces(tree, position, velocity, &f_ext, &dynamics.a_m);

    Ok(forces
        .iter()
        .zip(&position.x_gm)
        .map(|(f, x_gm)| SpatialVec::new(x_gm.rot.apply(&f.angular()), x_gm.rot.apply(&f.linear())))
        .collect())
}

/// Force carried by each body's inboard joint, M frame, about M's origin.
fn transmitted_forces(
    tree: &MultibodyTree,
    position: &PositionCache,
    velocity: &VelocityCache,
    f_ext: &[SpatialVec],
    a_m: &[SpatialVec],
) -> Vec<SpatialVec> {
    let mut forces = vec![SpatialVec::zero(); tree.num_bodies()];
    for (id, node) in tree.mobilized_bodies() {
        let i = id.index();
        let inertia = node.inertia_m();
        let v = &velocity.v_m[i];
        forces[i] = inertia.mul_vec(&a_m[i]) + v.cross_force(&inertia.mul_vec(v)) - f_ext[i];
    }

    for (id, node) in tree.mobilized_bodies().rev() {
        if node.parent().is_ground() {
            continue;
        }
        let i = id.index();
        let in_parent = position.x_tree[i].force_to_parent(&forces[i]);
        let p = node.parent().index();
        forces[p] = forces[p] + in_parent;
    }
    forces
}
