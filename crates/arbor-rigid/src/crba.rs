//! Composite Rigid Body Algorithm (CRBA) -- mass matrix computation.

use crate::forces::AppliedForces;
use crate::rnea::inverse_dynamics;
use arbor_math::{DMat, DVec, SpatialMat};
use arbor_model::{Error, MultibodyTree, Result, State};

/// Compute the joint-space mass matrix M(q). Requires Position.
///
/// Returns an n x n symmetric positive-definite matrix, n = number of mobilities.
pub fn mass_matrix(tree: &MultibodyTree, state: &State) -> Result<DMat> {
    let position = state.position_cache()?;
    let nb = tree.num_bodies();
    let n = tree.num_mobilities();
    let mut mass_matrix = DMat::zeros(n, n);

    // Composite inertias, in M frames.
    let mut i_c = vec![SpatialMat::zero(); nb];
    for (id, node) in tree.mobilized_bodies() {
        i_c[id.index()] = *node.inertia_m();
    }
    for (id, node) in tree.mobilized_bodies().rev() {
        if node.parent().is_ground() {
            continue;
        }
        let i = id.index();
        let ic_in_parent = position.x_tree[i].inertia_to_parent(&i_c[i]);
        let p = node.parent().index();
        i_c[p] = i_c[p] + ic_in_parent;
    }

    for (id, node) in tree.mobilized_bodies() {
        let v_i = node.mobility();
        let s_i = node.joint().motion_subspace();
        let mut f = i_c[id.index()].mul_vec(&s_i);
        mass_matrix[(v_i, v_i)] = s_i.dot(&f);

        // Off-diagonal: walk up the tree
        let mut j = id;
        let mut parent = node.parent();
        while !parent.is_ground() {
            f = position.x_tree[j.index()].force_to_parent(&f);
            let ancestor = tree.mobilized_body(parent)?;
            let v_j = ancestor.mobility();
            let value = ancestor.joint().motion_subspace().dot(&f);
            mass_matrix[(v_i, v_j)] = value;
            mass_matrix[(v_j, v_i)] = value;
            j = parent;
            parent = ancestor.parent();
        }
    }

    Ok(mass_matrix)
}

/// Forward dynamics by solving `M udot = Q - C` with a Cholesky factorization.
///
/// O(n³), kept as an independent check on the articulated-body solve.
/// Requires Velocity.
pub fn forward_dynamics_crba(
    tree: &MultibodyTree,
    state: &State,
    applied: &AppliedForces,
) -> Result<DVec> {
    let n = tree.num_mobilities();
    // Inverse dynamics at zero acceleration leaves C - Q.
    let bias = inverse_dynamics(tree, state, applied, &DVec::zeros(n))?;
    let chol = mass_matrix(tree, state)?
        .cholesky()
        .ok_or_else(|| Error::Structural("mass matrix is not positive definite".to_string()))?;
    Ok(chol.solve(&(-bias)))
}
