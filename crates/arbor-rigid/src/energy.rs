//! Energy computation for multibody trees.

use crate::forces::ForceSet;
use arbor_model::{MultibodyTree, Result, State};

/// Kinetic energy: sum over bodies of ½ vᵀ I v. Requires Velocity.
pub fn kinetic_energy(tree: &MultibodyTree, state: &State) -> Result<f64> {
    let velocity = state.velocity_cache()?;
    Ok(tree
        .mobilized_bodies()
        .map(|(id, node)| {
            let v = &velocity.v_m[id.index()];
            0.5 * v.dot(&node.inertia_m().mul_vec(v))
        })
        .sum())
}

/// Potential energy stored in the force elements. Requires Position.
pub fn potential_energy(tree: &MultibodyTree, forces: &ForceSet, state: &State) -> Result<f64> {
    forces.potential_energy(tree, state)
}

/// Total mechanical energy (kinetic + potential). Requires Velocity.
pub fn total_energy(tree: &MultibodyTree, forces: &ForceSet, state: &State) -> Result<f64> {
    Ok(kinetic_energy(tree, state)? + potential_energy(tree, forces, state)?)
}
