//! Staged realization: bring a state's caches up to a requested stage.

use crate::aba::aba;
use crate::forces::ForceSet;
use crate::kinematics::{ground_accelerations, realize_position, realize_velocity};
use arbor_model::{DynamicsCache, MultibodyTree, Result, Stage, State};

/// Realize `state` through `stage`.
///
/// Only the stages above the state's current one are computed, so calling this
/// twice with the same stage does nothing the second time.
pub fn realize(
    tree: &MultibodyTree,
    forces: &ForceSet,
    state: &mut State,
    stage: Stage,
) -> Result<()> {
    tree.check_state(state)?;
    // Dynamics results computed with other forces are stale.
    if state.stage() == Stage::Dynamics && state.dynamics_cache()?.force_set != forces.id() {
        state.invalidate_from(Stage::Dynamics);
    }
    while state.stage() < stage {
        match state.stage().next() {
            Some(Stage::Position) => realize_position(tree, state)?,
            Some(Stage::Velocity) => realize_velocity(tree, state)?,
            Some(Stage::Dynamics) => realize_dynamics(tree, forces, state)?,
            Some(Stage::Topology) | None => break,
        }
    }
    Ok(())
}

fn realize_dynamics(tree: &MultibodyTree, forces: &ForceSet, state: &mut State) -> Result<()> {
    let applied = forces.calc_forces(tree, state)?;
    let solution = aba(tree, state, &applied)?;
    let a_gb = ground_accelerations(state, &solution.a_m)?;

    state.commit_dynamics(DynamicsCache {
        udot: solution.udot,
        a_m: solution.a_m,
        a_gb,
        body_forces: applied.body,
        mobility_forces: applied.mobility,
        force_set: forces.id(),
    })
}
