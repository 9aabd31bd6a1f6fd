//! A finalized tree paired with the forces acting on it.

use crate::energy;
use crate::forces::ForceSet;
use crate::realize::realize;
use arbor_model::{Error, MultibodyTree, Result, Stage, State};
use std::sync::Arc;

/// Everything needed to realize a state: topology plus force elements.
#[derive(Debug, Clone)]
pub struct MultibodySystem {
    tree: Arc<MultibodyTree>,
    forces: ForceSet,
}

impl MultibodySystem {
    /// Pair a finalized tree with its forces.
    pub fn new(tree: impl Into<Arc<MultibodyTree>>, forces: ForceSet) -> Result<Self> {
        let tree = tree.into();
        if !tree.is_finalized() {
            return Err(Error::Structural(
                "a multibody system needs a finalized tree".to_string(),
            ));
        }
        Ok(Self { tree, forces })
    }

    pub fn tree(&self) -> &MultibodyTree {
        &self.tree
    }

    pub fn forces(&self) -> &ForceSet {
        &self.forces
    }

    pub fn default_state(&self) -> Result<State> {
        self.tree.default_state()
    }

    /// See [`realize`](crate::realize()).
    pub fn realize(&self, state: &mut State, stage: Stage) -> Result<()> {
        realize(&self.tree, &self.forces, state, stage)
    }

    pub fn kinetic_energy(&self, state: &State) -> Result<f64> {
        energy::kinetic_energy(&self.tree, state)
    }

    pub fn potential_energy(&self, state: &State) -> Result<f64> {
        energy::potential_energy(&self.tree, &self.forces, state)
    }

    pub fn total_energy(&self, state: &State) -> Result<f64> {
        energy::total_energy(&self.tree, &self.forces, state)
    }
}
