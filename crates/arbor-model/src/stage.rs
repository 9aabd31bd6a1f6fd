//! Realization stages and stage-tagged cache entries.

use crate::{Error, Result};

/// Dependency levels of derived quantities, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Structure only: body count and mobility indexing.
    Topology,
    /// Body poses, from q.
    Position,
    /// Body spatial velocities, from u.
    Velocity,
    /// Applied forces, generalized and body accelerations.
    Dynamics,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Topology,
        Stage::Position,
        Stage::Velocity,
        Stage::Dynamics,
    ];

    /// The stage immediately below this one, if any.
    pub fn prev(self) -> Option<Stage> {
        match self {
            Stage::Topology => None,
            Stage::Position => Some(Stage::Topology),
            Stage::Velocity => Some(Stage::Position),
            Stage::Dynamics => Some(Stage::Velocity),
        }
    }

    /// The stage immediately above this one, if any.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Topology => Some(Stage::Position),
            Stage::Position => Some(Stage::Velocity),
            Stage::Velocity => Some(Stage::Dynamics),
            Stage::Dynamics => None,
        }
    }
}

/// A cached value valid only while its stage is realized.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    stage: Stage,
    value: Option<T>,
}

impl<T> CacheEntry<T> {
    pub fn new(stage: Stage) -> Self {
        Self { stage, value: None }
    }

    /// Stage this entry belongs to.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    /// Drop the value if this entry depends on `stage` or anything above it.
    pub fn invalidate_from(&mut self, stage: Stage) {
        if self.stage >= stage {
            self.value = None;
        }
    }

    /// Read the value; `realized` is reported in the error when it is stale.
    pub fn get(&self, realized: Stage) -> Result<&T> {
        self.value.as_ref().ok_or(Error::StageViolation {
            required: self.stage,
            realized,
        })
    }
}
