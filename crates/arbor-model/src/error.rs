//! Error types shared by the arbor crates.

use crate::Stage;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed tree, or a structural change after finalization.
    #[error("structural error: {0}")]
    Structural(String),

    /// A cached quantity was read before its stage was realized.
    #[error("stage violation: {required:?} required but state is realized only to {realized:?}")]
    StageViolation { required: Stage, realized: Stage },

    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// Local error stayed above tolerance at the minimum step size.
    #[error("integrator failed to converge at t={time}: step {step:e} gave error norm {error:e}")]
    NumericalNonConvergence { time: f64, step: f64, error: f64 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, Error>;
