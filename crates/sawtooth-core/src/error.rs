//! Failures raised by the pipeline itself.
//!
//! Failures from caller-supplied getters, setters and transforms are not
//! represented here: they are handed back to the caller exactly as produced.

use std::fmt;

/// Conditions the pipeline reports on its own behalf.
///
/// Returned inside `anyhow::Error`; recover with `err.downcast_ref::<PipelineError>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The pipeline was built without steps. Every invocation fails before
    /// touching any tier.
    InvalidSeries,

    /// Every getter reported no value for the key.
    Exhausted {
        /// Number of steps in the series
        steps: usize,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::InvalidSeries => {
                write!(f, "invalid step series: a pipeline needs at least one step")
            }
            PipelineError::Exhausted { steps } => {
                write!(f, "no step produced a value (searched {} steps)", steps)
            }
        }
    }
}

impl std::error::Error for PipelineError {}
