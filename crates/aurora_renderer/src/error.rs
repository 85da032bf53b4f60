//! Renderer error types.

use thiserror::Error;

/// Errors surfaced by viewport operations. Numerical anomalies inside the
/// integrator are not errors: they are recovered per sample and reported
/// through the counters.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The caller passed an unusable argument (zero dimensions, zero tile
    /// size).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A buffer allocation failed.
    #[error("allocation failure: {0}")]
    AllocationFailure(String),
}
