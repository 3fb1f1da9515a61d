//! Error types.

use thiserror::Error;

/// Errors produced by invalid arguments to the public API.
///
/// Numerical degeneracy in the geometry itself is never an error; the
/// algorithms absorb it (depth caps, degenerate-piece culling).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    /// Flattening tolerance was negative or NaN.
    #[error("flatness must be a non-negative number, got {0}")]
    InvalidFlatness(f64),

    /// Flattening recursion limit exceeds the supported maximum.
    #[error("recursion limit must be at most {max}, got {got}")]
    InvalidLimit { got: usize, max: usize },
}
