//! Error kinds raised by input validation.
//!
//! Every check runs once, before any point is binned; the per-point
//! loops themselves are infallible.

use thiserror::Error;

/// Reasons a binning call can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BinError {
    /// Lengths of coordinates, weights, grid shape or output buffer disagree.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(&'static str),

    /// The grid shape is empty, has a zero-sized axis, or exceeds the supported dimensionality.
    #[error("invalid grid shape: {0}")]
    InvalidGridShape(&'static str),

    /// The corner table is not a complete `2^ndims x ndims` binary enumeration.
    #[error("invalid corner table: {0}")]
    InvalidCornerTable(&'static str),
}
