//! Two-dimensional bilinear binning.
//!
//! For a point with fractions `fx`, `fy` in its cell, the four corners
//! receive `(1 - fx)(1 - fy)`, `(1 - fx) fy`, `fx (1 - fy)` and `fx fy` of its
//! mass. Flat indices use stride `dims[1]` along the first axis and fold
//! modulo the declared grid length.
//!
//! ```rust
//! use linbin::two_dim;
//!
//! let x = [1.0_f64];
//! let y = [1.0_f64];
//! let mut out = [0.0; 9];
//! two_dim::bin_2d_weighted(&[3, 3], 9, &[&x[..], &y[..]], &[2.0], &mut out).unwrap();
//! assert_eq!(out[4], 2.0);
//! ```
use num_traits::Float;

use crate::fixed::FixedBinner;
use crate::BinError;

/// Bin unit-mass points onto a 2D grid of shape `dims`, folded into `nflat` cells.
///
/// # Errors
/// * If `dims` does not have exactly two nonzero entries
/// * If `obs` does not hold two slices of equal length
/// * If `nflat` is zero or longer than `out`
pub fn bin_2d<T: Float>(
    dims: &[usize],
    nflat: usize,
    obs: &[&[T]],
    out: &mut [T],
) -> Result<(), BinError> {
    FixedBinner::<2>::new(dims, nflat)?.bin(obs, out)
}

/// Bin weighted points onto a 2D grid of shape `dims`, folded into `nflat` cells.
///
/// # Errors
/// * If `dims` does not have exactly two nonzero entries
/// * If `obs` does not hold two slices of equal length
/// * If `weights` has a different length than the coordinate slices
/// * If `nflat` is zero or longer than `out`
pub fn bin_2d_weighted<T: Float>(
    dims: &[usize],
    nflat: usize,
    obs: &[&[T]],
    weights: &[T],
    out: &mut [T],
) -> Result<(), BinError> {
    FixedBinner::<2>::new(dims, nflat)?.bin_weighted(obs, weights, out)
}

/// Bin unit-mass points, allocating a zeroed output grid of length `nflat`.
///
/// For best results, use the `bin_2d` function with preallocated output;
/// allocation has a significant performance cost, and should be used sparingly.
#[cfg(feature = "std")]
pub fn bin_2d_alloc<T: Float>(
    dims: &[usize],
    nflat: usize,
    obs: &[&[T]],
) -> Result<Vec<T>, BinError> {
    let mut out = vec![T::zero(); nflat];
    bin_2d(dims, nflat, obs, &mut out)?;
    Ok(out)
}

/// Bin weighted points, allocating a zeroed output grid of length `nflat`.
#[cfg(feature = "std")]
pub fn bin_2d_weighted_alloc<T: Float>(
    dims: &[usize],
    nflat: usize,
    obs: &[&[T]],
    weights: &[T],
) -> Result<Vec<T>, BinError> {
    let mut out = vec![T::zero(); nflat];
    bin_2d_weighted(dims, nflat, obs, weights, &mut out)?;
    Ok(out)
}
