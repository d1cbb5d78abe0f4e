//! Parallel binning over chunks of points.
//!
//! Points are independent, but two points whose corners alias the same
//! output cell both add into it, so workers never share the output buffer.
//! Each worker bins its contiguous chunks into a private zeroed grid of
//! `nflat` cells; the private grids are reduced by elementwise summation
//! and the total is added into the caller's buffer.
//!
//! Peak memory is one extra grid per concurrently active worker, so this
//! pays off when there are many more points than grid cells.
use num_traits::Float;
use rayon::prelude::*;

use crate::fixed::FixedBinner;
use crate::kernel::{check_output, check_points, DepositRange, PointWeights, Unweighted, Weighted};
use crate::multilinear::LinearBinner;
use crate::BinError;

/// Fewest points handed to one worker at a time
const MIN_CHUNK: usize = 4096;

/// Bin unit-mass points onto a regular grid in up to 8 dimensions, in parallel.
///
/// Same inputs and result as [`crate::multilinear::regular::bin_nd`], up to
/// floating-point reassociation of the per-cell sums.
///
/// # Errors
/// * If any of the checks of [`crate::multilinear::regular::bin_nd`] fail
pub fn bin_nd_par<T, F>(
    dims: &[usize],
    nflat: usize,
    flags: &[F],
    obs: &[&[T]],
    out: &mut [T],
) -> Result<(), BinError>
where
    T: Float + Send + Sync,
    F: AsRef<[u8]> + Sync,
{
    dispatch(dims, nflat, flags, obs, &Unweighted, out)
}

/// Bin weighted points onto a regular grid in up to 8 dimensions, in parallel.
///
/// # Errors
/// * If any of the checks of [`crate::multilinear::regular::bin_nd_weighted`] fail
pub fn bin_nd_weighted_par<T, F>(
    dims: &[usize],
    nflat: usize,
    flags: &[F],
    obs: &[&[T]],
    weights: &[T],
    out: &mut [T],
) -> Result<(), BinError>
where
    T: Float + Send + Sync,
    F: AsRef<[u8]> + Sync,
{
    dispatch(dims, nflat, flags, obs, &Weighted(weights), out)
}

/// Bin unit-mass points onto a 2D grid in parallel.
///
/// # Errors
/// * If any of the checks of [`crate::two_dim::bin_2d`] fail
pub fn bin_2d_par<T: Float + Send + Sync>(
    dims: &[usize],
    nflat: usize,
    obs: &[&[T]],
    out: &mut [T],
) -> Result<(), BinError> {
    par_bin(&FixedBinner::<2>::new(dims, nflat)?, obs, &Unweighted, out)
}

/// Bin weighted points onto a 2D grid in parallel.
///
/// # Errors
/// * If any of the checks of [`crate::two_dim::bin_2d_weighted`] fail
pub fn bin_2d_weighted_par<T: Float + Send + Sync>(
    dims: &[usize],
    nflat: usize,
    obs: &[&[T]],
    weights: &[T],
    out: &mut [T],
) -> Result<(), BinError> {
    par_bin(
        &FixedBinner::<2>::new(dims, nflat)?,
        obs,
        &Weighted(weights),
        out,
    )
}

fn dispatch<T, F, W>(
    dims: &[usize],
    nflat: usize,
    flags: &[F],
    obs: &[&[T]],
    weights: &W,
    out: &mut [T],
) -> Result<(), BinError>
where
    T: Float + Send + Sync,
    F: AsRef<[u8]> + Sync,
    W: PointWeights<T> + Sync,
{
    macro_rules! run {
        ($n:literal) => {
            par_bin(
                &LinearBinner::<'_, F, $n>::new(dims, nflat, flags)?,
                obs,
                weights,
                out,
            )
        };
    }

    match dims.len() {
        1 => run!(1),
        2 => run!(2),
        3 => run!(3),
        4 => run!(4),
        5 => run!(5),
        6 => run!(6),
        7 => run!(7),
        8 => run!(8),
        0 => Err(BinError::InvalidGridShape("grid must have at least one axis")),
        _ => Err(BinError::InvalidGridShape(
            "Dimension exceeds maximum (8). Use binner struct directly for higher dimensions.",
        )),
    }
}

fn par_bin<B, T, W>(binner: &B, obs: &[&[T]], weights: &W, out: &mut [T]) -> Result<(), BinError>
where
    B: DepositRange + Sync,
    T: Float + Send + Sync,
    W: PointWeights<T> + Sync,
{
    let n = check_points(obs, binner.ndims(), weights)?;
    let nflat = binner.nflat();
    check_output(nflat, out.len())?;

    let chunk = (n / (4 * rayon::current_num_threads())).max(MIN_CHUNK);
    let nchunks = n.div_ceil(chunk);
    log::debug!("binning {n} points in {nchunks} chunks of up to {chunk} over {nflat} cells");

    let total = (0..nchunks)
        .into_par_iter()
        .fold(
            || vec![T::zero(); nflat],
            |mut acc, c| {
                let start = c * chunk;
                let end = (start + chunk).min(n);
                binner.deposit_range(obs, weights, start..end, &mut acc);
                acc
            },
        )
        .reduce_with(|mut a, b| {
            a.iter_mut().zip(b.iter()).for_each(|(x, y)| *x = *x + *y);
            a
        });

    if let Some(total) = total {
        out[..nflat]
            .iter_mut()
            .zip(total.iter())
            .for_each(|(o, t)| *o = *o + *t);
    }

    Ok(())
}
