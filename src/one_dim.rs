//! One-dimensional linear binning.
//!
//! Each point at coordinate `x` adds `1 - frac(x)` of its mass to cell
//! `trunc(x)` and `frac(x)` to cell `trunc(x) + 1`. The output buffer is the
//! whole grid, and indices fold modulo its length just as they do in every
//! other dimensionality, so a point in the last cell spills its upper share
//! into cell 0 rather than off the end of the buffer.
//!
//! ```rust
//! use linbin::one_dim;
//!
//! let x = [2.25_f64];
//! let mut out = [0.0; 4];
//! one_dim::bin_1d(&x, &mut out).unwrap();
//! assert_eq!(out, [0.0, 0.0, 0.75, 0.25]);
//! ```
use num_traits::Float;

use crate::fixed::FixedBinner;
use crate::BinError;

fn binner<T>(out: &[T]) -> Result<FixedBinner<1>, BinError> {
    if out.is_empty() {
        log::debug!("rejected empty output buffer");
        return Err(BinError::ShapeMismatch("output buffer must not be empty"));
    }
    FixedBinner::<1>::new(&[out.len()], out.len())
}

/// Bin unit-mass points onto a 1D grid the length of `out`.
///
/// # Errors
/// * If `out` is empty
pub fn bin_1d<T: Float>(x: &[T], out: &mut [T]) -> Result<(), BinError> {
    binner(out)?.bin(&[x], out)
}

/// Bin weighted points onto a 1D grid the length of `out`.
///
/// # Errors
/// * If `out` is empty
/// * If `x` and `weights` have different lengths
pub fn bin_1d_weighted<T: Float>(x: &[T], weights: &[T], out: &mut [T]) -> Result<(), BinError> {
    binner(out)?.bin_weighted(&[x], weights, out)
}

/// Length of the smallest grid that holds both bracketing cells of every
/// point without folding, or 2 if there are no finite non-negative points.
///
/// This follows the largest coordinate, so a single stray point far from
/// the rest (say `1e18`) asks for a correspondingly huge grid.
pub fn grid_len<T: Float>(x: &[T]) -> usize {
    let top = x
        .iter()
        .filter_map(|v| v.trunc().to_usize())
        .max()
        .unwrap_or(0);
    top.saturating_add(2)
}

#[cfg(feature = "std")]
fn zeroed_grid<T: Float>(n: usize) -> Result<Vec<T>, BinError> {
    let mut out = Vec::new();
    if out.try_reserve_exact(n).is_err() {
        log::debug!("could not allocate a 1D grid of {n} cells");
        return Err(BinError::InvalidGridShape("grid too large to allocate"));
    }
    out.resize(n, T::zero());
    Ok(out)
}

/// Bin unit-mass points, allocating a zeroed grid of [`grid_len`] cells.
///
/// For best results, use the `bin_1d` function with preallocated output;
/// allocation has a significant performance cost, and should be used sparingly.
///
/// # Errors
/// * If the grid needed to cover the largest coordinate can't be allocated
#[cfg(feature = "std")]
pub fn bin_1d_alloc<T: Float>(x: &[T]) -> Result<Vec<T>, BinError> {
    let mut out = zeroed_grid(grid_len(x))?;
    bin_1d(x, &mut out)?;
    Ok(out)
}

/// Bin weighted points, allocating a zeroed grid of [`grid_len`] cells.
///
/// # Errors
/// * If the grid needed to cover the largest coordinate can't be allocated
/// * If `x` and `weights` have different lengths
#[cfg(feature = "std")]
pub fn bin_1d_weighted_alloc<T: Float>(x: &[T], weights: &[T]) -> Result<Vec<T>, BinError> {
    let mut out = zeroed_grid(grid_len(x))?;
    bin_1d_weighted(x, weights, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::multilinear::regular::{bin_nd, bin_nd_weighted};
    use crate::utils::corner_table;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_point() {
        let mut out = [0.0_f64; 4];
        bin_1d(&[2.3], &mut out).unwrap();
        assert_relative_eq!(out[2], 0.7, epsilon = 1e-12);
        assert_relative_eq!(out[3], 0.3, epsilon = 1e-12);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 0.0);
    }

    #[test]
    fn test_accumulates_weighted() {
        let x = [0.5_f64, 0.5, 1.0];
        let w = [2.0_f64, 4.0, 0.5];
        let mut out = [1.0_f64; 3];
        bin_1d_weighted(&x, &w, &mut out).unwrap();
        assert_eq!(out, [4.0, 4.5, 1.0]);
    }

    /// Fractions `f` and `1 - f` mirror each other about the cell center
    #[test]
    fn test_mirror_symmetry() {
        for f in [0.1_f64, 0.25, 0.4, 0.5] {
            let mut a = [0.0; 3];
            let mut b = [0.0; 3];
            bin_1d(&[1.0 + f], &mut a).unwrap();
            bin_1d(&[1.0 + (1.0 - f)], &mut b).unwrap();
            assert_relative_eq!(a[1], b[2], epsilon = 1e-12);
            assert_relative_eq!(a[2], b[1], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_folds_at_end_of_buffer() {
        let mut out = [0.0_f64; 3];
        bin_1d(&[2.25], &mut out).unwrap();
        assert_eq!(out, [0.25, 0.0, 0.75]);
    }

    #[test]
    fn test_matches_general_path() {
        let mut rng = crate::testing::rng_fixed_seed();
        // Mostly on-grid, plus points below zero and past the end that must fold
        let x: Vec<f64> = crate::testing::randn::<f64>(&mut rng, 200)
            .iter()
            .map(|u| 9.0 * u)
            .chain([-0.25, -1.5, -13.75, 9.5, 10.0, 27.3])
            .collect();
        let w = crate::testing::randn::<f64>(&mut rng, x.len());
        let flags = corner_table(1);

        let mut fast = vec![0.0; 10];
        let mut general = vec![0.0; 10];
        bin_1d(&x, &mut fast).unwrap();
        bin_nd(&[10], 10, &flags, &[&x[..]], &mut general).unwrap();
        fast.iter()
            .zip(general.iter())
            .for_each(|(a, b)| assert_relative_eq!(*a, *b, epsilon = 1e-12));

        let mut fast = vec![0.0; 10];
        let mut general = vec![0.0; 10];
        bin_1d_weighted(&x, &w, &mut fast).unwrap();
        bin_nd_weighted(&[10], 10, &flags, &[&x[..]], &w, &mut general).unwrap();
        fast.iter()
            .zip(general.iter())
            .for_each(|(a, b)| assert_relative_eq!(*a, *b, epsilon = 1e-12));
    }

    #[test]
    fn test_alloc_sizes_grid() {
        let x = [0.5_f64, 3.75, 1.0];
        let out = bin_1d_alloc(&x).unwrap();
        assert_eq!(out.len(), 5);
        assert_eq!(out, vec![0.5, 1.5, 0.0, 0.25, 0.75]);

        let w = [2.0_f64, 2.0, 2.0];
        let out = bin_1d_weighted_alloc(&x, &w).unwrap();
        assert_relative_eq!(out.iter().sum::<f64>(), 6.0, epsilon = 1e-12);

        assert_eq!(grid_len::<f64>(&[]), 2);
        assert_eq!(grid_len(&[-3.0_f64, f64::NAN]), 2);
    }

    /// A far outlier asks for more cells than can be addressed
    #[test]
    fn test_alloc_rejects_unallocatable_grid() {
        let x = [0.5_f64, 1e19];
        assert!(matches!(
            bin_1d_alloc(&x),
            Err(BinError::InvalidGridShape(_))
        ));
        assert!(matches!(
            bin_1d_weighted_alloc(&x, &[1.0, 1.0]),
            Err(BinError::InvalidGridShape(_))
        ));
    }

    #[test]
    fn test_validation() {
        let mut empty: [f64; 0] = [];
        assert!(matches!(
            bin_1d(&[0.5], &mut empty),
            Err(BinError::ShapeMismatch(_))
        ));
        let mut out = [0.0_f64; 2];
        assert!(matches!(
            bin_1d_weighted(&[0.5], &[1.0, 1.0], &mut out),
            Err(BinError::ShapeMismatch(_))
        ));
    }
}
