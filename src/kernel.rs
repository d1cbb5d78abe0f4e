//! Arithmetic shared by every binning path.
//!
//! For a point with per-axis integer parts `int(x_j)` and fractional parts
//! `frac(x_j)`, a corner selects either `int(x_j)` (bit 0, weight `1 - frac`)
//! or `int(x_j) + 1` (bit 1, weight `frac`) on each axis. The corner's flat
//! index is the row-major offset of those per-axis indices, folded modulo
//! the declared output length, and its weight is the product of the
//! per-axis factors.
//!
//! Folding is never skipped, in any dimensionality. Indices are carried as
//! signed integers and folded with a Euclidean remainder, so points with
//! negative coordinates land inside the buffer rather than panicking.
use core::ops::Range;

use num_traits::Float;

use crate::BinError;

/// Per-point mass multiplier.
///
/// Monomorphizing on this keeps the weighted and unweighted loops
/// free of any per-point branch on whether weights were supplied.
pub(crate) trait PointWeights<T> {
    /// Mass of point `i`
    fn weight(&self, i: usize) -> T;

    /// Number of weights available, or `None` if any number of points is accepted
    fn len(&self) -> Option<usize>;
}

/// Every point carries unit mass.
#[derive(Clone, Copy)]
pub(crate) struct Unweighted;

impl<T: Float> PointWeights<T> for Unweighted {
    #[inline(always)]
    fn weight(&self, _i: usize) -> T {
        T::one()
    }

    #[inline(always)]
    fn len(&self) -> Option<usize> {
        None
    }
}

/// Each point carries the mass found at its own index.
#[derive(Clone, Copy)]
pub(crate) struct Weighted<'a, T>(pub &'a [T]);

impl<T: Float> PointWeights<T> for Weighted<'_, T> {
    #[inline(always)]
    fn weight(&self, i: usize) -> T {
        self.0[i]
    }

    #[inline(always)]
    fn len(&self) -> Option<usize> {
        Some(self.0.len())
    }
}

/// A validated binner that can deposit a range of points without further checks.
///
/// Implementors have already checked grid shape, corner enumeration and
/// fold modulus at construction; `deposit_range` trusts that `obs` and
/// `weights` have been checked by [`check_points`] and that
/// `out.len() >= self.nflat()`.
pub(crate) trait DepositRange {
    /// Number of axes
    fn ndims(&self) -> usize;

    /// Fold modulus
    fn nflat(&self) -> usize;

    /// Bin points `range` of `obs` into `out`.
    fn deposit_range<T: Float, W: PointWeights<T>>(
        &self,
        obs: &[&[T]],
        weights: &W,
        range: Range<usize>,
        out: &mut [T],
    );
}

/// Split a coordinate into its integer part, truncated toward zero,
/// and the remaining fraction.
///
/// Non-finite inputs map to integer part 0 and carry their non-finite
/// fraction into the weights.
#[inline(always)]
pub(crate) fn split<T: Float>(x: T) -> (isize, T) {
    let t = x.trunc();
    (t.to_isize().unwrap_or(0), x - t)
}

/// Weight factor along one axis for the lower (`upper == false`) or upper corner.
#[inline(always)]
pub(crate) fn factor<T: Float>(frac: T, upper: bool) -> T {
    if upper {
        frac
    } else {
        T::one() - frac
    }
}

/// Reduce a flat index into `[0, nflat)`.
#[inline(always)]
pub(crate) fn fold(flat: isize, nflat: isize) -> usize {
    flat.rem_euclid(nflat) as usize
}

/// Row-major flat index of one corner, before folding.
///
/// Equivalent to `flat = idx_0; flat = flat * dims[j] + idx_j` for each
/// later axis. Wrapping arithmetic keeps wildly out-of-range points on the
/// fold-don't-fail path instead of overflowing.
#[inline(always)]
pub(crate) fn flat_index(
    ints: &[isize],
    strides: &[isize],
    bit: impl Fn(usize) -> bool,
) -> isize {
    let mut k: isize = 0;
    for j in 0..ints.len() {
        let idx = ints[j].wrapping_add(bit(j) as isize);
        k = k.wrapping_add(idx.wrapping_mul(strides[j]));
    }
    k
}

/// Multilinear weight of one corner.
#[inline(always)]
pub(crate) fn corner_weight<T: Float>(fracs: &[T], bit: impl Fn(usize) -> bool) -> T {
    let mut w = T::one();
    for j in 0..fracs.len() {
        w = w * factor(fracs[j], bit(j));
    }
    w
}

/// Add one point's mass to each of its `ncorners` surrounding vertices.
///
/// `bit(c, j)` reports whether corner `c` takes the upper index on axis `j`.
/// With `ints`, `fracs` and `strides` sized by a compile-time dimension and
/// `bit` computed arithmetically, this unrolls into the closed-form
/// fixed-dimension kernels.
#[allow(clippy::too_many_arguments)]
#[inline(always)]
pub(crate) fn deposit<T: Float>(
    ints: &[isize],
    fracs: &[T],
    strides: &[isize],
    nflat: isize,
    ncorners: usize,
    bit: impl Fn(usize, usize) -> bool,
    mass: T,
    out: &mut [T],
) {
    for c in 0..ncorners {
        let k = flat_index(ints, strides, |j| bit(c, j));
        let w = corner_weight(fracs, |j| bit(c, j));
        let i = fold(k, nflat);
        out[i] = out[i] + w * mass;
    }
}

/// Row-major strides, `strides[j] = prod(dims[j+1..])`.
///
/// # Errors
/// * If `dims` is empty, longer than `strides`, or has a zero-sized axis
/// * If the product of the grid shape is not representable
pub(crate) fn row_major_strides(dims: &[usize], strides: &mut [isize]) -> Result<(), BinError> {
    let ndims = dims.len();
    if ndims == 0 {
        log::debug!("rejected empty grid shape");
        return Err(BinError::InvalidGridShape("grid must have at least one axis"));
    }
    if ndims > strides.len() {
        log::debug!(
            "rejected {ndims}-dimensional grid; at most {} supported",
            strides.len()
        );
        return Err(BinError::InvalidGridShape(
            "dimension exceeds maximum supported by this binner",
        ));
    }
    if dims.iter().any(|&d| d == 0) {
        log::debug!("rejected grid shape with a zero-sized axis");
        return Err(BinError::InvalidGridShape("all axes must have at least one entry"));
    }

    let mut acc: usize = 1;
    for i in 0..ndims {
        let j = ndims - i - 1;
        strides[j] = isize::try_from(acc)
            .map_err(|_| BinError::InvalidGridShape("grid size overflows index type"))?;
        acc = acc
            .checked_mul(dims[j])
            .ok_or(BinError::InvalidGridShape("grid size overflows index type"))?;
    }

    Ok(())
}

/// Convert a declared output grid length into a fold modulus.
///
/// # Errors
/// * If `nflat` is zero or not representable as a signed index
pub(crate) fn fold_modulus(nflat: usize) -> Result<isize, BinError> {
    if nflat == 0 {
        log::debug!("rejected zero-length output grid");
        return Err(BinError::ShapeMismatch("output grid length must be nonzero"));
    }
    isize::try_from(nflat)
        .map_err(|_| BinError::ShapeMismatch("output grid length overflows index type"))
}

/// Check that an output buffer of `nout` cells can hold every folded index.
pub(crate) fn check_output(nflat: usize, nout: usize) -> Result<(), BinError> {
    if nflat > nout {
        log::debug!("rejected output grid of length {nflat} over a buffer of {nout}");
        return Err(BinError::ShapeMismatch(
            "output buffer is shorter than the declared grid length",
        ));
    }
    Ok(())
}

/// Check that `obs` holds `ndims` equal-length coordinate slices
/// and that the weights cover the same points. Returns the number of points.
pub(crate) fn check_points<T, W: PointWeights<T>>(
    obs: &[&[T]],
    ndims: usize,
    weights: &W,
) -> Result<usize, BinError> {
    if obs.len() != ndims {
        log::debug!(
            "rejected {} coordinate axes for a {ndims}-dimensional grid",
            obs.len()
        );
        return Err(BinError::ShapeMismatch(
            "number of coordinate axes does not match grid",
        ));
    }
    let n = obs.first().map_or(0, |x| x.len());
    if !obs.iter().all(|x| x.len() == n) {
        log::debug!("rejected coordinate axes of unequal length");
        return Err(BinError::ShapeMismatch(
            "all coordinate axes must have the same length",
        ));
    }
    if let Some(nw) = weights.len() {
        if nw != n {
            log::debug!("rejected {nw} weights for {n} points");
            return Err(BinError::ShapeMismatch(
                "number of weights does not match number of points",
            ));
        }
    }
    Ok(n)
}

/// Validate inputs, then bin every point of `obs` into `out`.
pub(crate) fn bin_checked<B: DepositRange, T: Float, W: PointWeights<T>>(
    binner: &B,
    obs: &[&[T]],
    weights: &W,
    out: &mut [T],
) -> Result<(), BinError> {
    let n = check_points(obs, binner.ndims(), weights)?;
    check_output(binner.nflat(), out.len())?;
    log::trace!(
        "binning {n} points onto {}-dimensional grid of {} cells",
        binner.ndims(),
        binner.nflat()
    );
    binner.deposit_range(obs, weights, 0..n, out);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_split_truncates_toward_zero() {
        assert_eq!(split(2.25_f64), (2, 0.25));
        assert_eq!(split(3.0_f64), (3, 0.0));
        assert_eq!(split(-0.5_f64), (0, -0.5));
        assert_eq!(split(-1.75_f64), (-1, -0.75));

        let (i, f) = split(f64::NAN);
        assert_eq!(i, 0);
        assert!(f.is_nan());
    }

    #[test]
    fn test_factors_sum_to_one() {
        for f in [0.0_f64, 0.125, 0.5, 0.9, 1.0] {
            assert_eq!(factor(f, false) + factor(f, true), 1.0);
        }
    }

    #[test]
    fn test_fold_is_non_negative() {
        assert_eq!(fold(7, 5), 2);
        assert_eq!(fold(5, 5), 0);
        assert_eq!(fold(-1, 5), 4);
        assert_eq!(fold(-10, 5), 0);
    }

    #[test]
    fn test_row_major_strides() {
        let mut strides = [0_isize; 4];
        row_major_strides(&[2, 3, 4], &mut strides).unwrap();
        assert_eq!(&strides[..3], &[12, 4, 1]);

        assert_eq!(
            row_major_strides(&[], &mut strides),
            Err(BinError::InvalidGridShape("grid must have at least one axis"))
        );
        assert!(matches!(
            row_major_strides(&[2, 0], &mut strides),
            Err(BinError::InvalidGridShape(_))
        ));
        assert!(matches!(
            row_major_strides(&[2; 5], &mut strides),
            Err(BinError::InvalidGridShape(_))
        ));
        assert!(matches!(
            row_major_strides(&[usize::MAX, 2, 2], &mut strides),
            Err(BinError::InvalidGridShape(_))
        ));
    }

    #[test]
    fn test_flat_index_matches_horner_form() {
        let dims = [3_usize, 4, 5];
        let mut strides = [0_isize; 3];
        row_major_strides(&dims, &mut strides).unwrap();

        let ints = [1_isize, 2, 3];
        for c in 0..8_usize {
            let bit = |j: usize| (c >> (2 - j)) & 1 == 1;
            let mut horner = ints[0] + bit(0) as isize;
            for j in 1..3 {
                horner = horner * dims[j] as isize + ints[j] + bit(j) as isize;
            }
            assert_eq!(flat_index(&ints, &strides, bit), horner);
        }
    }

    #[test]
    fn test_corner_weights_partition_unity() {
        let fracs = [0.3_f64, 0.6, 0.85];
        let total: f64 = (0..8_usize)
            .map(|c| corner_weight(&fracs, |j| (c >> j) & 1 == 1))
            .sum();
        assert!((total - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_check_points() {
        let x = [0.5_f64, 1.5];
        let y = [0.5_f64];
        assert_eq!(check_points(&[&x[..], &x[..]], 2, &Unweighted), Ok(2));
        assert!(matches!(
            check_points(&[&x[..], &y[..]], 2, &Unweighted),
            Err(BinError::ShapeMismatch(_))
        ));
        assert!(matches!(
            check_points(&[&x[..]], 2, &Unweighted),
            Err(BinError::ShapeMismatch(_))
        ));
        assert!(matches!(
            check_points(&[&x[..]], 1, &Weighted(&y[..])),
            Err(BinError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_output_length_checks() {
        assert_eq!(fold_modulus(4), Ok(4));
        assert!(fold_modulus(0).is_err());
        assert!(fold_modulus(usize::MAX).is_err());
        assert_eq!(check_output(4, 4), Ok(()));
        assert_eq!(check_output(3, 4), Ok(()));
        assert!(check_output(5, 4).is_err());
    }
}
