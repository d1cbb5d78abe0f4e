//! Multilinear binning onto a regular grid of any dimensionality.
//!
//! Each point's mass is split among the `2^ndims` vertices of the grid cell
//! that contains it, in proportion to the multilinear interpolation weight
//! of each vertex: the product over axes of `1 - frac` for a vertex on the
//! lower side of the point, or `frac` for one on the upper side. This is
//! the adjoint of multilinear interpolation; interpolating a grid of ones
//! at the point would recover its mass.
//!
//! The vertices to visit are read from a caller-supplied corner table
//! (see [`crate::corners`]) which is checked once at construction.
//! Coordinates must already be scaled into grid-index units.
//!
//! Operation Complexity
//! * O(2^ndims * ndims) per point, independent of grid size.
//!
//! Memory Complexity
//! * Peak stack usage is O(MAXDIMS), which is minimally O(ndims).
//! * No allocation.
//!
//! ```rust
//! use linbin::multilinear::regular;
//!
//! // 3x4 grid, one point
//! let dims = [3, 4];
//! let nflat = 12;
//! let flags: [[u8; 2]; 4] = [[0, 0], [0, 1], [1, 0], [1, 1]];
//!
//! let x = [0.25_f64];
//! let y = [2.5_f64];
//! let obs = [&x[..], &y[..]];
//!
//! let mut out = [0.0; 12];
//! regular::bin_nd(&dims, nflat, &flags, &obs, &mut out).unwrap();
//!
//! assert_eq!(out[2], 0.375); // (0, 2)
//! assert_eq!(out[3], 0.375); // (0, 3)
//! assert_eq!(out[6], 0.125); // (1, 2)
//! assert_eq!(out[7], 0.125); // (1, 3)
//! ```
use core::ops::Range;

use num_traits::{Float, NumCast};

use crate::corners::{check_corner_table, BitOrder};
use crate::kernel::{
    bin_checked, check_output, deposit, fold_modulus, row_major_strides, split, DepositRange,
    PointWeights, Unweighted, Weighted,
};
use crate::BinError;

/// An arbitrary-dimensional multilinear binner on a regular grid.
///
/// Output is in C-style ordering (z(x0, y0), z(x0, y1), ..., z(x0, yn), z(x1, y0), ...),
/// folded modulo the declared grid length `nflat`.
pub struct LinearBinner<'a, F: AsRef<[u8]>, const MAXDIMS: usize> {
    /// Number of dimensions
    ndims: usize,

    /// Row-major stride of each axis, size ndims
    strides: [isize; MAXDIMS],

    /// Length of the output grid; every flat index is folded modulo this
    nflat: isize,

    /// Bit pattern of each corner, size 2^ndims x ndims
    flags: &'a [F],

    /// Bit order the corner table was written in
    order: BitOrder,
}

impl<'a, F: AsRef<[u8]>, const MAXDIMS: usize> LinearBinner<'a, F, MAXDIMS> {
    /// Build a new binner, using O(MAXDIMS) storage and O(2^ndims * ndims)
    /// calculations to check the corner table.
    ///
    /// # Errors
    /// * If `dims` is empty, has more than MAXDIMS entries, or has a zero-sized axis
    /// * If `nflat` is zero
    /// * If `flags` is not a complete corner table for `dims.len()` dimensions
    pub fn new(dims: &[usize], nflat: usize, flags: &'a [F]) -> Result<Self, BinError> {
        let ndims = dims.len();
        let mut strides = [0_isize; MAXDIMS];
        row_major_strides(dims, &mut strides)?;
        let nflat = fold_modulus(nflat)?;
        let order = check_corner_table(flags, ndims)?;

        Ok(Self {
            ndims,
            strides,
            nflat,
            flags,
            order,
        })
    }

    /// Bit order of the corner table this binner was built with.
    pub fn bit_order(&self) -> BitOrder {
        self.order
    }

    /// Bin points with unit mass.
    ///
    /// `obs[j][i]` is the coordinate of point `i` on axis `j`, already
    /// scaled into grid-index units. Contributions are added to `out`,
    /// which should be zeroed by the caller for a fresh histogram.
    ///
    /// # Errors
    /// * If `obs` does not hold one slice per axis, all of equal length
    /// * If `out` is shorter than the declared grid length
    pub fn bin<T: Float>(&self, obs: &[&[T]], out: &mut [T]) -> Result<(), BinError> {
        bin_checked(self, obs, &Unweighted, out)
    }

    /// Bin points, each scaled by its own weight.
    ///
    /// # Errors
    /// * If `obs` does not hold one slice per axis, all of equal length
    /// * If `weights` has a different length than the coordinate slices
    /// * If `out` is shorter than the declared grid length
    pub fn bin_weighted<T: Float>(
        &self,
        obs: &[&[T]],
        weights: &[T],
        out: &mut [T],
    ) -> Result<(), BinError> {
        bin_checked(self, obs, &Weighted(weights), out)
    }

    /// Bin a single point with mass `weight`,
    /// using fixed-size intermediate storage of O(ndims) and no allocation.
    ///
    /// # Errors
    /// * If the dimensionality of the point does not match the grid
    /// * If `out` is shorter than the declared grid length
    pub fn bin_one<T: Float>(&self, x: &[T], weight: T, out: &mut [T]) -> Result<(), BinError> {
        if x.len() != self.ndims {
            return Err(BinError::ShapeMismatch(
                "point dimensionality does not match grid",
            ));
        }
        check_output(self.nflat as usize, out.len())?;
        self.deposit_one(x, weight, out);
        Ok(())
    }

    #[inline(always)]
    fn deposit_one<T: Float>(&self, x: &[T], weight: T, out: &mut [T]) {
        let ndims = self.ndims;

        // Initialize fixed-size intermediate storage
        let ints = &mut [0_isize; MAXDIMS][..ndims]; // Indices of lower corner of cell
        let fracs = &mut [T::zero(); MAXDIMS][..ndims]; // Position within cell
        for j in 0..ndims {
            (ints[j], fracs[j]) = split(x[j]);
        }

        let flags = self.flags;
        deposit(
            ints,
            fracs,
            &self.strides[..ndims],
            self.nflat,
            flags.len(),
            |c, j| flags[c].as_ref()[j] == 1,
            weight,
            out,
        );
    }
}

impl<F: AsRef<[u8]>, const MAXDIMS: usize> DepositRange for LinearBinner<'_, F, MAXDIMS> {
    fn ndims(&self) -> usize {
        self.ndims
    }

    fn nflat(&self) -> usize {
        self.nflat as usize
    }

    #[inline]
    fn deposit_range<T: Float, W: PointWeights<T>>(
        &self,
        obs: &[&[T]],
        weights: &W,
        range: Range<usize>,
        out: &mut [T],
    ) {
        let ndims = self.ndims;
        let tmp = &mut [T::zero(); MAXDIMS][..ndims];
        for i in range {
            (0..ndims).for_each(|j| tmp[j] = obs[j][i]);
            self.deposit_one(tmp, weights.weight(i), out);
        }
    }
}

/// Bin unit-mass points onto a regular grid in up to 8 dimensions.
///
/// `dims` is the number of grid points along each axis, `nflat` the number of
/// output cells that flat indices fold onto (normally `dims.iter().product()`),
/// and `flags` the `2^ndims x ndims` corner table.
///
/// This is a convenience function that dispatches onto a binner with exactly
/// the right MAXDIMS; use [`LinearBinner`] directly for higher dimensions.
///
/// # Errors
/// * If any of the checks of [`LinearBinner::new`] or [`LinearBinner::bin`] fail
/// * If there are more than 8 dimensions
pub fn bin_nd<T: Float, F: AsRef<[u8]>>(
    dims: &[usize],
    nflat: usize,
    flags: &[F],
    obs: &[&[T]],
    out: &mut [T],
) -> Result<(), BinError> {
    dispatch(dims, nflat, flags, obs, &Unweighted, out)
}

/// Bin weighted points onto a regular grid in up to 8 dimensions.
///
/// # Errors
/// * If any of the checks of [`LinearBinner::new`] or [`LinearBinner::bin_weighted`] fail
/// * If there are more than 8 dimensions
pub fn bin_nd_weighted<T: Float, F: AsRef<[u8]>>(
    dims: &[usize],
    nflat: usize,
    flags: &[F],
    obs: &[&[T]],
    weights: &[T],
    out: &mut [T],
) -> Result<(), BinError> {
    dispatch(dims, nflat, flags, obs, &Weighted(weights), out)
}

/// Bin unit-mass points, allocating a zeroed output grid of length `nflat`.
///
/// For best results, use the `bin_nd` function with preallocated output;
/// allocation has a significant performance cost, and should be used sparingly.
#[cfg(feature = "std")]
pub fn bin_nd_alloc<T: Float, F: AsRef<[u8]>>(
    dims: &[usize],
    nflat: usize,
    flags: &[F],
    obs: &[&[T]],
) -> Result<Vec<T>, BinError> {
    let mut out = vec![T::zero(); nflat];
    bin_nd(dims, nflat, flags, obs, &mut out)?;
    Ok(out)
}

/// Bin weighted points, allocating a zeroed output grid of length `nflat`.
#[cfg(feature = "std")]
pub fn bin_nd_weighted_alloc<T: Float, F: AsRef<[u8]>>(
    dims: &[usize],
    nflat: usize,
    flags: &[F],
    obs: &[&[T]],
    weights: &[T],
) -> Result<Vec<T>, BinError> {
    let mut out = vec![T::zero(); nflat];
    bin_nd_weighted(dims, nflat, flags, obs, weights, &mut out)?;
    Ok(out)
}

fn dispatch<T: Float, F: AsRef<[u8]>, W: PointWeights<T>>(
    dims: &[usize],
    nflat: usize,
    flags: &[F],
    obs: &[&[T]],
    weights: &W,
    out: &mut [T],
) -> Result<(), BinError> {
    // Expanding out and using the specialized version for each size
    // keeps intermediate storage at exactly the size needed
    macro_rules! run {
        ($n:literal) => {
            bin_checked(
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

/// Check whether a list of observation points lands inside the grid
/// within some absolute tolerance, before the fold.
///
/// Binning itself never checks coordinates; this is the opt-in check.
/// A coordinate on axis `j` is in bounds if it is finite and lies in
/// `[0, dims[j] - 1]`, so that both of its bracketing indices are on the grid
/// (or, exactly at the last grid point, the upper one receives zero mass).
///
/// Output slice entry `i` is set to `false` if no points on that dimension are out of bounds,
/// and set to `true` if there is a bounds violation on that axis.
///
/// # Errors
/// * If the dimensionality of the grid does not match the dimensionality of the observation points
/// * If the output slice length does not match the dimensionality of the grid
pub fn check_bounds<T: Float>(
    dims: &[usize],
    obs: &[&[T]],
    atol: T,
    out: &mut [bool],
) -> Result<(), BinError> {
    let ndims = dims.len();
    if !(obs.len() == ndims && out.len() == ndims) {
        return Err(BinError::ShapeMismatch(
            "number of coordinate axes does not match grid",
        ));
    }

    for i in 0..ndims {
        match <T as NumCast>::from(dims[i].saturating_sub(1)) {
            Some(last) => {
                let bad = obs[i]
                    .iter()
                    .any(|&x| !x.is_finite() || x < -atol || (x - last) > atol);
                out[i] = bad;
            }
            // A grid too long to represent can't be checked against
            None => out[i] = true,
        }
    }
    Ok(())
}
