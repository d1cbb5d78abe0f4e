//! Multilinear binning with the number of dimensions fixed at compile time.
//!
//! This is the general corner-enumeration algorithm of
//! [`LinearBinner`](crate::multilinear::LinearBinner) with the dimension
//! lifted into a const parameter. Corner bits are computed from the corner
//! number instead of read from a table, and every per-point loop has a
//! compile-time trip count, so the `2^N` corner loop unrolls into the same
//! straight-line code as a hand-written kernel. The 1D and 2D entry points
//! are thin wrappers over `FixedBinner<1>` and `FixedBinner<2>`.
//!
//! ```rust
//! use linbin::fixed::FixedBinner;
//!
//! // 3x3x3 grid, no aliasing
//! let binner = FixedBinner::<3>::new(&[3, 3, 3], 27).unwrap();
//!
//! let x = [0.5_f64];
//! let y = [1.0_f64];
//! let z = [1.25_f64];
//! let mut out = [0.0; 27];
//! binner.bin(&[&x[..], &y[..], &z[..]], &mut out).unwrap();
//!
//! assert!((out.iter().sum::<f64>() - 1.0).abs() < 1e-12);
//! ```
use core::ops::Range;

use num_traits::Float;

use crate::corners::BitOrder;
use crate::kernel::{
    bin_checked, check_output, deposit, fold_modulus, row_major_strides, split, DepositRange,
    PointWeights, Unweighted, Weighted,
};
use crate::BinError;

/// Multilinear binner for exactly `N` dimensions.
///
/// Holds only the row-major strides of the grid and the fold modulus,
/// so it is cheap to build for every call.
#[derive(Debug, Clone, Copy)]
pub struct FixedBinner<const N: usize> {
    /// Row-major stride of each axis
    strides: [isize; N],

    /// Length of the output grid; every flat index is folded modulo this
    nflat: isize,
}

impl<const N: usize> FixedBinner<N> {
    /// Number of corners of each cell
    const NCORNERS: usize = 1 << N;

    /// Build a binner for a grid of shape `dims` folded into `nflat` cells.
    ///
    /// `nflat` is usually `dims.iter().product()`, but may be smaller
    /// (or otherwise different) to alias the grid onto a shorter buffer.
    ///
    /// # Errors
    /// * If `dims.len() != N`, or `N == 0`
    /// * If any axis has zero entries
    /// * If `nflat` is zero
    pub fn new(dims: &[usize], nflat: usize) -> Result<Self, BinError> {
        if dims.len() != N {
            log::debug!(
                "rejected {}-dimensional grid for {N}-dimensional binner",
                dims.len()
            );
            return Err(BinError::ShapeMismatch(
                "grid dimensionality does not match binner",
            ));
        }
        let mut strides = [0_isize; N];
        row_major_strides(dims, &mut strides)?;
        let nflat = fold_modulus(nflat)?;

        Ok(Self { strides, nflat })
    }

    /// Bin points with unit mass.
    ///
    /// `obs[j][i]` is the coordinate of point `i` on axis `j`, already
    /// scaled into grid-index units. `out` must be zeroed by the caller
    /// if a fresh histogram is wanted; contributions are only ever added.
    ///
    /// # Errors
    /// * If `obs` does not hold `N` slices of equal length
    /// * If `out` is shorter than the declared grid length
    pub fn bin<T: Float>(&self, obs: &[&[T]], out: &mut [T]) -> Result<(), BinError> {
        bin_checked(self, obs, &Unweighted, out)
    }

    /// Bin points, each scaled by its own weight.
    ///
    /// # Errors
    /// * If `obs` does not hold `N` slices of equal length
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

    /// Bin a single point with mass `weight`.
    ///
    /// # Errors
    /// * If `out` is shorter than the declared grid length
    #[inline]
    pub fn bin_one<T: Float>(
        &self,
        x: &[T; N],
        weight: T,
        out: &mut [T],
    ) -> Result<(), BinError> {
        check_output(self.nflat as usize, out.len())?;
        self.deposit_one(x, weight, out);
        Ok(())
    }

    #[inline(always)]
    fn deposit_one<T: Float>(&self, x: &[T; N], weight: T, out: &mut [T]) {
        let mut ints = [0_isize; N];
        let mut fracs = [T::zero(); N];
        for j in 0..N {
            (ints[j], fracs[j]) = split(x[j]);
        }
        deposit(
            &ints,
            &fracs,
            &self.strides,
            self.nflat,
            Self::NCORNERS,
            |c, j| BitOrder::AxisZeroMostSignificant.bit(c, j, N),
            weight,
            out,
        );
    }
}

impl<const N: usize> DepositRange for FixedBinner<N> {
    fn ndims(&self) -> usize {
        N
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
        let mut x = [T::zero(); N];
        for i in range {
            (0..N).for_each(|j| x[j] = obs[j][i]);
            self.deposit_one(&x, weights.weight(i), out);
        }
    }
}
