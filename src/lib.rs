//! N-dimensional linear binning of scattered points onto regular grids,
//! no-std and no-alloc compatible.
//!
//! Linear binning spreads the mass of each point over the `2^ndims` grid
//! vertices of the cell that contains it, in proportion to their multilinear
//! interpolation weights. The result is a dense grid approximation of the
//! scattered data's (optionally weighted) density, ready for a convolution
//! or transform.
//!
//! Coordinates must already be scaled into grid-index units, so that the
//! integer part of a coordinate (truncated toward zero) is the lower corner
//! of its cell and the fractional part is its position within the cell.
//! Output is accumulated, never overwritten, into a caller-owned buffer in
//! C-style ordering. Every flat index is folded modulo the declared grid
//! length, in every dimensionality, so a grid can be aliased onto a shorter
//! buffer for periodic boundaries.
//!
//! # Performance Scalings
//! | Method                      | RAM       | Cost per point         |
//! |-----------------------------|-----------|------------------------|
//! | one_dim                     | O(1)      | O(2)                   |
//! | two_dim                     | O(1)      | O(4)                   |
//! | fixed::FixedBinner<N>       | O(N)      | O(2^N), unrolled       |
//! | multilinear::regular        | O(ndims)  | O(2^ndims * ndims)     |
//!
//! All input validation happens once per call, before any point is binned.
//! Coordinates themselves are not checked; out-of-range points fold into
//! unrelated cells rather than failing. Use
//! [`multilinear::regular::check_bounds`] first if that matters.
//!
//! # Example
//! ```rust
//! use linbin::{one_dim, two_dim, multilinear};
//!
//! // 1D, grid of 4 cells
//! let mut out = [0.0_f64; 4];
//! one_dim::bin_1d(&[2.5], &mut out).unwrap();
//! assert_eq!(out, [0.0, 0.0, 0.5, 0.5]);
//!
//! // 2D, 3x3 grid, weighted point on a vertex
//! let x = [1.0_f64];
//! let y = [1.0_f64];
//! let mut out = [0.0; 9];
//! two_dim::bin_2d_weighted(&[3, 3], 9, &[&x[..], &y[..]], &[2.0], &mut out).unwrap();
//! assert_eq!(out[4], 2.0);
//!
//! // 3D, 2x2x2 grid, with an explicit corner table
//! let flags = linbin::utils::corner_table(3);
//! let z = [0.5_f64];
//! let mut out = [0.0; 8];
//! multilinear::regular::bin_nd(&[2, 2, 2], 8, &flags, &[&z[..], &z[..], &z[..]], &mut out).unwrap();
//! assert_eq!(out, [0.125; 8]);
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
// These "needless" range loops are a significant speedup
#![allow(clippy::needless_range_loop)]

pub mod corners;
pub mod error;
pub mod fixed;
pub mod multilinear;
pub mod one_dim;
pub mod two_dim;

pub(crate) mod kernel;

#[cfg(feature = "rayon")]
pub mod par;

#[cfg(feature = "std")]
pub mod utils;

#[cfg(all(test, feature = "std"))]
pub(crate) mod testing;

pub use error::BinError;
pub use fixed::FixedBinner;
pub use multilinear::LinearBinner;
