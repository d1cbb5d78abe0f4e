//! Multilinear binning onto grids of runtime dimensionality.

pub mod regular;

pub use regular::LinearBinner;
