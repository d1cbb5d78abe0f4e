//! Convenience methods for constructing grids and corner tables in a way that echoes,
//! but does not exactly match, methods common in scripting languages.
use itertools::Itertools;
use num_traits::Float;

/// Generates evenly spaced values from start to stop,
/// including the endpoint.
pub fn linspace<T>(start: T, stop: T, n: usize) -> Vec<T>
where
    T: Float,
{
    let dx: T = (stop - start) / T::from(n - 1).unwrap();
    (0..n).map(|i| start + T::from(i).unwrap() * dx).collect()
}

/// Generates a meshgrid in C ordering (x0, y0, z0, x0, y0, z1, ..., x0, yn, zn)
pub fn meshgrid<T>(x: Vec<&Vec<T>>) -> Vec<Vec<T>>
where
    T: Float,
{
    x.into_iter()
        .multi_cartesian_product()
        .map(|xx| xx.iter().map(|y| **y).collect())
        .collect()
}

/// Generates the `2^ndims x ndims` corner table in C ordering, so that row `c`
/// is the binary representation of `c` with axis 0 as the most significant bit:
/// `[0, .., 0, 0], [0, .., 0, 1], [0, .., 1, 0], ..., [1, .., 1, 1]`.
///
/// Generate this once per dimensionality and reuse it for every binning call.
pub fn corner_table(ndims: usize) -> Vec<Vec<u8>> {
    if ndims == 0 {
        return vec![vec![]];
    }
    (0..ndims)
        .map(|_| [0_u8, 1])
        .multi_cartesian_product()
        .collect()
}
