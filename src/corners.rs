//! Corner enumeration for a cell of an `ndims`-dimensional grid.
//!
//! A cell has `2^ndims` corners. Corner `c` is described by an
//! `ndims`-bit pattern; bit `j` set means the corner takes the upper
//! (`floor + 1`) index and the `frac` weight factor on axis `j`, and bit
//! `j` clear means it takes the lower index and the `1 - frac` factor.
//!
//! A corner table is the `2^ndims x ndims` matrix whose row `c` is the
//! bit pattern of `c`. Both common conventions for the order of the bits
//! within a row are accepted:
//!
//! | Order                                | Row 1 of a 3-d table |
//! |--------------------------------------|----------------------|
//! | [`BitOrder::AxisZeroMostSignificant`]  | `[0, 0, 1]`          |
//! | [`BitOrder::AxisZeroLeastSignificant`] | `[1, 0, 0]`          |
//!
//! The first is what a cartesian product of `[0, 1]` over each axis
//! produces, and is what [`crate::utils::corner_table`] generates.
use crate::BinError;

/// Which axis of a corner table row holds the most significant bit of the row number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// Row `c`, column `j` holds bit `ndims - 1 - j` of `c`
    AxisZeroMostSignificant,
    /// Row `c`, column `j` holds bit `j` of `c`
    AxisZeroLeastSignificant,
}

impl BitOrder {
    /// Whether corner `corner` takes the upper index on `axis`.
    ///
    /// An `axis` outside `0..ndims`, or a bit position past the width of
    /// `usize`, reads as a clear bit.
    #[inline(always)]
    pub fn bit(self, corner: usize, axis: usize, ndims: usize) -> bool {
        if axis >= ndims {
            return false;
        }
        let shift = match self {
            Self::AxisZeroMostSignificant => ndims - 1 - axis,
            Self::AxisZeroLeastSignificant => axis,
        };
        u32::try_from(shift)
            .ok()
            .and_then(|s| corner.checked_shr(s))
            .is_some_and(|c| c & 1 == 1)
    }
}

/// Number of corners of a cell in `ndims` dimensions.
///
/// # Errors
/// * If `2^ndims` is not representable
pub fn num_corners(ndims: usize) -> Result<usize, BinError> {
    u32::try_from(ndims)
        .ok()
        .and_then(|n| 1_usize.checked_shl(n))
        .ok_or(BinError::InvalidGridShape(
            "too many dimensions to enumerate cell corners",
        ))
}

/// Check that `flags` is a complete corner table for `ndims` dimensions,
/// returning the bit order it was written in.
///
/// # Errors
/// * If there are not exactly `2^ndims` rows
/// * If any row does not have exactly `ndims` entries
/// * If any entry is not 0 or 1
/// * If row `c` is not the binary representation of `c` in either bit order
pub fn check_corner_table<F: AsRef<[u8]>>(
    flags: &[F],
    ndims: usize,
) -> Result<BitOrder, BinError> {
    let ncorners = num_corners(ndims)?;
    if flags.len() != ncorners {
        log::debug!(
            "rejected corner table with {} rows for {ndims} dimensions",
            flags.len()
        );
        return Err(BinError::InvalidCornerTable(
            "number of rows must be 2^ndims",
        ));
    }
    if !flags.iter().all(|row| row.as_ref().len() == ndims) {
        log::debug!("rejected corner table with rows not of width {ndims}");
        return Err(BinError::InvalidCornerTable(
            "every row must have one entry per axis",
        ));
    }
    if !flags.iter().all(|row| row.as_ref().iter().all(|&b| b <= 1)) {
        log::debug!("rejected corner table with non-binary entries");
        return Err(BinError::InvalidCornerTable("entries must be 0 or 1"));
    }

    let matches = |order: BitOrder| {
        flags.iter().enumerate().all(|(c, row)| {
            row.as_ref()
                .iter()
                .enumerate()
                .all(|(j, &b)| (b == 1) == order.bit(c, j, ndims))
        })
    };

    if matches(BitOrder::AxisZeroMostSignificant) {
        Ok(BitOrder::AxisZeroMostSignificant)
    } else if matches(BitOrder::AxisZeroLeastSignificant) {
        Ok(BitOrder::AxisZeroLeastSignificant)
    } else {
        log::debug!("rejected corner table not in binary counting order");
        Err(BinError::InvalidCornerTable(
            "row c must be the binary representation of c",
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bit_orders() {
        let msb = BitOrder::AxisZeroMostSignificant;
        let lsb = BitOrder::AxisZeroLeastSignificant;
        // 6 = 0b110
        assert_eq!(
            [msb.bit(6, 0, 3), msb.bit(6, 1, 3), msb.bit(6, 2, 3)],
            [true, true, false]
        );
        assert_eq!(
            [lsb.bit(6, 0, 3), lsb.bit(6, 1, 3), lsb.bit(6, 2, 3)],
            [false, true, true]
        );
    }

    #[test]
    fn test_bit_outside_axes_is_clear() {
        for order in [
            BitOrder::AxisZeroMostSignificant,
            BitOrder::AxisZeroLeastSignificant,
        ] {
            assert!(!order.bit(7, 3, 3));
            assert!(!order.bit(usize::MAX, usize::MAX, 3));
            assert!(!order.bit(usize::MAX, 0, 0));
        }
        // Bit positions past the width of the corner number
        assert!(!BitOrder::AxisZeroLeastSignificant.bit(usize::MAX, 70, 80));
        assert!(!BitOrder::AxisZeroMostSignificant.bit(usize::MAX, 0, 80));
    }

    #[test]
    fn test_num_corners() {
        assert_eq!(num_corners(0), Ok(1));
        assert_eq!(num_corners(3), Ok(8));
        assert!(num_corners(usize::BITS as usize).is_err());
    }

    #[test]
    fn test_accepts_both_orders() {
        let msb: [[u8; 2]; 4] = [[0, 0], [0, 1], [1, 0], [1, 1]];
        let lsb: [[u8; 2]; 4] = [[0, 0], [1, 0], [0, 1], [1, 1]];
        assert_eq!(
            check_corner_table(&msb, 2),
            Ok(BitOrder::AxisZeroMostSignificant)
        );
        assert_eq!(
            check_corner_table(&lsb, 2),
            Ok(BitOrder::AxisZeroLeastSignificant)
        );

        // In one dimension the two orders coincide
        let one: [[u8; 1]; 2] = [[0], [1]];
        assert_eq!(
            check_corner_table(&one, 1),
            Ok(BitOrder::AxisZeroMostSignificant)
        );
    }

    #[test]
    fn test_rejects_malformed_tables() {
        let short: [[u8; 2]; 3] = [[0, 0], [0, 1], [1, 0]];
        assert!(matches!(
            check_corner_table(&short, 2),
            Err(BinError::InvalidCornerTable(_))
        ));

        let ragged: [&[u8]; 4] = [&[0, 0], &[0, 1], &[1], &[1, 1]];
        assert!(matches!(
            check_corner_table(&ragged, 2),
            Err(BinError::InvalidCornerTable(_))
        ));

        let nonbinary: [[u8; 2]; 4] = [[0, 0], [0, 2], [1, 0], [1, 1]];
        assert!(matches!(
            check_corner_table(&nonbinary, 2),
            Err(BinError::InvalidCornerTable(_))
        ));

        let shuffled: [[u8; 2]; 4] = [[0, 0], [1, 1], [1, 0], [0, 1]];
        assert!(matches!(
            check_corner_table(&shuffled, 2),
            Err(BinError::InvalidCornerTable(_))
        ));

        let duplicated: [[u8; 2]; 4] = [[0, 0], [0, 1], [0, 1], [1, 1]];
        assert!(matches!(
            check_corner_table(&duplicated, 2),
            Err(BinError::InvalidCornerTable(_))
        ));
    }
}
