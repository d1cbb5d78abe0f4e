//! Building this module successfully guarantees that the library is no-std compatible

#![no_std]
#![no_main]

use core::panic::PanicInfo;

use linbin::{fixed::FixedBinner, multilinear::regular, one_dim, two_dim};

#[panic_handler]
fn panic(_info: &PanicInfo) -> ! {
    // We can't print, so there's not much to do here
    loop {}
}

#[no_mangle]
pub fn _start() -> ! {
    let x = [0.5_f64, 1.25];
    let y = [1.0_f64, 0.75];
    let w = [2.0_f64, 1.0];
    let obs = [&x[..], &y[..]]; // Slightly weird syntax to get slice of slice without vec

    let dims = [3, 3];
    let flags: [[u8; 2]; 4] = [[0, 0], [0, 1], [1, 0], [1, 1]];

    let mut out = [0.0; 9];

    one_dim::bin_1d(&x, &mut out).unwrap();
    two_dim::bin_2d_weighted(&dims, 9, &obs, &w, &mut out).unwrap();
    regular::bin_nd(&dims, 9, &flags, &obs, &mut out).unwrap();
    FixedBinner::<2>::new(&dims, 9)
        .unwrap()
        .bin_one(&[0.5, 0.5], 1.0, &mut out)
        .unwrap();

    loop {} // We don't actually run this, just compile it
}
