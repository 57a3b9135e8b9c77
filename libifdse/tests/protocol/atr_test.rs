#[path = "../common/mod.rs"]
mod common;

use common::fixtures::native_atr;
use libifdse::atr;
use libifdse::protocol::checksum::xor_sum;
use libifdse::Error;
use proptest::prelude::*;

#[test]
fn rewrite_literal_vector() {
    // Historical bytes "JCOP4 ATPO"
    let hb = [0x4A, 0x43, 0x4F, 0x50, 0x34, 0x20, 0x41, 0x54, 0x50, 0x4F];
    let mut out = [0u8; 32];
    let len = atr::rewrite(&native_atr(&hb), &mut out).unwrap();

    let expected = [
        0x3B, 0xFA, 0x96, 0x00, 0x00, 0x80, 0x11, 0xFE, // prologue, K=10
        0x4A, 0x43, 0x4F, 0x50, 0x34, 0x20, 0x41, 0x54, 0x50, 0x4F, // HB
        0x0B, // TCK
    ];
    assert_eq!(&out[..len], &expected);
}

#[test]
fn rewrite_fits_iso_limit() {
    // Even the longest allowed HB yields an ATR within 32 bytes.
    let hb = [0xA5u8; 15];
    let mut out = [0u8; 32];
    let len = atr::rewrite(&native_atr(&hb), &mut out).unwrap();
    assert_eq!(len, 24);
}

#[test]
fn rewrite_rejects_oversized_hb() {
    let hb = [0u8; 16];
    let mut out = [0u8; 32];
    assert!(matches!(
        atr::rewrite(&native_atr(&hb), &mut out),
        Err(Error::InvalidLength { .. })
    ));
}

proptest! {
    #[test]
    fn rewrite_shape_for_all_hb_lengths(hb in prop::collection::vec(any::<u8>(), 0..=15)) {
        let mut out = [0u8; 32];
        let len = atr::rewrite(&native_atr(&hb), &mut out).unwrap();

        prop_assert_eq!(len, 9 + hb.len());
        prop_assert_eq!(out[0], 0x3B);
        prop_assert_eq!(out[1], 0xF0 | hb.len() as u8);
        prop_assert_eq!(&out[8..8 + hb.len()], &hb[..]);
        prop_assert_eq!(out[len - 1], xor_sum(&out[1..len - 1]));
    }
}
