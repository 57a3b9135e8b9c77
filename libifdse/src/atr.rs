// libifdse-rs/libifdse/src/atr.rs

//! ATR rewriting for the SE05x.
//!
//! The SE05x's native answer-to-reset (UM11225) is longer than the 32
//! bytes ISO 7816-3 allows, so it cannot be handed to a PC/SC host as-is.
//! We synthesize a conforming ATR from a fixed prologue plus the real
//! historical bytes extracted from the native ATR.

use log::info;

use crate::constants::ATR_HB_MAX_LEN;
use crate::protocol::checksum::xor_sum;
use crate::utils::bytes_to_hex_spaced;
use crate::{Error, Result};

/// Fixed prologue of the synthesized ATR.
const ATR_PROLOGUE: [u8; 8] = [
    0x3B, // TS: direct convention
    0xF0, // T0: Y(1) = 1111, K patched in below
    0x96, // TA(1): Fi=512, Di=32
    0x00, // TB(1): VPP not connected
    0x00, // TC(1): no extra guard time
    0x80, // TD(1): T=0
    0x11, // TD(2): T=1
    0xFE, // TA(3): IFSC 254
];

/// Native ATR layout:
/// `PVER(1) VID(5) DLLP_LEN(1) DLLP PLID(1) PLP_LEN(1) PLP HB_LEN(1) HB`
fn byte_at(atr: &[u8], off: usize) -> Result<usize> {
    atr.get(off)
        .map(|&b| usize::from(b))
        .ok_or(Error::InvalidLength {
            expected: off + 1,
            actual: atr.len(),
        })
}

/// Rewrite the native ATR into a conforming one in `out`, returning the
/// number of bytes written (9 + number of historical bytes).
pub fn rewrite(native: &[u8], out: &mut [u8]) -> Result<usize> {
    info!("SE has a non-conforming ATR, rewriting");
    info!("native ATR: {}", bytes_to_hex_spaced(native));

    // Walk to the historical bytes.
    let mut off = 1 + 5; // PVER, VID
    off += 1 + byte_at(native, off)?; // DLLP_LEN, DLLP
    off += 1; // PLID
    off += 1 + byte_at(native, off)?; // PLP_LEN, PLP
    let hb_len = byte_at(native, off)?;
    off += 1; // HB_LEN

    // K is a nibble of T0
    if hb_len > ATR_HB_MAX_LEN {
        return Err(Error::InvalidLength {
            expected: ATR_HB_MAX_LEN,
            actual: hb_len,
        });
    }

    let hb = native.get(off..off + hb_len).ok_or(Error::InvalidLength {
        expected: off + hb_len,
        actual: native.len(),
    })?;

    let total = ATR_PROLOGUE.len() + hb_len + 1;
    if out.len() < total {
        return Err(Error::BufferTooSmall {
            needed: total,
            capacity: out.len(),
        });
    }

    out[..ATR_PROLOGUE.len()].copy_from_slice(&ATR_PROLOGUE);
    out[1] |= hb_len as u8; // patch K into T0
    out[ATR_PROLOGUE.len()..ATR_PROLOGUE.len() + hb_len].copy_from_slice(hb);
    out[total - 1] = xor_sum(&out[1..total - 1]); // TCK

    Ok(total)
}
