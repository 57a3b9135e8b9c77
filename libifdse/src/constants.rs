// libifdse-rs/libifdse/src/constants.rs
//! Wire-level constants shared across the crate

/// NAD byte for host-to-SE blocks
pub const NAD_HOST_TO_SE: u8 = 0x5A;

/// NAD byte for SE-to-host blocks
pub const NAD_SE_TO_HOST: u8 = 0xA5;

/// Block prologue length: NAD, PCB, LEN
pub const SIZE_PROLOGUE: usize = 3;

/// Maximum INF field length per block (IFSC)
pub const SIZE_INF_MAX: usize = 254;

/// Block epilogue length: CRC16, high byte first
pub const SIZE_EPILOGUE: usize = 2;

/// Capacity of one fully populated block
pub const SIZE_BLOCK_MAX: usize = SIZE_PROLOGUE + SIZE_INF_MAX + SIZE_EPILOGUE;

/// ISO 7816-3 maximum ATR length
pub const ATR_MAX_LEN: usize = 32;

/// Maximum number of historical bytes in an ATR (K nibble of T0)
pub const ATR_HB_MAX_LEN: usize = 15;
