// libifdse-rs/libifdse/src/protocol/checksum.rs

/// CRC-16/X.25 over a block's NAD, PCB, LEN and INF bytes.
///
/// Init 0xFFFF, reflected polynomial 0x8408, final xor 0xFFFF. The result
/// is byte-swapped so that storing it big-endian in the epilogue yields the
/// wire byte order the SE expects.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;

    for &b in data {
        crc ^= u16::from(b);
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ 0x8408;
            } else {
                crc >>= 1;
            }
        }
    }

    crc ^= 0xFFFF;
    crc.swap_bytes()
}

/// TCK checksum for an ISO 7816-3 ATR: xor of all bytes from T0 through
/// the last historical byte.
pub fn xor_sum(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, &b| acc ^ b)
}
