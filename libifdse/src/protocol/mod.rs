// libifdse-rs/libifdse/src/protocol/mod.rs

pub mod block;
pub mod checksum;
pub mod engine;

pub use checksum::{crc16, xor_sum};
pub use engine::T1Engine;
