// libifdse-rs/libifdse/src/lib.rs

//! libifdse
//!
//! Userspace driver library for secure elements wired over I2C, exposing
//! the reader operations a PC/SC-style host middleware needs: power
//! control, ATR retrieval and APDU exchange.
//!
//! The core is the T=1 block engine for the NXP SE05x ([`se::Se05x`]); the
//! simpler Kerkey device ([`se::Kerkey`]) shares the transport layer.
#![warn(missing_docs)]

pub mod atr;
pub mod config;
pub mod constants;
pub mod error;
pub mod prelude;
pub mod protocol;
pub mod se;
pub mod timings;
pub mod transport;
pub mod utils;

// Re-export common types at crate root so `crate::Error` and
// `crate::Result` are available for consumers and the prelude.
pub use crate::error::*;

pub use prelude::*;
