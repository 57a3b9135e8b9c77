// libifdse-rs/libifdse/src/prelude.rs

//! Convenience re-exports of the types most consumers need.

pub use crate::config::{DeviceConfig, GpioConfig, I2cConfig};
pub use crate::protocol::T1Engine;
pub use crate::se::{Capabilities, Kerkey, ReaderTable, Se05x, SeDevice};
pub use crate::timings::Timings;
pub use crate::transport::{I2cBus, ResetLine};
pub use crate::{Error, Result};

// Re-export small utilities for convenience
pub use crate::utils::{bytes_to_hex, bytes_to_hex_spaced};
