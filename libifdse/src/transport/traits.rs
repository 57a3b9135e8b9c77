// libifdse-rs/libifdse/src/transport/traits.rs

use std::thread;
use std::time::Duration;

use crate::{Error, Result};

/// Byte-oriented access to one I2C slave. Implementations report a busy
/// slave as [`Error::Nack`] so the retry wrappers can poll; everything else
/// is a hard transport error. Handles are released on drop.
pub trait I2cBus {
    /// Read exactly `buf.len()` bytes from the slave.
    fn read(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Write all of `buf` to the slave.
    fn write(&mut self, buf: &[u8]) -> Result<()>;
}

/// One output line wired to the SE's power/reset input. Active-low
/// inversion is hidden inside the implementation: `enable` always means
/// "power the device".
pub trait ResetLine {
    fn enable(&mut self) -> Result<()>;

    fn disable(&mut self) -> Result<()>;
}

/// Repeat `bus.read` while the slave NACKs, sleeping `poll_time` between
/// attempts. Exhausting the budget is a timeout; any other error aborts
/// immediately.
pub fn read_with_retry(
    bus: &mut dyn I2cBus,
    buf: &mut [u8],
    attempts: usize,
    poll_time: Duration,
) -> Result<()> {
    for _ in 0..attempts {
        match bus.read(buf) {
            Err(Error::Nack) => thread::sleep(poll_time),
            other => return other,
        }
    }

    Err(Error::Timeout)
}

/// Write counterpart of [`read_with_retry`].
pub fn write_with_retry(
    bus: &mut dyn I2cBus,
    buf: &[u8],
    attempts: usize,
    poll_time: Duration,
) -> Result<()> {
    for _ in 0..attempts {
        match bus.write(buf) {
            Err(Error::Nack) => thread::sleep(poll_time),
            other => return other,
        }
    }

    Err(Error::Timeout)
}
