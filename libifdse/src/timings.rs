// libifdse-rs/libifdse/src/timings.rs
//! Timing parameters of the SE05x I2C link.
//!
//! The values are the ones the device data sheet prescribes for the T=1
//! block link: a short guard time between any two I2C transactions, a
//! minimum polling interval while the slave NACKs, and a block waiting
//! time bounding how long one block may stay in flight.

use std::time::Duration;

/// SE guard time between two I2C transactions.
pub const SEGT: Duration = Duration::from_micros(10);

/// Minimum polling time between retries of a NACKed transfer.
pub const MPOT: Duration = Duration::from_millis(1);

/// Block waiting time.
pub const BWT: Duration = Duration::from_millis(1000);

/// Power-wakeup time after (de-)asserting the reset line.
pub const PWT: Duration = Duration::from_millis(5);

/// Per-session timing parameters. Constructed with the data-sheet defaults;
/// tests shrink them to keep retry paths fast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    /// Sleep before every I2C read or write.
    pub guard_time: Duration,
    /// Sleep between retries of a NACKed transfer.
    pub poll_time: Duration,
    /// Wait after power-cycling the device.
    pub power_wakeup: Duration,
    /// NACK-retry budget per transfer.
    pub max_retries: usize,
}

impl Timings {
    /// Derive the retry budget so that `max_retries * poll_time` covers the
    /// block waiting time.
    pub fn new(guard_time: Duration, poll_time: Duration, block_waiting_time: Duration) -> Self {
        let max_retries = (block_waiting_time.as_micros() / poll_time.as_micros().max(1)) as usize;
        Self {
            guard_time,
            poll_time,
            power_wakeup: PWT,
            max_retries,
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self::new(SEGT, MPOT, BWT)
    }
}
