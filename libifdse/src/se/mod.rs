// libifdse-rs/libifdse/src/se/mod.rs

//! Secure element device facades.
//!
//! Every supported device implements [`SeDevice`], the operation set a
//! PC/SC-style host drives a reader with. Since the SE is soldered down,
//! there is no card presence to track: the "card" is always inserted.

pub mod kerkey;
pub mod se05x;
pub mod table;

pub use kerkey::Kerkey;
pub use se05x::Se05x;
pub use table::ReaderTable;

use crate::{Error, Result};

/// Maximum number of reader units the driver manages at once.
pub const MAX_SE_DEVICES: usize = 16;

/// Uniform secure element session interface. Drop closes the underlying
/// transport handles.
pub trait SeDevice {
    /// Write the (conforming) ATR into `out` and return its length.
    fn atr(&self, out: &mut [u8]) -> Result<usize>;

    /// Power the device, directly via the reset line or with a chip reset
    /// when none is wired.
    fn power_up(&mut self) -> Result<()>;

    /// Drop power, if a reset line is wired.
    fn power_down(&mut self) -> Result<()>;

    /// Reset the device without a power cycle and refresh the cached ATR.
    fn warm_reset(&mut self) -> Result<()>;

    /// Exchange one APDU: send `tx`, reassemble the response into `rx` and
    /// return the number of bytes received. A response longer than `rx` is
    /// truncated, not an error.
    fn transmit(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<usize>;
}

/// Open a device from a provider-qualified config string:
/// `"se:<provider>@<device-config>"` with providers `se05x` and `kerkey`.
pub fn open(config: &str) -> Result<Box<dyn SeDevice>> {
    let rest = config
        .strip_prefix("se:")
        .ok_or_else(|| Error::Config(format!("invalid config: '{}'", config)))?;

    let (provider, args) = rest
        .split_once('@')
        .ok_or_else(|| Error::Config(format!("missing device arguments in '{}'", config)))?;

    match provider {
        "se05x" => Ok(Box::new(Se05x::open(args)?)),
        "kerkey" => Ok(Box::new(Kerkey::open(args)?)),
        other => Err(Error::Config(format!("unknown SE provider: '{}'", other))),
    }
}

/// Capability values reported to the host middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Units the driver can serve simultaneously.
    pub simultaneous_access: u8,
    /// The driver serializes everything; hosts must not call in parallel.
    pub thread_safe: bool,
    /// Slots per unit; the SE is soldered down, so exactly one.
    pub slots: u8,
    pub slot_thread_safe: bool,
}

/// The capability answers for this driver.
pub fn capabilities() -> Capabilities {
    Capabilities {
        simultaneous_access: MAX_SE_DEVICES as u8,
        thread_safe: false,
        slots: 1,
        slot_thread_safe: false,
    }
}
