// libifdse-rs/libifdse/src/error.rs

use thiserror::Error;

/// Common error type for the whole driver stack.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid config string: {0}")]
    Config(String),

    /// The I2C slave did not acknowledge the transfer. Retryable: the SE
    /// NACKs while it is busy or still powering up.
    #[error("i2c slave not ready (nack)")]
    Nack,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("operation timed out")]
    Timeout,

    #[error("invalid length: expected at most {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("crc mismatch: expected {expected:#06x}, got {actual:#06x}")]
    CrcMismatch { expected: u16, actual: u16 },

    #[error("unexpected block: pcb {pcb:#04x}")]
    UnexpectedBlock { pcb: u8 },

    #[error("wrong sequence number: expected {expected}, got {actual}")]
    WrongSequence { expected: u8, actual: u8 },

    #[error("unsupported supervisory request: pcb {pcb:#04x}")]
    UnsupportedRequest { pcb: u8 },

    #[error("buffer too small: need {needed}, have {capacity}")]
    BufferTooSmall { needed: usize, capacity: usize },

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("no free reader slot")]
    NoFreeSlot,

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // GPIO char-device support can be compiled out; keep the conversion
    // next to the feature that introduces the error type.
    #[cfg(feature = "hw")]
    #[error("gpio error: {0}")]
    Gpio(#[from] gpio_cdev::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
