// libifdse-rs/libifdse/src/transport/i2c_kernel.rs

#![cfg(feature = "hw")]

use i2cdev::core::I2CDevice;
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};
use log::debug;

use crate::transport::traits::I2cBus;
use crate::{Error, Result};

/// I2C backend on a Linux character device (`/dev/i2c-*`) with the slave
/// address bound via `I2C_SLAVE`.
pub struct KernelI2c {
    dev: LinuxI2CDevice,
}

impl KernelI2c {
    pub fn open(path: &str, addr: u16) -> Result<Self> {
        debug!("opening i2c device {} (slave {:#04x})", path, addr);
        let dev = LinuxI2CDevice::new(path, addr).map_err(classify)?;
        Ok(Self { dev })
    }
}

impl I2cBus for KernelI2c {
    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        self.dev.read(buf).map_err(classify)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.dev.write(buf).map_err(classify)
    }
}

/// Fold the kernel error into our taxonomy. Which errno a NACK surfaces as
/// depends on the bus driver: ENXIO and EREMOTEIO are common, some drivers
/// report ETIMEDOUT.
fn classify(err: LinuxI2CError) -> Error {
    let io: std::io::Error = err.into();
    match io.raw_os_error() {
        Some(libc::ENXIO) | Some(libc::ETIMEDOUT) | Some(libc::EREMOTEIO) => Error::Nack,
        _ => Error::Transport(io.to_string()),
    }
}
