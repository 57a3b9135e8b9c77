// libifdse-rs/libifdse/src/transport/mod.rs

pub mod mock;
pub mod traits;

pub mod gpio_sysfs;
#[cfg(feature = "hw")]
pub mod gpio_kernel;
#[cfg(feature = "hw")]
pub mod i2c_kernel;

pub use mock::{MockBus, MockLine};
pub use traits::{read_with_retry, write_with_retry, I2cBus, ResetLine};

use crate::config::{GpioConfig, I2cConfig};
use crate::Result;

/// Open the I2C backend selected by the config.
pub fn open_i2c(cfg: &I2cConfig) -> Result<Box<dyn I2cBus>> {
    match cfg {
        #[cfg(feature = "hw")]
        I2cConfig::Kernel { path, addr } => {
            Ok(Box::new(i2c_kernel::KernelI2c::open(path, *addr)?))
        }
        #[cfg(not(feature = "hw"))]
        I2cConfig::Kernel { .. } => Err(crate::Error::UnsupportedOperation(
            "i2c:kernel requires the 'hw' feature".into(),
        )),
    }
}

/// Open the GPIO backend selected by the config.
pub fn open_gpio(cfg: &GpioConfig) -> Result<Box<dyn ResetLine>> {
    match cfg {
        #[cfg(feature = "hw")]
        GpioConfig::Kernel {
            chip,
            line,
            active_low,
        } => Ok(Box::new(gpio_kernel::KernelGpio::open(
            *chip,
            *line,
            *active_low,
        )?)),
        #[cfg(not(feature = "hw"))]
        GpioConfig::Kernel { .. } => Err(crate::Error::UnsupportedOperation(
            "gpio:kernel requires the 'hw' feature".into(),
        )),
        GpioConfig::Sysfs { num, active_low } => {
            Ok(Box::new(gpio_sysfs::SysfsGpio::open(*num, *active_low)?))
        }
    }
}
