// libifdse-rs/libifdse/src/config.rs

//! Reader configuration strings.
//!
//! A device is described as `"i2c:<spec>[@gpio:<spec>]"`, the format the
//! PC/SC reader.conf hands to the driver:
//!
//! - `i2c:kernel:<device-path>:<slave-addr>` — I2C character device and
//!   7-bit slave address (decimal or `0x` hex)
//! - `gpio:kernel:<chip-index>:[n]<line-offset>` — GPIO character device
//!   line; a leading `n` marks the line active-low
//! - `gpio:sysfs:[n]<gpio-number>` — legacy sysfs GPIO

use crate::{Error, Result};

/// Parsed reader configuration: one I2C slave, optionally one reset line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub i2c: I2cConfig,
    pub gpio: Option<GpioConfig>,
}

/// I2C backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum I2cConfig {
    Kernel { path: String, addr: u16 },
}

/// GPIO backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpioConfig {
    Kernel {
        chip: u32,
        line: u32,
        active_low: bool,
    },
    Sysfs {
        num: u32,
        active_low: bool,
    },
}

impl DeviceConfig {
    pub fn parse(config: &str) -> Result<Self> {
        let mut i2c = None;
        let mut gpio = None;

        for token in config.split('@') {
            if let Some(spec) = token.strip_prefix("i2c:") {
                i2c = Some(I2cConfig::parse(spec)?);
            } else if let Some(spec) = token.strip_prefix("gpio:") {
                gpio = Some(GpioConfig::parse(spec)?);
            } else {
                return Err(Error::Config(format!(
                    "invalid token in config string: '{}'",
                    token
                )));
            }
        }

        let i2c = i2c.ok_or_else(|| Error::Config("missing i2c device".into()))?;
        Ok(Self { i2c, gpio })
    }
}

impl I2cConfig {
    fn parse(spec: &str) -> Result<Self> {
        let Some(args) = spec.strip_prefix("kernel:") else {
            return Err(Error::Config(format!("unknown i2c provider: '{}'", spec)));
        };

        let (path, addr) = args
            .split_once(':')
            .ok_or_else(|| Error::Config(format!("no i2c slave address in '{}'", args)))?;
        if path.is_empty() {
            return Err(Error::Config("empty i2c device path".into()));
        }

        let addr = parse_number(addr)
            .ok_or_else(|| Error::Config(format!("invalid i2c address '{}'", addr)))?;
        // 7-bit addressing
        let addr = u16::try_from(addr)
            .ok()
            .filter(|&a| a <= 0x7F)
            .ok_or_else(|| Error::Config(format!("i2c address out of range: {:#x}", addr)))?;

        Ok(Self::Kernel {
            path: path.to_string(),
            addr,
        })
    }
}

impl GpioConfig {
    fn parse(spec: &str) -> Result<Self> {
        if let Some(args) = spec.strip_prefix("kernel:") {
            let (chip, line) = args
                .split_once(':')
                .ok_or_else(|| Error::Config(format!("no gpio line in '{}'", args)))?;
            let chip = parse_number(chip)
                .ok_or_else(|| Error::Config(format!("invalid gpiochip '{}'", chip)))?;
            let (active_low, line) = split_active_low(line);
            let line = parse_number(line)
                .ok_or_else(|| Error::Config(format!("invalid gpio line '{}'", line)))?;
            return Ok(Self::Kernel {
                chip,
                line,
                active_low,
            });
        }

        if let Some(args) = spec.strip_prefix("sysfs:") {
            let (active_low, num) = split_active_low(args);
            let num = parse_number(num)
                .ok_or_else(|| Error::Config(format!("invalid gpio number '{}'", num)))?;
            return Ok(Self::Sysfs { num, active_low });
        }

        Err(Error::Config(format!("unknown gpio provider: '{}'", spec)))
    }
}

/// An optional leading `n` marks the line active-low.
fn split_active_low(s: &str) -> (bool, &str) {
    match s.strip_prefix('n') {
        Some(rest) => (true, rest),
        None => (false, s),
    }
}

fn parse_number(s: &str) -> Option<u32> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}
