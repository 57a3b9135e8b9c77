// libifdse-rs/libifdse/src/transport/gpio_sysfs.rs

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Seek, SeekFrom, Write};
use std::path::PathBuf;

use log::{debug, info};

use crate::transport::traits::ResetLine;
use crate::Result;

/// Reset line via the legacy sysfs GPIO interface: the number is exported,
/// `active_low` and `direction` are configured once, and the `value` file
/// is held open for the lifetime of the handle.
pub struct SysfsGpio {
    value: File,
    num: u32,
}

impl SysfsGpio {
    pub fn open(num: u32, active_low: bool) -> Result<Self> {
        debug!("exporting sysfs gpio {} (active_low: {})", num, active_low);

        // Exporting an already-exported GPIO yields EBUSY; that just means
        // a previous instance left it configured.
        let export = std::fs::write("/sys/class/gpio/export", num.to_string());
        match export {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::ResourceBusy => {
                info!("gpio {} was already exported", num);
            }
            Err(e) => return Err(e.into()),
        }

        let dir = PathBuf::from(format!("/sys/class/gpio/gpio{}", num));

        std::fs::write(dir.join("active_low"), if active_low { "1" } else { "0" })?;
        std::fs::write(dir.join("direction"), "out")?;

        let value = OpenOptions::new()
            .read(true)
            .write(true)
            .open(dir.join("value"))?;

        Ok(Self { value, num })
    }

    fn set(&mut self, level: &[u8]) -> Result<()> {
        self.value.seek(SeekFrom::Start(0))?;
        self.value.write_all(level)?;
        Ok(())
    }

    /// Exported GPIO number backing this handle.
    pub fn number(&self) -> u32 {
        self.num
    }
}

impl ResetLine for SysfsGpio {
    fn enable(&mut self) -> Result<()> {
        self.set(b"1")
    }

    fn disable(&mut self) -> Result<()> {
        self.set(b"0")
    }
}
