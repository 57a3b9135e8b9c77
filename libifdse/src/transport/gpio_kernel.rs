// libifdse-rs/libifdse/src/transport/gpio_kernel.rs

#![cfg(feature = "hw")]

use gpio_cdev::{Chip, LineHandle, LineRequestFlags};
use log::debug;

use crate::transport::traits::ResetLine;
use crate::Result;

/// Consumer label shown in `gpioinfo` for the requested line.
const CONSUMER: &str = "libifdse";

/// Reset line on a GPIO character device (`/dev/gpiochip<N>`). The line is
/// requested as an output, with the active-low flag applied in the kernel
/// so `set_value(1)` always means "active".
pub struct KernelGpio {
    handle: LineHandle,
}

impl KernelGpio {
    pub fn open(chip_index: u32, line_offset: u32, active_low: bool) -> Result<Self> {
        let path = format!("/dev/gpiochip{}", chip_index);
        debug!(
            "requesting gpio line {}:{} (active_low: {})",
            path, line_offset, active_low
        );

        let mut chip = Chip::new(&path)?;
        let line = chip.get_line(line_offset)?;

        let mut flags = LineRequestFlags::OUTPUT;
        if active_low {
            flags |= LineRequestFlags::ACTIVE_LOW;
        }

        let handle = line.request(flags, 0, CONSUMER)?;
        Ok(Self { handle })
    }
}

impl ResetLine for KernelGpio {
    fn enable(&mut self) -> Result<()> {
        self.handle.set_value(1)?;
        Ok(())
    }

    fn disable(&mut self) -> Result<()> {
        self.handle.set_value(0)?;
        Ok(())
    }
}
