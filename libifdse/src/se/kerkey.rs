// libifdse-rs/libifdse/src/se/kerkey.rs

//! Session facade for the Kerkey secure element.
//!
//! The Kerkey speaks a much simpler framing than the SE05x: every response
//! starts with a two-byte header carrying a chain bit and a length, with a
//! zero-length unchained header acting as a waiting-time extension.

use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::config::DeviceConfig;
use crate::se::SeDevice;
use crate::transport::{self, read_with_retry, write_with_retry, I2cBus, ResetLine};
use crate::utils::bytes_to_hex;
use crate::{Error, Result};

/// Ask the device for its command timeout.
const CMD_TIMEOUT: u8 = 0x75;
/// Trigger a warm reset and read the ATR.
const CMD_ATR: u8 = 0x76;

/// Maximum payload per I2C frame.
const FRAME_MAX: usize = 254;

/// Sleep between NACK retries.
const POLL_TIME: Duration = Duration::from_micros(1000);
/// Power cycling and warm resets take a while on this device.
const SETTLE_TIME: Duration = Duration::from_millis(200);
/// Wait before polling again after a waiting-time extension.
const WTX_POLL: Duration = Duration::from_millis(1);

/// Retry budget before the device has told us its real timeout.
const INITIAL_RETRIES: usize = 10_000;

/// One Kerkey session.
pub struct Kerkey {
    bus: Box<dyn I2cBus>,
    reset_line: Option<Box<dyn ResetLine>>,
    atr: Vec<u8>,
    retries: usize,
}

impl Kerkey {
    /// Open a session from a reader config string
    /// (`"i2c:<spec>[@gpio:<spec>]"`) and run the power-up sequence.
    pub fn open(config: &str) -> Result<Self> {
        debug!("opening kerkey with config '{}'", config);

        let cfg = DeviceConfig::parse(config)?;
        let bus = transport::open_i2c(&cfg.i2c)?;
        let reset_line = match &cfg.gpio {
            Some(gpio) => Some(transport::open_gpio(gpio)?),
            None => None,
        };

        Self::with_transport(bus, reset_line)
    }

    /// Build a session on an already-open bus (and optional reset line)
    /// and run the power-up sequence. Also the test entry point.
    pub fn with_transport(
        bus: Box<dyn I2cBus>,
        reset_line: Option<Box<dyn ResetLine>>,
    ) -> Result<Self> {
        let mut dev = Self {
            bus,
            reset_line,
            atr: Vec::new(),
            retries: INITIAL_RETRIES,
        };

        dev.line_disable()?;
        thread::sleep(SETTLE_TIME);
        dev.line_enable()?;
        thread::sleep(SETTLE_TIME);

        dev.warm_reset()?;
        dev.read_device_timeout()?;

        Ok(dev)
    }

    fn line_enable(&mut self) -> Result<()> {
        match &mut self.reset_line {
            Some(line) => line.enable(),
            None => Ok(()),
        }
    }

    fn line_disable(&mut self) -> Result<()> {
        match &mut self.reset_line {
            Some(line) => line.disable(),
            None => Ok(()),
        }
    }

    fn write_retry(&mut self, buf: &[u8]) -> Result<()> {
        write_with_retry(self.bus.as_mut(), buf, self.retries, POLL_TIME)
    }

    fn read_retry(&mut self, buf: &mut [u8]) -> Result<()> {
        read_with_retry(self.bus.as_mut(), buf, self.retries, POLL_TIME)
    }

    /// Read a response header: chain flag plus payload length. Only the
    /// low byte of the 16-bit length field is significant on the wire.
    fn read_header(&mut self) -> Result<(bool, usize)> {
        let mut res = [0u8; 2];
        self.read_retry(&mut res)?;

        let chain = res[0] & 0x80 != 0;
        let rlen = (((u16::from(res[0]) << 8) | u16::from(res[1])) & 0x00FF) as usize;

        Ok((chain, rlen))
    }

    /// Query the device command timeout and adopt it as the retry budget.
    fn read_device_timeout(&mut self) -> Result<()> {
        self.write_retry(&[CMD_TIMEOUT])?;

        let (chain, rlen) = loop {
            let (chain, rlen) = self.read_header()?;
            if !chain && rlen == 0 {
                debug!("received WTX");
                thread::sleep(WTX_POLL);
                continue;
            }
            break (chain, rlen);
        };

        if chain || rlen != 2 {
            return Err(Error::Protocol("could not get device timeout".into()));
        }

        let mut res = [0u8; 2];
        self.read_retry(&mut res)?;
        self.retries = usize::from(u16::from_be_bytes(res));
        debug!("device timeout: {} ms", self.retries);

        Ok(())
    }
}

impl SeDevice for Kerkey {
    fn atr(&self, out: &mut [u8]) -> Result<usize> {
        if out.len() < self.atr.len() {
            return Err(Error::BufferTooSmall {
                needed: self.atr.len(),
                capacity: out.len(),
            });
        }
        out[..self.atr.len()].copy_from_slice(&self.atr);
        Ok(self.atr.len())
    }

    fn power_up(&mut self) -> Result<()> {
        self.line_enable()?;
        thread::sleep(SETTLE_TIME);
        Ok(())
    }

    fn power_down(&mut self) -> Result<()> {
        self.line_disable()
    }

    fn warm_reset(&mut self) -> Result<()> {
        self.write_retry(&[CMD_ATR])?;

        let (chain, rlen) = self.read_header()?;
        if chain || rlen == 0 {
            return Err(Error::Protocol("could not trigger warm reset".into()));
        }

        let mut atr = vec![0u8; rlen];
        self.read_retry(&mut atr)?;
        debug!("kerkey ATR: {}", bytes_to_hex(&atr));
        self.atr = atr;

        // CMD_ATR triggers a warm reset, which takes some time.
        thread::sleep(SETTLE_TIME);

        Ok(())
    }

    fn transmit(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<usize> {
        if tx.is_empty() {
            return Err(Error::InvalidLength {
                expected: 1,
                actual: 0,
            });
        }

        let mut tx_off = 0;
        let mut rx_off = 0;

        'send: loop {
            let len = (tx.len() - tx_off).min(FRAME_MAX);
            self.write_retry(&tx[tx_off..tx_off + len])?;
            tx_off += len;

            loop {
                let (chain, rlen) = self.read_header()?;

                if !chain && rlen == 0 {
                    debug!("received WTX");
                    thread::sleep(WTX_POLL);
                    continue;
                }

                if chain && rlen == 0 {
                    if tx_off < tx.len() {
                        // Device wants the rest of the command.
                        continue 'send;
                    }
                    return Err(Error::Protocol("unexpected continuation request".into()));
                }

                let mut data = vec![0u8; rlen];
                self.read_retry(&mut data)?;

                let space = rx.len() - rx_off;
                let n = rlen.min(space);
                if n < rlen {
                    warn!(
                        "receive buffer too small ({} < {}), truncating",
                        rx.len(),
                        rx_off + rlen
                    );
                }
                rx[rx_off..rx_off + n].copy_from_slice(&data[..n]);
                rx_off += n;

                if !chain {
                    return Ok(rx_off);
                }
            }
        }
    }
}
