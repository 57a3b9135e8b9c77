// libifdse-rs/libifdse/src/se/se05x.rs

//! Session facade for the NXP SE05x secure element.

use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::atr;
use crate::config::DeviceConfig;
use crate::constants::SIZE_INF_MAX;
use crate::protocol::block;
use crate::protocol::engine::T1Engine;
use crate::se::SeDevice;
use crate::timings::Timings;
use crate::transport::{self, I2cBus, ResetLine};
use crate::utils::bytes_to_hex_spaced;
use crate::{Error, Result};

/// Delay before every APDU exchange.
///
/// Under high load some devices end up in a state where they answer every
/// block with EE_OTHER_ERROR until reset. This short pause before each
/// exchange reliably keeps them out of that state.
const XFER_SETTLE: Duration = Duration::from_millis(1);

/// One SE05x session: the block engine bound to the I2C slave, an optional
/// reset line, and the cached native ATR.
pub struct Se05x {
    engine: T1Engine,
    reset_line: Option<Box<dyn ResetLine>>,
    atr: Vec<u8>,
}

impl Se05x {
    /// Open a session from a reader config string
    /// (`"i2c:<spec>[@gpio:<spec>]"`) and run the power-up sequence.
    pub fn open(config: &str) -> Result<Self> {
        debug!("opening se05x with config '{}'", config);

        let cfg = DeviceConfig::parse(config)?;
        let bus = transport::open_i2c(&cfg.i2c)?;
        let reset_line = match &cfg.gpio {
            Some(gpio) => Some(transport::open_gpio(gpio)?),
            None => None,
        };

        Self::with_transport(bus, reset_line)
    }

    /// Build a session on an already-open bus (and optional reset line)
    /// and run the power-up sequence. This is also the test entry point
    /// for driving the protocol against a mock bus.
    pub fn with_transport(
        bus: Box<dyn I2cBus>,
        reset_line: Option<Box<dyn ResetLine>>,
    ) -> Result<Self> {
        let mut dev = Self {
            engine: T1Engine::new(bus, Timings::default()),
            reset_line,
            atr: Vec::new(),
        };

        dev.power_down()?;
        thread::sleep(dev.engine.timings().power_wakeup);
        dev.power_up()?;
        dev.warm_reset()?;

        Ok(dev)
    }

    /// The raw, non-conforming ATR as cached by the last warm reset.
    pub fn native_atr(&self) -> &[u8] {
        &self.atr
    }

    fn transmit_inner(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<usize> {
        if tx.is_empty() {
            return Err(Error::InvalidLength {
                expected: 1,
                actual: 0,
            });
        }

        // Write loop: chain everything but the final chunk. The engine
        // consumes the token R-block between chained I-blocks.
        let mut chunks = tx.chunks(SIZE_INF_MAX).peekable();
        while let Some(chunk) = chunks.next() {
            let chain = chunks.peek().is_some();
            self.engine.send_i_block(chunk, chain)?;
        }

        // Read loop: reassemble the response chain, acknowledging each
        // chained I-block. An undersized rx buffer truncates, it never
        // fails the exchange.
        let mut rx_off = 0;
        loop {
            let len = self.engine.recv_block()?;
            let pcb = self.engine.rx_pcb();
            if !block::is_i_block(pcb) {
                return Err(Error::UnexpectedBlock { pcb });
            }

            let space = rx.len() - rx_off;
            let n = len.min(space);
            if n < len {
                warn!(
                    "receive buffer too small ({} < {}), truncating",
                    rx.len(),
                    rx_off + len
                );
            }
            rx[rx_off..rx_off + n].copy_from_slice(self.engine.rx_inf(n));
            rx_off += n;

            if !block::i_block_chained(pcb) {
                break;
            }
            let n_r = block::i_block_ns(pcb) ^ 1;
            self.engine.send_r_block(n_r, block::EE_NO_ERROR)?;
        }

        Ok(rx_off)
    }
}

impl SeDevice for Se05x {
    fn atr(&self, out: &mut [u8]) -> Result<usize> {
        atr::rewrite(&self.atr, out)
    }

    fn power_up(&mut self) -> Result<()> {
        match &mut self.reset_line {
            Some(line) => line.enable()?,
            // No reset line wired: a full chip reset over the wire is the
            // closest thing to a power cycle.
            None => self.engine.hard_reset()?,
        }

        self.engine.clear_state();
        thread::sleep(self.engine.timings().power_wakeup);

        Ok(())
    }

    fn power_down(&mut self) -> Result<()> {
        match &mut self.reset_line {
            Some(line) => line.disable(),
            None => Ok(()),
        }
    }

    fn warm_reset(&mut self) -> Result<()> {
        self.engine.clear_state();
        self.atr = self.engine.soft_reset()?;
        debug!("cached ATR: {}", bytes_to_hex_spaced(&self.atr));
        Ok(())
    }

    fn transmit(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<usize> {
        thread::sleep(XFER_SETTLE);

        let ret = self.transmit_inner(tx, rx);
        // Buffers, tx length and the retransmit latch never survive an
        // exchange, successful or not.
        self.engine.clear_buffers();
        ret
    }
}
