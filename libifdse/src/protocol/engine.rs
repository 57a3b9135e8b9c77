// libifdse-rs/libifdse/src/protocol/engine.rs

//! T=1 block engine for the SE05x I2C link.
//!
//! The engine owns the bus handle, the one-bit sequence numbers and a pair
//! of fixed block buffers. The tx buffer doubles as the retransmission
//! cache: when the SE answers with an R-block carrying an error code, the
//! previous block is resent verbatim, at most once per exchange.

use std::thread;

use log::{debug, warn};

use crate::constants::{NAD_SE_TO_HOST, SIZE_BLOCK_MAX, SIZE_EPILOGUE, SIZE_INF_MAX, SIZE_PROLOGUE};
use crate::protocol::block::{self, SCommand};
use crate::protocol::checksum::crc16;
use crate::timings::Timings;
use crate::transport::{read_with_retry, write_with_retry, I2cBus};
use crate::{Error, Result};

/// Stateful T=1 engine bound to one I2C slave.
pub struct T1Engine {
    bus: Box<dyn I2cBus>,
    timings: Timings,

    n_s: u8,
    n_r: u8,

    // Two buffers so the last transmitted block stays available for
    // retransmission while a response is being received.
    txbuf: [u8; SIZE_BLOCK_MAX],
    txlen: usize,
    retransmitted: bool,
    rxbuf: [u8; SIZE_BLOCK_MAX],
}

/// Sleep the guard time, then read with the NACK-retry budget.
fn guarded_read(bus: &mut dyn I2cBus, timings: &Timings, buf: &mut [u8]) -> Result<()> {
    // The SE needs a short gap between any two I2C transactions. It is so
    // short that we simply always pay it.
    thread::sleep(timings.guard_time);
    read_with_retry(bus, buf, timings.max_retries, timings.poll_time)
}

/// Write counterpart of [`guarded_read`].
fn guarded_write(bus: &mut dyn I2cBus, timings: &Timings, buf: &[u8]) -> Result<()> {
    thread::sleep(timings.guard_time);
    write_with_retry(bus, buf, timings.max_retries, timings.poll_time)
}

impl T1Engine {
    pub fn new(bus: Box<dyn I2cBus>, timings: Timings) -> Self {
        Self {
            bus,
            timings,
            n_s: 0,
            n_r: 0,
            txbuf: [0; SIZE_BLOCK_MAX],
            txlen: 0,
            retransmitted: false,
            rxbuf: [0; SIZE_BLOCK_MAX],
        }
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Current send sequence number.
    pub fn n_s(&self) -> u8 {
        self.n_s
    }

    /// Reset the sequence numbers (after a power cycle or reset).
    pub fn clear_state(&mut self) {
        self.n_s = 0;
        self.n_r = 0;
    }

    /// Wipe both block buffers and the retransmit latch.
    pub fn clear_buffers(&mut self) {
        self.txbuf.fill(0);
        self.txlen = 0;
        self.retransmitted = false;
        self.rxbuf.fill(0);
    }

    /// PCB of the last received block.
    pub fn rx_pcb(&self) -> u8 {
        self.rxbuf[1]
    }

    /// INF bytes of the last received block.
    pub fn rx_inf(&self, len: usize) -> &[u8] {
        &self.rxbuf[SIZE_PROLOGUE..SIZE_PROLOGUE + len]
    }

    /// Seal the staged block and put it on the wire, keeping it cached for
    /// a possible retransmission.
    fn crc_and_send(&mut self, n: usize) -> Result<()> {
        self.txlen = block::seal(&mut self.txbuf, n);
        guarded_write(self.bus.as_mut(), &self.timings, &self.txbuf[..self.txlen])
    }

    /// Resend the cached block. Only one retransmission is allowed per
    /// exchange; a second request times the exchange out.
    fn resend(&mut self) -> Result<()> {
        if self.retransmitted {
            return Err(Error::Timeout);
        }
        self.retransmitted = true;

        guarded_write(self.bus.as_mut(), &self.timings, &self.txbuf[..self.txlen])
    }

    /// Send an I-block. With `chain` set the SE passes the token back in an
    /// R-block, which is consumed and validated here.
    pub fn send_i_block(&mut self, inf: &[u8], chain: bool) -> Result<()> {
        let pcb = block::i_block_pcb(self.n_s, chain);
        let n = block::stage(&mut self.txbuf, pcb, inf)?;

        self.n_s ^= 1;
        // The next R-block from the peer must acknowledge up to here.
        self.n_r = self.n_s;

        self.crc_and_send(n)?;

        if chain {
            self.recv_block()?;

            let pcb = self.rxbuf[1];
            if !block::is_r_block(pcb) {
                return Err(Error::UnexpectedBlock { pcb });
            }

            let ee = pcb & block::EE_MASK;
            if ee != 0 {
                return Err(Error::UnexpectedBlock { pcb });
            }

            let n_r = block::r_block_nr(pcb);
            if n_r != self.n_r {
                return Err(Error::WrongSequence {
                    expected: self.n_r,
                    actual: n_r,
                });
            }
        }

        Ok(())
    }

    /// Send an R-block acknowledging (or complaining about) the peer's
    /// last I-block.
    pub fn send_r_block(&mut self, n_r: u8, ee: u8) -> Result<()> {
        let n = block::stage(&mut self.txbuf, block::r_block_pcb(n_r, ee), &[])?;
        self.crc_and_send(n)
    }

    /// Send a supervisory request.
    pub fn send_s_request(&mut self, cmd: SCommand, inf: &[u8]) -> Result<()> {
        let n = block::stage(&mut self.txbuf, block::s_request_pcb(cmd), inf)?;
        self.crc_and_send(n)
    }

    /// Acknowledge a waiting-time extension. The response echoes the WTX
    /// multiplier byte. Framed in a scratch buffer so the retransmission
    /// cache keeps the block the SE actually asked more time for.
    fn send_wtx_response(&mut self, multiplier: u8) -> Result<()> {
        let mut buf = [0u8; SIZE_PROLOGUE + 1 + SIZE_EPILOGUE];
        let n = block::stage(&mut buf, block::s_response_pcb(SCommand::Wtx), &[multiplier])?;
        let total = block::seal(&mut buf, n);
        guarded_write(self.bus.as_mut(), &self.timings, &buf[..total])
    }

    /// Read one raw block into the rx buffer and verify it.
    ///
    /// The SE streams a block across two reads: the prologue plus the two
    /// epilogue-sized bytes first, then the remaining LEN bytes. Their
    /// concatenation is the contiguous wire block, so the CRC is verified
    /// in place over `NAD PCB LEN INF` against the big-endian epilogue.
    fn read_raw_block(&mut self) -> Result<usize> {
        let head = SIZE_PROLOGUE + SIZE_EPILOGUE;
        guarded_read(self.bus.as_mut(), &self.timings, &mut self.rxbuf[..head])?;

        let len = usize::from(self.rxbuf[2]);
        if len > SIZE_INF_MAX {
            return Err(Error::InvalidLength {
                expected: SIZE_INF_MAX,
                actual: len,
            });
        }

        if len > 0 {
            guarded_read(
                self.bus.as_mut(),
                &self.timings,
                &mut self.rxbuf[head..head + len],
            )?;
        }

        if self.rxbuf[0] != NAD_SE_TO_HOST {
            // Tolerated for now; some firmware revisions get this wrong.
            warn!("invalid NAD received: {:#04x}", self.rxbuf[0]);
        }

        let expected = crc16(&self.rxbuf[..SIZE_PROLOGUE + len]);
        let actual = u16::from_be_bytes([
            self.rxbuf[SIZE_PROLOGUE + len],
            self.rxbuf[SIZE_PROLOGUE + len + 1],
        ]);
        if expected != actual {
            return Err(Error::CrcMismatch { expected, actual });
        }

        Ok(len)
    }

    /// Receive one block, transparently acknowledging WTX requests and
    /// retransmitting on R-block errors. Returns the INF length; the block
    /// itself is inspected via [`rx_pcb`](Self::rx_pcb) and
    /// [`rx_inf`](Self::rx_inf).
    ///
    /// The WTX/retransmit continuation is a loop bounded by the retry
    /// budget, so a device streaming WTX requests forever cannot wedge us.
    pub fn recv_block(&mut self) -> Result<usize> {
        for _ in 0..self.timings.max_retries {
            let len = self.read_raw_block()?;
            let pcb = self.rxbuf[1];

            if block::is_s_block_request(pcb) {
                match pcb & block::S_TYPE_MASK {
                    t if t == SCommand::Wtx as u8 => {
                        debug!("received WTX request, acknowledging");
                        let multiplier = self.rxbuf[SIZE_PROLOGUE];
                        self.send_wtx_response(multiplier)?;
                        continue;
                    }
                    _ => return Err(Error::UnsupportedRequest { pcb }),
                }
            }

            if block::is_r_block_with_error(pcb) {
                warn!("received R-block with error (pcb {:#04x}), retransmitting", pcb);
                self.resend()?;
                continue;
            }

            return Ok(len);
        }

        Err(Error::Timeout)
    }

    /// Soft reset (S-block type 0x0F). The response INF is the SE's raw,
    /// non-conforming ATR.
    pub fn soft_reset(&mut self) -> Result<Vec<u8>> {
        self.send_s_request(SCommand::SoftReset, &[])?;

        let len = self.recv_block()?;
        let pcb = self.rxbuf[1];
        if pcb != block::s_response_pcb(SCommand::SoftReset) {
            return Err(Error::UnexpectedBlock { pcb });
        }

        Ok(self.rx_inf(len).to_vec())
    }

    /// Full chip reset (S-block type 0x06), used when no reset line is
    /// wired. Does not touch the ATR.
    pub fn hard_reset(&mut self) -> Result<()> {
        self.send_s_request(SCommand::Reset, &[])?;

        self.recv_block()?;
        let pcb = self.rxbuf[1];
        if pcb != block::s_response_pcb(SCommand::Reset) {
            return Err(Error::UnexpectedBlock { pcb });
        }

        Ok(())
    }
}
