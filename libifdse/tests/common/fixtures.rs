// fixtures.rs — shared wire-level payloads and test doubles

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use libifdse::constants::{NAD_HOST_TO_SE, NAD_SE_TO_HOST};
use libifdse::protocol::block::{self, SCommand};
use libifdse::protocol::checksum::crc16;
use libifdse::transport::{I2cBus, MockBus, MockLine, ResetLine};
use libifdse::{Result, SeDevice};

/// A sealed wire block: NAD, PCB, LEN, INF, CRC (high byte first).
pub fn wire_block(nad: u8, pcb: u8, inf: &[u8]) -> Vec<u8> {
    let mut b = vec![nad, pcb, inf.len() as u8];
    b.extend_from_slice(inf);
    let crc = crc16(&b);
    b.push((crc >> 8) as u8);
    b.push((crc & 0xFF) as u8);
    b
}

/// Host-to-SE block.
pub fn host_block(pcb: u8, inf: &[u8]) -> Vec<u8> {
    wire_block(NAD_HOST_TO_SE, pcb, inf)
}

/// SE-to-host block.
pub fn se_block(pcb: u8, inf: &[u8]) -> Vec<u8> {
    wire_block(NAD_SE_TO_HOST, pcb, inf)
}

/// The SE's answer to a soft reset, carrying its raw ATR.
pub fn soft_reset_response(atr: &[u8]) -> Vec<u8> {
    se_block(block::s_response_pcb(SCommand::SoftReset), atr)
}

/// The SE's answer to a chip reset.
pub fn hard_reset_response() -> Vec<u8> {
    se_block(block::s_response_pcb(SCommand::Reset), &[])
}

/// Native SE05x ATR with the given historical bytes, 2-byte DLLP and
/// 3-byte PLP filler.
pub fn native_atr(hb: &[u8]) -> Vec<u8> {
    let mut atr = vec![0x01]; // PVER
    atr.extend_from_slice(&[0xA0, 0x00, 0x00, 0x03, 0x96]); // VID
    atr.push(2); // DLLP_LEN
    atr.extend_from_slice(&[0x11, 0x22]);
    atr.push(0x02); // PLID
    atr.push(3); // PLP_LEN
    atr.extend_from_slice(&[0x33, 0x44, 0x55]);
    atr.push(hb.len() as u8);
    atr.extend_from_slice(hb);
    atr
}

/// Shared handle onto a [`MockBus`] so tests can keep inspecting writes
/// after a session takes ownership of the transport.
pub struct SharedBus(pub Rc<RefCell<MockBus>>);

impl I2cBus for SharedBus {
    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        self.0.borrow_mut().read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.0.borrow_mut().write(buf)
    }
}

/// Shared handle onto a [`MockLine`].
pub struct SharedLine(pub Rc<RefCell<MockLine>>);

impl ResetLine for SharedLine {
    fn enable(&mut self) -> Result<()> {
        self.0.borrow_mut().enable()
    }

    fn disable(&mut self) -> Result<()> {
        self.0.borrow_mut().disable()
    }
}

/// Inert device for table bookkeeping tests.
pub struct StubSe {
    pub atr: Vec<u8>,
    pub transmits: usize,
}

impl StubSe {
    pub fn new() -> Self {
        Self {
            atr: vec![0x3B, 0x00],
            transmits: 0,
        }
    }
}

impl SeDevice for StubSe {
    fn atr(&self, out: &mut [u8]) -> Result<usize> {
        out[..self.atr.len()].copy_from_slice(&self.atr);
        Ok(self.atr.len())
    }

    fn power_up(&mut self) -> Result<()> {
        Ok(())
    }

    fn power_down(&mut self) -> Result<()> {
        Ok(())
    }

    fn warm_reset(&mut self) -> Result<()> {
        Ok(())
    }

    fn transmit(&mut self, _tx: &[u8], rx: &mut [u8]) -> Result<usize> {
        self.transmits += 1;
        let sw = [0x90, 0x00];
        let n = sw.len().min(rx.len());
        rx[..n].copy_from_slice(&sw[..n]);
        Ok(n)
    }
}
