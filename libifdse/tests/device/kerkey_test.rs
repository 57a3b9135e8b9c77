#[path = "../common/mod.rs"]
mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::fixtures::{SharedBus, SharedLine};
use libifdse::transport::{MockBus, MockLine};
use libifdse::{Error, Kerkey, SeDevice};

const SAMPLE_ATR: [u8; 5] = [0x3B, 0x01, 0x02, 0x03, 0x04];

/// Script the open sequence: ATR fetch followed by the timeout query
/// (10000 ms), then any extra bytes.
fn open_kerkey(extra: &[Vec<u8>]) -> (Kerkey, Rc<RefCell<MockBus>>, Rc<RefCell<MockLine>>) {
    let bus = Rc::new(RefCell::new(MockBus::new()));
    {
        let mut b = bus.borrow_mut();
        b.push_bytes(&[0x00, SAMPLE_ATR.len() as u8]);
        b.push_bytes(&SAMPLE_ATR);
        b.push_bytes(&[0x00, 0x02]);
        b.push_bytes(&[0x27, 0x10]);
        for bytes in extra {
            b.push_bytes(bytes);
        }
    }
    let line = Rc::new(RefCell::new(MockLine::new()));

    let dev = Kerkey::with_transport(
        Box::new(SharedBus(bus.clone())),
        Some(Box::new(SharedLine(line.clone()))),
    )
    .expect("kerkey open");

    (dev, bus, line)
}

#[test]
fn open_power_cycles_and_reads_atr_and_timeout() {
    let (dev, bus, line) = open_kerkey(&[]);

    assert_eq!(line.borrow().transitions, vec![false, true]);
    // CMD_ATR then CMD_TIMEOUT
    assert_eq!(bus.borrow().written, vec![vec![0x76], vec![0x75]]);

    let mut out = [0u8; 33];
    let len = dev.atr(&mut out).unwrap();
    assert_eq!(&out[..len], &SAMPLE_ATR);
}

#[test]
fn atr_rejects_short_buffer() {
    let (dev, _bus, _line) = open_kerkey(&[]);

    let mut out = [0u8; 3];
    assert!(matches!(
        dev.atr(&mut out),
        Err(Error::BufferTooSmall {
            needed: 5,
            capacity: 3
        })
    ));
}

#[test]
fn transmit_single_frame() {
    let (mut dev, bus, _line) = open_kerkey(&[vec![0x00, 0x02], vec![0x90, 0x00]]);
    bus.borrow_mut().written.clear();

    let mut rx = [0u8; 8];
    let n = dev.transmit(&[0x00, 0xA4, 0x04, 0x00], &mut rx).unwrap();

    assert_eq!(&rx[..n], &[0x90, 0x00]);
    assert_eq!(bus.borrow().written, vec![vec![0x00, 0xA4, 0x04, 0x00]]);
}

#[test]
fn transmit_polls_through_wtx_headers() {
    let script = [
        vec![0x00, 0x00], // WTX: nothing yet
        vec![0x00, 0x00],
        vec![0x00, 0x02],
        vec![0x90, 0x00],
    ];
    let (mut dev, _bus, _line) = open_kerkey(&script);

    let mut rx = [0u8; 8];
    let n = dev.transmit(&[0x80, 0xCA, 0x00, 0xFE], &mut rx).unwrap();
    assert_eq!(&rx[..n], &[0x90, 0x00]);
}

#[test]
fn transmit_reassembles_chained_response() {
    let script = [
        vec![0x80, 0x03], // chained part
        vec![0x01, 0x02, 0x03],
        vec![0x00, 0x02], // final part
        vec![0x90, 0x00],
    ];
    let (mut dev, _bus, _line) = open_kerkey(&script);

    let mut rx = [0u8; 16];
    let n = dev.transmit(&[0x00, 0xB0, 0x00, 0x00], &mut rx).unwrap();
    assert_eq!(&rx[..n], &[0x01, 0x02, 0x03, 0x90, 0x00]);
}

#[test]
fn transmit_sends_remainder_on_continuation_request() {
    let tx: Vec<u8> = (0..300).map(|i| i as u8).collect();
    let script = [
        vec![0x80, 0x00], // send the rest
        vec![0x00, 0x02],
        vec![0x90, 0x00],
    ];
    let (mut dev, bus, _line) = open_kerkey(&script);
    bus.borrow_mut().written.clear();

    let mut rx = [0u8; 8];
    let n = dev.transmit(&tx, &mut rx).unwrap();
    assert_eq!(&rx[..n], &[0x90, 0x00]);

    let written = &bus.borrow().written;
    assert_eq!(written.len(), 2);
    assert_eq!(written[0].len(), 254);
    assert_eq!(&written[0][..], &tx[..254]);
    assert_eq!(&written[1][..], &tx[254..]);
}

#[test]
fn unsolicited_continuation_request_is_an_error() {
    let script = [vec![0x80, 0x00]];
    let (mut dev, _bus, _line) = open_kerkey(&script);

    let mut rx = [0u8; 8];
    let err = dev.transmit(&[0x00, 0xA4, 0x04, 0x00], &mut rx).unwrap_err();
    assert!(matches!(err, Error::Protocol(_)));
}

#[test]
fn length_field_only_uses_the_low_byte() {
    // A stray bit in the high length byte must not inflate the length:
    // ((0x01 << 8) | 0x05) & 0x00ff == 5, and 0x01 has no chain bit.
    let script = [vec![0x01, 0x05], vec![0x0A, 0x0B, 0x0C, 0x0D, 0x0E]];
    let (mut dev, _bus, _line) = open_kerkey(&script);

    let mut rx = [0u8; 16];
    let n = dev.transmit(&[0x00, 0xB0, 0x00, 0x00], &mut rx).unwrap();
    assert_eq!(&rx[..n], &[0x0A, 0x0B, 0x0C, 0x0D, 0x0E]);
}

#[test]
fn short_receive_buffer_truncates_without_error() {
    let script = [vec![0x00, 0x04], vec![0x01, 0x02, 0x90, 0x00]];
    let (mut dev, _bus, _line) = open_kerkey(&script);

    let mut rx = [0u8; 2];
    let n = dev.transmit(&[0x00, 0xB0, 0x00, 0x00], &mut rx).unwrap();
    assert_eq!(n, 2);
    assert_eq!(rx, [0x01, 0x02]);
}

#[test]
fn empty_apdu_is_rejected() {
    let (mut dev, _bus, _line) = open_kerkey(&[]);

    let mut rx = [0u8; 8];
    assert!(matches!(
        dev.transmit(&[], &mut rx),
        Err(Error::InvalidLength { .. })
    ));
}
