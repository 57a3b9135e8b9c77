// libifdse-rs/libifdse/src/se/table.rs

//! Unit-number bookkeeping for the host shim.
//!
//! The host addresses readers by unit number. The table owns the sessions;
//! it is plain state the embedding shim holds wherever it likes, the core
//! keeps no globals.

use std::collections::HashMap;

use crate::se::{self, SeDevice, MAX_SE_DEVICES};
use crate::{Error, Result};

/// Mapping from unit number to an owned device session, bounded by
/// [`MAX_SE_DEVICES`].
#[derive(Default)]
pub struct ReaderTable {
    devices: HashMap<u32, Box<dyn SeDevice>>,
}

impl ReaderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the device described by `config` and register it under `unit`.
    pub fn open(&mut self, unit: u32, config: &str) -> Result<&mut Box<dyn SeDevice>> {
        let dev = se::open(config)?;
        self.insert(unit, dev)
    }

    /// Register an already-open device under `unit`.
    pub fn insert(&mut self, unit: u32, dev: Box<dyn SeDevice>) -> Result<&mut Box<dyn SeDevice>> {
        if self.devices.contains_key(&unit) {
            return Err(Error::Config(format!("unit {:#x} already open", unit)));
        }
        if self.devices.len() >= MAX_SE_DEVICES {
            return Err(Error::NoFreeSlot);
        }

        Ok(self.devices.entry(unit).or_insert(dev))
    }

    pub fn exists(&self, unit: u32) -> bool {
        self.devices.contains_key(&unit)
    }

    pub fn get_mut(&mut self, unit: u32) -> Option<&mut (dyn SeDevice + '_)> {
        match self.devices.get_mut(&unit) {
            Some(dev) => Some(&mut **dev),
            None => None,
        }
    }

    /// Drop the session registered under `unit`, closing its handles.
    pub fn close(&mut self, unit: u32) {
        self.devices.remove(&unit);
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
