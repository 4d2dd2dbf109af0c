//! Devices driven by the "control" instructions 72 and 75.
//!
//! Such devices (plotters, film handlers and the like) each answer
//! to a range of addresses.  They are kept in an ordered registry;
//! an address is routed to the first device whose base matches it
//! under its mask.
use std::fmt::{self, Debug, Formatter};

use base::prelude::*;
use tracing::{event, Level};

pub trait ControlDevice: Send {
    fn name(&self) -> &str;
    fn address_base(&self) -> u16;
    fn address_mask(&self) -> u16;

    /// Handle function 72.  `None` leaves the accumulator unchanged.
    fn read(&mut self, addr: u16) -> Option<Word>;

    /// Handle function 75.
    fn write(&mut self, addr: u16, value: Word);

    fn responds_to(&self, addr: u16) -> bool {
        addr & self.address_mask() == self.address_base()
    }
}

#[derive(Default)]
pub struct ControlRegistry {
    devices: Vec<Box<dyn ControlDevice>>,
}

impl Debug for ControlRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_list()
            .entries(self.devices.iter().map(|d| d.name()))
            .finish()
    }
}

impl ControlRegistry {
    pub fn new() -> ControlRegistry {
        ControlRegistry::default()
    }

    /// Add a device.  Devices registered earlier take precedence.
    pub fn register(&mut self, device: Box<dyn ControlDevice>) {
        event!(
            Level::INFO,
            "registering control device {} at {:o} (mask {:o})",
            device.name(),
            device.address_base(),
            device.address_mask()
        );
        self.devices.push(device);
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    fn find(&mut self, addr: u16) -> Option<&mut Box<dyn ControlDevice>> {
        self.devices.iter_mut().find(|d| d.responds_to(addr))
    }

    pub fn read(&mut self, addr: u16) -> Option<Word> {
        match self.find(addr) {
            Some(device) => device.read(addr),
            None => {
                event!(Level::DEBUG, "no control device answers read at {addr}");
                None
            }
        }
    }

    pub fn write(&mut self, addr: u16, value: Word) {
        match self.find(addr) {
            Some(device) => device.write(addr, value),
            None => {
                event!(Level::DEBUG, "no control device answers write at {addr}");
            }
        }
    }
}
