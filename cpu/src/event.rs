//! Notifications to whatever is displaying the machine.
//!
//! The emulator reports state changes to an [`Observer`].  Observers
//! are purely passive; every method has an empty default so an
//! implementation only needs the ones it cares about, and the
//! machine works with no observer at all ([`NoObserver`]).
use base::prelude::*;

use crate::io::DeviceId;

/// The registers shown on the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterDisplay {
    pub acc: Word,
    pub ar: u64,
    pub scr: u16,
    pub scr2: u8,
    pub ir: InstructionPair,
    pub overflow: bool,
    pub fp_overflow: bool,
}

pub trait Observer: Send {
    /// Called after each instruction (when enabled) and after a
    /// reset.
    fn registers_changed(&mut self, _registers: &RegisterDisplay) {}

    /// A device became busy (`Some`) or the machine stopped waiting
    /// (`None`).
    fn busy_changed(&mut self, _device: Option<DeviceId>) {}

    /// A character was read or written by a tape-station device.
    fn character_transferred(&mut self, _device: DeviceId, _ch: u8) {}

    fn running_changed(&mut self, _running: bool) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoObserver;

impl Observer for NoObserver {}
