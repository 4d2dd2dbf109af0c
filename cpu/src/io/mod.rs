//! Peripheral devices.
//!
//! The tape station has two readers, two punches and a teleprinter;
//! the console has the word generator.  All of these transfer at
//! most one item per instruction.  A device which cannot complete a
//! transfer reports itself busy, and the control unit then enters a
//! busy wait (see [`crate::busy`]).
//!
//! Control devices (function codes 72 and 75) are different: they
//! never wait, and are supplied by the application through the
//! [`ControlRegistry`].
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use serde::Serialize;

mod console;
mod control;
mod punch;
mod reader;

#[cfg(test)]
mod tests;

pub use console::WordGenerator;
pub use control::{ControlDevice, ControlRegistry};
pub use punch::Punch;
pub use reader::Reader;

/// Tape characters have five holes.
pub const CHARACTER_MASK: u8 = 0b11111;

/// Address bit selecting reader 2 or punch 2.
pub const SECOND_STATION_BIT: u16 = 2048;

/// Address bit selecting the teleprinter for output.
pub const TELEPRINTER_BIT: u16 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeviceId {
    Reader1,
    Reader2,
    Punch1,
    Punch2,
    Teleprinter,
    WordGenerator,
}

impl Display for DeviceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            DeviceId::Reader1 => "reader 1",
            DeviceId::Reader2 => "reader 2",
            DeviceId::Punch1 => "punch 1",
            DeviceId::Punch2 => "punch 2",
            DeviceId::Teleprinter => "teleprinter",
            DeviceId::WordGenerator => "word generator",
        })
    }
}

/// Why a device is busy; that is, what must happen before it can
/// complete its transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BusyReason {
    /// A reader needs a tape.
    AwaitingInput,
    /// A punch or the teleprinter needs somewhere to put its output.
    AwaitingOutput,
    /// The operator must press OPERATE.
    AwaitingOperator,
}

impl Display for BusyReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            BusyReason::AwaitingInput => "waiting for a tape",
            BusyReason::AwaitingOutput => "waiting for an output stream",
            BusyReason::AwaitingOperator => "waiting for the operator",
        })
    }
}

/// The outcome of asking a device for a single transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer<T> {
    /// The transfer happened.  `delay` is how long the mechanism
    /// takes to handle the character.
    Done { value: T, delay: Duration },
    Busy(BusyReason),
}

/// A peripheral that can stall the machine.
pub trait Peripheral {
    type Stream;

    fn id(&self) -> DeviceId;
    fn attach(&mut self, stream: Self::Stream);
    fn detach(&mut self);
    fn busy_reason(&self) -> Option<BusyReason>;
    fn clear_busy(&mut self);

    fn is_busy(&self) -> bool {
        self.busy_reason().is_some()
    }
}

/// Per-character mechanism delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterDelays {
    pub reader: Duration,
    pub punch: Duration,
    pub teleprinter: Duration,
}

impl Default for CharacterDelays {
    fn default() -> Self {
        CharacterDelays {
            reader: Duration::from_millis(2),
            punch: Duration::from_millis(10),
            teleprinter: Duration::from_millis(100),
        }
    }
}

/// Which tape-station reader an instruction with address `addr` uses.
pub fn reader_for_address(addr: u16) -> DeviceId {
    if addr & SECOND_STATION_BIT != 0 {
        DeviceId::Reader2
    } else {
        DeviceId::Reader1
    }
}

/// Which tape-station output device an instruction with address
/// `addr` uses.
pub fn output_for_address(addr: u16) -> DeviceId {
    if addr & TELEPRINTER_BIT != 0 {
        DeviceId::Teleprinter
    } else if addr & SECOND_STATION_BIT != 0 {
        DeviceId::Punch2
    } else {
        DeviceId::Punch1
    }
}

/// All the machine's peripherals.
#[derive(Debug)]
pub struct Peripherals {
    readers: [Reader; 2],
    punches: [Punch; 2],
    teleprinter: Punch,
    pub word_generator: WordGenerator,
    pub controls: ControlRegistry,
}

impl Peripherals {
    pub fn new(delays: &CharacterDelays) -> Peripherals {
        Peripherals {
            readers: [
                Reader::new(DeviceId::Reader1, delays.reader),
                Reader::new(DeviceId::Reader2, delays.reader),
            ],
            punches: [
                Punch::new(DeviceId::Punch1, delays.punch),
                Punch::new(DeviceId::Punch2, delays.punch),
            ],
            teleprinter: Punch::new(DeviceId::Teleprinter, delays.teleprinter),
            word_generator: WordGenerator::new(),
            controls: ControlRegistry::new(),
        }
    }

    /// The reader with identity `id`, if it is a reader.
    pub fn reader(&mut self, id: DeviceId) -> Option<&mut Reader> {
        match id {
            DeviceId::Reader1 => Some(&mut self.readers[0]),
            DeviceId::Reader2 => Some(&mut self.readers[1]),
            _ => None,
        }
    }

    /// The output device with identity `id`, if it is one.
    pub fn output(&mut self, id: DeviceId) -> Option<&mut Punch> {
        match id {
            DeviceId::Punch1 => Some(&mut self.punches[0]),
            DeviceId::Punch2 => Some(&mut self.punches[1]),
            DeviceId::Teleprinter => Some(&mut self.teleprinter),
            _ => None,
        }
    }

    pub fn busy_reason(&self, id: DeviceId) -> Option<BusyReason> {
        match id {
            DeviceId::Reader1 => self.readers[0].busy_reason(),
            DeviceId::Reader2 => self.readers[1].busy_reason(),
            DeviceId::Punch1 => self.punches[0].busy_reason(),
            DeviceId::Punch2 => self.punches[1].busy_reason(),
            DeviceId::Teleprinter => self.teleprinter.busy_reason(),
            DeviceId::WordGenerator => self.word_generator.busy_reason(),
        }
    }

    pub fn clear_busy(&mut self, id: DeviceId) {
        match id {
            DeviceId::Reader1 => self.readers[0].clear_busy(),
            DeviceId::Reader2 => self.readers[1].clear_busy(),
            DeviceId::Punch1 => self.punches[0].clear_busy(),
            DeviceId::Punch2 => self.punches[1].clear_busy(),
            DeviceId::Teleprinter => self.teleprinter.clear_busy(),
            DeviceId::WordGenerator => self.word_generator.clear_busy(),
        }
    }

    /// Clear every device's busy flag.
    pub fn reset(&mut self) {
        for r in self.readers.iter_mut() {
            r.clear_busy();
        }
        for p in self.punches.iter_mut() {
            p.clear_busy();
        }
        self.teleprinter.clear_busy();
        self.word_generator.reset();
    }

    pub fn flush_outputs(&mut self) {
        for p in self.punches.iter_mut() {
            p.flush();
        }
        self.teleprinter.flush();
    }
}
