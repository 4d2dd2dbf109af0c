//! Machine configuration.
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::busy::ExecutionMode;
use crate::io::CharacterDelays;

/// Length of the basic machine cycle.
pub const CYCLE_TIME: Duration = Duration::from_micros(288);

/// Everything about a machine that is fixed when it is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub cycle_time: Duration,
    /// Pace execution to run no faster than the real machine.
    pub real_time: bool,
    pub mode: ExecutionMode,
    pub fpu_installed: bool,
    /// Log each instruction as it executes.
    pub debug: bool,
    pub reader_delay: Duration,
    pub punch_delay: Duration,
    pub teleprinter_delay: Duration,
}

impl Default for Configuration {
    fn default() -> Self {
        let delays = CharacterDelays::default();
        Configuration {
            cycle_time: CYCLE_TIME,
            real_time: false,
            mode: ExecutionMode::Batch,
            fpu_installed: true,
            debug: false,
            reader_delay: delays.reader,
            punch_delay: delays.punch,
            teleprinter_delay: delays.teleprinter,
        }
    }
}

impl Configuration {
    pub fn character_delays(&self) -> CharacterDelays {
        CharacterDelays {
            reader: self.reader_delay,
            punch: self.punch_delay,
            teleprinter: self.teleprinter_delay,
        }
    }
}
