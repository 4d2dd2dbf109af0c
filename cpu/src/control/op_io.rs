//! ## Input and output, group 7
//!
//! | Code | Effect |
//! | ---- | ------ |
//! | 70   | A' = word generator |
//! | 71   | read a tape character, OR it into A |
//! | 72   | A' = control device value, if any |
//! | 73   | N' = SCR |
//! | 74   | output the character N & 31 |
//! | 75   | control device write of A |
//! | 76   | block transfer (not implemented) |
//! | 77   | block transfer (not implemented) |
//!
//! Devices which are not ready leave the machine state untouched.
use std::time::Duration;

use base::prelude::*;
use tracing::{event, Level};

use crate::event::Observer;
use crate::io::{self, DeviceId, Peripherals, Transfer, CHARACTER_MASK};
use crate::memory::Store;

use super::{completed, ControlUnit, DeviceBusy, OpResult, ProgramCounterChange};

fn done(delay: Duration) -> OpResult {
    Ok((ProgramCounterChange::CounterUpdate, delay, false))
}

fn busy(device: DeviceId, reason: io::BusyReason) -> OpResult {
    Err(DeviceBusy { device, reason })
}

impl ControlUnit {
    pub(super) fn op_io(
        &mut self,
        inst: Instruction,
        store: &mut Store,
        devices: &mut Peripherals,
        observer: &mut dyn Observer,
    ) -> OpResult {
        let addr = inst.address();
        match inst.function() {
            0 => match devices.word_generator.read() {
                Transfer::Done { value, delay } => {
                    self.regs.acc = value;
                    done(delay)
                }
                Transfer::Busy(reason) => busy(DeviceId::WordGenerator, reason),
            },
            1 => {
                let id = io::reader_for_address(addr);
                let Some(reader) = devices.reader(id) else {
                    return completed();
                };
                match reader.read_char() {
                    Transfer::Done { value, delay } => {
                        self.regs.acc = Word::from_bits(self.regs.acc.bits() | u64::from(value));
                        observer.character_transferred(id, value);
                        done(delay)
                    }
                    Transfer::Busy(reason) => busy(id, reason),
                }
            }
            2 => {
                if let Some(value) = devices.controls.read(addr) {
                    self.regs.acc = value;
                }
                completed()
            }
            3 => {
                store.write(u32::from(addr), Word::from(self.regs.scr));
                completed()
            }
            4 => {
                let id = io::output_for_address(addr);
                let ch = (addr as u8) & CHARACTER_MASK;
                let Some(output) = devices.output(id) else {
                    return completed();
                };
                match output.punch_char(ch) {
                    Transfer::Done { delay, .. } => {
                        observer.character_transferred(id, ch);
                        done(delay)
                    }
                    Transfer::Busy(reason) => busy(id, reason),
                }
            }
            5 => {
                devices.controls.write(addr, self.regs.acc);
                completed()
            }
            f => {
                event!(Level::DEBUG, "block transfer function 7{f} ignored");
                completed()
            }
        }
    }
}
