//! Emulates the control unit.
//!
//! The control unit holds the machine's registers, fetches each
//! instruction, applies B-line modification, and dispatches on the
//! function code.  The function code's top three bits select a
//! group:
//!
//! | Group | Function |
//! | ----- | -------- |
//! | 0-3   | fixed-point arithmetic; the groups differ in where the result goes |
//! | 4     | jumps |
//! | 5     | shifts, multiplication and division |
//! | 6     | floating point (when the FPU is installed) |
//! | 7     | input/output |
//!
//! Execution of an instruction is atomic: either it completes and the
//! sequence control register moves on, or (when a peripheral is not
//! ready) nothing at all changes and the same instruction is
//! executed again later.
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use serde::Serialize;
use tracing::{event, span, Level};

use base::prelude::*;

use crate::clock::Cycles;
use crate::event::{Observer, RegisterDisplay};
use crate::io::{BusyReason, DeviceId, Peripherals};
use crate::memory::{Store, STORE_SIZE};
use crate::trace::TraceEntry;

mod op_arith;
mod op_float;
mod op_io;
mod op_jump;
mod op_shift;
pub mod timing;


/// Why the machine cannot make progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stall {
    /// A peripheral is busy; the instruction using it has not been
    /// executed.
    Device { device: DeviceId, reason: BusyReason },
    /// A floating-point instruction overflowed.  The instruction has
    /// completed; the machine waits for the operator.
    FloatingPointOverflow,
}

impl Display for Stall {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Stall::Device { device, reason } => write!(f, "{device} is {reason}"),
            Stall::FloatingPointOverflow => f.write_str("floating-point overflow"),
        }
    }
}

/// A peripheral needed by the current instruction is not ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceBusy {
    pub device: DeviceId,
    pub reason: BusyReason,
}

impl From<DeviceBusy> for Stall {
    fn from(b: DeviceBusy) -> Stall {
        Stall::Device {
            device: b.device,
            reason: b.reason,
        }
    }
}

/// The result of executing one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Executed {
    pub trace: TraceEntry,
    /// Time taken by the instruction itself.
    pub cycles: Cycles,
    /// Additional time taken by a peripheral mechanism.
    pub device_delay: Duration,
    /// The instruction caused a floating-point overflow.
    pub fp_overflow: bool,
}

/// The processor registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CpuState {
    /// Accumulator.
    pub acc: Word,
    /// Auxiliary register: the 38 low-order bits of a double-length
    /// value.
    pub ar: u64,
    pub overflow: bool,
    pub fp_overflow: bool,
    /// Sequence control register: the address of the current word.
    pub scr: u16,
    /// Which half of that word is next: 0 for the first instruction,
    /// 1 for the second.
    pub scr2: u8,
    /// The last word fetched.
    pub ir: Word,
    /// The instruction last executed, after modification.
    pub irx: Instruction,
    /// The last instruction transferred control, so a second half
    /// reached that way is not B-modified.
    pub jumped: bool,
}

#[derive(Debug)]
enum ProgramCounterChange {
    CounterUpdate,
    Jump { addr: u16, half: u8 },
}

#[derive(Debug)]
pub struct ControlUnit {
    pub regs: CpuState,
    fpu_installed: bool,
    /// Report register contents to the observer after every
    /// instruction, not just on request.
    pub report_every_instruction: bool,
}

impl ControlUnit {
    pub fn new(fpu_installed: bool) -> ControlUnit {
        ControlUnit {
            regs: CpuState::default(),
            fpu_installed,
            report_every_instruction: false,
        }
    }

    pub fn fpu_installed(&self) -> bool {
        self.fpu_installed
    }

    /// Clear all registers.  Execution restarts at the first
    /// instruction of location 0.
    pub fn reset(&mut self) {
        event!(Level::INFO, "control unit reset");
        self.regs = CpuState::default();
    }

    /// Change where execution continues.
    pub fn set_next_instruction(&mut self, addr: u16, half: u8) {
        self.regs.scr = addr & ADDRESS_MASK;
        self.regs.scr2 = half & 1;
        // The second half of a word chosen by the operator is not
        // modified, just as if it had been reached by a jump.
        self.regs.jumped = true;
    }

    pub fn register_display(&self) -> RegisterDisplay {
        RegisterDisplay {
            acc: self.regs.acc,
            ar: self.regs.ar,
            scr: self.regs.scr,
            scr2: self.regs.scr2,
            ir: InstructionPair::from(self.regs.ir),
            overflow: self.regs.overflow,
            fp_overflow: self.regs.fp_overflow,
        }
    }

    fn set_program_counter(&mut self, change: ProgramCounterChange) {
        match change {
            ProgramCounterChange::CounterUpdate => {
                if self.regs.scr2 == 0 {
                    self.regs.scr2 = 1;
                } else {
                    self.regs.scr2 = 0;
                    self.regs.scr = ((usize::from(self.regs.scr) + 1) % STORE_SIZE) as u16;
                }
                self.regs.jumped = false;
            }
            ProgramCounterChange::Jump { addr, half } => {
                self.regs.scr = addr & ADDRESS_MASK;
                self.regs.scr2 = half;
                self.regs.jumped = true;
            }
        }
    }

    /// Work out which instruction is next, without changing any
    /// register.
    pub fn fetch_instruction(&self, store: &Store) -> (Word, Instruction) {
        // The second half comes from the pair fetched for the first
        // half, even if the first instruction overwrote its own word.
        let word = if self.regs.scr2 == 1 && !self.regs.jumped {
            self.regs.ir
        } else {
            store.fetch(u32::from(self.regs.scr))
        };
        let inst = if self.regs.scr2 == 0 {
            word.first_instruction()
        } else if word.b_bit() && !self.regs.jumped {
            // B-line modification adds the word addressed by the
            // first instruction (which has just been executed, so we
            // see its result) to the original second instruction.
            let modifier = store.read(u32::from(word.first_instruction().address()));
            word.second_instruction()
                .modified_by(modifier.bits() & u64::from(INSTRUCTION_MASK))
        } else {
            word.second_instruction()
        };
        (word, inst)
    }

    /// Fetch and execute one instruction.
    pub fn step(
        &mut self,
        store: &mut Store,
        devices: &mut Peripherals,
        observer: &mut dyn Observer,
    ) -> Result<Executed, DeviceBusy> {
        let (scr, scr2) = (self.regs.scr, self.regs.scr2);
        let (word, inst) = self.fetch_instruction(store);
        let span = span!(Level::DEBUG, "xop", scr, scr2, op = %inst);
        let _enter = span.enter();

        let acc_before = self.regs.acc;
        let outcome = match inst.group() {
            0..=3 => self.op_arith(inst, store),
            4 => self.op_jump(inst),
            5 => self.op_shift(inst, store),
            6 if self.fpu_installed => self.op_float(inst, store),
            6 => self.op_arith(Instruction::new(inst.function(), inst.address()), store),
            _ => self.op_io(inst, store, devices, observer),
        };
        let (change, device_delay, fp_overflow) = match outcome {
            Ok(result) => result,
            Err(busy) => {
                event!(
                    Level::DEBUG,
                    "instruction {inst} not executed: {} is {}",
                    busy.device,
                    busy.reason
                );
                return Err(busy);
            }
        };
        if fp_overflow {
            event!(Level::INFO, "floating-point overflow at {scr}");
            self.regs.fp_overflow = true;
            self.regs.overflow = true;
        }
        let cycles = timing::instruction_cycles(inst, acc_before);
        self.regs.ir = word;
        self.regs.irx = inst;
        self.set_program_counter(change);
        if self.report_every_instruction {
            observer.registers_changed(&self.register_display());
        }
        Ok(Executed {
            trace: TraceEntry {
                scr,
                scr2,
                instruction: inst,
                acc: self.regs.acc,
                overflow: self.regs.overflow,
                cycles,
            },
            cycles,
            device_delay,
            fp_overflow,
        })
    }
}

/// What an instruction did, short of its timing.
type OpResult = Result<(ProgramCounterChange, Duration, bool), DeviceBusy>;

fn completed() -> OpResult {
    Ok((ProgramCounterChange::CounterUpdate, Duration::ZERO, false))
}
