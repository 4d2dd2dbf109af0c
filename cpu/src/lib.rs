//! This crate emulates the Elliott 803: its control unit, arithmetic
//! and floating-point units, core store and tape-station peripherals.
//!
//! The usual entry point is [`Machine`], which can be driven from a
//! single thread (batch mode) or run on its own thread and
//! controlled from others (interactive mode).
#![crate_name = "cpu"]

pub mod alu;
mod busy;
mod clock;
mod config;
mod control;
mod event;
pub mod fpu;
mod io;
mod machine;
mod memory;
mod pacing;
mod trace;

pub use busy::{BusyWait, ExecutionMode, WaitResult, WaitState};
pub use clock::{BasicClock, Clock, Cycles};
pub use config::{Configuration, CYCLE_TIME};
pub use control::{ControlUnit, CpuState, DeviceBusy, Executed, Stall};
pub use event::{NoObserver, Observer, RegisterDisplay};
pub use io::{
    BusyReason, CharacterDelays, ControlDevice, ControlRegistry, DeviceId, Peripheral,
    Peripherals, Punch, Reader, Transfer, WordGenerator,
};
pub use machine::{Machine, MachineSnapshot, RunOutcome, WrongDevice};
pub use memory::{SnapshotError, Store, INITIAL_INSTRUCTIONS, STORE_SIZE};
pub use pacing::{Calibration, Pacer};
pub use trace::{LogTrace, TraceEntry, TraceSink};
