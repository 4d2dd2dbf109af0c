//! The whole machine, shared between threads.
//!
//! All mutable state lives in a single [`Core`] behind one mutex.
//! The execution thread holds the lock while it executes an
//! instruction and releases it between instructions, so control
//! operations from other threads (stop, reset, attaching a tape and
//! so on) always take effect between instructions.
//!
//! A device wait releases the lock while the execution thread
//! sleeps on the condition variable in [`BusyWait`].  In batch mode
//! the wait is not performed; [`Machine::run`] returns instead, and
//! calling it again resumes execution.
use std::fmt::{self, Debug, Display, Formatter};
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use serde::Serialize;
use tracing::{event, span, Level};

use base::prelude::*;

use crate::busy::{BusyWait, ExecutionMode, WaitResult, WaitState};
use crate::clock::{BasicClock, Clock, Cycles};
use crate::config::Configuration;
use crate::control::{timing, ControlUnit, CpuState, Stall};
use crate::event::{NoObserver, Observer, RegisterDisplay};
use crate::io::{ControlDevice, DeviceId, Peripheral, Peripherals};
use crate::memory::{SnapshotError, Store};
use crate::pacing::{Calibration, Pacer};
use crate::trace::TraceSink;

/// Why [`Machine::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    /// [`Machine::stop`] was called.
    Stopped,
    /// Batch mode only: the machine needs something before it can
    /// continue.
    Waiting(Stall),
    /// The instruction limit given to [`Machine::run_limited`] was
    /// reached.
    LimitReached,
}

/// A device operation named a device of the wrong kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrongDevice {
    NotAReader(DeviceId),
    NotAnOutput(DeviceId),
}

impl Display for WrongDevice {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            WrongDevice::NotAReader(id) => write!(f, "{id} is not a tape reader"),
            WrongDevice::NotAnOutput(id) => write!(f, "{id} is not an output device"),
        }
    }
}

impl std::error::Error for WrongDevice {}

/// The complete visible state of the machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineSnapshot {
    pub registers: CpuState,
    pub cycles: Cycles,
    pub waiting_on: Option<Stall>,
    pub store: Vec<Word>,
}

/// Everything protected by the machine's lock.
struct Core {
    control: ControlUnit,
    store: Store,
    devices: Peripherals,
    clock: BasicClock,
    observer: Box<dyn Observer>,
    trace: Option<Box<dyn TraceSink>>,
    wait: WaitState,
    stall: Option<Stall>,
    instructions: u64,
}

impl Debug for Core {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("Core")
            .field("control", &self.control)
            .field("store", &self.store)
            .field("devices", &self.devices)
            .field("clock", &self.clock)
            .field("tracing", &self.trace.is_some())
            .field("wait", &self.wait)
            .field("stall", &self.stall)
            .field("instructions", &self.instructions)
            .finish()
    }
}

impl AsRef<WaitState> for Core {
    fn as_ref(&self) -> &WaitState {
        &self.wait
    }
}

impl AsMut<WaitState> for Core {
    fn as_mut(&mut self) -> &mut WaitState {
        &mut self.wait
    }
}

impl Core {
    fn report_registers(&mut self) {
        let display = self.control.register_display();
        self.observer.registers_changed(&display);
    }
}

#[derive(Debug)]
pub struct Machine {
    core: Mutex<Core>,
    busy: BusyWait,
    running: AtomicBool,
    config: Configuration,
    calibration: Option<Calibration>,
}

impl Machine {
    pub fn new(config: Configuration) -> Machine {
        Machine::with_observer(config, Box::new(NoObserver))
    }

    pub fn with_observer(config: Configuration, observer: Box<dyn Observer>) -> Machine {
        event!(Level::INFO, "creating machine: {config:?}");
        let mut control = ControlUnit::new(config.fpu_installed);
        control.report_every_instruction = config.debug;
        let core = Core {
            control,
            store: Store::new(),
            devices: Peripherals::new(&config.character_delays()),
            clock: BasicClock::new(config.cycle_time),
            observer,
            trace: None,
            wait: WaitState::default(),
            stall: None,
            instructions: 0,
        };
        let calibration = config.real_time.then(Calibration::measure);
        Machine {
            core: Mutex::new(core),
            busy: BusyWait::new(config.mode),
            running: AtomicBool::new(false),
            config,
            calibration,
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run until stopped, or (in batch mode) until the machine has to
    /// wait.
    pub fn run(&self) -> RunOutcome {
        self.run_limited(None)
    }

    /// As [`Machine::run`], but also return after `limit`
    /// instructions have been executed.
    pub fn run_limited(&self, limit: Option<u64>) -> RunOutcome {
        self.running.store(true, Ordering::SeqCst);
        self.execute(limit)
    }

    /// The execution loop.  The caller has already marked the machine
    /// as running, so a stop requested before we get here is honoured.
    fn execute(&self, limit: Option<u64>) -> RunOutcome {
        let span = span!(Level::INFO, "run", mode = ?self.busy.mode());
        let _enter = span.enter();

        let mut guard = self.lock();
        // Running again is how a batch-mode caller continues after a
        // wait.
        guard.stall = None;
        self.busy.clear_busy_wait(&mut guard.wait);
        guard.observer.running_changed(true);
        let mut pacer = self
            .calibration
            .map(|c| Pacer::new(c, guard.clock.now()));

        let mut executed: u64 = 0;
        let (outcome, mut guard) = loop {
            if !self.running.load(Ordering::SeqCst) {
                break (RunOutcome::Stopped, guard);
            }
            if limit.is_some_and(|n| executed >= n) {
                break (RunOutcome::LimitReached, guard);
            }
            let core = &mut *guard;
            let result = core
                .control
                .step(&mut core.store, &mut core.devices, core.observer.as_mut());
            match result {
                Ok(done) => {
                    executed += 1;
                    core.instructions += 1;
                    let delay = timing::cycles_for_delay(done.device_delay, self.config.cycle_time);
                    core.clock.consume(done.cycles + delay);
                    if let Some(trace) = core.trace.as_mut() {
                        trace.record(&done.trace);
                    }
                    if self.config.debug {
                        event!(
                            Level::DEBUG,
                            "{}.{} {} A={}",
                            done.trace.scr,
                            done.trace.scr2,
                            done.trace.instruction,
                            done.trace.acc
                        );
                    }
                    if done.fp_overflow {
                        guard = match self.wait_for(guard, Stall::FloatingPointOverflow) {
                            WaitResult::Halted(g) => {
                                break (RunOutcome::Waiting(Stall::FloatingPointOverflow), g);
                            }
                            WaitResult::Released(g) => g,
                        };
                        if let Some(p) = pacer.as_mut() {
                            p.reset_baseline(guard.clock.now());
                        }
                        continue;
                    }
                    let now = guard.clock.now();
                    drop(guard);
                    if let Some(p) = pacer.as_mut() {
                        p.pace(now);
                    }
                    guard = self.lock();
                }
                Err(busy) => {
                    let stall = Stall::from(busy);
                    guard = match self.wait_for(guard, stall) {
                        WaitResult::Halted(g) => break (RunOutcome::Waiting(stall), g),
                        WaitResult::Released(g) => g,
                    };
                    if let Some(p) = pacer.as_mut() {
                        p.reset_baseline(guard.clock.now());
                    }
                }
            }
        };

        self.running.store(false, Ordering::SeqCst);
        guard.devices.flush_outputs();
        guard.observer.running_changed(false);
        guard.report_registers();
        event!(
            Level::INFO,
            "run finished after {executed} instructions: {outcome:?}"
        );
        outcome
    }

    /// Record the stall and enter the busy wait.  In batch mode the
    /// stall stays recorded so that [`Machine::waiting_on`] can
    /// report it.
    fn wait_for<'a>(
        &self,
        mut guard: MutexGuard<'a, Core>,
        stall: Stall,
    ) -> WaitResult<MutexGuard<'a, Core>> {
        if !self.running.load(Ordering::SeqCst) {
            // Stopped while executing; don't wait.
            return WaitResult::Released(guard);
        }
        event!(Level::DEBUG, "machine waiting: {stall}");
        guard.stall = Some(stall);
        let device = match stall {
            Stall::Device { device, .. } => Some(device),
            Stall::FloatingPointOverflow => None,
        };
        guard.observer.busy_changed(device);
        guard.report_registers();
        match self.busy.enter_busy_wait(guard) {
            WaitResult::Halted(g) => WaitResult::Halted(g),
            WaitResult::Released(mut g) => {
                g.stall = None;
                g.observer.busy_changed(None);
                WaitResult::Released(g)
            }
        }
    }

    /// Run on a new thread.  This is how interactive mode is used.
    pub fn spawn(self: &Arc<Self>) -> io::Result<JoinHandle<RunOutcome>> {
        let machine = Arc::clone(self);
        self.running.store(true, Ordering::SeqCst);
        let result = thread::Builder::new()
            .name("e803-execution".to_string())
            .spawn(move || machine.execute(None));
        if result.is_err() {
            self.running.store(false, Ordering::SeqCst);
        }
        result
    }

    pub fn stop(&self) {
        event!(Level::INFO, "stop requested");
        self.running.store(false, Ordering::SeqCst);
        let mut guard = self.lock();
        self.busy.clear_busy_wait(&mut guard.wait);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Clear the registers and every device's busy state, and release
    /// any wait.  The store is not changed.
    pub fn reset(&self) {
        let mut guard = self.lock();
        guard.control.reset();
        guard.devices.reset();
        guard.stall = None;
        self.busy.clear_busy_wait(&mut guard.wait);
        guard.report_registers();
    }

    pub fn set_next_instruction(&self, addr: u16, half: u8) {
        let mut guard = self.lock();
        guard.control.set_next_instruction(addr, half);
        guard.report_registers();
    }

    pub fn attach_trace(&self, sink: Box<dyn TraceSink>) {
        self.lock().trace = Some(sink);
    }

    pub fn detach_trace(&self) -> Option<Box<dyn TraceSink>> {
        self.lock().trace.take()
    }

    pub fn set_observer(&self, observer: Box<dyn Observer>) {
        self.lock().observer = observer;
    }

    /// Release the wait if the machine is waiting on `device`.
    fn device_ready(&self, guard: &mut Core, device: DeviceId) {
        guard.devices.clear_busy(device);
        if matches!(guard.stall, Some(Stall::Device { device: d, .. }) if d == device) {
            guard.stall = None;
            self.busy.clear_busy_wait(&mut guard.wait);
        }
    }

    /// Load a tape into a reader.
    pub fn set_tape(&self, reader: DeviceId, tape: Box<dyn Read + Send>) -> Result<(), WrongDevice> {
        let mut guard = self.lock();
        guard
            .devices
            .reader(reader)
            .ok_or(WrongDevice::NotAReader(reader))?
            .attach(tape);
        self.device_ready(&mut guard, reader);
        Ok(())
    }

    /// Give a punch or the teleprinter somewhere to write.
    pub fn set_punch_output(
        &self,
        output: DeviceId,
        sink: Box<dyn Write + Send>,
    ) -> Result<(), WrongDevice> {
        let mut guard = self.lock();
        guard
            .devices
            .output(output)
            .ok_or(WrongDevice::NotAnOutput(output))?
            .attach(sink);
        self.device_ready(&mut guard, output);
        Ok(())
    }

    /// Flush and remove an output stream.
    pub fn detach_punch_output(&self, output: DeviceId) -> Result<(), WrongDevice> {
        let mut guard = self.lock();
        guard
            .devices
            .output(output)
            .ok_or(WrongDevice::NotAnOutput(output))?
            .detach();
        Ok(())
    }

    pub fn press_operate(&self) {
        let mut guard = self.lock();
        guard.devices.word_generator.operate_pressed();
        self.device_ready(&mut guard, DeviceId::WordGenerator);
    }

    /// Continue after a floating-point overflow.  The floating-point
    /// overflow flag is cleared.
    pub fn continue_after_overflow(&self) {
        let mut guard = self.lock();
        if guard.stall == Some(Stall::FloatingPointOverflow) {
            guard.control.regs.fp_overflow = false;
            guard.stall = None;
            self.busy.clear_busy_wait(&mut guard.wait);
        }
    }

    pub fn set_word_generator(&self, value: Word) {
        self.lock().devices.word_generator.set_value(value);
    }

    pub fn set_word_generator_bit(&self, bit: u32, on: bool) {
        self.lock().devices.word_generator.set_bit(bit, on);
    }

    pub fn word_generator(&self) -> Word {
        self.lock().devices.word_generator.value()
    }

    pub fn set_manual_data(&self, on: bool) {
        let mut guard = self.lock();
        guard.devices.word_generator.set_manual_data(on);
        if !on {
            self.device_ready(&mut guard, DeviceId::WordGenerator);
        }
    }

    pub fn arm_manual_data_after_next_read(&self) {
        self.lock()
            .devices
            .word_generator
            .arm_manual_data_after_next_read();
    }

    pub fn register_control_device(&self, device: Box<dyn ControlDevice>) {
        self.lock().devices.controls.register(device);
    }

    pub fn clear_store(&self) {
        self.lock().store.clear();
    }

    /// The word at `addr`, as it would be fetched for execution.
    pub fn read_store(&self, addr: u16) -> Word {
        self.lock().store.fetch(u32::from(addr))
    }

    pub fn write_store(&self, addr: u16, value: Word) {
        self.lock().store.write(u32::from(addr), value);
    }

    pub fn load_store(&self, addr: u16, words: &[Word]) {
        self.lock().store.load(u32::from(addr), words);
    }

    pub fn restore_store(&self, image: &[Word]) -> Result<(), SnapshotError> {
        self.lock().store.restore(image)
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        let guard = self.lock();
        MachineSnapshot {
            registers: guard.control.regs,
            cycles: guard.clock.cycles(),
            waiting_on: guard.stall,
            store: guard.store.words().to_vec(),
        }
    }

    /// Instructions executed since the machine was created.
    pub fn instructions_executed(&self) -> u64 {
        self.lock().instructions
    }

    pub fn registers(&self) -> RegisterDisplay {
        self.lock().control.register_display()
    }

    /// What the machine is waiting for, if anything.
    pub fn waiting_on(&self) -> Option<Stall> {
        self.lock().stall
    }

    pub fn mode(&self) -> ExecutionMode {
        self.busy.mode()
    }
}
