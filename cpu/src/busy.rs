//! The busy/ready protocol between the execution thread and the
//! peripherals.
//!
//! When a peripheral cannot complete a transfer the execution thread
//! enters a busy wait.  In interactive mode it blocks on a condition
//! variable until another thread supplies what the device needs and
//! clears the wait.  In batch mode there is nobody to do that, so the
//! wait "fails fast": the run loop is told to halt and its caller can
//! decide what to do (for example attach the next tape) before
//! running the machine again.
use std::sync::{Condvar, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{event, Level};

/// How the machine reacts to a device wait.  This is fixed when the
/// machine is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Return to the caller as soon as a wait would block.
    #[default]
    Batch,
    /// Block the execution thread until the wait is cleared.
    Interactive,
}

/// The part of the machine state which the busy-wait protocol
/// manages.  It lives inside the machine's mutex alongside
/// everything else.
#[derive(Debug, Default)]
pub struct WaitState {
    busy: bool,
}

impl WaitState {
    pub fn is_busy(&self) -> bool {
        self.busy
    }
}

#[derive(Debug)]
pub enum WaitResult<G> {
    /// Batch mode: the wait was not performed.  The state is still
    /// marked busy.
    Halted(G),
    /// Interactive mode: another thread cleared the wait.
    Released(G),
}

#[derive(Debug)]
pub struct BusyWait {
    ready: Condvar,
    mode: ExecutionMode,
}

impl BusyWait {
    pub fn new(mode: ExecutionMode) -> BusyWait {
        BusyWait {
            ready: Condvar::new(),
            mode,
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Mark the state busy and (in interactive mode) wait for
    /// [`BusyWait::clear_busy_wait`] to be called.  The mutex is
    /// released while waiting.
    pub fn enter_busy_wait<'a, T>(&self, mut guard: MutexGuard<'a, T>) -> WaitResult<MutexGuard<'a, T>>
    where
        T: AsMut<WaitState> + AsRef<WaitState>,
    {
        guard.as_mut().busy = true;
        match self.mode {
            ExecutionMode::Batch => {
                event!(Level::DEBUG, "busy wait in batch mode; halting");
                WaitResult::Halted(guard)
            }
            ExecutionMode::Interactive => {
                event!(Level::DEBUG, "entering busy wait");
                let guard = self
                    .ready
                    .wait_while(guard, |state| state.as_ref().busy)
                    .unwrap_or_else(PoisonError::into_inner);
                event!(Level::DEBUG, "busy wait released");
                WaitResult::Released(guard)
            }
        }
    }

    /// Release a pending wait.  This does nothing unless the state is
    /// actually busy; it returns true if a wait was released.
    pub fn clear_busy_wait(&self, state: &mut WaitState) -> bool {
        if state.busy {
            state.busy = false;
            self.ready.notify_all();
            true
        } else {
            false
        }
    }
}
