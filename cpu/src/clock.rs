//! Simulated elapsed time.
//!
//! The machine's timing is expressed in cycles (word times).  The
//! clock converts consumed cycles into simulated time using the
//! configured cycle length, and is what the real-time pacer compares
//! against the wall clock.
use std::time::Duration;

use serde::Serialize;

/// A count of machine cycles.
pub type Cycles = u64;

/// Clock is a simulated system clock.  Callers report work done in
/// cycles and read back the simulated time that has passed.
pub trait Clock {
    /// Retrieves the current (simulated) time.
    fn now(&self) -> Duration;

    /// Total cycles consumed since the clock was created or reset.
    fn cycles(&self) -> Cycles;

    /// Record that `cycles` cycles have elapsed.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use cpu::{BasicClock, Clock};
    ///
    /// let mut clk = BasicClock::new(Duration::from_micros(288));
    /// clk.consume(2);
    /// assert_eq!(clk.now(), Duration::from_micros(576));
    /// ```
    fn consume(&mut self, cycles: Cycles);
}

#[derive(Debug, Clone, Serialize)]
pub struct BasicClock {
    cycle_time: Duration,
    cycles: Cycles,
}

impl BasicClock {
    pub fn new(cycle_time: Duration) -> BasicClock {
        BasicClock {
            cycle_time,
            cycles: 0,
        }
    }

    pub fn cycle_time(&self) -> Duration {
        self.cycle_time
    }

    /// The simulated duration of `cycles` cycles.
    pub fn duration_of(&self, cycles: Cycles) -> Duration {
        // Saturate rather than wrap for absurdly long runs.
        let nanos = (self.cycle_time.as_nanos()).saturating_mul(u128::from(cycles));
        let secs = u64::try_from(nanos / 1_000_000_000).unwrap_or(u64::MAX);
        Duration::new(secs, (nanos % 1_000_000_000) as u32)
    }

    pub fn reset(&mut self) {
        self.cycles = 0;
    }
}

impl Clock for BasicClock {
    fn now(&self) -> Duration {
        self.duration_of(self.cycles)
    }

    fn cycles(&self) -> Cycles {
        self.cycles
    }

    fn consume(&mut self, cycles: Cycles) {
        self.cycles = self.cycles.saturating_add(cycles);
    }
}

#[test]
fn clock_accumulates_cycles() {
    let mut clk = BasicClock::new(Duration::from_micros(288));
    assert_eq!(clk.now(), Duration::ZERO);
    clk.consume(1000);
    clk.consume(3);
    assert_eq!(clk.cycles(), 1003);
    assert_eq!(clk.now(), Duration::from_micros(288 * 1003));
    clk.reset();
    assert_eq!(clk.cycles(), 0);
}

#[test]
fn long_runs_do_not_wrap() {
    let clk = BasicClock::new(Duration::from_secs(1));
    assert_eq!(clk.duration_of(u64::MAX), Duration::from_secs(u64::MAX));
}
