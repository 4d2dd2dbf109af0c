//! Keeping simulated time in step with the wall clock.
//!
//! After each instruction the machine tells the [`Pacer`] how much
//! simulated time has passed.  If the simulation is running ahead of
//! real time, the pacer makes up the difference.  Sleeping is only
//! worthwhile once the debt exceeds the shortest sleep the host can
//! actually perform; smaller debts are worked off by spinning on the
//! clock, and debts smaller than the cost of reading the clock are
//! carried forward.
use std::thread::sleep;
use std::time::{Duration, Instant};

use tracing::{event, Level};

const CALIBRATION_SAMPLES: u32 = 5;

/// Measured costs of the host's timing primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    /// The shortest period a call to `sleep` actually takes.
    pub min_sleep: Duration,
    /// The cost of one call to `Instant::now`.
    pub clock_overhead: Duration,
}

impl Calibration {
    pub fn new(min_sleep: Duration, clock_overhead: Duration) -> Calibration {
        Calibration {
            min_sleep,
            clock_overhead,
        }
    }

    /// Measure the host by sampling each primitive a few times and
    /// averaging.
    pub fn measure() -> Calibration {
        let mut slept = Duration::ZERO;
        for _ in 0..CALIBRATION_SAMPLES {
            let then = Instant::now();
            sleep(Duration::from_micros(1));
            slept += then.elapsed();
        }
        let mut clock_reads = Duration::ZERO;
        for _ in 0..CALIBRATION_SAMPLES {
            let then = Instant::now();
            let now = Instant::now();
            clock_reads += now.duration_since(then);
        }
        let result = Calibration {
            min_sleep: slept / CALIBRATION_SAMPLES,
            clock_overhead: clock_reads / CALIBRATION_SAMPLES,
        };
        event!(Level::DEBUG, "timing calibration: {result:?}");
        result
    }
}

#[derive(Debug)]
pub struct Pacer {
    calibration: Calibration,
    wall_baseline: Instant,
    simulated_baseline: Duration,
    total_sleep: Duration,
    total_spin: Duration,
}

impl Pacer {
    pub fn new(calibration: Calibration, simulated_now: Duration) -> Pacer {
        Pacer {
            calibration,
            wall_baseline: Instant::now(),
            simulated_baseline: simulated_now,
            total_sleep: Duration::ZERO,
            total_spin: Duration::ZERO,
        }
    }

    /// Start measuring afresh from `simulated_now`.  Used after a
    /// device wait, which has already taken real time of its own.
    pub fn reset_baseline(&mut self, simulated_now: Duration) {
        self.wall_baseline = Instant::now();
        self.simulated_baseline = simulated_now;
    }

    /// How far the simulation is ahead of real time.
    fn owed(&self, simulated_now: Duration) -> Duration {
        let simulated = simulated_now.saturating_sub(self.simulated_baseline);
        simulated.saturating_sub(self.wall_baseline.elapsed())
    }

    /// Wait until real time catches up with `simulated_now`, if the
    /// debt is large enough to act on.
    pub fn pace(&mut self, simulated_now: Duration) {
        let owed = self.owed(simulated_now);
        if owed > self.calibration.min_sleep {
            event!(Level::TRACE, "sleeping for {owed:?}");
            sleep(owed);
            self.total_sleep += owed;
        } else if owed > self.calibration.clock_overhead {
            let target = Instant::now() + owed;
            while Instant::now() < target {
                std::hint::spin_loop();
            }
            self.total_spin += owed;
        }
    }

    pub fn total_sleep(&self) -> Duration {
        self.total_sleep
    }
}

impl Drop for Pacer {
    fn drop(&mut self) {
        event!(
            Level::DEBUG,
            "pacer: total sleep {:?}, total spin {:?}",
            self.total_sleep,
            self.total_spin
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_is_plausible() {
        let c = Calibration::measure();
        assert!(c.min_sleep >= Duration::from_micros(1));
        assert!(c.clock_overhead < Duration::from_millis(100));
    }

    #[test]
    fn pacer_waits_for_real_time() {
        let calibration = Calibration::new(Duration::from_micros(100), Duration::ZERO);
        let start = Instant::now();
        let mut pacer = Pacer::new(calibration, Duration::ZERO);
        pacer.pace(Duration::from_millis(20));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn pacer_does_not_wait_when_behind() {
        let calibration = Calibration::new(Duration::from_micros(100), Duration::ZERO);
        let mut pacer = Pacer::new(calibration, Duration::from_secs(10));
        // Simulated time went backwards relative to the baseline,
        // so nothing is owed.
        pacer.pace(Duration::from_secs(5));
        assert_eq!(pacer.total_sleep(), Duration::ZERO);
    }

    #[test]
    fn reset_baseline_forgets_debt() {
        let calibration = Calibration::new(Duration::from_micros(100), Duration::ZERO);
        let mut pacer = Pacer::new(calibration, Duration::ZERO);
        pacer.reset_baseline(Duration::from_secs(60));
        let start = Instant::now();
        pacer.pace(Duration::from_secs(60));
        assert!(start.elapsed() < Duration::from_secs(30));
    }
}
