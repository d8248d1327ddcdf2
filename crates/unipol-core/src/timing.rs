//! Scoped timing of pre-processing work
//!
//! A [`Timed`] guard samples three clocks when created and adds the elapsed
//! deltas into a caller-owned [`TimingTotals`] when dropped. Dropping also
//! happens while unwinding, so time spent in a failing region is still
//! accounted for.
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Accumulated durations, in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingTotals {
    pub wall_clock_time_seconds: f64,
    pub process_time_seconds: f64,
    pub perf_counter_seconds: f64,
}

impl TimingTotals {
    /// Run `f` inside a timed region
    pub fn time<T>(&mut self, f: impl FnOnce() -> T) -> T {
        let _timed = Timed::start(self);
        f()
    }
}

pub struct Timed<'a> {
    totals: &'a mut TimingTotals,
    wall_clock_start: DateTime<Utc>,
    process_time_start: Duration,
    perf_counter_start: Instant,
}

impl<'a> Timed<'a> {
    pub fn start(totals: &'a mut TimingTotals) -> Self {
        Self {
            totals,
            wall_clock_start: Utc::now(),
            process_time_start: process_time(),
            perf_counter_start: Instant::now(),
        }
    }
}

impl Drop for Timed<'_> {
    fn drop(&mut self) {
        // Wall clock may step backwards; the delta is kept signed.
        let wall = Utc::now() - self.wall_clock_start;
        self.totals.wall_clock_time_seconds +=
            wall.num_nanoseconds().unwrap_or_default() as f64 / 1e9;
        self.totals.process_time_seconds += process_time()
            .saturating_sub(self.process_time_start)
            .as_secs_f64();
        self.totals.perf_counter_seconds += self.perf_counter_start.elapsed().as_secs_f64();
    }
}

/// CPU time consumed by this process
#[cfg(unix)]
pub fn process_time() -> Duration {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `ts` is a valid, exclusively borrowed timespec for the call.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_PROCESS_CPUTIME_ID, &mut ts) };
    if rc != 0 {
        return Duration::ZERO;
    }
    Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32)
}

#[cfg(not(unix))]
pub fn process_time() -> Duration {
    Duration::ZERO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_accumulates() {
        let mut totals = TimingTotals::default();
        {
            let _timed = Timed::start(&mut totals);
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(totals.perf_counter_seconds >= 0.005);
        assert!(totals.process_time_seconds >= 0.0);

        let before = totals.perf_counter_seconds;
        let value = totals.time(|| 7);
        assert_eq!(value, 7);
        assert!(totals.perf_counter_seconds >= before);
    }

    #[test]
    fn test_timed_records_on_unwind() {
        let mut totals = TimingTotals::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            totals.time::<()>(|| {
                std::thread::sleep(Duration::from_millis(2));
                panic!("production failed");
            })
        }));
        assert!(result.is_err());
        assert!(totals.perf_counter_seconds >= 0.002);
    }
}
