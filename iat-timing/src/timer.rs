use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Stopwatch with an explicit reset plus a blocking pause.
pub trait Timer {
    /// Restarts the stopwatch.
    fn reset(&mut self);
    /// Time since the last reset (or creation).
    fn elapsed(&self) -> Duration;
    /// Blocks for `d` with no early exit.
    fn sleep(&self, d: Duration);

    fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}

/// Wall-clock timer backed by `Instant` and the platform's finest sleep.
#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    start: Instant,
}

impl Timer for HighPrecisionTimer {
    fn reset(&mut self) {
        self.start = Instant::now();
    }
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{clock_nanosleep, timespec, CLOCK_MONOTONIC, EINTR};

        let mut req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };
        let mut rem = timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };

        // Resume with the remainder when a signal cuts the sleep short.
        loop {
            let rc = unsafe { clock_nanosleep(CLOCK_MONOTONIC, 0, &req, &mut rem) };
            if rc != EINTR {
                break;
            }
            req = rem;
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulated clock for tests and dry runs.
///
/// Clones share the same "now", so a scripted input source can advance the
/// clock by a participant's latency before handing back a key. `sleep`
/// advances the clock instead of blocking and is tallied in `slept()`.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now_ns: Arc<AtomicU64>,
    slept_ns: Arc<AtomicU64>,
    origin_ns: u64,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns.fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Total time spent in `sleep` across all clones.
    pub fn slept(&self) -> Duration {
        Duration::from_nanos(self.slept_ns.load(Ordering::SeqCst))
    }

    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
}

impl Timer for ManualTimer {
    fn reset(&mut self) {
        self.origin_ns = self.now();
    }
    fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(self.origin_ns))
    }
    fn sleep(&self, d: Duration) {
        self.slept_ns
            .fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
        self.advance(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_timer_measures_from_last_reset() {
        let mut timer = ManualTimer::new();
        let remote = timer.clone();
        remote.advance(Duration::from_millis(300));
        timer.reset();
        remote.advance(Duration::from_millis(450));
        assert_eq!(timer.elapsed(), Duration::from_millis(450));
        assert!((timer.elapsed_secs() - 0.45).abs() < 1e-9);
    }

    #[test]
    fn manual_sleep_advances_time() {
        let mut timer = ManualTimer::new();
        timer.reset();
        timer.sleep(Duration::from_millis(150));
        timer.sleep(Duration::from_secs(1));
        assert_eq!(timer.elapsed(), Duration::from_millis(1150));
        assert_eq!(timer.slept(), Duration::from_millis(1150));
    }

    #[test]
    fn high_precision_sleep_waits_at_least_requested() {
        let mut timer = HighPrecisionTimer::new();
        timer.reset();
        timer.sleep(Duration::from_millis(5));
        assert!(timer.elapsed() >= Duration::from_millis(5));
    }
}
