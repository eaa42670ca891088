//! Time sources for timers
//!
//! Every store reads time through the [`Clock`] trait so that tests can drive
//! timestamps deterministically. Timestamps are signed nanoseconds, matching
//! the 64-bit field of the log wire format.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of nanosecond timestamps
pub trait Clock {
    /// Current time in nanoseconds
    fn now_nanos(&self) -> i64;
}

/// Wall-clock nanoseconds since the UNIX epoch
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_nanos(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => since.as_nanos() as i64,
            Err(before) => -(before.duration().as_nanos() as i64),
        }
    }
}

/// Manually advanced clock
///
/// Clones share the same underlying time, so a test can hand one clone to a
/// store and keep another to move time forward.
///
/// # Example
/// ```
/// use timerlog::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(100);
/// let handle = clock.clone();
/// handle.advance(50);
/// assert_eq!(clock.now_nanos(), 150);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start)),
        }
    }

    pub fn set(&self, nanos: i64) {
        self.now.store(nanos, Ordering::SeqCst);
    }

    pub fn advance(&self, nanos: i64) {
        self.now.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_epoch_and_non_decreasing() {
        let clock = SystemClock;
        let a = clock.now_nanos();
        let b = clock.now_nanos();
        assert!(a > 0);
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_set_and_advance() {
        let clock = ManualClock::new(0);
        clock.set(1_000);
        clock.advance(-10);
        assert_eq!(clock.now_nanos(), 990);
    }
}
