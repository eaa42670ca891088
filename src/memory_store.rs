//! In-process table of single-shot timers
//!
//! Each name holds at most one start and one end timestamp. Calling an
//! operation against a timer in the wrong state returns a misuse error
//! (see [`TimerError::is_misuse`]) and leaves the table unchanged.

use crate::clock::{Clock, SystemClock};
use crate::deltas::{elapsed_nanos, TimerDelta};
use crate::error::{Result, TimerError};
use std::collections::HashMap;

/// In-memory timer table
#[derive(Debug, Default)]
pub struct MemoryTimers<C: Clock = SystemClock> {
    clock: C,
    starts: HashMap<String, i64>,
    ends: HashMap<String, i64>,
}

impl MemoryTimers<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> MemoryTimers<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            starts: HashMap::new(),
            ends: HashMap::new(),
        }
    }

    /// Start a timer
    ///
    /// # Errors
    ///
    /// [`TimerError::AlreadyRunning`] if the timer was started and not deleted.
    pub fn start(&mut self, name: &str) -> Result<()> {
        if self.starts.contains_key(name) {
            return Err(TimerError::AlreadyRunning(name.to_string()));
        }
        self.starts.insert(name.to_string(), self.clock.now_nanos());
        Ok(())
    }

    /// End a running timer
    ///
    /// # Errors
    ///
    /// [`TimerError::NotRunning`] if the timer was never started,
    /// [`TimerError::AlreadyEnded`] if an end is already recorded.
    pub fn end(&mut self, name: &str) -> Result<()> {
        if !self.starts.contains_key(name) {
            return Err(TimerError::NotRunning(name.to_string()));
        }
        if self.ends.contains_key(name) {
            return Err(TimerError::AlreadyEnded(name.to_string()));
        }
        self.ends.insert(name.to_string(), self.clock.now_nanos());
        Ok(())
    }

    /// Elapsed time between start and end
    ///
    /// # Errors
    ///
    /// [`TimerError::Overflow`] if the difference does not fit in an `i64`.
    ///
    /// # Example
    /// ```
    /// use timerlog::clock::ManualClock;
    /// use timerlog::deltas::TimerDelta;
    /// use timerlog::memory_store::MemoryTimers;
    ///
    /// let clock = ManualClock::new(0);
    /// let mut timers = MemoryTimers::with_clock(clock.clone());
    /// assert_eq!(timers.delta("parse").unwrap(), TimerDelta::NeverStarted);
    ///
    /// timers.start("parse").unwrap();
    /// assert_eq!(timers.delta("parse").unwrap(), TimerDelta::NeverEnded);
    ///
    /// clock.advance(1_500);
    /// timers.end("parse").unwrap();
    /// assert_eq!(timers.delta("parse").unwrap(), TimerDelta::Elapsed(1_500));
    /// ```
    pub fn delta(&self, name: &str) -> Result<TimerDelta> {
        match (self.starts.get(name), self.ends.get(name)) {
            (None, _) => Ok(TimerDelta::NeverStarted),
            (Some(_), None) => Ok(TimerDelta::NeverEnded),
            (Some(&start), Some(&end)) => TimerDelta::between(name, start, end),
        }
    }

    /// Restart a timer, returning the time elapsed since its previous start
    ///
    /// Any recorded end is cleared so the timer is running again.
    pub fn reset(&mut self, name: &str) -> Result<i64> {
        let now = self.clock.now_nanos();
        let start = self
            .starts
            .get_mut(name)
            .ok_or_else(|| TimerError::NotRunning(name.to_string()))?;
        let elapsed = elapsed_nanos(name, *start, now)?;
        *start = now;
        self.ends.remove(name);
        Ok(elapsed)
    }

    /// Time elapsed since the timer was started
    pub fn poll(&self, name: &str) -> Result<i64> {
        let start = self
            .starts
            .get(name)
            .ok_or_else(|| TimerError::NotRunning(name.to_string()))?;
        elapsed_nanos(name, *start, self.clock.now_nanos())
    }

    /// Forget a timer's start and end
    pub fn delete(&mut self, name: &str) -> Result<()> {
        if self.starts.remove(name).is_none() {
            return Err(TimerError::NotRunning(name.to_string()));
        }
        self.ends.remove(name);
        Ok(())
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.starts.contains_key(name) && !self.ends.contains_key(name)
    }

    /// Number of timers that have been started
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}
