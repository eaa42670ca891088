//! Reconstruction of timer durations from decoded start/end sequences
//!
//! Each name is validated on its own. The `i`-th start is paired with the
//! `i`-th end, and the name contributes durations only if every pair passes:
//!
//! ```text
//! starts: [10, 50]
//! ends:   [20, 80]
//!
//! pair 0: 10 ≤ 20                      → 10
//! pair 1: 50 ≤ 80, 50 ≥ ends[0] = 20   → 30
//! ```
//!
//! A name that fails any rule is dropped entirely and reported as a
//! [`DeltaAnomaly`]. One bad name never affects the others.

use crate::error::{self, TimerError};
use crate::summary::{SummaryMap, TimerSummary};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Why a timer's durations could not be reconstructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeltaAnomaly {
    /// End events but no start events
    NeverStarted,
    /// Start events but no end events
    NeverEnded,
    /// Different number of starts and ends
    UnequalCounts { starts: usize, ends: usize },
    /// `ends[index]` is earlier than `starts[index]`
    EndPrecedesStart { index: usize },
    /// `starts[index]` is earlier than `ends[index - 1]`
    StartedTwice { index: usize },
    /// `ends[index] - starts[index]` does not fit in an `i64`
    DurationOverflow { index: usize },
}

impl fmt::Display for DeltaAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeltaAnomaly::NeverStarted => write!(f, "was ended but never started"),
            DeltaAnomaly::NeverEnded => write!(f, "was started but never ended"),
            DeltaAnomaly::UnequalCounts { starts, ends } => write!(
                f,
                "has a different number of starts ({}) than ends ({})",
                starts, ends
            ),
            DeltaAnomaly::EndPrecedesStart { index } => {
                write!(f, "has an end time preceding its start time (pair {})", index)
            }
            DeltaAnomaly::StartedTwice { index } => write!(
                f,
                "was started twice without being ended in between (pair {})",
                index
            ),
            DeltaAnomaly::DurationOverflow { index } => write!(
                f,
                "has a duration too large to represent (pair {})",
                index
            ),
        }
    }
}

/// Elapsed time of a single-shot timer from the simple stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "nanos", rename_all = "snake_case")]
pub enum TimerDelta {
    /// End minus start; may be negative if the clock stepped backwards
    Elapsed(i64),
    NeverStarted,
    /// Started but no end recorded yet
    NeverEnded,
}

impl TimerDelta {
    /// `end - start` for the timer `name`
    pub(crate) fn between(name: &str, start: i64, end: i64) -> error::Result<Self> {
        elapsed_nanos(name, start, end).map(TimerDelta::Elapsed)
    }

    pub fn elapsed(self) -> Option<i64> {
        match self {
            TimerDelta::Elapsed(nanos) => Some(nanos),
            _ => None,
        }
    }
}

impl fmt::Display for TimerDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerDelta::Elapsed(nanos) => write!(f, "{}", nanos),
            TimerDelta::NeverStarted => write!(f, "never started"),
            TimerDelta::NeverEnded => write!(f, "never ended"),
        }
    }
}

/// `end - start`, or [`TimerError::Overflow`] if the difference leaves `i64`
pub(crate) fn elapsed_nanos(name: &str, start: i64, end: i64) -> error::Result<i64> {
    end.checked_sub(start)
        .ok_or_else(|| TimerError::Overflow(name.to_string()))
}

/// Output of [`reconstruct`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeltaReport {
    /// Durations per name, index-aligned with the start order
    pub deltas: HashMap<String, Vec<i64>>,
    /// Names that were dropped, sorted by name
    pub anomalies: Vec<(String, DeltaAnomaly)>,
}

impl DeltaReport {
    pub fn anomaly_for(&self, name: &str) -> Option<DeltaAnomaly> {
        self.anomalies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, anomaly)| *anomaly)
    }

    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }
}

/// Pair one timer's starts and ends into durations
pub fn timer_deltas(summary: &TimerSummary) -> Result<Vec<i64>, DeltaAnomaly> {
    let TimerSummary { starts, ends } = summary;

    if starts.is_empty() {
        return Err(DeltaAnomaly::NeverStarted);
    }
    if ends.is_empty() {
        return Err(DeltaAnomaly::NeverEnded);
    }
    if starts.len() != ends.len() {
        return Err(DeltaAnomaly::UnequalCounts {
            starts: starts.len(),
            ends: ends.len(),
        });
    }

    starts
        .iter()
        .zip(ends)
        .enumerate()
        .map(|(index, (&start, &end))| {
            if start > end {
                return Err(DeltaAnomaly::EndPrecedesStart { index });
            }
            // A start exactly at the previous end is back-to-back, not overlapping
            if index > 0 && start < ends[index - 1] {
                return Err(DeltaAnomaly::StartedTwice { index });
            }
            end.checked_sub(start)
                .ok_or(DeltaAnomaly::DurationOverflow { index })
        })
        .collect()
}

/// Reconstruct durations for every timer in the map
///
/// Each anomaly is also logged at WARN level.
///
/// # Example
/// ```
/// use timerlog::deltas::reconstruct;
/// use timerlog::summary::SummaryMap;
///
/// let mut map = SummaryMap::new();
/// map.record_start("T", 10);
/// map.record_end("T", 20);
/// map.record_start("T", 50);
/// map.record_end("T", 80);
///
/// let report = reconstruct(&map);
/// assert_eq!(report.deltas["T"], vec![10, 30]);
/// assert!(report.is_clean());
/// ```
pub fn reconstruct(map: &SummaryMap) -> DeltaReport {
    let mut report = DeltaReport::default();

    for (name, summary) in map {
        match timer_deltas(summary) {
            Ok(deltas) => {
                report.deltas.insert(name.clone(), deltas);
            }
            Err(anomaly) => {
                tracing::warn!("Timer {} {}", name, anomaly);
                report.anomalies.push((name.clone(), anomaly));
            }
        }
    }

    report.anomalies.sort_by(|a, b| a.0.cmp(&b.0));
    report
}
