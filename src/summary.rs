//! Per-name accumulation of start and end timestamps

use crate::event::{EventKind, TimerEvent};
use std::collections::hash_map::{self, HashMap};

/// Start and end timestamps recorded for one timer name, in encounter order
///
/// Within a single monotonic writer encounter order is chronological. When
/// several logs are merged it is only chronological per source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerSummary {
    pub starts: Vec<i64>,
    pub ends: Vec<i64>,
}

impl TimerSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of recorded events
    pub fn event_count(&self) -> usize {
        self.starts.len() + self.ends.len()
    }
}

/// Mapping from timer name to its [`TimerSummary`]
///
/// Iteration order over names is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryMap {
    timers: HashMap<String, TimerSummary>,
}

impl SummaryMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, name: &str) -> &mut TimerSummary {
        self.timers.entry(name.to_string()).or_default()
    }

    pub fn record_start(&mut self, name: &str, timestamp: i64) {
        self.entry(name).starts.push(timestamp);
    }

    pub fn record_end(&mut self, name: &str, timestamp: i64) {
        self.entry(name).ends.push(timestamp);
    }

    /// Fold a decoded event into the map
    pub fn record(&mut self, event: &TimerEvent) {
        match event.kind {
            EventKind::Start => self.record_start(&event.name, event.timestamp),
            EventKind::End => self.record_end(&event.name, event.timestamp),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TimerSummary> {
        self.timers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.timers.contains_key(name)
    }

    /// Number of distinct timer names
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Total number of events across all names
    pub fn event_count(&self) -> usize {
        self.timers.values().map(TimerSummary::event_count).sum()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, TimerSummary> {
        self.timers.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.timers.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a SummaryMap {
    type Item = (&'a String, &'a TimerSummary);
    type IntoIter = hash_map::Iter<'a, String, TimerSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.timers.iter()
    }
}

impl FromIterator<(String, TimerSummary)> for SummaryMap {
    fn from_iter<I: IntoIterator<Item = (String, TimerSummary)>>(iter: I) -> Self {
        Self {
            timers: iter.into_iter().collect(),
        }
    }
}

impl From<HashMap<String, TimerSummary>> for SummaryMap {
    fn from(timers: HashMap<String, TimerSummary>) -> Self {
        Self { timers }
    }
}
