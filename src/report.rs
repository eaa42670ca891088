//! Summaries of reconstructed timer durations
//!
//! Turns a [`DeltaReport`] into per-timer statistics and renders them either
//! as an strace-style text table or as JSON.

use crate::deltas::{DeltaAnomaly, DeltaReport};
use serde::Serialize;
use std::fmt::Write as _;

/// Statistics for one timer's durations (nanoseconds)
///
/// Totals are kept as `i128` so summing many large durations cannot overflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerStats {
    pub name: String,
    pub count: usize,
    pub total_ns: i128,
    pub min_ns: i64,
    pub max_ns: i64,
    pub mean_ns: f64,
    /// Individual durations in start order
    pub deltas: Vec<i64>,
}

impl TimerStats {
    /// Compute statistics, or `None` for an empty duration list
    pub fn from_deltas(name: &str, deltas: &[i64]) -> Option<Self> {
        let min_ns = *deltas.iter().min()?;
        let max_ns = *deltas.iter().max()?;
        let total_ns: i128 = deltas.iter().map(|&d| i128::from(d)).sum();
        Some(Self {
            name: name.to_string(),
            count: deltas.len(),
            total_ns,
            min_ns,
            max_ns,
            mean_ns: total_ns as f64 / deltas.len() as f64,
            deltas: deltas.to_vec(),
        })
    }
}

/// A timer excluded from the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyEntry {
    pub timer: String,
    pub anomaly: DeltaAnomaly,
    pub message: String,
}

/// Report over every decoded timer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimingReport {
    /// Sorted by total time, descending, then by name
    pub timers: Vec<TimerStats>,
    /// Sorted by timer name
    pub anomalies: Vec<AnomalyEntry>,
}

impl TimingReport {
    pub fn from_deltas(report: &DeltaReport) -> Self {
        let mut timers: Vec<TimerStats> = report
            .deltas
            .iter()
            .filter_map(|(name, deltas)| TimerStats::from_deltas(name, deltas))
            .collect();
        timers.sort_by(|a, b| b.total_ns.cmp(&a.total_ns).then_with(|| a.name.cmp(&b.name)));

        let anomalies = report
            .anomalies
            .iter()
            .map(|(timer, anomaly)| AnomalyEntry {
                timer: timer.clone(),
                anomaly: *anomaly,
                message: format!("Timer {} {}", timer, anomaly),
            })
            .collect();

        Self { timers, anomalies }
    }

    pub fn total_ns(&self) -> i128 {
        self.timers.iter().map(|t| t.total_ns).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Render an strace-style summary table
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        if self.timers.is_empty() {
            out.push_str("No complete timers.\n");
        } else {
            let total = self.total_ns();
            let _ = writeln!(
                out,
                "% time     seconds   nsecs/call   calls     min ns     max ns timer"
            );
            let _ = writeln!(
                out,
                "------ ----------- ------------ ------- ---------- ---------- ----------------"
            );
            for t in &self.timers {
                let percent = if total > 0 {
                    t.total_ns as f64 / total as f64 * 100.0
                } else {
                    0.0
                };
                let _ = writeln!(
                    out,
                    "{:6.2} {:>11.6} {:>12.0} {:>7} {:>10} {:>10} {}",
                    percent,
                    t.total_ns as f64 / 1e9,
                    t.mean_ns,
                    t.count,
                    t.min_ns,
                    t.max_ns,
                    t.name
                );
            }
            let _ = writeln!(
                out,
                "------ ----------- ------------ ------- ---------- ---------- ----------------"
            );
            let calls: usize = self.timers.iter().map(|t| t.count).sum();
            let _ = writeln!(
                out,
                "100.00 {:>11.6} {:>12} {:>7} {:>10} {:>10} total",
                total as f64 / 1e9,
                "",
                calls,
                "",
                ""
            );
        }

        if !self.anomalies.is_empty() {
            let _ = writeln!(out, "\nExcluded timers:");
            for entry in &self.anomalies {
                let _ = writeln!(out, "  {}", entry.message);
            }
        }

        out
    }
}
