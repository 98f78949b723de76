//! Wall-clock accounting of the propagation loop.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Accumulated time of one named operation.
#[derive(Debug, Clone, Serialize)]
pub struct TimingEntry {
    pub name: &'static str,
    pub total: Duration,
    pub calls: u64,
}

impl TimingEntry {
    pub fn mean(&self) -> Duration {
        if self.calls == 0 {
            Duration::ZERO
        } else {
            self.total / self.calls as u32
        }
    }
}

/// Per-operation timings, in order of first use.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Timings {
    entries: Vec<TimingEntry>,
}

impl Timings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f`, charging its wall-clock time to `name`.
    pub fn measure<T>(&mut self, name: &'static str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.record(name, start.elapsed());
        out
    }

    pub fn record(&mut self, name: &'static str, elapsed: Duration) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                entry.total += elapsed;
                entry.calls += 1;
            }
            None => self.entries.push(TimingEntry {
                name,
                total: elapsed,
                calls: 1,
            }),
        }
    }

    pub fn entries(&self) -> &[TimingEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&TimingEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn total(&self) -> Duration {
        self.entries.iter().map(|e| e.total).sum()
    }

    /// Human-readable table of totals, call counts and means.
    pub fn report(&self) -> String {
        let total = self.total().as_secs_f64();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<24} {:>12} {:>8} {:>12} {:>7}",
            "operation", "total, s", "calls", "mean, s", "share"
        );
        for entry in &self.entries {
            let secs = entry.total.as_secs_f64();
            let share = if total > 0.0 { 100.0 * secs / total } else { 0.0 };
            let _ = writeln!(
                out,
                "{:<24} {:>12.4e} {:>8} {:>12.4e} {:>6.1}%",
                entry.name,
                secs,
                entry.calls,
                entry.mean().as_secs_f64(),
                share
            );
        }
        let _ = writeln!(out, "{:<24} {:>12.4e}", "total", total);
        out
    }
}
