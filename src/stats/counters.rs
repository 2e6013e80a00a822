//! Per-outcome request counters.
//!
//! # Responsibilities
//! - Count callback outcomes with lock-free atomics
//! - Produce point-in-time snapshots for the stats listener
//! - Mirror every increment into the metrics facade

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::jsonp::ValidationOutcome;
use crate::observability::metrics;

/// Sink the request handler reports outcomes to.
pub trait OutcomeSink: Send + Sync {
    fn record(&self, outcome: ValidationOutcome);
}

/// Monotonic counters, one per outcome, plus process start time for uptime.
#[derive(Debug)]
pub struct OutcomeCounters {
    started: Instant,
    ok: AtomicU64,
    empty: AtomicU64,
    too_long: AtomicU64,
    reserved: AtomicU64,
    invalid: AtomicU64,
}

impl OutcomeCounters {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            ok: AtomicU64::new(0),
            empty: AtomicU64::new(0),
            too_long: AtomicU64::new(0),
            reserved: AtomicU64::new(0),
            invalid: AtomicU64::new(0),
        }
    }

    fn counter(&self, outcome: ValidationOutcome) -> &AtomicU64 {
        match outcome {
            ValidationOutcome::Valid => &self.ok,
            ValidationOutcome::Empty => &self.empty,
            ValidationOutcome::TooLong => &self.too_long,
            ValidationOutcome::Reserved => &self.reserved,
            ValidationOutcome::Invalid => &self.invalid,
        }
    }

    /// Current value for a single outcome.
    pub fn get(&self, outcome: ValidationOutcome) -> u64 {
        self.counter(outcome).load(Ordering::Relaxed)
    }

    /// Read every counter. Individual loads are not taken atomically together.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime_secs: self.started.elapsed().as_secs(),
            ok: self.get(ValidationOutcome::Valid),
            e_empty: self.get(ValidationOutcome::Empty),
            e_toolong: self.get(ValidationOutcome::TooLong),
            e_reserved: self.get(ValidationOutcome::Reserved),
            e_invalid: self.get(ValidationOutcome::Invalid),
        }
    }
}

impl Default for OutcomeCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeSink for OutcomeCounters {
    fn record(&self, outcome: ValidationOutcome) {
        self.counter(outcome).fetch_add(1, Ordering::Relaxed);
        metrics::record_outcome(outcome);
    }
}

/// Counter values at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    #[serde(rename = "uptime")]
    pub uptime_secs: u64,
    pub ok: u64,
    pub e_empty: u64,
    pub e_toolong: u64,
    pub e_reserved: u64,
    pub e_invalid: u64,
}

impl StatsSnapshot {
    fn entries(&self) -> [(&'static str, u64); 6] {
        [
            ("uptime", self.uptime_secs),
            ("ok", self.ok),
            ("e_empty", self.e_empty),
            ("e_toolong", self.e_toolong),
            ("e_reserved", self.e_reserved),
            ("e_invalid", self.e_invalid),
        ]
    }
}

/// Renders the `key: value` lines written by the stats listener.
impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.entries() {
            writeln!(f, "{}: {}", key, value)?;
        }
        Ok(())
    }
}

/// Error parsing the stats listener's text output.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotParseError {
    #[error("malformed line: {0:?}")]
    MalformedLine(String),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("missing key: {0}")]
    MissingKey(&'static str),
}

impl FromStr for StatsSnapshot {
    type Err = SnapshotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut values = HashMap::new();
        for line in s.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (key, value) = line
                .split_once(':')
                .ok_or_else(|| SnapshotParseError::MalformedLine(line.to_string()))?;
            let (key, value) = (key.trim(), value.trim());
            let parsed = value.parse::<u64>().map_err(|_| SnapshotParseError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            })?;
            values.insert(key.to_string(), parsed);
        }

        let take = |key: &'static str| values.get(key).copied().ok_or(SnapshotParseError::MissingKey(key));

        Ok(Self {
            uptime_secs: take("uptime")?,
            ok: take("ok")?,
            e_empty: take("e_empty")?,
            e_toolong: take("e_toolong")?,
            e_reserved: take("e_reserved")?,
            e_invalid: take("e_invalid")?,
        })
    }
}
