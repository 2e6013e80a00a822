//! Outcome statistics subsystem.
//!
//! # Data Flow
//! ```text
//! request handler
//!     → OutcomeSink::record (atomic increment + metrics facade)
//!
//! stats listener (separate port)
//!     → OutcomeCounters::snapshot
//!     → "key: value" lines, connection closed
//! ```
//!
//! # Design Decisions
//! - Handler depends on the `OutcomeSink` trait, not on the counters type
//! - Counters live as long as the process; only a restart resets them
//! - Listener is serial: one snapshot per connection, no request parsing

pub mod counters;
pub mod listener;

pub use counters::{OutcomeCounters, OutcomeSink, SnapshotParseError, StatsSnapshot};
pub use listener::StatsServer;
