//! Fired-event records for replay, auditing, and testing.
//!
//! The scheduler's run loop has no observable output besides action side
//! effects, so every pop produces a [`FiredEvent`] record handed to the
//! observer callback (see `run_with_observer`). [`Trace`] is the standard
//! collector: an append-only log with query helpers, serializable so two
//! runs can be compared byte-for-byte for deterministic-replay checks.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::event::Context;

/// Record of one popped event.
///
/// Produced for every pop, including deactivated events (which carry no log
/// entry). The sequence number makes the total firing order auditable even
/// among equal timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiredEvent<V = Value> {
    /// The event's own scheduled time (its literal value, never clamped)
    pub time: f64,

    /// Sequence number assigned at `schedule()` time
    pub seq: u64,

    /// What the action returned, if the event was active and chose to log
    pub log_entry: Option<V>,

    /// The event's context as left by the action
    pub context: Context<V>,
}

/// Append-only log of fired events.
///
/// # Example
/// ```
/// use des_core::{FiredEvent, Trace};
/// use serde_json::{json, Value};
/// use std::collections::HashMap;
///
/// let mut trace: Trace<Value> = Trace::new();
/// trace.record(FiredEvent {
///     time: 2.0,
///     seq: 0,
///     log_entry: Some(json!("arrival")),
///     context: HashMap::new(),
/// });
///
/// assert_eq!(trace.len(), 1);
/// assert_eq!(trace.entries_at_time(2.0).len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace<V = Value> {
    entries: Vec<FiredEvent<V>>,
}

impl<V> Trace<V> {
    /// Create an empty trace.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a fired-event record.
    pub fn record(&mut self, fired: FiredEvent<V>) {
        self.entries.push(fired);
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the trace is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, in firing order.
    pub fn entries(&self) -> &[FiredEvent<V>] {
        &self.entries
    }

    /// Entries that fired at exactly `time`.
    pub fn entries_at_time(&self, time: f64) -> Vec<&FiredEvent<V>> {
        self.entries
            .iter()
            .filter(|e| e.time.total_cmp(&time).is_eq())
            .collect()
    }

    /// Entries whose action produced a log entry.
    pub fn entries_with_log(&self) -> Vec<&FiredEvent<V>> {
        self.entries
            .iter()
            .filter(|e| e.log_entry.is_some())
            .collect()
    }

    /// The log entries alone, in firing order, skipping silent events.
    pub fn log_entries(&self) -> Vec<&V> {
        self.entries
            .iter()
            .filter_map(|e| e.log_entry.as_ref())
            .collect()
    }

    /// Firing times in order, one per entry.
    pub fn times(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.time).collect()
    }

    /// An observer closure that records into this trace.
    ///
    /// Plugs directly into `run_with_observer` / `drain_with_observer`.
    pub fn observer(&mut self) -> impl FnMut(FiredEvent<V>) + '_ {
        move |fired| self.record(fired)
    }

    /// Discard all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<V> Default for Trace<V> {
    fn default() -> Self {
        Self::new()
    }
}
