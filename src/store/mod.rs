//! Bounded, time-windowed in-memory event store.
//!
//! This is the heart of the collector: an insertion-ordered buffer of
//! [`MetricEvent`]s with a hard capacity cap (FIFO eviction) and a retention
//! window (front-pruning). Total memory is bounded by
//! `capacity * size_of::<MetricEvent>()` regardless of ingestion rate.
//!
//! The store is a best-effort telemetry sink: it never returns an error for
//! well-formed input and silently drops events beyond capacity, preferring
//! recency over completeness.

use crate::core::types::{now_millis, MetricEvent};
use parking_lot::Mutex;
use std::time::Duration;

/// Shared, mutex-guarded buffer of recent metric events.
///
/// Constructed once at the composition root and cloned via `Arc` into
/// request handlers; concurrent `add`/`prune`/`data_within` calls serialize
/// on a single lock. No operation performs I/O, so hold times are bounded by
/// O(capacity) slice work.
pub struct RumStore {
    events: Mutex<Vec<MetricEvent>>,
    capacity: usize,
    retention: Duration,
}

impl RumStore {
    /// Create an empty store with the given capacity cap and retention
    /// window.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; config validation rejects that before
    /// construction.
    pub fn new(capacity: usize, retention: Duration) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        Self {
            events: Mutex::new(Vec::with_capacity(capacity.min(1024))),
            capacity,
            retention,
        }
    }

    /// Append one sanitized event.
    ///
    /// The timestamp is clamped to not exceed "now" (the sanitizer already
    /// does this for client-supplied timestamps; clamping again here keeps
    /// the store's window invariant independent of its callers). If the
    /// buffer exceeds capacity after insertion, the oldest excess entries
    /// are dropped, then expired events are pruned.
    pub fn add(&self, mut event: MetricEvent) {
        let now = now_millis();
        event.timestamp = event.timestamp.min(now);

        let mut events = self.events.lock();
        events.push(event);

        if events.len() > self.capacity {
            let excess = events.len() - self.capacity;
            events.drain(..excess);
        }

        Self::prune_locked(&mut events, now, self.retention);
    }

    /// Append each event in input order.
    ///
    /// Events are independently kept; a dropped element (the sanitizer's
    /// concern, upstream of this call) never aborts the rest of the batch.
    /// Returns the number of events appended.
    pub fn add_many(&self, events: Vec<MetricEvent>) -> usize {
        let count = events.len();
        for event in events {
            self.add(event);
        }
        count
    }

    /// Remove events older than `now - retention`.
    pub fn prune(&self) {
        let mut events = self.events.lock();
        Self::prune_locked(&mut events, now_millis(), self.retention);
    }

    /// Snapshot of all retained events with `timestamp >= now - window`.
    ///
    /// Returns an owned copy; callers can never mutate the internal buffer.
    pub fn data_within(&self, window: Duration) -> Vec<MetricEvent> {
        let cutoff = now_millis().saturating_sub(window.as_millis() as u64);
        let events = self.events.lock();
        events.iter().filter(|e| e.timestamp >= cutoff).cloned().collect()
    }

    /// Number of events currently retained.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// True when no events are retained.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity cap.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retention window.
    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Drop the expired prefix of the buffer.
    ///
    /// Finds the first index still inside the window and drains everything
    /// before it, relying on insertion order correlating with timestamp
    /// order. Client-supplied (clamped) timestamps are not strictly
    /// monotonic with insertion, so an out-of-order straggler behind the
    /// first in-window event can outlive the window; this is an accepted
    /// approximation — the capacity cap still bounds memory.
    fn prune_locked(events: &mut Vec<MetricEvent>, now: u64, retention: Duration) {
        let cutoff = now.saturating_sub(retention.as_millis() as u64);
        match events.iter().position(|e| e.timestamp >= cutoff) {
            Some(0) => {},
            Some(idx) => {
                events.drain(..idx);
            },
            None => events.clear(),
        }
    }
}
