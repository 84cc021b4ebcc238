//! Event queue - min-heap keyed on `(time, sequence)`
//!
//! # Keying
//!
//! The heap is keyed explicitly on `(time, seq)` where `seq` is a
//! monotonically increasing counter assigned at push. Two consequences:
//!
//! - Events sharing a timestamp pop in FIFO push order, which makes replay
//!   deterministic (batch arrivals at the same instant are common).
//! - Events themselves are never compared, so they need no ordering traits.
//!
//! Times are ordered with `f64::total_cmp`; non-finite times are rejected
//! upstream at `schedule()`, so the total order here is the plain numeric one.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::models::event::Event;

/// A scheduled entry: the heap key plus the event it carries.
pub(crate) struct QueueEntry<V: 'static> {
    pub time: f64,
    pub seq: u64,
    pub event: Event<V>,
}

impl<V: 'static> PartialEq for QueueEntry<V> {
    fn eq(&self, other: &Self) -> bool {
        self.time.total_cmp(&other.time).is_eq() && self.seq == other.seq
    }
}

impl<V: 'static> Eq for QueueEntry<V> {}

impl<V: 'static> PartialOrd for QueueEntry<V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<V: 'static> Ord for QueueEntry<V> {
    // Reversed so the max-heap pops the smallest (time, seq) first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue of scheduled events. O(log n) push and pop.
pub(crate) struct EventQueue<V: 'static> {
    heap: BinaryHeap<QueueEntry<V>>,
    next_seq: u64,
}

impl<V: 'static> EventQueue<V> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Insert an event, assigning it the next sequence number.
    pub fn push(&mut self, event: Event<V>) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueueEntry {
            time: event.time(),
            seq,
            event,
        });
        seq
    }

    /// Remove and return the earliest `(time, seq)` entry.
    pub fn pop(&mut self) -> Option<QueueEntry<V>> {
        self.heap.pop()
    }

    /// Time of the next entry without removing it.
    pub fn peek_time(&self) -> Option<f64> {
        self.heap.peek().map(|entry| entry.time)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
