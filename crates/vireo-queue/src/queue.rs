//! The per-agent event mailbox.
//!
//! An [`EventQueue`] is an ordered, unbounded sequence of entries: opaque
//! event envelopes interleaved with marker sentinels inserted at
//! (re)registration time. Draining is strictly FIFO and stops at the
//! first marker, so a single poll response never spans more than one
//! registration epoch.
//!
//! # Replacement semantics
//!
//! [`EventQueue::drain_epoch`] consumes the queue by value and hands back
//! the undrained remainder as a brand-new successor queue. The drained
//! queue object is never mutated afterwards, so no code path holding a
//! snapshot of it can observe post-drain changes, and leftover markers
//! from stacked re-registrations survive for the next drain.

use std::collections::VecDeque;

use vireo_types::EventEnvelope;

/// A single entry in an agent's event queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEntry {
    /// An opaque event payload awaiting delivery.
    Event(EventEnvelope),

    /// Response-boundary sentinel inserted at (re)registration time.
    Marker,
}

/// Ordered, unbounded mailbox of pending events for one agent.
///
/// Producers never block: [`EventQueue::enqueue`] always succeeds and the
/// queue grows without bound. Backpressure is explicitly not part of the
/// protocol.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventQueue {
    entries: VecDeque<QueueEntry>,
}

/// Result of draining one registration epoch from a queue.
#[derive(Debug)]
pub struct DrainOutcome {
    /// Events removed from the front, in enqueue order.
    pub events: Vec<EventEnvelope>,

    /// Whether the drain stopped at (and consumed) a marker.
    pub hit_marker: bool,

    /// Successor queue holding everything after the consumed marker.
    pub rest: EventQueue,
}

impl EventQueue {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Append an event entry. Never fails, never blocks.
    pub fn enqueue(&mut self, envelope: EventEnvelope) {
        self.entries.push_back(QueueEntry::Event(envelope));
    }

    /// Append a marker sentinel.
    pub fn enqueue_marker(&mut self) {
        self.entries.push_back(QueueEntry::Marker);
    }

    /// Whether the queue holds no entries at all (events or markers).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries currently queued, markers included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drain all events up to and including the first marker.
    ///
    /// The marker is consumed but not returned in `events`. If the queue
    /// holds no marker the whole queue is drained and `hit_marker` is
    /// `false`. The remainder past the marker is returned as a new
    /// successor queue.
    pub fn drain_epoch(mut self) -> DrainOutcome {
        let mut events = Vec::new();
        let mut hit_marker = false;

        while let Some(entry) = self.entries.pop_front() {
            match entry {
                QueueEntry::Event(envelope) => events.push(envelope),
                QueueEntry::Marker => {
                    hit_marker = true;
                    break;
                }
            }
        }

        DrainOutcome {
            events,
            hit_marker,
            rest: Self {
                entries: self.entries,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(n: u64) -> EventEnvelope {
        EventEnvelope::new("TestEvent", json!({ "seq": n }))
    }

    #[test]
    fn drain_without_marker_returns_everything_in_order() {
        let mut queue = EventQueue::new();
        queue.enqueue(event(1));
        queue.enqueue(event(2));
        queue.enqueue(event(3));

        let outcome = queue.drain_epoch();
        assert_eq!(outcome.events, vec![event(1), event(2), event(3)]);
        assert!(!outcome.hit_marker);
        assert!(outcome.rest.is_empty());
    }

    #[test]
    fn drain_stops_at_first_marker() {
        let mut queue = EventQueue::new();
        queue.enqueue(event(1));
        queue.enqueue_marker();
        queue.enqueue(event(2));

        let outcome = queue.drain_epoch();
        assert_eq!(outcome.events, vec![event(1)]);
        assert!(outcome.hit_marker);
        // The post-marker remainder survives in the successor queue.
        assert_eq!(outcome.rest.len(), 1);
    }

    #[test]
    fn marker_at_front_yields_empty_batch() {
        let mut queue = EventQueue::new();
        queue.enqueue_marker();
        queue.enqueue(event(1));

        let outcome = queue.drain_epoch();
        assert!(outcome.events.is_empty());
        assert!(outcome.hit_marker);
        assert_eq!(outcome.rest.len(), 1);
    }

    #[test]
    fn drain_of_empty_queue_is_empty() {
        let outcome = EventQueue::new().drain_epoch();
        assert!(outcome.events.is_empty());
        assert!(!outcome.hit_marker);
        assert!(outcome.rest.is_empty());
    }

    #[test]
    fn enqueue_then_drain_roundtrip_leaves_queue_empty() {
        let mut queue = EventQueue::new();
        queue.enqueue(event(7));

        let outcome = queue.drain_epoch();
        assert_eq!(outcome.events, vec![event(7)]);
        assert!(!outcome.hit_marker);
        assert!(outcome.rest.is_empty());
    }

    #[test]
    fn stacked_markers_drain_one_epoch_at_a_time() {
        let mut queue = EventQueue::new();
        queue.enqueue(event(1));
        queue.enqueue_marker();
        queue.enqueue_marker();

        let first = queue.drain_epoch();
        assert_eq!(first.events, vec![event(1)]);
        assert!(first.hit_marker);

        let second = first.rest.drain_epoch();
        assert!(second.events.is_empty());
        assert!(second.hit_marker);
        assert!(second.rest.is_empty());
    }
}
