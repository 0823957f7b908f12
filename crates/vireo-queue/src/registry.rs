//! Agent to queue/capability/counter mapping.
//!
//! The registry exclusively owns the three pieces of per-agent state:
//! the event queue, the capability token binding, and (through the owned
//! [`ResponseSequencer`]) the response counter. Each map sits behind its
//! own mutex and the locks are never nested, so there is no lock-ordering
//! hazard and no lock is held across the drain-then-stamp sequence.
//!
//! Everything here is non-throwing: a drain racing an unregistration
//! resolves to "no events", and an enqueue for an unknown agent is logged
//! and dropped (fire-and-forget, no retry, no backpressure).

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};
use vireo_types::{AgentId, CapabilityId, EventEnvelope};

use crate::config::QueueConfig;
use crate::queue::EventQueue;
use crate::sequencer::ResponseSequencer;

/// Bidirectional agent/capability binding table.
#[derive(Debug, Default)]
struct CapabilityTable {
    by_agent: HashMap<AgentId, CapabilityId>,
    by_capability: HashMap<CapabilityId, AgentId>,
}

impl CapabilityTable {
    /// Reuse the existing binding for `agent` or mint a fresh token.
    fn bind(&mut self, agent: AgentId) -> CapabilityId {
        if let Some(existing) = self.by_agent.get(&agent) {
            return *existing;
        }

        let capability = CapabilityId::random();
        self.by_agent.insert(agent, capability);
        self.by_capability.insert(capability, agent);
        capability
    }

    fn unbind(&mut self, agent: AgentId) {
        if let Some(capability) = self.by_agent.remove(&agent) {
            self.by_capability.remove(&capability);
        }
    }
}

/// One drained poll batch, stamped with its response id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainedBatch {
    /// Drained events in enqueue order. Empty when the drain consumed
    /// only a marker.
    pub events: Vec<EventEnvelope>,

    /// Response id to tag a non-empty batch with.
    pub response_id: i64,

    /// Whether the agent was in id-recovery mode at drain time.
    pub recovering: bool,
}

/// Point-in-time view of one agent's queue for the debug surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct QueueSummary {
    /// The agent owning the queue.
    pub agent: AgentId,

    /// Whether the queue currently holds any entries.
    pub is_empty: bool,

    /// Entry count at the time of the snapshot, markers included.
    pub queued: usize,
}

/// Registry mapping each agent to its event queue, poll capability, and
/// response counter.
///
/// Safe under concurrent invocation from unrelated threads; none of the
/// operations block waiting for data.
#[derive(Debug)]
pub struct QueueRegistry {
    queues: Mutex<HashMap<AgentId, EventQueue>>,
    capabilities: Mutex<CapabilityTable>,
    sequencer: ResponseSequencer,
    registration_markers: usize,
}

impl QueueRegistry {
    /// Build a registry from validated configuration.
    pub fn new(config: &QueueConfig) -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            capabilities: Mutex::new(CapabilityTable::default()),
            sequencer: ResponseSequencer::new(config.response_id_bound),
            registration_markers: config.registration_markers.max(1),
        }
    }

    fn lock_queues(&self) -> MutexGuard<'_, HashMap<AgentId, EventQueue>> {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_capabilities(&self) -> MutexGuard<'_, CapabilityTable> {
        self.capabilities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register (or re-register) an agent, returning the capability token
    /// that forms its long-poll endpoint path.
    ///
    /// A first registration creates the queue; a re-registration keeps
    /// the existing queue and its undrained content. Either way,
    /// `registration_markers` marker sentinels are appended so stale
    /// in-flight poll responses from a previous session are absorbed as
    /// forced no-events rather than delivering duplicated batches. The
    /// capability binding is reused when one exists so the client does
    /// not need a new URL.
    pub fn register(&self, agent: AgentId) -> CapabilityId {
        let is_new_queue = {
            let mut queues = self.lock_queues();
            match queues.get_mut(&agent) {
                Some(queue) => {
                    for _ in 0..self.registration_markers {
                        queue.enqueue_marker();
                    }
                    false
                }
                None => {
                    let mut queue = EventQueue::new();
                    for _ in 0..self.registration_markers {
                        queue.enqueue_marker();
                    }
                    queues.insert(agent, queue);
                    true
                }
            }
        };

        let capability = {
            let mut capabilities = self.lock_capabilities();
            if is_new_queue && capabilities.by_agent.contains_key(&agent) {
                // Binding outlived its queue; keep it so the client's
                // existing poll URL stays valid.
                debug!(agent = %agent, "existing capability binding without a queue");
            }
            capabilities.bind(agent)
        };

        self.sequencer.on_register(agent, is_new_queue);

        debug!(
            agent = %agent,
            capability = %capability,
            reused_queue = !is_new_queue,
            "event queue registered"
        );

        capability
    }

    /// Tear down all state for an agent. Idempotent: a second call is a
    /// no-op.
    pub fn unregister(&self, agent: AgentId) {
        self.lock_queues().remove(&agent);
        self.lock_capabilities().unbind(agent);
        self.sequencer.forget(agent);
        debug!(agent = %agent, "event queue unregistered");
    }

    /// Append an event to the agent's queue.
    ///
    /// Returns `false` (after logging a warning) when the agent has no
    /// queue; the event is dropped, not retried.
    pub fn enqueue(&self, agent: AgentId, envelope: EventEnvelope) -> bool {
        let mut queues = self.lock_queues();
        if let Some(queue) = queues.get_mut(&agent) {
            queue.enqueue(envelope);
            true
        } else {
            warn!(
                agent = %agent,
                message = %envelope.message,
                "no queue for agent, event dropped"
            );
            false
        }
    }

    /// Whether the agent has anything queued.
    ///
    /// An entirely unknown agent reports `true`: it may be mid-register,
    /// so the transport polls optimistically instead of erroring.
    pub fn has_events(&self, agent: AgentId) -> bool {
        self.lock_queues()
            .get(&agent)
            .is_none_or(|queue| !queue.is_empty())
    }

    /// Drain one registration epoch from the agent's queue and stamp it
    /// with a response id.
    ///
    /// Returns `None` when the agent has no queue or the queue is empty
    /// (nothing happened, no id changed). Returns `Some` with an empty
    /// `events` when the drain consumed only a marker; the sequencer is
    /// still consulted in that case so id recovery can complete.
    ///
    /// The queue swap happens under the queues lock (pointer moves only);
    /// the old queue object is replaced by a fresh successor rather than
    /// mutated in place, and the sequencer is stamped after the lock is
    /// released.
    pub fn drain(&self, agent: AgentId) -> Option<DrainedBatch> {
        let (events, hit_marker) = {
            let mut queues = self.lock_queues();
            let queue = queues.remove(&agent)?;
            if queue.is_empty() {
                queues.insert(agent, queue);
                return None;
            }
            let outcome = queue.drain_epoch();
            queues.insert(agent, outcome.rest);
            (outcome.events, outcome.hit_marker)
        };

        debug_assert!(
            !events.is_empty() || hit_marker,
            "drain of a non-empty queue must yield events or consume a marker"
        );

        let stamp = self.sequencer.on_drain(agent, events.len());

        Some(DrainedBatch {
            events,
            response_id: stamp.response_id,
            recovering: stamp.recovering,
        })
    }

    /// Resolve a capability token back to its agent, if bound.
    pub fn agent_for_capability(&self, capability: CapabilityId) -> Option<AgentId> {
        self.lock_capabilities()
            .by_capability
            .get(&capability)
            .copied()
    }

    /// Capability currently bound to an agent, if any.
    pub fn capability_for_agent(&self, agent: AgentId) -> Option<CapabilityId> {
        self.lock_capabilities().by_agent.get(&agent).copied()
    }

    /// Snapshot of every registered queue for the debug surface.
    pub fn queue_summaries(&self) -> Vec<QueueSummary> {
        let queues = self.lock_queues();
        let mut summaries: Vec<QueueSummary> = queues
            .iter()
            .map(|(agent, queue)| QueueSummary {
                agent: *agent,
                is_empty: queue.is_empty(),
                queued: queue.len(),
            })
            .collect();
        summaries.sort_by_key(|summary| summary.agent);
        summaries
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> QueueRegistry {
        QueueRegistry::new(&QueueConfig::default())
    }

    fn event(n: u64) -> EventEnvelope {
        EventEnvelope::new("TestEvent", json!({ "seq": n }))
    }

    #[test]
    fn register_mints_capability_and_reuses_it() {
        let registry = registry();
        let agent = AgentId::random();

        let first = registry.register(agent);
        let second = registry.register(agent);
        assert_eq!(first, second);
        assert_eq!(registry.agent_for_capability(first), Some(agent));
        assert_eq!(registry.capability_for_agent(agent), Some(first));
    }

    #[test]
    fn register_appends_configured_markers() {
        let config = QueueConfig {
            registration_markers: 3,
            ..QueueConfig::default()
        };
        let registry = QueueRegistry::new(&config);
        let agent = AgentId::random();

        registry.register(agent);
        let summaries = registry.queue_summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries.first().map(|s| s.queued), Some(3));
    }

    #[test]
    fn enqueue_for_unknown_agent_is_dropped() {
        let registry = registry();
        assert!(!registry.enqueue(AgentId::random(), event(1)));
    }

    #[test]
    fn enqueue_after_register_succeeds() {
        let registry = registry();
        let agent = AgentId::random();
        registry.register(agent);
        assert!(registry.enqueue(agent, event(1)));
        assert!(registry.has_events(agent));
    }

    #[test]
    fn has_events_is_optimistic_for_unknown_agents() {
        let registry = registry();
        assert!(registry.has_events(AgentId::random()));
    }

    #[test]
    fn unregister_is_idempotent() {
        let registry = registry();
        let agent = AgentId::random();
        let capability = registry.register(agent);

        registry.unregister(agent);
        registry.unregister(agent);

        assert!(registry.agent_for_capability(capability).is_none());
        assert!(!registry.enqueue(agent, event(1)));
    }

    #[test]
    fn drain_of_missing_agent_is_none() {
        let registry = registry();
        assert!(registry.drain(AgentId::random()).is_none());
    }

    #[test]
    fn drain_empty_queue_is_none() {
        let registry = registry();
        let agent = AgentId::random();
        registry.register(agent);

        // First two drains consume the registration markers.
        assert!(registry.drain(agent).is_some());
        assert!(registry.drain(agent).is_some());
        // Queue is now genuinely empty.
        assert!(registry.drain(agent).is_none());
    }

    #[test]
    fn events_drain_in_enqueue_order() {
        let registry = registry();
        let agent = AgentId::random();
        registry.register(agent);

        // Consume the registration markers first.
        registry.drain(agent);
        registry.drain(agent);

        registry.enqueue(agent, event(1));
        registry.enqueue(agent, event(2));
        registry.enqueue(agent, event(3));

        let batch = registry.drain(agent).unwrap();
        assert_eq!(batch.events, vec![event(1), event(2), event(3)]);
        assert!(!batch.recovering);
    }

    #[test]
    fn concurrent_enqueue_and_drain_lose_nothing() {
        use std::sync::Arc;

        let registry = Arc::new(registry());
        let agent = AgentId::random();
        registry.register(agent);
        registry.drain(agent);
        registry.drain(agent);

        let producer = {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for n in 0..200 {
                    assert!(registry.enqueue(agent, event(n)));
                }
            })
        };

        let mut received = Vec::new();
        while received.len() < 200 {
            if let Some(batch) = registry.drain(agent) {
                received.extend(batch.events);
            } else {
                std::thread::yield_now();
            }
        }
        let joined = producer.join();
        assert!(joined.is_ok());

        // FIFO per agent: delivered in enqueue order, no loss, no dupes.
        let expected: Vec<EventEnvelope> = (0..200).map(event).collect();
        assert_eq!(received, expected);
    }
}
