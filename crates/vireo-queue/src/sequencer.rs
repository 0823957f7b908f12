//! Rolling response-id sequencing for poll responses.
//!
//! Viewers track the id of the last poll response they received and
//! re-issue requests they believe were lost. The sequencer keeps one
//! signed counter per agent: non-negative during normal delivery, negated
//! on queue re-registration to mark the recovering state. While
//! recovering, the magnitude keeps advancing so ids stay coherent for a
//! client that is still waiting on a stale long-poll from before the
//! rebuild; recovery ends when a drain consumes a marker with an empty
//! batch, at which point a fresh non-negative id is minted.
//!
//! Ids are minted in `1..bound`, never 0: negating 0 would not flip the
//! sign, so a zero id could silently skip recovery mode.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::Rng;
use vireo_types::AgentId;

/// Response-id stamp for one drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainStamp {
    /// Id to tag a non-empty batch with (the stored magnitude at drain
    /// time). Meaningless to the client for empty batches, which carry
    /// no id at all.
    pub response_id: i64,

    /// Whether the agent was in recovery mode when the drain happened.
    pub recovering: bool,
}

/// Per-agent monotonically advancing response-id counters.
///
/// All mutation happens under a single map-wide mutex; no lock is ever
/// held while another registry map is locked.
#[derive(Debug)]
pub struct ResponseSequencer {
    counters: Mutex<HashMap<AgentId, i64>>,
    id_bound: i64,
}

impl ResponseSequencer {
    /// Create a sequencer minting ids in `1..id_bound`.
    ///
    /// The bound must be at least 2; [`crate::config::QueueConfig::validate`]
    /// enforces this before a sequencer is built.
    pub fn new(id_bound: i64) -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
            id_bound: id_bound.max(2),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<AgentId, i64>> {
        // A poisoned counter map is still structurally sound; the core is
        // contractually non-throwing, so recover the inner value.
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Mint a fresh non-negative response id in `1..id_bound`.
    fn mint(&self) -> i64 {
        rand::rng().random_range(1..self.id_bound)
    }

    /// Record a (re)registration for `agent`.
    ///
    /// A brand-new queue gets a fresh positive id. Reusing an existing
    /// queue negates the stored id, entering recovery mode so ids issued
    /// for pre-rebuild content remain coherent.
    pub fn on_register(&self, agent: AgentId, is_new_queue: bool) {
        let fresh = self.mint();
        let mut counters = self.lock();

        if is_new_queue {
            counters.insert(agent, fresh);
            return;
        }

        match counters.get_mut(&agent) {
            Some(stored) => {
                *stored = stored.saturating_neg();
            }
            None => {
                // Queue exists but no counter; start directly in recovery.
                tracing::debug!(agent = %agent, "re-registration with no stored response id");
                counters.insert(agent, fresh.saturating_neg());
            }
        }
    }

    /// Stamp a completed drain for `agent`.
    ///
    /// Callers only invoke this after an actual drain: either a non-empty
    /// batch, or an empty batch whose drain consumed a marker.
    ///
    /// - Non-empty batch: the response id is the stored magnitude; the
    ///   stored value advances by `events_delivered + 1` with its sign
    ///   preserved, so a recovering agent stays recovering.
    /// - Empty batch while recovering: the marker that bounded this drain
    ///   absorbed the last stale response, so recovery completes and a
    ///   fresh positive id is stored.
    /// - Empty batch otherwise: no state change.
    pub fn on_drain(&self, agent: AgentId, events_delivered: usize) -> DrainStamp {
        let mut counters = self.lock();

        let Some(stored) = counters.get(&agent).copied() else {
            // Drain raced with unregistration. Stamp with a throwaway id
            // and store nothing: only `forget` removes counter entries,
            // so re-inserting here would undo the teardown.
            tracing::debug!(agent = %agent, "drain for agent with no stored response id");
            return DrainStamp {
                response_id: self.mint(),
                recovering: false,
            };
        };

        let recovering = stored < 0;
        let magnitude = stored.saturating_abs();

        if events_delivered > 0 {
            let delivered = i64::try_from(events_delivered).unwrap_or(i64::MAX);
            let next = magnitude.saturating_add(delivered).saturating_add(1);
            let signed = if recovering {
                next.saturating_neg()
            } else {
                next
            };
            counters.insert(agent, signed);
        } else if recovering {
            let fresh = self.mint();
            counters.insert(agent, fresh);
            tracing::debug!(agent = %agent, "response id recovery complete");
        }

        DrainStamp {
            response_id: magnitude,
            recovering,
        }
    }

    /// Current stored counter for `agent`, if any. Used by the debug
    /// surface and tests; not part of the delivery protocol.
    pub fn current(&self, agent: AgentId) -> Option<i64> {
        self.lock().get(&agent).copied()
    }

    /// Drop the counter entry for `agent`. Idempotent.
    pub fn forget(&self, agent: AgentId) {
        self.lock().remove(&agent);
    }
}
