//! End-to-end scenarios for the queue lifecycle and the response-id /
//! marker recovery protocol, driven through [`QueueRegistry`] exactly as
//! the poll transport drives it.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use serde_json::json;
use vireo_queue::{QueueConfig, QueueRegistry};
use vireo_types::{AgentId, EventEnvelope};

fn registry() -> QueueRegistry {
    QueueRegistry::new(&QueueConfig::default())
}

fn event(name: &str) -> EventEnvelope {
    EventEnvelope::new(name, json!({}))
}

/// Drain away the two registration markers a fresh agent starts with,
/// the way a client's first couple of polls would.
fn absorb_registration_markers(registry: &QueueRegistry, agent: AgentId) {
    for _ in 0..2 {
        let batch = registry.drain(agent).unwrap();
        assert!(batch.events.is_empty(), "marker drains deliver no events");
    }
}

#[test]
fn fresh_registration_delivers_in_order_with_minted_id() {
    let registry = registry();
    let agent = AgentId::random();

    registry.register(agent);

    // The two registration markers cost the client two forced no-events
    // polls and must not move the stored id.
    absorb_registration_markers(&registry, agent);

    registry.enqueue(agent, event("X"));
    registry.enqueue(agent, event("Y"));

    let batch = registry.drain(agent).unwrap();
    assert_eq!(batch.events, vec![event("X"), event("Y")]);
    assert!(!batch.recovering);
    assert!(batch.response_id >= 1, "first batch carries the minted id");

    // Nothing queued: subsequent drain is a no-op and changes no state.
    assert!(registry.drain(agent).is_none());
    assert!(registry.drain(agent).is_none());
}

#[test]
fn marker_drains_do_not_advance_the_id() {
    let registry = registry();
    let agent = AgentId::random();

    registry.register(agent);
    absorb_registration_markers(&registry, agent);

    registry.enqueue(agent, event("first"));
    let first = registry.drain(agent).unwrap();

    registry.enqueue(agent, event("second"));
    let second = registry.drain(agent).unwrap();

    // Ids advance by events delivered + 1 per non-empty batch, and only
    // by that: the marker drains contributed nothing.
    assert_eq!(second.response_id, first.response_id + 2);
}

#[test]
fn re_registration_enters_and_exits_recovery() {
    let registry = registry();
    let agent = AgentId::random();

    registry.register(agent);
    absorb_registration_markers(&registry, agent);

    // Establish the normal-mode id.
    registry.enqueue(agent, event("warmup"));
    let warmup = registry.drain(agent).unwrap();
    assert!(!warmup.recovering);
    let expected_magnitude = warmup.response_id + 2;

    // One undrained event, then the client re-registers while still
    // connected (e.g. after a viewer-side relog into the same session).
    registry.enqueue(agent, event("Z"));
    let capability = registry.capability_for_agent(agent).unwrap();
    let re_registered = registry.register(agent);
    assert_eq!(re_registered, capability, "capability path is reused");

    // First drain: the pre-rebuild event, stamped from the negated
    // counter's magnitude so the id sequence stays coherent.
    let batch = registry.drain(agent).unwrap();
    assert_eq!(batch.events, vec![event("Z")]);
    assert!(batch.recovering);
    assert_eq!(batch.response_id, expected_magnitude);

    // Second drain consumes the leftover marker with an empty batch:
    // recovery completes and a fresh non-negative id is assigned.
    let marker_drain = registry.drain(agent).unwrap();
    assert!(marker_drain.events.is_empty());
    assert!(marker_drain.recovering);

    // Back to normal mode: the next batch is stamped positive.
    registry.enqueue(agent, event("after"));
    let after = registry.drain(agent).unwrap();
    assert!(!after.recovering);
    assert!(after.response_id >= 1);
}

#[test]
fn double_re_registration_stacks_marker_epochs() {
    let registry = registry();
    let agent = AgentId::random();

    registry.register(agent);
    absorb_registration_markers(&registry, agent);

    registry.enqueue(agent, event("A"));
    registry.register(agent);
    registry.enqueue(agent, event("B"));
    registry.register(agent);

    // Queue: A M M B M M. Each drain is bounded to one marker epoch.
    let first = registry.drain(agent).unwrap();
    assert_eq!(first.events, vec![event("A")]);

    let second = registry.drain(agent).unwrap();
    assert!(second.events.is_empty());

    let third = registry.drain(agent).unwrap();
    assert_eq!(third.events, vec![event("B")]);

    let fourth = registry.drain(agent).unwrap();
    assert!(fourth.events.is_empty());

    assert!(registry.drain(agent).is_none());
}

#[test]
fn unregister_tears_down_everything() {
    let registry = registry();
    let agent = AgentId::random();

    let capability = registry.register(agent);
    registry.enqueue(agent, event("pending"));

    registry.unregister(agent);

    assert!(registry.agent_for_capability(capability).is_none());
    assert!(registry.drain(agent).is_none());
    assert!(!registry.enqueue(agent, event("late")), "late events drop");

    // Idempotent teardown.
    registry.unregister(agent);
}

#[test]
fn independent_agents_do_not_interfere() {
    let registry = registry();
    let alice = AgentId::random();
    let bob = AgentId::random();

    registry.register(alice);
    registry.register(bob);
    absorb_registration_markers(&registry, alice);
    absorb_registration_markers(&registry, bob);

    registry.enqueue(alice, event("for-alice"));
    registry.enqueue(bob, event("for-bob"));

    let alice_batch = registry.drain(alice).unwrap();
    let bob_batch = registry.drain(bob).unwrap();
    assert_eq!(alice_batch.events, vec![event("for-alice")]);
    assert_eq!(bob_batch.events, vec![event("for-bob")]);

    registry.unregister(alice);
    assert!(registry.enqueue(bob, event("still-delivered")));
}
