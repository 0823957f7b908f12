//! Per-agent event delivery core for Vireo.
//!
//! Simulation-side producers enqueue opaque events for an agent; the
//! viewer drains them over repeated HTTP long-poll requests. This crate
//! owns everything between those two edges:
//!
//! - [`queue::EventQueue`] -- the ordered, unbounded per-agent mailbox of
//!   events and marker sentinels;
//! - [`sequencer::ResponseSequencer`] -- the rolling response-id protocol
//!   the viewer uses to detect lost poll responses, including the
//!   negative-id recovery mode entered on queue re-registration;
//! - [`registry::QueueRegistry`] -- the agent -> (queue, capability,
//!   counter) mapping, with creation, reuse, and teardown.
//!
//! All entry points are safe under concurrent invocation from unrelated
//! threads and none of them block waiting for data: the long-poll
//! wait-or-timeout behavior belongs entirely to the transport layer.

pub mod config;
pub mod queue;
pub mod registry;
pub mod sequencer;

pub use config::{ConfigError, QueueConfig};
pub use queue::{DrainOutcome, EventQueue, QueueEntry};
pub use registry::{DrainedBatch, QueueRegistry, QueueSummary};
pub use sequencer::{DrainStamp, ResponseSequencer};
