//! Shared type definitions for the Vireo event delivery service.
//!
//! Vireo streams asynchronous simulation events to remote viewer clients
//! over repeated HTTP long-poll requests. This crate defines the
//! strongly-typed identifiers shared by every other crate and the opaque
//! event envelope the queues carry.

pub mod event;
pub mod ids;

pub use event::EventEnvelope;
pub use ids::{AgentId, CapabilityId};
