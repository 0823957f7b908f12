//! The opaque event envelope carried by per-agent queues.
//!
//! The delivery core never interprets payloads: an envelope is a message
//! name plus an arbitrary JSON body, produced by simulation-side callbacks
//! (teleport completion, group chat session updates, script state changes)
//! and consumed by the viewer. Everything between enqueue and the poll
//! response treats it as a value to move, not inspect.

use serde::{Deserialize, Serialize};

/// A single queued simulation event.
///
/// `message` names the event type for the viewer's dispatch table;
/// `body` is the event-specific payload, opaque to the queueing layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Viewer-facing event name, e.g. `TeleportFinish`.
    pub message: String,

    /// Event-specific payload. Never inspected by the delivery core.
    pub body: serde_json::Value,
}

impl EventEnvelope {
    /// Build an envelope from an event name and body.
    pub fn new(message: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            message: message.into(),
            body,
        }
    }
}
