//! Translation between the long-poll transport and the queue core.
//!
//! The transport drives the core through four hooks: `has_events` (peek),
//! `get_events` (drain and frame), `no_events` (timeout response), and
//! `drop_poll` (connection teardown). The adapter owns the response
//! framing: a successful batch is `{"events": [...], "id": n}` with HTTP
//! 200; the no-events sentinel is an empty JSON document with HTTP 502,
//! which viewers treat as "nothing yet, poll again" rather than an error.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{debug, trace};
use vireo_queue::QueueRegistry;
use vireo_types::{AgentId, EventEnvelope};

/// Framed outcome of one poll request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResponse {
    /// A non-empty batch of events tagged with its response id.
    Events {
        /// Drained events in enqueue order.
        events: Vec<EventEnvelope>,
        /// Rolling response id for client-side gap detection.
        id: i64,
    },

    /// Nothing to deliver; the client should immediately re-poll.
    ///
    /// Serialized as an empty JSON document with HTTP 502 so it is
    /// distinguishable out-of-band from a real batch; it never advances
    /// the stored response id.
    NoEvents,
}

impl IntoResponse for PollResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Events { events, id } => (
                StatusCode::OK,
                Json(serde_json::json!({ "events": events, "id": id })),
            )
                .into_response(),
            Self::NoEvents => {
                (StatusCode::BAD_GATEWAY, Json(serde_json::json!({}))).into_response()
            }
        }
    }
}

/// Poll-side view of the queue registry.
///
/// Cheap to clone; all state lives in the shared registry.
#[derive(Debug, Clone)]
pub struct PollAdapter {
    registry: Arc<QueueRegistry>,
}

impl PollAdapter {
    /// Create an adapter over a shared registry.
    pub const fn new(registry: Arc<QueueRegistry>) -> Self {
        Self { registry }
    }

    /// Whether a poll for `agent` should be answered now.
    ///
    /// Unknown agents report `true`: the agent may be mid-registration,
    /// so the transport polls optimistically and lets [`Self::get_events`]
    /// resolve the miss to a no-events response.
    pub fn has_events(&self, agent: AgentId) -> bool {
        self.registry.has_events(agent)
    }

    /// Drain and frame one poll response for `agent`.
    ///
    /// Absent or empty queues and marker-only drains all frame as
    /// [`PollResponse::NoEvents`]; the marker-only case still ran through
    /// the sequencer, so a pending id recovery may have completed.
    pub fn get_events(&self, agent: AgentId) -> PollResponse {
        match self.registry.drain(agent) {
            Some(batch) if !batch.events.is_empty() => {
                debug!(
                    agent = %agent,
                    count = batch.events.len(),
                    id = batch.response_id,
                    recovering = batch.recovering,
                    "poll response"
                );
                PollResponse::Events {
                    events: batch.events,
                    id: batch.response_id,
                }
            }
            _ => PollResponse::NoEvents,
        }
    }

    /// Timeout response when the wait window elapsed with nothing queued.
    pub const fn no_events(&self) -> PollResponse {
        PollResponse::NoEvents
    }

    /// Poll-connection teardown hook.
    ///
    /// Deliberately a no-op: a dropped poll does not imply the agent
    /// left, so releasing the queue stays with the session layer's
    /// unregister call.
    pub fn drop_poll(&self, agent: AgentId) {
        trace!(agent = %agent, "poll connection dropped");
    }
}

/// Everything the transport needs to serve one agent's poll endpoint.
///
/// Bundles the endpoint name and path, the agent binding, the four
/// queue-side hooks (via the adapter), and the no-events window. The
/// transport owns connection accept, timeout scheduling, and threading;
/// the handler only answers the queue-side questions.
#[derive(Debug, Clone)]
pub struct PollHandler {
    name: &'static str,
    path: String,
    agent: AgentId,
    adapter: PollAdapter,
    no_events_timeout: Duration,
}

impl PollHandler {
    /// Bundle a poll handler for one agent.
    pub const fn new(
        name: &'static str,
        path: String,
        agent: AgentId,
        adapter: PollAdapter,
        no_events_timeout: Duration,
    ) -> Self {
        Self {
            name,
            path,
            agent,
            adapter,
            no_events_timeout,
        }
    }

    /// Endpoint name, for logging.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The capability path this handler answers on.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The agent whose queue this handler drains.
    pub const fn agent(&self) -> AgentId {
        self.agent
    }

    /// How long the transport may hold a poll open before forcing
    /// a no-events answer.
    pub const fn no_events_timeout(&self) -> Duration {
        self.no_events_timeout
    }

    /// See [`PollAdapter::has_events`].
    pub fn has_events(&self) -> bool {
        self.adapter.has_events(self.agent)
    }

    /// See [`PollAdapter::get_events`].
    pub fn get_events(&self) -> PollResponse {
        self.adapter.get_events(self.agent)
    }

    /// See [`PollAdapter::no_events`].
    pub const fn no_events(&self) -> PollResponse {
        self.adapter.no_events()
    }

    /// See [`PollAdapter::drop_poll`].
    pub fn drop_poll(&self) {
        self.adapter.drop_poll(self.agent);
    }
}
