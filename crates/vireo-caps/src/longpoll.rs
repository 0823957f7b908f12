//! The long-poll endpoint itself.
//!
//! Viewers issue `GET /caps/eqg/{capability}` and the handler waits until
//! the agent's queue has something to deliver or the no-events window
//! elapses. Viewer HTTP clients time out after roughly 60 seconds, so the
//! server answers with a forced no-events response on a shorter cycle
//! (50 seconds by default) and the client immediately re-polls.
//!
//! The wait is transport-owned: the core's `has_events` check is a
//! non-blocking point-in-time peek re-run on this handler's schedule.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::trace;
use uuid::Uuid;
use vireo_types::CapabilityId;

use crate::adapter::PollHandler;
use crate::error::CapsError;
use crate::state::AppState;

/// Fixed URL prefix for event-queue-get capability paths.
pub const EQG_PATH_PREFIX: &str = "/caps/eqg";

/// Long-poll timing configuration (the `poll` section of the config file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PollConfig {
    /// How long a poll waits before answering no-events, in milliseconds.
    ///
    /// Must stay below the viewer's ~60 s socket timeout; the default
    /// leaves a 10 s safety margin.
    #[serde(default = "default_no_events_timeout_ms")]
    pub no_events_timeout_ms: u64,

    /// Interval between queue occupancy checks, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_no_events_timeout_ms() -> u64 {
    50_000
}

fn default_poll_interval_ms() -> u64 {
    250
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            no_events_timeout_ms: default_no_events_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl PollConfig {
    /// The no-events window as a [`Duration`].
    pub const fn no_events_timeout(&self) -> Duration {
        Duration::from_millis(self.no_events_timeout_ms)
    }

    /// The occupancy check interval as a [`Duration`].
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Capability path for an agent's long-poll endpoint.
pub fn eqg_cap_path(capability: CapabilityId) -> String {
    format!("{EQG_PATH_PREFIX}/{capability}")
}

/// Fires the handler's drop hook when a poll is abandoned mid-wait.
///
/// Axum drops the request future when the client goes away; completing
/// normally disarms the guard first. The hook itself is a no-op on
/// queue state, since a dropped poll does not imply the agent left.
struct PollGuard {
    handler: PollHandler,
    completed: bool,
}

impl Drop for PollGuard {
    fn drop(&mut self) {
        if !self.completed {
            self.handler.drop_poll();
        }
    }
}

/// Serve one long-poll request.
///
/// # Route
///
/// `GET /caps/eqg/{capability}`
///
/// Resolves the capability token to its agent, waits for queued content
/// up to the configured no-events window, then answers with either a
/// framed batch or the no-events sentinel. Unknown tokens get 404: a
/// capability is only unknown when it was never issued or the agent was
/// unregistered.
pub async fn event_queue_get(
    Path(capability): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let capability = CapabilityId::from(capability);

    let Some(agent) = state.registry.agent_for_capability(capability) else {
        return CapsError::UnknownCapability(capability.to_string()).into_response();
    };

    let handler = PollHandler::new(
        "EventQueueGet",
        eqg_cap_path(capability),
        agent,
        state.adapter.clone(),
        state.poll.no_events_timeout(),
    );

    trace!(
        endpoint = handler.name(),
        agent = %handler.agent(),
        path = handler.path(),
        "long poll started"
    );

    let mut guard = PollGuard {
        handler: handler.clone(),
        completed: false,
    };

    let wait_for_events = async {
        while !handler.has_events() {
            tokio::time::sleep(state.poll.poll_interval()).await;
        }
    };

    let response = match tokio::time::timeout(handler.no_events_timeout(), wait_for_events).await {
        Ok(()) => handler.get_events().into_response(),
        Err(_elapsed) => handler.no_events().into_response(),
    };

    guard.completed = true;
    response
}
