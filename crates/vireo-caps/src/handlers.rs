//! Session and producer REST endpoints.
//!
//! These stand in for the scene/avatar session layer: the session layer
//! registers an agent when its client connects (receiving the capability
//! path the viewer will poll), enqueues events as the simulation produces
//! them, and unregisters the agent on disconnect.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/agents/{id}/caps` | Register agent, returns poll capability |
//! | `DELETE` | `/api/agents/{id}` | Unregister agent (idempotent) |
//! | `POST` | `/api/agents/{id}/events` | Enqueue one event for the agent |
//! | `GET` | `/api/queues` | Per-agent queue occupancy (debug) |

// Axum handlers must be async even when they never await.
#![allow(clippy::unused_async)]

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;
use vireo_queue::QueueSummary;
use vireo_types::{AgentId, CapabilityId, EventEnvelope};

use crate::error::CapsError;
use crate::longpoll::eqg_cap_path;
use crate::state::AppState;

/// Response body for a successful registration.
#[derive(Debug, Serialize)]
pub struct CapabilityGrant {
    /// The capability token bound to the agent.
    pub capability: CapabilityId,

    /// The long-poll path the viewer should request.
    pub path: String,
}

/// Register (or re-register) an agent's event queue.
///
/// # Route
///
/// `POST /api/agents/{id}/caps`
pub async fn register_agent(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Json<CapabilityGrant> {
    let agent = AgentId::from(id);
    let capability = state.registry.register(agent);
    Json(CapabilityGrant {
        capability,
        path: eqg_cap_path(capability),
    })
}

/// Tear down an agent's queue, capability, and response counter.
///
/// Idempotent: unregistering an unknown agent still answers 204.
///
/// # Route
///
/// `DELETE /api/agents/{id}`
pub async fn unregister_agent(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    state.registry.unregister(AgentId::from(id));
    StatusCode::NO_CONTENT
}

/// Enqueue one event for an agent.
///
/// Fire-and-forget from the producer's perspective, but the HTTP edge
/// reports the miss: an agent with no queue answers 404 and the event is
/// dropped, matching the core's warn-and-drop semantics.
///
/// # Route
///
/// `POST /api/agents/{id}/events`
pub async fn enqueue_event(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(envelope): Json<EventEnvelope>,
) -> Result<StatusCode, CapsError> {
    let agent = AgentId::from(id);
    if state.registry.enqueue(agent, envelope) {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(CapsError::UnknownAgent(agent.to_string()))
    }
}

/// Snapshot of every registered queue.
///
/// # Route
///
/// `GET /api/queues`
pub async fn list_queues(State(state): State<Arc<AppState>>) -> Json<Vec<QueueSummary>> {
    Json(state.registry.queue_summaries())
}
