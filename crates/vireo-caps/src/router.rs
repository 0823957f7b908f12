//! Axum router construction for the capability transport.
//!
//! Assembles the long-poll endpoint and the session REST endpoints into
//! a single [`Router`] with CORS middleware enabled so browser-based
//! debug tooling can reach the API.

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::longpoll;
use crate::state::AppState;

/// Build the complete Axum router for the capability server.
///
/// The router includes:
/// - `GET /caps/eqg/{capability}` -- viewer long-poll endpoint
/// - `POST /api/agents/{id}/caps` -- register agent
/// - `DELETE /api/agents/{id}` -- unregister agent
/// - `POST /api/agents/{id}/events` -- enqueue event
/// - `GET /api/queues` -- queue occupancy (debug)
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Viewer-facing long poll
        .route("/caps/eqg/{capability}", get(longpoll::event_queue_get))
        // Session/producer API
        .route("/api/agents/{id}/caps", post(handlers::register_agent))
        .route("/api/agents/{id}", delete(handlers::unregister_agent))
        .route("/api/agents/{id}/events", post(handlers::enqueue_event))
        .route("/api/queues", get(handlers::list_queues))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
