//! Capability long-poll transport for the Vireo event delivery service.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Long-poll endpoint** (`GET /caps/eqg/{capability}`) where viewer
//!   clients wait for batches of queued events, addressed by their
//!   unguessable capability token;
//! - **Session REST endpoints** for the producer side: register and
//!   unregister agents, enqueue events;
//! - **Debug endpoint** (`GET /api/queues`) showing per-agent queue
//!   occupancy.
//!
//! # Architecture
//!
//! The transport owns all connection accept, wait, and timeout behavior.
//! It drives the non-blocking core through the [`adapter::PollAdapter`]
//! hooks (`has_events` / `get_events` / `no_events` / `drop_poll`): the
//! long-poll handler re-checks `has_events` on its own schedule and
//! answers with a forced no-events response just before the viewer's
//! socket timeout would fire.

pub mod adapter;
pub mod error;
pub mod handlers;
pub mod longpoll;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use adapter::{PollAdapter, PollHandler, PollResponse};
pub use longpoll::PollConfig;
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use state::AppState;
