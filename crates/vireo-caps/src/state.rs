//! Shared application state for the capability transport server.
//!
//! [`AppState`] holds the shared [`QueueRegistry`], the [`PollAdapter`]
//! the long-poll handler drives, and the poll timing configuration.
//! Wrapped in [`Arc`] and injected via Axum's `State` extractor.

use std::sync::Arc;

use vireo_queue::QueueRegistry;

use crate::adapter::PollAdapter;
use crate::longpoll::PollConfig;

/// Shared state for the Axum application.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The queue registry; also shared with simulation-side producers.
    pub registry: Arc<QueueRegistry>,

    /// Poll-side view of the registry used by the long-poll handler.
    pub adapter: PollAdapter,

    /// Long-poll timing configuration.
    pub poll: PollConfig,
}

impl AppState {
    /// Create application state over a shared registry.
    pub fn new(registry: Arc<QueueRegistry>, poll: PollConfig) -> Self {
        let adapter = PollAdapter::new(Arc::clone(&registry));
        Self {
            registry,
            adapter,
            poll,
        }
    }
}
