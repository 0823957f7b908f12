//! Capability server binary for Vireo.
//!
//! This is the entry point that wires the event delivery core to its
//! HTTP transport. It loads configuration, initializes structured
//! logging, builds the queue registry, and serves the long-poll and
//! session endpoints until the process is terminated.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `vireo-config.yaml` (defaults when absent)
//! 2. Initialize structured logging (tracing, `RUST_LOG` override)
//! 3. Validate the queue configuration
//! 4. Build the queue registry and shared application state
//! 5. Serve the capability HTTP endpoints

mod config;
mod error;

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use vireo_caps::state::AppState;
use vireo_queue::QueueRegistry;

use crate::config::VireoConfig;
use crate::error::StartupError;

/// Application entry point for the capability server.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the transport fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (settings, config_found) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level)),
        )
        .with_target(true)
        .init();

    info!("vireo-server starting");
    if !config_found {
        info!("Config file not found, using defaults");
    }
    info!(
        registration_markers = settings.queue.registration_markers,
        response_id_bound = settings.queue.response_id_bound,
        no_events_timeout_ms = settings.poll.no_events_timeout_ms,
        poll_interval_ms = settings.poll.poll_interval_ms,
        "Configuration loaded"
    );

    // 3. Validate the queue configuration.
    settings.queue.validate().map_err(StartupError::from)?;

    // 4. Build the queue registry and shared state.
    let registry = Arc::new(QueueRegistry::new(&settings.queue));
    let state = Arc::new(AppState::new(registry, settings.poll));
    info!("Queue registry initialized");

    // 5. Serve until terminated.
    vireo_caps::start_server(&settings.server, state)
        .await
        .map_err(StartupError::from)?;

    info!("vireo-server shutdown complete");
    Ok(())
}

/// Load the server configuration from `vireo-config.yaml`.
///
/// Looks for the config file relative to the current working directory;
/// returns defaults (and `false`) when the file does not exist.
fn load_config() -> Result<(VireoConfig, bool), StartupError> {
    let config_path = Path::new("vireo-config.yaml");
    if config_path.exists() {
        let config = VireoConfig::from_file(config_path).map_err(StartupError::from)?;
        Ok((config, true))
    } else {
        Ok((VireoConfig::default(), false))
    }
}
