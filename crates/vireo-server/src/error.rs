//! Error types for the capability server binary.
//!
//! [`StartupError`] is the top-level error type that wraps all possible
//! failure modes during startup, providing a single error type that
//! `main` can propagate with `?`.

/// Top-level error for the capability server binary.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// Queue configuration validation failed.
    #[error("queue config error: {source}")]
    Queue {
        /// The underlying validation error.
        #[from]
        source: vireo_queue::ConfigError,
    },

    /// The HTTP transport failed to start or serve.
    #[error("transport error: {source}")]
    Transport {
        /// The underlying server error.
        #[from]
        source: vireo_caps::ServerError,
    },
}
