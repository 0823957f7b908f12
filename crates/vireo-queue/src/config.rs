//! Typed configuration for the event delivery core.
//!
//! Mirrors the `queue` section of `vireo-config.yaml`. All fields have
//! defaults matching the long-standing empirical values of the protocol;
//! [`QueueConfig::validate`] rejects combinations that would break the
//! id/marker recovery invariants.

use serde::Deserialize;

/// Errors that can occur when validating queue configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration value is outside its valid range.
    #[error("invalid queue configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Configuration for queue lifecycle and response-id sequencing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueueConfig {
    /// Number of marker sentinels appended at each (re)registration.
    ///
    /// Each marker absorbs one stale in-flight long-poll response from a
    /// previous session. Two has proven sufficient in practice; the value
    /// is configurable rather than hardcoded because it is empirical.
    #[serde(default = "default_registration_markers")]
    pub registration_markers: usize,

    /// Exclusive upper bound for freshly minted response ids.
    ///
    /// Ids are drawn from `1..response_id_bound`. Zero is excluded so
    /// negating a stored id always flips its sign and reliably signals
    /// recovery mode.
    #[serde(default = "default_response_id_bound")]
    pub response_id_bound: i64,
}

fn default_registration_markers() -> usize {
    2
}

fn default_response_id_bound() -> i64 {
    30_000_000
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            registration_markers: default_registration_markers(),
            response_id_bound: default_response_id_bound(),
        }
    }
}

impl QueueConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `registration_markers` is zero
    /// (re-registration could then never absorb a stale response) or
    /// `response_id_bound` is less than 2 (the mint range `1..bound`
    /// would be empty).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registration_markers == 0 {
            return Err(ConfigError::Invalid {
                reason: "registration_markers must be at least 1".to_owned(),
            });
        }

        if self.response_id_bound < 2 {
            return Err(ConfigError::Invalid {
                reason: "response_id_bound must be at least 2".to_owned(),
            });
        }

        Ok(())
    }
}
