// src/error.rs
use thiserror::Error;

/// Failures surfaced by the bounded fetch executor. Both variants are
/// recoverable at the subsystem boundary: the view renders a retry
/// affordance (network) or an empty result (validation), never a crash.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure or non-2xx final response after retries exhausted.
    #[error("request for `{target}` failed after {attempts} attempts: {reason}")]
    Network {
        target: String,
        attempts: u32,
        reason: String,
    },
    /// Response body did not parse into the expected news shape.
    /// Never cached.
    #[error("invalid payload for `{target}`: {reason}")]
    Validation { target: String, reason: String },
}

impl FetchError {
    /// Message to show next to the retry affordance in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Network { .. } => "Unable to load news. Please try again.",
            FetchError::Validation { .. } => {
                "No news available for this category at the moment."
            }
        }
    }
}

/// Persistent-storage failures. Degrade the cache to in-memory-only
/// operation for the session; never shown to the user.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage read failed for `{key}`: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("storage write failed for `{key}`: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("stored value for `{key}` is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub fn key(&self) -> &str {
        match self {
            StorageError::Read { key, .. }
            | StorageError::Write { key, .. }
            | StorageError::Corrupt { key, .. } => key,
        }
    }
}
