//! Error types for discovery operations.
//!
//! Transport and timeout failures from collaborators are kept distinct from
//! validation failures so callers can decide whether to retry.

use std::time::Duration;

/// Error type for discovery operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError {
    /// A collaborator call did not complete in time.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// The operation that timed out.
        operation: &'static str,
        /// The bound that was exceeded.
        after: Duration,
    },

    /// The DHT transport failed.
    #[error("transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The permission layer identifier is not recognized.
    #[error("invalid layer {0:?}")]
    UnknownLayer(String),

    /// The permission layer could not produce version data.
    #[error("version data unavailable for {layer}: {reason}")]
    VersionData {
        /// The layer that was asked.
        layer: String,
        /// Why no version data could be produced.
        reason: String,
    },

    /// The blockchain client failed.
    #[error("chain error: {message}")]
    Chain {
        /// Description of the chain failure.
        message: String,
    },

    /// A URL failed validation.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl {
        /// The raw value that was rejected.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl DiscoveryError {
    /// Shorthand for a [`DiscoveryError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Shorthand for a [`DiscoveryError::Chain`].
    pub fn chain(message: impl Into<String>) -> Self {
        Self::Chain {
            message: message.into(),
        }
    }
}

/// Result type for discovery operations.
pub type DiscoveryResult<T> = core::result::Result<T, DiscoveryError>;
