//! Error types for query routing.

use crate::endpoint::Endpoint;

/// Errors raised by the router itself.
///
/// Routing never fails: `route_read` and `route_write` absorb probe failures.
/// These cover construction and the optional deadline wrapper.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The configured topology breaks a router invariant.
    #[error("Invalid topology: {message}")]
    InvalidTopology { message: String },

    /// `route_write_within` gave up before any write endpoint answered.
    #[error("No write endpoint became available within {deadline_ms}ms")]
    DeadlineExceeded { deadline_ms: u64 },

    /// An endpoint connection pool could not be created.
    #[error("Pool error for {endpoint}: {message}")]
    Pool { endpoint: Endpoint, message: String },
}

impl RouterError {
    /// Creates a new topology error.
    #[must_use]
    pub fn invalid_topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }

    /// Creates a new pool error.
    #[must_use]
    pub fn pool(endpoint: Endpoint, message: impl Into<String>) -> Self {
        Self::Pool {
            endpoint,
            message: message.into(),
        }
    }
}

/// A failed health probe. Always transient from the router's point of view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// The round-trip failed.
    #[error("Endpoint {endpoint} is unavailable: {message}")]
    Unavailable { endpoint: Endpoint, message: String },

    /// The round-trip did not finish within the probe timeout.
    #[error("Endpoint {endpoint} did not answer within {timeout_ms}ms")]
    Timeout { endpoint: Endpoint, timeout_ms: u64 },

    /// The probe has no connection for this endpoint.
    #[error("Endpoint {endpoint} is not configured")]
    UnknownEndpoint { endpoint: Endpoint },
}

impl ProbeError {
    /// Creates a new `Unavailable` error.
    #[must_use]
    pub fn unavailable(endpoint: &Endpoint, message: impl Into<String>) -> Self {
        Self::Unavailable {
            endpoint: endpoint.clone(),
            message: message.into(),
        }
    }

    /// Creates a new `Timeout` error.
    #[must_use]
    pub fn timeout(endpoint: &Endpoint, timeout_ms: u64) -> Self {
        Self::Timeout {
            endpoint: endpoint.clone(),
            timeout_ms,
        }
    }
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
