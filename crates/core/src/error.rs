//! Error taxonomy shared by the gates and the sync store.

use thiserror::Error;

/// Failure of the backend health pre-flight.
#[derive(Debug, Clone, Error)]
pub enum HealthError {
    /// The probe did not get a response.
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    /// The probe got a response that was not an explicit healthy signal.
    #[error("backend unhealthy: {0}")]
    Unhealthy(String),
}

/// Failure to establish or bootstrap a session.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// No valid session exists.
    #[error("not authenticated")]
    NotAuthenticated,
    /// The session exists but profile/organization resolution failed.
    #[error("session bootstrap failed: {0}")]
    Bootstrap(String),
}

/// Failure of a collection fetch or page load.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Connection-level failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
    /// The server answered with a non-success status.
    #[error("server returned status {status}")]
    Server {
        /// HTTP status code.
        status: u16,
    },
    /// The request exceeded the client timeout.
    #[error("request timed out")]
    Timeout,
}

impl FetchError {
    /// Wraps any displayable error as a transport failure.
    pub fn transport<E: std::fmt::Display>(e: E) -> Self {
        Self::Transport(e.to_string())
    }

    /// Wraps any displayable error as a decode failure.
    pub fn decode<E: std::fmt::Display>(e: E) -> Self {
        Self::Decode(e.to_string())
    }
}

/// An optimistic record was never confirmed within the retry horizon.
#[derive(Debug, Clone, Error)]
#[error("pending record {id} not confirmed after {attempts} syncs")]
pub struct PendingExpired {
    /// Identifier of the unconfirmed record.
    pub id: String,
    /// Number of successful full syncs the record survived unconfirmed.
    pub attempts: u32,
}
