//! Remote service ports consumed by the gates and the sync store.
//!
//! The wire format behind these traits belongs to the backend; the engine
//! only requires stable item identifiers and cursor-based pagination.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use jobsync_core::error::{AuthError, FetchError, HealthError};
use jobsync_core::model::{JobPage, Organization, Profile};

/// Health signal reported by the backend probe endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Explicit healthy signal; the only value that opens the gate.
    Healthy,
    /// Responding but impaired.
    Degraded,
    /// Anything else the probe may report.
    #[serde(other)]
    Unhealthy,
}

impl HealthStatus {
    /// Wire spelling of the signal.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

/// Raw session state as reported by the auth endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireSession {
    /// Whether a valid token is attached.
    pub authenticated: bool,
    /// Current user id, present when authenticated.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Current organization id, present when authenticated.
    #[serde(default)]
    pub organization_id: Option<String>,
}

/// Paginated job collection endpoint plus the health probe.
#[async_trait]
pub trait JobsApi: Send + Sync {
    /// Lists one page of jobs. `cursor: None` requests the first page.
    async fn list_jobs(
        &self,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<JobPage, FetchError>;

    /// Probes backend health. Transport failures map to
    /// [`HealthError::Unreachable`].
    async fn health(&self) -> Result<HealthStatus, HealthError>;
}

/// Session, profile and organization endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Reports the current session as the backend sees it.
    async fn current_session(&self) -> Result<WireSession, AuthError>;

    /// Resolves current-user metadata.
    async fn profile(&self, user_id: &str) -> Result<Profile, AuthError>;

    /// Resolves organization-scope metadata.
    async fn organization(&self, org_id: &str) -> Result<Organization, AuthError>;
}
