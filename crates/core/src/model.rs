//! Job records and the wire types they are decoded from.

use serde::{Deserialize, Serialize};

use crate::EpochMs;

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Scheduled and actionable.
    Active,
    /// Work has started.
    InProgress,
    /// Work finished.
    Completed,
    /// Called off before completion.
    Cancelled,
    /// Any status value this client version does not recognize.
    ///
    /// Newer server releases may add statuses; decoding must not fail on them.
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Wire/storage spelling of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Unknown => "unknown",
        }
    }

    /// Parses the wire spelling; anything unrecognized lands in `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "active" => JobStatus::Active,
            "in_progress" => JobStatus::InProgress,
            "completed" => JobStatus::Completed,
            "cancelled" => JobStatus::Cancelled,
            _ => JobStatus::Unknown,
        }
    }
}

/// Risk classification assigned to a job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Routine work.
    Low,
    /// Elevated attention.
    Medium,
    /// Requires review.
    High,
    /// Requires sign-off.
    Critical,
    /// Any level this client version does not recognize.
    #[serde(other)]
    Unknown,
}

impl RiskLevel {
    /// Wire/storage spelling of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
            RiskLevel::Unknown => "unknown",
        }
    }

    /// Parses the wire spelling; anything unrecognized lands in `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "low" => RiskLevel::Low,
            "medium" => RiskLevel::Medium,
            "high" => RiskLevel::High,
            "critical" => RiskLevel::Critical,
            _ => RiskLevel::Unknown,
        }
    }
}

/// A job record as synchronized from the backend.
///
/// `id` is stable and unique within a collection snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    /// Stable identifier.
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// Lifecycle status.
    pub status: JobStatus,
    /// Risk classification, if assessed.
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
    /// Numeric risk score, if assessed.
    #[serde(default)]
    pub risk_score: Option<f64>,
    /// Free-text client name.
    pub client_name: String,
    /// Free-text job type.
    pub job_type: String,
    /// Free-text location.
    pub location: String,
    /// Creation timestamp (ms).
    pub created_at_ms: EpochMs,
}

/// One page of the server job collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobPage {
    /// Jobs in server order.
    pub items: Vec<Job>,
    /// Opaque token for the next page; absent on the last page.
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Organization scope resolved during session bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Organization {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Current-user metadata resolved during session bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub display_name: String,
    /// Entitlement tags granted to the user.
    #[serde(default)]
    pub entitlements: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_decodes_without_error() {
        let raw = r#"{
            "id": "j1",
            "organization_id": "org1",
            "status": "archived",
            "risk_level": "catastrophic",
            "client_name": "Acme",
            "job_type": "inspection",
            "location": "Leeds",
            "created_at_ms": 1000
        }"#;
        let job: Job = serde_json::from_str(raw).unwrap();
        assert_eq!(job.status, JobStatus::Unknown);
        assert_eq!(job.risk_level, Some(RiskLevel::Unknown));
    }

    #[test]
    fn absent_risk_fields_default_to_none() {
        let raw = r#"{
            "id": "j2",
            "organization_id": "org1",
            "status": "active",
            "client_name": "Acme",
            "job_type": "repair",
            "location": "York",
            "created_at_ms": 1000
        }"#;
        let job: Job = serde_json::from_str(raw).unwrap();
        assert_eq!(job.risk_level, None);
        assert_eq!(job.risk_score, None);
    }

    #[test]
    fn status_round_trips_through_wire_spelling() {
        for s in [
            JobStatus::Active,
            JobStatus::InProgress,
            JobStatus::Completed,
            JobStatus::Cancelled,
        ] {
            assert_eq!(JobStatus::parse(s.as_str()), s);
        }
        assert_eq!(JobStatus::parse("something_new"), JobStatus::Unknown);
    }
}
