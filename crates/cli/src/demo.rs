//! Seed data for `--offline` runs.

use std::sync::Arc;

use jobsync_core::model::{Job, JobStatus, RiskLevel};
use jobsync_core::now_ms;
use jobsync_engine::memory::MemoryApi;

fn job(
    id: &str,
    status: JobStatus,
    risk: Option<RiskLevel>,
    score: Option<f64>,
    client: &str,
    job_type: &str,
    location: &str,
    age_hours: i64,
) -> Job {
    Job {
        id: id.to_string(),
        organization_id: "org-1".to_string(),
        status,
        risk_level: risk,
        risk_score: score,
        client_name: client.to_string(),
        job_type: job_type.to_string(),
        location: location.to_string(),
        created_at_ms: now_ms() - age_hours * 3_600_000,
    }
}

/// An in-memory backend pre-loaded with a plausible job collection.
pub fn seeded_api() -> Arc<MemoryApi> {
    let api = Arc::new(MemoryApi::new());
    api.set_jobs(vec![
        job(
            "job-0001",
            JobStatus::Active,
            Some(RiskLevel::Critical),
            Some(9.1),
            "Harbour Logistics",
            "electrical inspection",
            "Pier 12, Rotterdam",
            2,
        ),
        job(
            "job-0002",
            JobStatus::InProgress,
            Some(RiskLevel::High),
            Some(7.4),
            "Northwind Traders",
            "scaffold erection",
            "Warehouse 4, Leeds",
            6,
        ),
        job(
            "job-0003",
            JobStatus::Active,
            Some(RiskLevel::Medium),
            Some(4.8),
            "Acme Facilities",
            "roof survey",
            "Unit 9, Sheffield",
            11,
        ),
        job(
            "job-0004",
            JobStatus::Completed,
            Some(RiskLevel::Low),
            Some(1.2),
            "Harbour Logistics",
            "gate repair",
            "Pier 3, Rotterdam",
            30,
        ),
        job(
            "job-0005",
            JobStatus::Active,
            None,
            None,
            "Meridian Care",
            "boiler service",
            "Elm Court, York",
            32,
        ),
        job(
            "job-0006",
            JobStatus::Cancelled,
            Some(RiskLevel::Medium),
            Some(5.0),
            "Northwind Traders",
            "asbestos check",
            "Warehouse 2, Leeds",
            50,
        ),
        job(
            "job-0007",
            JobStatus::InProgress,
            Some(RiskLevel::Low),
            Some(2.3),
            "Acme Facilities",
            "window cleaning",
            "Unit 9, Sheffield",
            55,
        ),
        job(
            "job-0008",
            JobStatus::Completed,
            Some(RiskLevel::High),
            Some(7.9),
            "Meridian Care",
            "lift maintenance",
            "Elm Court, York",
            72,
        ),
    ]);
    api
}
