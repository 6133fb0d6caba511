//! Filter selection and pure predicate composition over a job sequence.

use crate::model::{Job, JobStatus, RiskLevel};

/// Status filter: either everything or one concrete status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// No-op predicate.
    All,
    /// Exact status match.
    Only(JobStatus),
}

impl StatusFilter {
    /// Storage spelling: `"all"` or the status wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Only(s) => s.as_str(),
        }
    }

    /// Parses the storage spelling. Unrecognized values fall back to `All`
    /// so a stale persisted file never hides the whole collection.
    pub fn parse(s: &str) -> Self {
        match s {
            "all" | "" => StatusFilter::All,
            other => match JobStatus::parse(other) {
                JobStatus::Unknown => StatusFilter::All,
                status => StatusFilter::Only(status),
            },
        }
    }
}

/// Risk filter: either everything or one concrete level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskFilter {
    /// No-op predicate.
    All,
    /// Exact level match.
    Only(RiskLevel),
}

impl RiskFilter {
    /// Storage spelling: `"all"` or the level wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskFilter::All => "all",
            RiskFilter::Only(l) => l.as_str(),
        }
    }

    /// Parses the storage spelling. Unrecognized values fall back to `All`.
    pub fn parse(s: &str) -> Self {
        match s {
            "all" | "" => RiskFilter::All,
            other => match RiskLevel::parse(other) {
                RiskLevel::Unknown => RiskFilter::All,
                level => RiskFilter::Only(level),
            },
        }
    }
}

/// The active filter selection: status, risk, and free-text search.
///
/// Predicates compose with logical AND. `All` / empty search are no-ops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    /// Status predicate.
    pub status: StatusFilter,
    /// Risk predicate.
    pub risk: RiskFilter,
    /// Applied search text. Matched case-insensitively as a substring of
    /// client name, job type, or location.
    pub search_text: String,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            status: StatusFilter::All,
            risk: RiskFilter::All,
            search_text: String::new(),
        }
    }
}

impl FilterSelection {
    /// True when every predicate is a no-op.
    pub fn is_noop(&self) -> bool {
        self.status == StatusFilter::All
            && self.risk == RiskFilter::All
            && self.search_text.trim().is_empty()
    }
}

/// Whether a single job satisfies every active predicate.
pub fn matches(job: &Job, sel: &FilterSelection) -> bool {
    if let StatusFilter::Only(status) = sel.status {
        if job.status != status {
            return false;
        }
    }
    if let RiskFilter::Only(level) = sel.risk {
        if job.risk_level != Some(level) {
            return false;
        }
    }
    let needle = sel.search_text.trim();
    if !needle.is_empty() {
        let needle = needle.to_lowercase();
        let hit = job.client_name.to_lowercase().contains(&needle)
            || job.job_type.to_lowercase().contains(&needle)
            || job.location.to_lowercase().contains(&needle);
        if !hit {
            return false;
        }
    }
    true
}

/// Projects an ordered job sequence through the selection, preserving order.
pub fn select_jobs(jobs: &[Job], sel: &FilterSelection) -> Vec<Job> {
    jobs.iter().filter(|j| matches(j, sel)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str, status: JobStatus, risk: Option<RiskLevel>) -> Job {
        Job {
            id: id.to_string(),
            organization_id: "org1".to_string(),
            status,
            risk_level: risk,
            risk_score: None,
            client_name: format!("Client {id}"),
            job_type: "inspection".to_string(),
            location: "Warehouse 4".to_string(),
            created_at_ms: 0,
        }
    }

    #[test]
    fn status_and_risk_predicates_compose() {
        let jobs = vec![
            job("a", JobStatus::Active, Some(RiskLevel::High)),
            job("b", JobStatus::Completed, Some(RiskLevel::Low)),
        ];

        let by_status = FilterSelection {
            status: StatusFilter::Only(JobStatus::Active),
            ..Default::default()
        };
        let got = select_jobs(&jobs, &by_status);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, "a");

        let by_risk = FilterSelection {
            risk: RiskFilter::Only(RiskLevel::Low),
            ..Default::default()
        };
        let got = select_jobs(&jobs, &by_risk);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, "b");

        // Active AND low matches neither job.
        let both = FilterSelection {
            status: StatusFilter::Only(JobStatus::Active),
            risk: RiskFilter::Only(RiskLevel::Low),
            ..Default::default()
        };
        assert!(select_jobs(&jobs, &both).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let mut a = job("a", JobStatus::Active, None);
        a.client_name = "Northwind Traders".to_string();
        let mut b = job("b", JobStatus::Active, None);
        b.location = "northwind street".to_string();
        let c = job("c", JobStatus::Active, None);

        let sel = FilterSelection {
            search_text: "NORTHWIND".to_string(),
            ..Default::default()
        };
        let got = select_jobs(&[a, b, c], &sel);
        assert_eq!(got.iter().map(|j| j.id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn empty_selection_is_a_noop() {
        let jobs = vec![
            job("a", JobStatus::Active, None),
            job("b", JobStatus::Cancelled, None),
        ];
        let sel = FilterSelection::default();
        assert!(sel.is_noop());
        assert_eq!(select_jobs(&jobs, &sel), jobs);
    }

    #[test]
    fn risk_filter_never_matches_unassessed_jobs() {
        let jobs = vec![job("a", JobStatus::Active, None)];
        let sel = FilterSelection {
            risk: RiskFilter::Only(RiskLevel::High),
            ..Default::default()
        };
        assert!(select_jobs(&jobs, &sel).is_empty());
    }

    #[test]
    fn persisted_spellings_round_trip_and_degrade() {
        assert_eq!(StatusFilter::parse("active"), StatusFilter::Only(JobStatus::Active));
        assert_eq!(StatusFilter::parse("all"), StatusFilter::All);
        assert_eq!(StatusFilter::parse("archived"), StatusFilter::All);
        assert_eq!(RiskFilter::parse("critical"), RiskFilter::Only(RiskLevel::Critical));
        assert_eq!(RiskFilter::parse(""), RiskFilter::All);
        assert_eq!(RiskFilter::parse("catastrophic"), RiskFilter::All);
    }
}
