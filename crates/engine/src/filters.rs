//! Durable storage of the last-chosen status/risk filters.
//!
//! One JSON file per store, path chosen by the composition root (per-device
//! scope). Search text is deliberately never persisted.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use jobsync_core::filter::{FilterSelection, RiskFilter, StatusFilter};

/// On-disk record. Absence of the file is equivalent to `{all, all}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct StoredFilters {
    status: String,
    risk: String,
}

/// File-backed filter store. Reads are safe from any thread; writes are
/// serialized by the query composer (single writer).
pub struct FilterStore {
    path: PathBuf,
}

impl FilterStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the persisted selection. A missing or unreadable file yields
    /// the default selection; a corrupt file is logged and also degrades to
    /// the default rather than failing startup.
    pub fn load(&self) -> FilterSelection {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return FilterSelection::default(),
        };
        match serde_json::from_slice::<StoredFilters>(&bytes) {
            Ok(stored) => FilterSelection {
                status: StatusFilter::parse(&stored.status),
                risk: RiskFilter::parse(&stored.risk),
                search_text: String::new(),
            },
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt filter file; using defaults");
                FilterSelection::default()
            }
        }
    }

    /// Writes the status/risk part of the selection through to disk.
    /// Atomic: temp file in the same directory, then rename.
    pub fn save(&self, sel: &FilterSelection) -> io::Result<()> {
        let stored = StoredFilters {
            status: sel.status.as_str().to_string(),
            risk: sel.risk.as_str().to_string(),
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&stored)?)?;
        fs::rename(&tmp, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobsync_core::model::{JobStatus, RiskLevel};

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilterStore::new(dir.path().join("filters.json"));
        assert_eq!(store.load(), FilterSelection::default());
    }

    #[test]
    fn save_then_load_restores_status_and_risk_but_not_search() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilterStore::new(dir.path().join("filters.json"));

        let sel = FilterSelection {
            status: StatusFilter::Only(JobStatus::InProgress),
            risk: RiskFilter::Only(RiskLevel::High),
            search_text: "transient".to_string(),
        };
        store.save(&sel).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.status, sel.status);
        assert_eq!(loaded.risk, sel.risk);
        assert_eq!(loaded.search_text, "");
    }

    #[test]
    fn corrupt_file_degrades_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.json");
        fs::write(&path, b"{not json").unwrap();
        let store = FilterStore::new(path);
        assert_eq!(store.load(), FilterSelection::default());
    }
}
