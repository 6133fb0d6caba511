//! Read-only view of the synchronized collection.
//!
//! The sync store is the only writer; every consumer receives clones.

use std::collections::BTreeSet;

use crate::model::Job;
use crate::EpochMs;

/// Coarse lifecycle of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorePhase {
    /// Nothing fetched yet.
    #[default]
    Empty,
    /// First fetch in flight, nothing to show.
    Loading,
    /// A collection is materialized (possibly stale).
    Ready,
}

/// The materialized state of the job collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionSnapshot {
    /// Coarse lifecycle.
    pub phase: StorePhase,
    /// Jobs in display order: optimistic records first, then server order.
    pub jobs: Vec<Job>,
    /// Pagination token for the next `load_more`, if any.
    pub cursor: Option<String>,
    /// Whether the server reported more pages.
    pub has_more: bool,
    /// Identifiers created locally and not yet confirmed by the server.
    pub pending: BTreeSet<String>,
    /// Identifiers whose confirmation never arrived within the retry horizon.
    pub failed_sync: BTreeSet<String>,
    /// Timestamp of the last successful full sync.
    pub last_sync_ms: Option<EpochMs>,
    /// Human-readable description of the last fetch failure, if any.
    pub last_error: Option<String>,
    /// A `load_more` request is in flight.
    pub is_loading_more: bool,
}

impl CollectionSnapshot {
    /// Whether the given id is an unconfirmed optimistic record.
    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains(id)
    }

    /// Whether the given id exhausted its confirmation horizon.
    pub fn is_failed_sync(&self, id: &str) -> bool {
        self.failed_sync.contains(id)
    }
}
