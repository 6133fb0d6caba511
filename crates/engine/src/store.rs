//! The sync store: canonical owner of the synchronized job collection.
//!
//! One logical writer per store instance. Snapshot state lives behind a
//! mutex that is never held across an await; the `is_loading_more` guard
//! flag and the epoch counter are the only concurrency-control primitives.
//!
//! Stale completions are not cancelled, they are discarded: every network
//! operation captures the epoch before suspending, and any completion whose
//! epoch no longer matches the store's is dropped. The epoch advances on
//! every forced refresh and on `clear`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, warn};

use jobsync_core::error::{FetchError, PendingExpired};
use jobsync_core::model::{Job, JobPage};
use jobsync_core::now_ms;
use jobsync_core::snapshot::{CollectionSnapshot, StorePhase};

use crate::ports::JobsApi;
use crate::session::Purge;

/// Page size used when the composition root does not choose one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// How many successful full syncs an optimistic record may survive without
/// the server returning its id before it is flagged as failed. The record
/// stays visible; the failure is surfaced, never silently dropped.
pub const MAX_UNCONFIRMED_SYNCS: u32 = 5;

#[derive(Debug, Clone)]
struct PendingWrite {
    job: Job,
    unconfirmed_syncs: u32,
    failed: bool,
}

#[derive(Default)]
struct StoreState {
    snapshot: CollectionSnapshot,
    pending: BTreeMap<String, PendingWrite>,
    epoch: u64,
    refresh_in_flight: bool,
}

impl StoreState {
    /// Commits a first page: replaces the collection, reconciles optimistic
    /// records, recomputes paging state.
    fn apply_first_page(&mut self, page: JobPage) {
        let returned: BTreeSet<&str> = page.items.iter().map(|j| j.id.as_str()).collect();
        let confirmed: Vec<String> = self
            .pending
            .keys()
            .filter(|id| returned.contains(id.as_str()))
            .cloned()
            .collect();
        for id in &confirmed {
            self.pending.remove(id);
            debug!(id = %id, "optimistic record confirmed by server");
        }

        // Age unconfirmed markers on every successful full sync only; a
        // failed fetch says nothing about whether the server has the record.
        for (id, marker) in self.pending.iter_mut() {
            if marker.failed {
                continue;
            }
            marker.unconfirmed_syncs += 1;
            if marker.unconfirmed_syncs >= MAX_UNCONFIRMED_SYNCS {
                marker.failed = true;
                let err = PendingExpired {
                    id: id.clone(),
                    attempts: marker.unconfirmed_syncs,
                };
                warn!(error = %err, "optimistic record expired");
            }
        }

        // Optimistic records first, then the server page in server order.
        let mut jobs: Vec<Job> = self.pending.values().map(|m| m.job.clone()).collect();
        let mut seen: BTreeSet<String> = jobs.iter().map(|j| j.id.clone()).collect();
        for item in page.items {
            if seen.insert(item.id.clone()) {
                jobs.push(item);
            }
        }

        self.snapshot.jobs = jobs;
        self.snapshot.has_more = page.next_cursor.is_some();
        self.snapshot.cursor = page.next_cursor;
        self.snapshot.phase = StorePhase::Ready;
        self.snapshot.last_sync_ms = Some(now_ms());
        self.snapshot.last_error = None;
        self.sync_marker_sets();
    }

    /// Appends a follow-up page, deduplicating by id. The server copy wins
    /// on field conflicts.
    fn append_page(&mut self, page: JobPage) {
        for item in page.items {
            if self.pending.remove(&item.id).is_some() {
                debug!(id = %item.id, "optimistic record confirmed by later page");
            }
            if let Some(existing) = self.snapshot.jobs.iter_mut().find(|j| j.id == item.id) {
                *existing = item;
            } else {
                self.snapshot.jobs.push(item);
            }
        }
        self.snapshot.has_more = page.next_cursor.is_some();
        self.snapshot.cursor = page.next_cursor;
        self.sync_marker_sets();
    }

    fn sync_marker_sets(&mut self) {
        self.snapshot.pending = self
            .pending
            .iter()
            .filter(|(_, m)| !m.failed)
            .map(|(id, _)| id.clone())
            .collect();
        self.snapshot.failed_sync = self
            .pending
            .iter()
            .filter(|(_, m)| m.failed)
            .map(|(id, _)| id.clone())
            .collect();
    }
}

struct StoreInner {
    api: Arc<dyn JobsApi>,
    page_size: usize,
    state: Mutex<StoreState>,
    notify: watch::Sender<CollectionSnapshot>,
}

impl StoreInner {
    fn publish(&self, st: &StoreState) {
        self.notify.send_replace(st.snapshot.clone());
    }

    async fn background_refresh(inner: Arc<StoreInner>, epoch: u64) {
        let result = inner.api.list_jobs(None, inner.page_size).await;

        let mut st = inner.state.lock().unwrap();
        st.refresh_in_flight = false;
        if st.epoch != epoch {
            return;
        }
        match result {
            Ok(page) => {
                st.apply_first_page(page);
                inner.publish(&st);
            }
            Err(e) => {
                // Stale-while-revalidate: the cached snapshot stays on
                // screen; only the error field changes.
                warn!(error = %e, "background refresh failed; keeping cached snapshot");
                st.snapshot.last_error = Some(e.to_string());
                inner.publish(&st);
            }
        }
    }
}

/// Handle to a sync store. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct SyncStore {
    inner: Arc<StoreInner>,
}

impl SyncStore {
    pub fn new(api: Arc<dyn JobsApi>, page_size: usize) -> Self {
        let (notify, _) = watch::channel(CollectionSnapshot::default());
        Self {
            inner: Arc::new(StoreInner {
                api,
                page_size: page_size.max(1),
                state: Mutex::new(StoreState::default()),
                notify,
            }),
        }
    }

    /// Read-only copy of the current collection state.
    pub fn snapshot(&self) -> CollectionSnapshot {
        self.inner.state.lock().unwrap().snapshot.clone()
    }

    /// Receiver notified with a fresh snapshot on every replacement.
    pub fn subscribe(&self) -> watch::Receiver<CollectionSnapshot> {
        self.inner.notify.subscribe()
    }

    /// Fetches the first page.
    ///
    /// With a Ready snapshot and `force_refresh == false` this returns
    /// immediately and reconciles in the background (cache-first). With
    /// `force_refresh == true`, or with no cached snapshot, the request is
    /// awaited. A failed awaited fetch leaves any prior snapshot untouched;
    /// only a first-ever failure yields a bare error state.
    pub async fn fetch(&self, force_refresh: bool) -> Result<(), FetchError> {
        let epoch = {
            let mut st = self.inner.state.lock().unwrap();
            if st.snapshot.phase == StorePhase::Ready && !force_refresh {
                if !st.refresh_in_flight {
                    st.refresh_in_flight = true;
                    let inner = self.inner.clone();
                    let epoch = st.epoch;
                    tokio::spawn(async move {
                        StoreInner::background_refresh(inner, epoch).await;
                    });
                }
                return Ok(());
            }
            if force_refresh {
                st.epoch = st.epoch.wrapping_add(1);
            }
            if st.snapshot.phase == StorePhase::Empty {
                st.snapshot.phase = StorePhase::Loading;
                self.inner.publish(&st);
            }
            st.epoch
        };

        let result = self.inner.api.list_jobs(None, self.inner.page_size).await;

        let mut st = self.inner.state.lock().unwrap();
        if st.epoch != epoch {
            // Superseded by a newer refresh or a clear.
            return Ok(());
        }
        match result {
            Ok(page) => {
                st.apply_first_page(page);
                self.inner.publish(&st);
                Ok(())
            }
            Err(e) => {
                st.snapshot.last_error = Some(e.to_string());
                if st.snapshot.phase == StorePhase::Loading {
                    // First fetch ever; there is no prior snapshot to keep.
                    st.snapshot.phase = StorePhase::Empty;
                }
                self.inner.publish(&st);
                Err(e)
            }
        }
    }

    /// Requests the next page. No-op when there is nothing more to load or
    /// a page load is already in flight: concurrent calls collapse to the
    /// single in-flight request.
    pub async fn load_more(&self) -> Result<(), FetchError> {
        let (epoch, cursor) = {
            let mut st = self.inner.state.lock().unwrap();
            if st.snapshot.phase != StorePhase::Ready
                || !st.snapshot.has_more
                || st.snapshot.is_loading_more
            {
                return Ok(());
            }
            let Some(cursor) = st.snapshot.cursor.clone() else {
                return Ok(());
            };
            st.snapshot.is_loading_more = true;
            self.inner.publish(&st);
            (st.epoch, cursor)
        };

        let result = self.inner.api.list_jobs(Some(&cursor), self.inner.page_size).await;

        let mut st = self.inner.state.lock().unwrap();
        st.snapshot.is_loading_more = false;
        if st.epoch != epoch || st.snapshot.cursor.as_deref() != Some(cursor.as_str()) {
            // A refresh or clear happened meanwhile; this page was computed
            // against a stale cursor and would resurrect pre-refresh data.
            self.inner.publish(&st);
            return Ok(());
        }
        match result {
            Ok(page) => {
                st.append_page(page);
                self.inner.publish(&st);
                Ok(())
            }
            Err(e) => {
                st.snapshot.last_error = Some(e.to_string());
                self.inner.publish(&st);
                Err(e)
            }
        }
    }

    /// Inserts a locally created job ahead of server confirmation. The job
    /// is visible immediately and tracked as pending until a fetched page
    /// returns its id.
    pub fn add_pending(&self, job: Job) {
        let mut st = self.inner.state.lock().unwrap();
        let id = job.id.clone();
        let confirmed_already =
            st.snapshot.jobs.iter().any(|j| j.id == id) && !st.pending.contains_key(&id);
        if confirmed_already {
            return;
        }
        st.pending.insert(
            id.clone(),
            PendingWrite {
                job: job.clone(),
                unconfirmed_syncs: 0,
                failed: false,
            },
        );
        if let Some(existing) = st.snapshot.jobs.iter_mut().find(|j| j.id == id) {
            *existing = job;
        } else {
            st.snapshot.jobs.insert(0, job);
        }
        if st.snapshot.phase == StorePhase::Empty {
            st.snapshot.phase = StorePhase::Ready;
        }
        st.sync_marker_sets();
        self.inner.publish(&st);
    }

    /// Empties the collection and the pending set, and bumps the epoch so
    /// any in-flight completion is discarded. Synchronous: used by the
    /// session gate on logout.
    pub fn clear(&self) {
        let mut st = self.inner.state.lock().unwrap();
        st.epoch = st.epoch.wrapping_add(1);
        st.pending.clear();
        st.snapshot = CollectionSnapshot::default();
        self.inner.publish(&st);
    }
}

impl Purge for SyncStore {
    fn purge(&self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryApi;
    use jobsync_core::model::JobStatus;

    fn job(id: &str) -> Job {
        Job {
            id: id.to_string(),
            organization_id: "org-1".to_string(),
            status: JobStatus::Active,
            risk_level: None,
            risk_score: None,
            client_name: "Client".to_string(),
            job_type: "survey".to_string(),
            location: "Depot".to_string(),
            created_at_ms: 0,
        }
    }

    #[tokio::test]
    async fn add_pending_is_visible_before_any_fetch() {
        let store = SyncStore::new(Arc::new(MemoryApi::new()), 10);
        store.add_pending(job("local-1"));

        let snap = store.snapshot();
        assert_eq!(snap.phase, StorePhase::Ready);
        assert_eq!(snap.jobs.len(), 1);
        assert!(snap.is_pending("local-1"));
    }

    #[tokio::test]
    async fn clear_empties_collection_and_pending_set() {
        let api = Arc::new(MemoryApi::new());
        api.set_jobs(vec![job("a")]);
        let store = SyncStore::new(api, 10);
        store.fetch(false).await.unwrap();
        store.add_pending(job("local-1"));

        store.clear();

        let snap = store.snapshot();
        assert_eq!(snap.phase, StorePhase::Empty);
        assert!(snap.jobs.is_empty());
        assert!(snap.pending.is_empty());
        assert!(snap.failed_sync.is_empty());
    }
}
