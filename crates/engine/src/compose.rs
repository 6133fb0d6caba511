//! Query composer: the filtered/searched projection served to views.
//!
//! Owns the live filter selection and the search debounce. Raw search text
//! is captured immediately so an input field never lags; the predicate
//! actually applied updates only after the text has been stable for
//! [`SEARCH_DEBOUNCE`]. Stale scheduled applications are discarded via a
//! generation counter rather than applied out of order.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tracing::warn;

use jobsync_core::filter::{select_jobs, FilterSelection, RiskFilter, StatusFilter};
use jobsync_core::model::Job;

use crate::filters::FilterStore;
use crate::store::SyncStore;

/// Quiescence window for free-text search input.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(200);

struct ComposerState {
    /// The selection actually applied to the projection.
    selection: FilterSelection,
    /// Live input text, possibly ahead of `selection.search_text`.
    raw_search: String,
    /// Bumped on every keystroke; a scheduled application only commits if
    /// the generation it captured is still current.
    debounce_gen: u64,
}

/// Derives the visible job projection from the sync store's snapshot.
pub struct QueryComposer {
    store: SyncStore,
    filters: Arc<FilterStore>,
    state: Arc<Mutex<ComposerState>>,
    changed: watch::Sender<FilterSelection>,
}

impl QueryComposer {
    /// Loads the persisted selection exactly once, before the first
    /// projection is served.
    pub fn new(store: SyncStore, filters: Arc<FilterStore>) -> Self {
        let selection = filters.load();
        let (changed, _) = watch::channel(selection.clone());
        Self {
            store,
            filters,
            state: Arc::new(Mutex::new(ComposerState {
                selection,
                raw_search: String::new(),
                debounce_gen: 0,
            })),
            changed,
        }
    }

    /// The applied selection.
    pub fn selection(&self) -> FilterSelection {
        self.state.lock().unwrap().selection.clone()
    }

    /// The live input text, for display.
    pub fn search_text(&self) -> String {
        self.state.lock().unwrap().raw_search.clone()
    }

    /// Receiver notified whenever the applied selection changes.
    pub fn subscribe(&self) -> watch::Receiver<FilterSelection> {
        self.changed.subscribe()
    }

    /// The ordered jobs satisfying every active predicate.
    pub fn visible_jobs(&self) -> Vec<Job> {
        let snapshot = self.store.snapshot();
        let selection = self.state.lock().unwrap().selection.clone();
        select_jobs(&snapshot.jobs, &selection)
    }

    /// Commits a status filter and writes it through to disk.
    pub fn set_status_filter(&self, filter: StatusFilter) {
        let selection = {
            let mut st = self.state.lock().unwrap();
            st.selection.status = filter;
            st.selection.clone()
        };
        self.persist(&selection);
        self.changed.send_replace(selection);
    }

    /// Commits a risk filter and writes it through to disk.
    pub fn set_risk_filter(&self, filter: RiskFilter) {
        let selection = {
            let mut st = self.state.lock().unwrap();
            st.selection.risk = filter;
            st.selection.clone()
        };
        self.persist(&selection);
        self.changed.send_replace(selection);
    }

    /// Records a keystroke. The applied predicate updates only once the
    /// input has been quiet for [`SEARCH_DEBOUNCE`]; earlier pending
    /// applications whose captured text no longer matches are discarded.
    pub fn set_search_text(&self, text: &str) {
        let owned = text.to_string();
        let gen = {
            let mut st = self.state.lock().unwrap();
            st.raw_search = owned.clone();
            st.debounce_gen = st.debounce_gen.wrapping_add(1);
            st.debounce_gen
        };

        let state = self.state.clone();
        let changed = self.changed.clone();
        tokio::spawn(async move {
            tokio::time::sleep(SEARCH_DEBOUNCE).await;
            let selection = {
                let mut st = state.lock().unwrap();
                if st.debounce_gen != gen || st.raw_search != owned {
                    return;
                }
                st.selection.search_text = owned;
                st.selection.clone()
            };
            changed.send_replace(selection);
        });
    }

    /// Explicit user reset: all filters and search cleared, persisted.
    pub fn clear_filters(&self) {
        let selection = {
            let mut st = self.state.lock().unwrap();
            st.selection = FilterSelection::default();
            st.raw_search.clear();
            st.debounce_gen = st.debounce_gen.wrapping_add(1);
            st.selection.clone()
        };
        self.persist(&selection);
        self.changed.send_replace(selection);
    }

    fn persist(&self, selection: &FilterSelection) {
        if let Err(e) = self.filters.save(selection) {
            // The in-memory selection stays authoritative for this session.
            warn!(error = %e, "failed to persist filter selection");
        }
    }
}
