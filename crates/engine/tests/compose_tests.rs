//! Projection, debounce and persistence behavior of the query composer.

use std::sync::Arc;
use std::time::Duration;

use jobsync_core::filter::{RiskFilter, StatusFilter};
use jobsync_core::model::{Job, JobStatus, RiskLevel};
use jobsync_engine::compose::QueryComposer;
use jobsync_engine::filters::FilterStore;
use jobsync_engine::memory::MemoryApi;
use jobsync_engine::store::SyncStore;

fn job(id: &str, status: JobStatus, risk: Option<RiskLevel>) -> Job {
    Job {
        id: id.to_string(),
        organization_id: "org-1".to_string(),
        status,
        risk_level: risk,
        risk_score: None,
        client_name: format!("Client {id}"),
        job_type: "inspection".to_string(),
        location: "Depot".to_string(),
        created_at_ms: 0,
    }
}

fn composer_in(dir: &tempfile::TempDir) -> (Arc<MemoryApi>, SyncStore, QueryComposer) {
    let api = Arc::new(MemoryApi::new());
    let store = SyncStore::new(api.clone(), 50);
    let filters = Arc::new(FilterStore::new(dir.path().join("filters.json")));
    let composer = QueryComposer::new(store.clone(), filters);
    (api, store, composer)
}

#[tokio::test]
async fn projection_applies_the_committed_filters() {
    let dir = tempfile::tempdir().unwrap();
    let (api, store, composer) = composer_in(&dir);
    api.set_jobs(vec![
        job("a", JobStatus::Active, Some(RiskLevel::High)),
        job("b", JobStatus::Completed, Some(RiskLevel::Low)),
    ]);
    store.fetch(false).await.unwrap();

    composer.set_status_filter(StatusFilter::Only(JobStatus::Active));
    let got = composer.visible_jobs();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].id, "a");

    composer.set_risk_filter(RiskFilter::Only(RiskLevel::Low));
    assert!(composer.visible_jobs().is_empty());
}

#[tokio::test(start_paused = true)]
async fn debounce_applies_only_the_final_text() {
    let dir = tempfile::tempdir().unwrap();
    let (api, store, composer) = composer_in(&dir);
    api.set_jobs(vec![job("a", JobStatus::Active, None)]);
    store.fetch(false).await.unwrap();

    // Three keystrokes inside the quiescence window.
    composer.set_search_text("a");
    tokio::time::sleep(Duration::from_millis(100)).await;
    composer.set_search_text("ab");
    tokio::time::sleep(Duration::from_millis(100)).await;
    composer.set_search_text("abc");

    // The first keystroke's window has elapsed by now, but its scheduled
    // application was superseded and must have been discarded.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(composer.selection().search_text, "");
    assert_eq!(composer.search_text(), "abc");

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(composer.selection().search_text, "abc");
}

#[tokio::test(start_paused = true)]
async fn pause_then_type_applies_each_settled_value() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, composer) = composer_in(&dir);

    composer.set_search_text("depot");
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(composer.selection().search_text, "depot");

    composer.set_search_text("depot 4");
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(composer.selection().search_text, "depot 4");
}

#[tokio::test]
async fn committed_filters_write_through_to_disk_but_search_does_not() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, composer) = composer_in(&dir);

    composer.set_status_filter(StatusFilter::Only(JobStatus::InProgress));
    composer.set_risk_filter(RiskFilter::Only(RiskLevel::Critical));

    let reloaded = FilterStore::new(dir.path().join("filters.json")).load();
    assert_eq!(reloaded.status, StatusFilter::Only(JobStatus::InProgress));
    assert_eq!(reloaded.risk, RiskFilter::Only(RiskLevel::Critical));
    assert_eq!(reloaded.search_text, "");
}

#[tokio::test]
async fn persisted_selection_is_loaded_once_at_construction() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (_, _, composer) = composer_in(&dir);
        composer.set_status_filter(StatusFilter::Only(JobStatus::Cancelled));
    }

    // A fresh composer over the same file starts from the stored selection.
    let (_, _, composer) = composer_in(&dir);
    assert_eq!(
        composer.selection().status,
        StatusFilter::Only(JobStatus::Cancelled)
    );
}

#[tokio::test]
async fn clear_filters_resets_selection_and_persisted_copy() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, composer) = composer_in(&dir);
    composer.set_status_filter(StatusFilter::Only(JobStatus::Active));
    composer.set_risk_filter(RiskFilter::Only(RiskLevel::High));

    composer.clear_filters();
    assert!(composer.selection().is_noop());

    let reloaded = FilterStore::new(dir.path().join("filters.json")).load();
    assert_eq!(reloaded.status, StatusFilter::All);
    assert_eq!(reloaded.risk, RiskFilter::All);
}

#[tokio::test]
async fn subscription_fires_on_committed_filter_changes() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, composer) = composer_in(&dir);
    let mut rx = composer.subscribe();

    composer.set_status_filter(StatusFilter::Only(JobStatus::Active));
    rx.changed().await.unwrap();
    assert_eq!(
        rx.borrow().status,
        StatusFilter::Only(JobStatus::Active)
    );
}
