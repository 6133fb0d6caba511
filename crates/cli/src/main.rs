use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use ulid::Ulid;

use jobsync_core::filter::{RiskFilter, StatusFilter};
use jobsync_core::model::{Job, JobStatus};
use jobsync_core::now_ms;
use jobsync_core::snapshot::CollectionSnapshot;
use jobsync_engine::compose::{QueryComposer, SEARCH_DEBOUNCE};
use jobsync_engine::filters::FilterStore;
use jobsync_engine::health::HealthGate;
use jobsync_engine::http::HttpApi;
use jobsync_engine::ports::{AuthApi, JobsApi};
use jobsync_engine::session::{SessionGate, SessionState};
use jobsync_engine::store::SyncStore;

mod demo;

#[derive(Parser, Debug)]
#[command(name = "jobsyncctl", version, about = "Terminal client for the jobsync engine")]
struct Args {
    /// Backend base URL, e.g. http://127.0.0.1:8080
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    backend_url: String,

    /// Bearer token for the backend.
    #[arg(long)]
    token: Option<String>,

    /// Run against an in-memory demo backend instead of HTTP.
    #[arg(long)]
    offline: bool,

    /// Page size for job listing requests.
    #[arg(long, default_value_t = 50)]
    page_size: usize,

    /// Path of the persisted filter file.
    #[arg(long, default_value = ".jobsync/filters.json")]
    filter_file: PathBuf,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Probe backend health.
    Health,
    /// Job collection commands.
    Jobs {
        #[command(subcommand)]
        jobs: JobsCmd,
    },
    /// Persisted filter commands.
    Filters {
        #[command(subcommand)]
        filters: FiltersCmd,
    },
}

#[derive(Subcommand, Debug)]
enum JobsCmd {
    /// Fetch and print the visible jobs.
    List {
        /// Status filter: active, in_progress, completed, cancelled or all.
        #[arg(long)]
        status: Option<String>,
        /// Risk filter: low, medium, high, critical or all.
        #[arg(long)]
        risk: Option<String>,
        /// Case-insensitive search over client, type and location.
        #[arg(long)]
        search: Option<String>,
        /// Keep paging until the collection is fully materialized.
        #[arg(long)]
        all_pages: bool,
        /// Print raw JSON instead of the table.
        #[arg(long)]
        json: bool,
    },
    /// Keep the collection synchronized and print every change.
    Watch {
        /// Seconds between reconcile attempts.
        #[arg(long, default_value_t = 5)]
        interval_seconds: u64,
    },
    /// Create a job locally; it stays pending until the server confirms it.
    Add {
        #[arg(long)]
        client: String,
        #[arg(long)]
        job_type: String,
        #[arg(long)]
        location: String,
    },
}

#[derive(Subcommand, Debug)]
enum FiltersCmd {
    /// Print the persisted selection.
    Show,
    /// Reset the persisted selection to all/all.
    Clear,
}

struct App {
    store: SyncStore,
    composer: QueryComposer,
    organization_id: String,
}

fn build_apis(args: &Args) -> Result<(Arc<dyn JobsApi>, Arc<dyn AuthApi>)> {
    if args.offline {
        let api = demo::seeded_api();
        return Ok((api.clone(), api));
    }
    let api = Arc::new(
        HttpApi::new(&args.backend_url, args.token.clone()).context("building http client")?,
    );
    Ok((api.clone(), api))
}

/// Runs the gate sequence and wires the store and composer.
///
/// Order is fixed: the health gate must pass once, then the session gate
/// must report an authenticated organization scope, before any fetch.
async fn open_app(args: &Args) -> Result<App> {
    let (jobs_api, auth_api) = build_apis(args)?;

    let health = HealthGate::new(jobs_api.clone());
    health.check().await.context("backend health check")?;

    let session = SessionGate::new(auth_api);
    let state = session.check().await.context("session check")?;
    let organization_id = match state {
        SessionState::Authenticated {
            profile,
            organization,
        } => {
            info!(user = %profile.display_name, organization = %organization.name, "signed in");
            organization.id
        }
        _ => bail!("not signed in; authenticate first"),
    };

    let store = SyncStore::new(jobs_api, args.page_size);
    session.register_cache(Arc::new(store.clone()));

    let filters = Arc::new(FilterStore::new(args.filter_file.clone()));
    let composer = QueryComposer::new(store.clone(), filters);

    Ok(App {
        store,
        composer,
        organization_id,
    })
}

fn print_table(jobs: &[Job], snap: &CollectionSnapshot) {
    for job in jobs {
        let marker = if snap.is_failed_sync(&job.id) {
            " [sync failed]"
        } else if snap.is_pending(&job.id) {
            " [pending]"
        } else {
            ""
        };
        let risk = job
            .risk_level
            .map(|r| r.as_str())
            .unwrap_or("-");
        println!(
            "{:<12} {:<12} {:<9} {:<24} {:<22} {}{marker}",
            job.id,
            job.status.as_str(),
            risk,
            job.client_name,
            job.job_type,
            job.location,
        );
    }
    let more = if snap.has_more { ", more available" } else { "" };
    println!("-- {} shown{more}", jobs.len());
    if let Some(err) = &snap.last_error {
        println!("-- last sync problem: {err}");
    }
}

async fn jobs_list(
    app: &App,
    status: Option<String>,
    risk: Option<String>,
    search: Option<String>,
    all_pages: bool,
    json: bool,
) -> Result<()> {
    app.store.fetch(false).await.context("initial fetch")?;
    if all_pages {
        while app.store.snapshot().has_more {
            app.store.load_more().await.context("loading next page")?;
        }
    }

    if let Some(status) = status {
        app.composer.set_status_filter(StatusFilter::parse(&status));
    }
    if let Some(risk) = risk {
        app.composer.set_risk_filter(RiskFilter::parse(&risk));
    }
    if let Some(search) = search {
        app.composer.set_search_text(&search);
        // One-shot invocation: wait out the quiescence window so the
        // predicate is applied before printing.
        tokio::time::sleep(SEARCH_DEBOUNCE + Duration::from_millis(50)).await;
    }

    let visible = app.composer.visible_jobs();
    if json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
    } else {
        print_table(&visible, &app.store.snapshot());
    }
    Ok(())
}

async fn jobs_watch(app: &App, interval_seconds: u64) -> Result<()> {
    app.store.fetch(false).await.context("initial fetch")?;
    let mut rx = app.store.subscribe();

    let snap = app.store.snapshot();
    print_table(&app.composer.visible_jobs(), &snap);

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let snap = rx.borrow_and_update().clone();
                println!();
                print_table(&app.composer.visible_jobs(), &snap);
            }
            _ = tokio::time::sleep(Duration::from_secs(interval_seconds)) => {
                // Cache-first: serves the current snapshot and reconciles in
                // the background; failures land in snapshot.last_error.
                let _ = app.store.fetch(false).await;
            }
        }
    }
}

fn jobs_add(app: &App, client: String, job_type: String, location: String) -> Result<()> {
    let job = Job {
        id: Ulid::new().to_string(),
        organization_id: app.organization_id.clone(),
        status: JobStatus::Active,
        risk_level: None,
        risk_score: None,
        client_name: client,
        job_type,
        location,
        created_at_ms: now_ms(),
    };
    let id = job.id.clone();
    app.store.add_pending(job);
    println!("created {id} (pending server confirmation)");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match &args.cmd {
        Cmd::Health => {
            let (jobs_api, _) = build_apis(&args)?;
            let gate = HealthGate::new(jobs_api);
            gate.check().await.context("backend health check")?;
            println!("backend healthy");
        }
        Cmd::Jobs { jobs } => {
            let app = open_app(&args).await?;
            match jobs {
                JobsCmd::List {
                    status,
                    risk,
                    search,
                    all_pages,
                    json,
                } => {
                    jobs_list(
                        &app,
                        status.clone(),
                        risk.clone(),
                        search.clone(),
                        *all_pages,
                        *json,
                    )
                    .await?
                }
                JobsCmd::Watch { interval_seconds } => jobs_watch(&app, *interval_seconds).await?,
                JobsCmd::Add {
                    client,
                    job_type,
                    location,
                } => jobs_add(&app, client.clone(), job_type.clone(), location.clone())?,
            }
        }
        Cmd::Filters { filters } => {
            let store = FilterStore::new(args.filter_file.clone());
            match filters {
                FiltersCmd::Show => {
                    let sel = store.load();
                    println!(
                        "{}",
                        serde_json::json!({
                            "status": sel.status.as_str(),
                            "risk": sel.risk.as_str(),
                        })
                    );
                }
                FiltersCmd::Clear => {
                    store
                        .save(&Default::default())
                        .context("clearing filter file")?;
                    println!("filters reset");
                }
            }
        }
    }

    Ok(())
}
