//! In-memory implementation of the remote ports.
//!
//! Used by the engine tests and by `jobsyncctl --offline`. Not durable.
//! Pages are served from a scriptable job list; the cursor is the start
//! index of the next page, encoded as a string.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use jobsync_core::error::{AuthError, FetchError, HealthError};
use jobsync_core::model::{Job, JobPage, Organization, Profile};

use crate::ports::{AuthApi, HealthStatus, JobsApi, WireSession};

#[derive(Debug)]
struct Inner {
    jobs: Vec<Job>,
    session: WireSession,
    profile: Profile,
    organization: Organization,
    health: HealthStatus,
    list_calls: u32,
    delay_next_list_ms: Option<u64>,
    fail_next_list: Option<FetchError>,
    fail_next_session: Option<AuthError>,
}

/// Scriptable in-memory backend.
pub struct MemoryApi {
    inner: Mutex<Inner>,
}

impl Default for MemoryApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryApi {
    /// Empty collection, healthy backend, authenticated demo session.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                jobs: Vec::new(),
                session: WireSession {
                    authenticated: true,
                    user_id: Some("user-1".to_string()),
                    organization_id: Some("org-1".to_string()),
                },
                profile: Profile {
                    id: "user-1".to_string(),
                    display_name: "Demo User".to_string(),
                    entitlements: vec!["jobs:read".to_string(), "jobs:write".to_string()],
                },
                organization: Organization {
                    id: "org-1".to_string(),
                    name: "Demo Organization".to_string(),
                },
                health: HealthStatus::Healthy,
                list_calls: 0,
                delay_next_list_ms: None,
                fail_next_list: None,
                fail_next_session: None,
            }),
        }
    }

    /// Replaces the server-side collection.
    pub fn set_jobs(&self, jobs: Vec<Job>) {
        self.inner.lock().unwrap().jobs = jobs;
    }

    /// Appends one job to the server-side collection.
    pub fn push_job(&self, job: Job) {
        self.inner.lock().unwrap().jobs.push(job);
    }

    /// Scripts the reported health signal.
    pub fn set_health(&self, health: HealthStatus) {
        self.inner.lock().unwrap().health = health;
    }

    /// Replaces the reported session.
    pub fn set_session(&self, session: WireSession) {
        self.inner.lock().unwrap().session = session;
    }

    /// Renames the organization, as an org-level change the client should
    /// pick up via `refresh_organization`.
    pub fn rename_organization(&self, name: &str) {
        self.inner.lock().unwrap().organization.name = name.to_string();
    }

    /// Makes the next `list_jobs` call sleep before responding.
    pub fn delay_next_list(&self, delay: Duration) {
        self.inner.lock().unwrap().delay_next_list_ms = Some(delay.as_millis() as u64);
    }

    /// Makes the next `list_jobs` call fail.
    pub fn fail_next_list(&self, err: FetchError) {
        self.inner.lock().unwrap().fail_next_list = Some(err);
    }

    /// Makes the next `current_session` call fail.
    pub fn fail_next_session(&self, err: AuthError) {
        self.inner.lock().unwrap().fail_next_session = Some(err);
    }

    /// Number of `list_jobs` calls observed.
    pub fn list_calls(&self) -> u32 {
        self.inner.lock().unwrap().list_calls
    }
}

fn page_at(jobs: &[Job], cursor: Option<&str>, page_size: usize) -> Result<JobPage, FetchError> {
    let start = match cursor {
        None => 0,
        Some(c) => c
            .parse::<usize>()
            .map_err(|_| FetchError::decode("bad cursor"))?,
    };
    let end = (start + page_size.max(1)).min(jobs.len());
    let items = jobs.get(start..end).unwrap_or_default().to_vec();
    let next_cursor = (end < jobs.len()).then(|| end.to_string());
    Ok(JobPage { items, next_cursor })
}

#[async_trait]
impl JobsApi for MemoryApi {
    async fn list_jobs(
        &self,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<JobPage, FetchError> {
        let (delay, fail, page) = {
            let mut inner = self.inner.lock().unwrap();
            inner.list_calls += 1;
            (
                inner.delay_next_list_ms.take(),
                inner.fail_next_list.take(),
                page_at(&inner.jobs, cursor, page_size),
            )
        };
        if let Some(ms) = delay {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        if let Some(err) = fail {
            return Err(err);
        }
        page
    }

    async fn health(&self) -> Result<HealthStatus, HealthError> {
        Ok(self.inner.lock().unwrap().health)
    }
}

#[async_trait]
impl AuthApi for MemoryApi {
    async fn current_session(&self) -> Result<WireSession, AuthError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(err) = inner.fail_next_session.take() {
            return Err(err);
        }
        Ok(inner.session.clone())
    }

    async fn profile(&self, user_id: &str) -> Result<Profile, AuthError> {
        let inner = self.inner.lock().unwrap();
        if inner.profile.id != user_id {
            return Err(AuthError::Bootstrap(format!("unknown user {user_id}")));
        }
        Ok(inner.profile.clone())
    }

    async fn organization(&self, org_id: &str) -> Result<Organization, AuthError> {
        let inner = self.inner.lock().unwrap();
        if inner.organization.id != org_id {
            return Err(AuthError::Bootstrap(format!("unknown organization {org_id}")));
        }
        Ok(inner.organization.clone())
    }
}
