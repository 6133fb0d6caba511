//! Reqwest-backed implementation of the remote ports.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use jobsync_core::error::{AuthError, FetchError, HealthError};
use jobsync_core::model::{JobPage, Organization, Profile};

use crate::ports::{AuthApi, HealthStatus, JobsApi, WireSession};

/// Default request timeout. The store treats timeouts as ordinary fetch
/// errors; bounding them is this adapter's responsibility.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct HealthReply {
    status: HealthStatus,
}

/// HTTP client for the jobsync backend.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpApi {
    /// Builds a client against `base_url` with the default timeout.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, token, DEFAULT_TIMEOUT)
    }

    /// Builds a client with an explicit request timeout.
    pub fn with_timeout(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::transport)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let req = self.client.get(self.url(path));
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

fn fetch_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if let Some(status) = e.status() {
        FetchError::Server {
            status: status.as_u16(),
        }
    } else if e.is_decode() {
        FetchError::decode(e)
    } else {
        FetchError::transport(e)
    }
}

#[async_trait]
impl JobsApi for HttpApi {
    async fn list_jobs(
        &self,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<JobPage, FetchError> {
        let mut query = vec![("page_size", page_size.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        let page = self
            .get("/v1/jobs")
            .query(&query)
            .send()
            .await
            .map_err(fetch_error)?
            .error_for_status()
            .map_err(fetch_error)?
            .json::<JobPage>()
            .await
            .map_err(fetch_error)?;
        Ok(page)
    }

    async fn health(&self) -> Result<HealthStatus, HealthError> {
        let reply = self
            .get("/v1/health")
            .send()
            .await
            .map_err(|e| HealthError::Unreachable(e.to_string()))?
            .error_for_status()
            .map_err(|e| HealthError::Unhealthy(e.to_string()))?
            .json::<HealthReply>()
            .await
            .map_err(|e| HealthError::Unhealthy(e.to_string()))?;
        Ok(reply.status)
    }
}

#[async_trait]
impl AuthApi for HttpApi {
    async fn current_session(&self) -> Result<WireSession, AuthError> {
        self.get("/v1/session")
            .send()
            .await
            .map_err(|e| AuthError::Bootstrap(e.to_string()))?
            .error_for_status()
            .map_err(|e| match e.status() {
                Some(status) if status == reqwest::StatusCode::UNAUTHORIZED => {
                    AuthError::NotAuthenticated
                }
                _ => AuthError::Bootstrap(e.to_string()),
            })?
            .json::<WireSession>()
            .await
            .map_err(|e| AuthError::Bootstrap(e.to_string()))
    }

    async fn profile(&self, user_id: &str) -> Result<Profile, AuthError> {
        self.get(&format!("/v1/users/{user_id}"))
            .send()
            .await
            .map_err(|e| AuthError::Bootstrap(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthError::Bootstrap(e.to_string()))?
            .json::<Profile>()
            .await
            .map_err(|e| AuthError::Bootstrap(e.to_string()))
    }

    async fn organization(&self, org_id: &str) -> Result<Organization, AuthError> {
        self.get(&format!("/v1/organizations/{org_id}"))
            .send()
            .await
            .map_err(|e| AuthError::Bootstrap(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthError::Bootstrap(e.to_string()))?
            .json::<Organization>()
            .await
            .map_err(|e| AuthError::Bootstrap(e.to_string()))
    }
}
