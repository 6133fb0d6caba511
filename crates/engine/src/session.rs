//! Session establishment and teardown.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use jobsync_core::error::AuthError;
use jobsync_core::model::{Organization, Profile};

use crate::ports::AuthApi;

/// A client-side cache that must be emptied on logout.
///
/// Implementations must be synchronous: logout may not leak one
/// organization's data into the next session through a still-warm cache.
pub trait Purge: Send + Sync {
    fn purge(&self);
}

/// Where the session currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No valid session.
    Unauthenticated,
    /// Token accepted, profile/organization resolution in progress.
    Bootstrapping,
    /// Fully established scope. Dependent stores may assume the
    /// organization is present.
    Authenticated {
        profile: Profile,
        organization: Organization,
    },
}

/// Gate that establishes an authenticated, bootstrapped session before any
/// resource fetch is attempted.
pub struct SessionGate {
    api: Arc<dyn AuthApi>,
    state: Mutex<SessionState>,
    caches: Mutex<Vec<Arc<dyn Purge>>>,
}

impl SessionGate {
    pub fn new(api: Arc<dyn AuthApi>) -> Self {
        Self {
            api,
            state: Mutex::new(SessionState::Unauthenticated),
            caches: Mutex::new(Vec::new()),
        }
    }

    /// Registers a cache to be purged on logout.
    pub fn register_cache(&self, cache: Arc<dyn Purge>) {
        self.caches.lock().unwrap().push(cache);
    }

    /// Current state, as of the last `check`/`logout`.
    pub fn state(&self) -> SessionState {
        self.state.lock().unwrap().clone()
    }

    /// Resolves the session. `Authenticated` is reported only once profile
    /// and organization metadata are both loaded.
    pub async fn check(&self) -> Result<SessionState, AuthError> {
        let session = self.api.current_session().await?;
        if !session.authenticated {
            let state = SessionState::Unauthenticated;
            *self.state.lock().unwrap() = state.clone();
            return Ok(state);
        }

        let user_id = session
            .user_id
            .ok_or_else(|| AuthError::Bootstrap("session missing user id".to_string()))?;
        let org_id = session
            .organization_id
            .ok_or_else(|| AuthError::Bootstrap("session missing organization id".to_string()))?;

        *self.state.lock().unwrap() = SessionState::Bootstrapping;

        let profile = self.api.profile(&user_id).await?;
        let organization = self.api.organization(&org_id).await?;
        info!(user = %profile.id, organization = %organization.id, "session established");

        let state = SessionState::Authenticated {
            profile,
            organization,
        };
        *self.state.lock().unwrap() = state.clone();
        Ok(state)
    }

    /// Re-fetches organization-level fields without a full session teardown.
    /// No-op unless authenticated.
    pub async fn refresh_organization(&self) -> Result<(), AuthError> {
        let org_id = match self.state() {
            SessionState::Authenticated { organization, .. } => organization.id,
            _ => return Ok(()),
        };
        let organization = self.api.organization(&org_id).await?;
        let mut state = self.state.lock().unwrap();
        if let SessionState::Authenticated {
            organization: current,
            ..
        } = &mut *state
        {
            *current = organization;
        }
        Ok(())
    }

    /// Drops the session and synchronously purges every registered cache.
    pub fn logout(&self) {
        *self.state.lock().unwrap() = SessionState::Unauthenticated;
        let caches = self.caches.lock().unwrap();
        for cache in caches.iter() {
            cache.purge();
        }
        if !caches.is_empty() {
            warn!(caches = caches.len(), "logout purged dependent caches");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryApi;
    use crate::ports::WireSession;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FlagCache(AtomicBool);

    impl Purge for FlagCache {
        fn purge(&self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn authenticated_only_after_profile_and_organization_resolve() {
        let api = Arc::new(MemoryApi::new());
        let gate = SessionGate::new(api);

        let state = gate.check().await.unwrap();
        match state {
            SessionState::Authenticated {
                profile,
                organization,
            } => {
                assert_eq!(profile.id, "user-1");
                assert_eq!(organization.id, "org-1");
            }
            other => panic!("expected authenticated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unauthenticated_session_reports_without_bootstrap() {
        let api = Arc::new(MemoryApi::new());
        api.set_session(WireSession {
            authenticated: false,
            user_id: None,
            organization_id: None,
        });
        let gate = SessionGate::new(api);
        assert_eq!(gate.check().await.unwrap(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn logout_purges_registered_caches() {
        let api = Arc::new(MemoryApi::new());
        let gate = SessionGate::new(api);
        gate.check().await.unwrap();

        let cache = Arc::new(FlagCache(AtomicBool::new(false)));
        gate.register_cache(cache.clone());

        gate.logout();
        assert!(cache.0.load(Ordering::SeqCst));
        assert_eq!(gate.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn refresh_organization_swaps_only_org_fields() {
        let api = Arc::new(MemoryApi::new());
        let gate = SessionGate::new(api.clone());
        gate.check().await.unwrap();

        api.rename_organization("Demo Organization Ltd");
        gate.refresh_organization().await.unwrap();

        match gate.state() {
            SessionState::Authenticated { organization, .. } => {
                assert_eq!(organization.name, "Demo Organization Ltd");
            }
            other => panic!("expected authenticated, got {other:?}"),
        }
    }
}
