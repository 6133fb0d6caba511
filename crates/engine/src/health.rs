//! Backend health pre-flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use jobsync_core::error::HealthError;

use crate::ports::{HealthStatus, JobsApi};

/// One-shot health gate.
///
/// Every session and data operation is sequenced behind this gate: it must
/// resolve to success at least once in the process lifetime. There is no
/// automatic retry; the caller owns the retry affordance.
pub struct HealthGate {
    api: Arc<dyn JobsApi>,
    open: AtomicBool,
}

impl HealthGate {
    pub fn new(api: Arc<dyn JobsApi>) -> Self {
        Self {
            api,
            open: AtomicBool::new(false),
        }
    }

    /// Whether the gate has passed at least once.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Probes the backend once. Opens the gate only on an explicit healthy
    /// signal; any other outcome leaves it closed.
    pub async fn check(&self) -> Result<(), HealthError> {
        match self.api.health().await {
            Ok(HealthStatus::Healthy) => {
                self.open.store(true, Ordering::Release);
                info!("backend healthy");
                Ok(())
            }
            Ok(status) => {
                warn!(status = status.as_str(), "backend not healthy");
                Err(HealthError::Unhealthy(status.as_str().to_string()))
            }
            Err(e) => {
                warn!(error = %e, "health probe failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryApi;

    #[tokio::test]
    async fn opens_only_on_explicit_healthy_signal() {
        let api = Arc::new(MemoryApi::new());
        api.set_health(HealthStatus::Degraded);
        let gate = HealthGate::new(api.clone());

        assert!(gate.check().await.is_err());
        assert!(!gate.is_open());

        api.set_health(HealthStatus::Healthy);
        gate.check().await.unwrap();
        assert!(gate.is_open());
    }

    #[tokio::test]
    async fn stays_open_for_the_process_lifetime() {
        let api = Arc::new(MemoryApi::new());
        let gate = HealthGate::new(api.clone());
        gate.check().await.unwrap();

        // A later degraded probe reports the error but the gate stays open.
        api.set_health(HealthStatus::Degraded);
        assert!(gate.check().await.is_err());
        assert!(gate.is_open());
    }
}
