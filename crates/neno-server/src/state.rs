//! Application state shared across request handlers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use neno_core::{BedrockHttpClient, Gateway, GatewayConfig};

/// Shared application state. Handlers hold no per-request state of their
/// own; everything here is immutable or concurrency-safe.
#[derive(Clone)]
pub struct AppState {
    /// The request handler - Arc for cheap clones
    pub gateway: Arc<Gateway>,
    /// Concurrency limiter to prevent resource exhaustion
    pub request_semaphore: Arc<Semaphore>,
    /// Request timeout configuration (seconds)
    pub request_timeout_secs: u64,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        // Limit concurrent in-flight generations (tunable per deployment)
        let max_concurrent = std::env::var("NENO_MAX_CONCURRENT_REQUESTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(100);

        let timeout = std::env::var("NENO_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(300); // 5 minutes default

        // The transport shares the request ceiling so an abandoned endpoint
        // call does not outlive its invocation.
        let client = BedrockHttpClient::new(&config, Duration::from_secs(timeout))?;

        Ok(Self {
            gateway: Arc::new(Gateway::new(config, Arc::new(client))),
            request_semaphore: Arc::new(Semaphore::new(max_concurrent)),
            request_timeout_secs: timeout,
        })
    }

    /// Acquire a permit for concurrent request processing
    pub async fn acquire_permit(&self) -> tokio::sync::SemaphorePermit<'_> {
        self.request_semaphore
            .acquire()
            .await
            .expect("Semaphore should never be closed")
    }
}
