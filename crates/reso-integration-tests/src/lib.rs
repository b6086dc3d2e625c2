//! End-to-end test harness for Reso
//!
//! Starts the full application (API, health routes and middleware) on an
//! ephemeral local port so tests can drive it over real HTTP, the way the
//! tracker and a browser would.

use reso_core::{Catalog, LogStores, StoreCapacities};
use reso_ingress::{AppState, DelayConfig};
use reso_observability::{HealthState, Metrics};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A running server bound to `127.0.0.1:0`
pub struct TestServer {
    pub addr: SocketAddr,
    pub stores: Arc<LogStores>,
    pub metrics: Arc<Metrics>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Start with default capacities and no artificial latency
    pub async fn start() -> std::io::Result<Self> {
        Self::start_with(StoreCapacities::default(), DelayConfig::disabled()).await
    }

    pub async fn start_with(
        capacities: StoreCapacities,
        delays: DelayConfig,
    ) -> std::io::Result<Self> {
        let stores = Arc::new(
            LogStores::new(capacities)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?,
        );
        let metrics = Arc::new(
            Metrics::new().map_err(|e| std::io::Error::other(e.to_string()))?,
        );

        let state = AppState::new(stores.clone(), Arc::new(Catalog::builtin()), metrics.clone())
            .with_delays(delays);
        let health = HealthState::new(metrics.clone()).with_stores(stores.clone());
        let app = reso_ingress::router(Arc::new(state), health);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                tracing::error!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            stores,
            metrics,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Stop accepting connections and wait for the server task
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Fetch a JSON document from the server
pub async fn get_json(client: &reqwest::Client, url: &str) -> reqwest::Result<serde_json::Value> {
    client.get(url).send().await?.json().await
}
