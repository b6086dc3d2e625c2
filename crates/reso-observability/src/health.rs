//! Health endpoints
//!
//! This module provides HTTP health check endpoints:
//! - `/healthz` - Liveness (200 OK with version and uptime while the process serves)
//! - `/readyz` - Readiness (per-store fill level and eviction pressure)
//! - `/metrics` - Prometheus metrics endpoint

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus::TextEncoder;
use reso_core::{LogStores, StoreStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::Metrics;

/// How close a log store is to dropping entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorePressure {
    /// Nothing recorded yet
    Empty,
    /// Below 90% of capacity
    Normal,
    /// At or above 90% of capacity, nothing evicted yet
    NearCapacity,
    /// The store has already dropped its oldest entries
    Evicting,
}

impl StorePressure {
    pub fn classify(entries: usize, capacity: usize, total_evicted: u64) -> Self {
        if total_evicted > 0 {
            Self::Evicting
        } else if entries == 0 {
            Self::Empty
        } else if entries.saturating_mul(10) >= capacity.saturating_mul(9) {
            Self::NearCapacity
        } else {
            Self::Normal
        }
    }
}

/// One store as reported by `/readyz`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreReport {
    pub name: String,
    pub entries: usize,
    pub capacity: usize,
    pub fill_ratio: f64,
    pub total_appended: u64,
    pub total_evicted: u64,
    pub pressure: StorePressure,
}

impl From<StoreStatus> for StoreReport {
    fn from(status: StoreStatus) -> Self {
        let fill_ratio = if status.capacity == 0 {
            0.0
        } else {
            status.entries as f64 / status.capacity as f64
        };

        Self {
            pressure: StorePressure::classify(status.entries, status.capacity, status.total_evicted),
            name: status.name,
            entries: status.entries,
            capacity: status.capacity,
            fill_ratio,
            total_appended: status.total_appended,
            total_evicted: status.total_evicted,
        }
    }
}

/// Liveness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub uptime_secs: u64,
    #[serde(default)]
    pub stores: Vec<StoreReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    /// Metrics collector
    pub metrics: Arc<Metrics>,
    /// Log stores reported by `/readyz`
    pub stores: Option<Arc<LogStores>>,
    started: Instant,
}

impl HealthState {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            metrics,
            stores: None,
            started: Instant::now(),
        }
    }

    /// Report fill levels of `stores` on `/readyz` and `/metrics`
    pub fn with_stores(mut self, stores: Arc<LogStores>) -> Self {
        self.stores = Some(stores);
        self
    }

    fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Current store reports; an error means a store lock is poisoned
    pub fn store_reports(&self) -> reso_core::Result<Vec<StoreReport>> {
        match &self.stores {
            Some(stores) => Ok(stores
                .statuses()?
                .into_iter()
                .map(StoreReport::from)
                .collect()),
            None => Ok(Vec::new()),
        }
    }
}

/// Create health check router
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn healthz(State(state): State<HealthState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Returns 503 when a log store can no longer be read
async fn readyz(State(state): State<HealthState>) -> Response {
    match state.store_reports() {
        Ok(stores) => (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready".to_string(),
                uptime_secs: state.uptime_secs(),
                stores,
                message: None,
            }),
        )
            .into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    status: "not_ready".to_string(),
                    uptime_secs: state.uptime_secs(),
                    stores: Vec::new(),
                    message: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Prometheus metrics handler
///
/// Refreshes the store gauges before encoding so an idle store still
/// reports its current size.
async fn metrics_handler(State(state): State<HealthState>) -> Response {
    match state.store_reports() {
        Ok(reports) => {
            for report in reports {
                state
                    .metrics
                    .log_store_entries
                    .with_label_values(&[report.name.as_str()])
                    .set(report.entries as f64);
            }
        }
        Err(err) => tracing::warn!(error = %err, "Skipping store gauges"),
    }

    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry().gather();

    match encoder.encode_to_string(&metric_families) {
        Ok(body) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", err),
            )
                .into_response()
        }
    }
}
