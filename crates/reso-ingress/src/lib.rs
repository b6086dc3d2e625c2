//! Reso HTTP ingress
//!
//! This crate provides the REST surface of the service:
//! - Search, click and client-behavior logging endpoints
//! - The analytics report
//! - Mock product listing and product detail
//! - Keyword intent lookup
//!
//! All routes share the request context middleware, which extracts the
//! client address, user agent and session id, and stamps `x-request-id` on
//! the response.

pub mod analytics;
pub mod catalog;
pub mod logs;
pub mod middleware;
pub mod state;
pub mod types;
pub mod vibe;

pub use middleware::{RequestMetadataExt, SESSION_HEADER};
pub use state::{AppState, DelayConfig};
pub use types::{IngressError, IngressResult, RequestId, RequestMetadata};

use axum::{Router, routing::get, routing::post};
use reso_observability::{HealthState, health_router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Logging handlers read `RequestMetadataExt`, so these routes are only
// served through `router`, which installs the context middleware.
fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/log-search",
            post(logs::record_search).get(logs::list_searches),
        )
        .route(
            "/api/log-click",
            post(logs::record_click).get(logs::list_clicks),
        )
        .route(
            "/api/client-log",
            post(logs::record_client_events).get(logs::list_client_events),
        )
        .route("/api/analytics", get(analytics::analytics))
        .route("/api/products", get(catalog::list_products))
        .route("/api/thread", get(catalog::thread_detail))
        .route("/api/vibe", post(vibe::vibe))
        .with_state(state)
}

/// Full application: API plus health/metrics routes, with request context,
/// error metrics and HTTP tracing layered over everything
pub fn router(state: Arc<AppState>, health: HealthState) -> Router {
    let metrics = state.metrics.clone();

    api_routes(state)
        .merge(health_router(health))
        .layer(axum::middleware::from_fn_with_state(
            metrics,
            middleware::error_metrics_middleware,
        ))
        .layer(axum::middleware::from_fn(
            middleware::request_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}
