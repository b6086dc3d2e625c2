//! Analytics endpoint

use crate::state::AppState;
use crate::types::IngressResult;
use axum::{Json, extract::State};
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// `GET /api/analytics`
///
/// Snapshots each store under its read lock, then aggregates outside the
/// locks.
pub async fn analytics(State(state): State<Arc<AppState>>) -> IngressResult<Json<Value>> {
    let start = Instant::now();

    let searches = state.stores.search()?.list();
    let clicks = state.stores.click()?.list();
    let client_events = state.stores.client()?.list();

    let now = Utc::now();
    let report = reso_core::summarize(&searches, &clicks, &client_events, now, &state.analytics);

    let elapsed = start.elapsed();
    state.metrics.record_analytics(elapsed.as_secs_f64());
    debug!(
        searches = searches.len(),
        clicks = clicks.len(),
        client_events = client_events.len(),
        elapsed_us = elapsed.as_micros() as u64,
        "Generated analytics report"
    );

    Ok(Json(json!({
        "success": true,
        "data": report,
        "generatedAt": now,
    })))
}
