//! Event logging endpoints
//!
//! `POST` appends to the matching log store, `GET` lists the current
//! contents oldest first. Bodies are parsed here rather than through the
//! `Json` extractor so malformed input gets the same JSON error shape as
//! every other failure.

use crate::middleware::RequestMetadataExt;
use crate::state::AppState;
use crate::types::IngressResult;
use axum::{Extension, Json, extract::State};
use bytes::Bytes;
use chrono::Utc;
use reso_core::{
    ClickInput, ClickLog, ClientLog, SearchInput, SearchLog, TrackedEvent, client_event_counts,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};

fn record_store_metrics(state: &AppState, log: &str, recorded: usize, evicted: usize, entries: usize) {
    state.metrics.record_events(log, recorded, evicted, entries);
    if evicted > 0 {
        debug!(log, evicted, entries, "Evicted oldest log entries");
    }
}

/// `POST /api/log-search`
pub async fn record_search(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestMetadataExt>,
    body: Bytes,
) -> IngressResult<Json<Value>> {
    let input: SearchInput = serde_json::from_slice(&body)?;
    let entry = SearchLog::from_input(input, &ctx.0.origin, Utc::now())?;

    info!(
        log_id = %entry.id,
        query = entry.query.as_deref().unwrap_or(""),
        session_id = %entry.session_id,
        ip = %entry.ip,
        "Search logged"
    );

    let log_id = entry.id.clone();
    let (evicted, entries) = {
        let mut store = state.stores.search_mut()?;
        let evicted = store.append(entry);
        (evicted, store.len())
    };
    record_store_metrics(&state, "search", 1, evicted, entries);

    Ok(Json(json!({
        "success": true,
        "message": "Search logged successfully",
        "logId": log_id,
    })))
}

/// `GET /api/log-search`
pub async fn list_searches(State(state): State<Arc<AppState>>) -> IngressResult<Json<Value>> {
    let data = state.stores.search()?.list();

    Ok(Json(json!({
        "success": true,
        "total": data.len(),
        "data": data,
    })))
}

/// `POST /api/log-click`
pub async fn record_click(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestMetadataExt>,
    body: Bytes,
) -> IngressResult<Json<Value>> {
    let input: ClickInput = serde_json::from_slice(&body)?;
    let entry = ClickLog::from_input(input, &ctx.0.origin, Utc::now())?;

    info!(
        log_id = %entry.id,
        product_id = %entry.product_id,
        title = entry.title.as_deref().unwrap_or(""),
        category = entry.category.as_deref().unwrap_or(""),
        session_id = %entry.session_id,
        "Click logged"
    );

    let log_id = entry.id.clone();
    let (evicted, entries) = {
        let mut store = state.stores.click_mut()?;
        let evicted = store.append(entry);
        (evicted, store.len())
    };
    record_store_metrics(&state, "click", 1, evicted, entries);

    Ok(Json(json!({
        "success": true,
        "message": "Click logged successfully",
        "logId": log_id,
    })))
}

/// `GET /api/log-click`
pub async fn list_clicks(State(state): State<Arc<AppState>>) -> IngressResult<Json<Value>> {
    let data = state.stores.click()?.list();

    Ok(Json(json!({
        "success": true,
        "total": data.len(),
        "data": data,
    })))
}

/// `POST /api/client-log`
///
/// Accepts either a batch (JSON array, as sent by the tracker) or a single
/// event object. A batch is validated as a whole before anything is stored.
pub async fn record_client_events(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestMetadataExt>,
    body: Bytes,
) -> IngressResult<Json<Value>> {
    let value: Value = serde_json::from_slice(&body)?;
    let now = Utc::now();
    let origin = &ctx.0.origin;

    if value.is_array() {
        let events: Vec<TrackedEvent> = serde_json::from_value(value)?;
        let logs = events
            .into_iter()
            .map(|event| ClientLog::from_event(event, origin, now))
            .collect::<reso_core::Result<Vec<_>>>()?;

        for log in &logs {
            info!(
                kind = %log.kind,
                user_id = log.user_id.as_deref().unwrap_or(""),
                url = log.url.as_deref().unwrap_or(""),
                payload = ?log.payload,
                "Client behavior"
            );
        }

        let count = logs.len();
        let (evicted, entries) = {
            let mut store = state.stores.client_mut()?;
            let evicted = store.extend(logs);
            (evicted, store.len())
        };
        record_store_metrics(&state, "client", count, evicted, entries);

        return Ok(Json(json!({
            "success": true,
            "message": format!("Logged {} client events", count),
            "count": count,
        })));
    }

    let event: TrackedEvent = serde_json::from_value(value)?;
    let log = ClientLog::from_event(event, origin, now)?;
    info!(log_id = %log.id, kind = %log.kind, "Client log");

    let log_id = log.id.clone();
    let (evicted, entries) = {
        let mut store = state.stores.client_mut()?;
        let evicted = store.append(log);
        (evicted, store.len())
    };
    record_store_metrics(&state, "client", 1, evicted, entries);

    Ok(Json(json!({
        "success": true,
        "message": "Client event logged successfully",
        "logId": log_id,
    })))
}

/// `GET /api/client-log`
pub async fn list_client_events(State(state): State<Arc<AppState>>) -> IngressResult<Json<Value>> {
    let data = state.stores.client()?.list();
    let stats = client_event_counts(&data);

    Ok(Json(json!({
        "success": true,
        "total": data.len(),
        "stats": stats,
        "data": data,
    })))
}
