//! Search intent endpoint

use crate::state::AppState;
use crate::types::{IngressError, IngressResult};
use axum::{Json, extract::State};
use bytes::Bytes;
use reso_core::intent::IntentResponse;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct VibeRequest {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// `POST /api/vibe`
pub async fn vibe(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> IngressResult<Json<IntentResponse>> {
    let request: VibeRequest = serde_json::from_slice(&body)?;
    let (Some(uuid), Some(query)) = (present(request.uuid), present(request.query)) else {
        return Err(IngressError::InvalidRequest(
            "UUID and query are required".to_string(),
        ));
    };

    info!(uuid = %uuid, query = %query, "Intent lookup");

    let delay = state.delays.vibe();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let classification = state.classifier.classify(&query);
    state
        .metrics
        .record_classification(classification.bucket.as_str());

    Ok(Json(classification.response))
}
