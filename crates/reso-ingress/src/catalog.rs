//! Product listing and product detail endpoints

use crate::state::AppState;
use crate::types::{IngressError, IngressResult};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use reso_core::catalog::ThreadDetail;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct ThreadQuery {
    pub id: Option<String>,
}

/// `GET /api/products`
pub async fn list_products(State(state): State<Arc<AppState>>) -> Json<Value> {
    let products = state.catalog.products();

    Json(json!({
        "data": products,
        "total": products.len(),
    }))
}

/// `GET /api/thread?id=`
pub async fn thread_detail(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ThreadQuery>, QueryRejection>,
) -> IngressResult<Json<ThreadDetail>> {
    let Query(query) = query.map_err(|rejection| {
        IngressError::InvalidRequest(format!("Invalid query string: {}", rejection.body_text()))
    })?;

    let id = query
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| {
            IngressError::InvalidRequest("Thread ID is required as query parameter".to_string())
        })?;

    let delay = state.delays.thread();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    state
        .catalog
        .thread(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| IngressError::NotFound("Thread not found".to_string()))
}
