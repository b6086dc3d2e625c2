//! Shared ingress middleware

use crate::types::RequestMetadata;
use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use reso_observability::Metrics;
use std::sync::Arc;

/// Header carrying the client-side session id
pub const SESSION_HEADER: &str = "x-session-id";

/// Extension key for request metadata
#[derive(Clone)]
pub struct RequestMetadataExt(pub RequestMetadata);

/// Middleware to add request ID and client origin to all requests
pub async fn request_context_middleware(mut req: Request, next: Next) -> Response {
    let headers = req.headers();

    let mut metadata = RequestMetadata::new();

    // Take the first IP in the list
    if let Some(forwarded_for) = headers.get("x-forwarded-for")
        && let Ok(ip) = forwarded_for.to_str()
    {
        let client_ip = ip.split(',').next().unwrap_or(ip).trim();
        if !client_ip.is_empty() {
            metadata = metadata.with_client_ip(client_ip.to_string());
        }
    }

    if let Some(user_agent) = headers.get(header::USER_AGENT)
        && let Ok(ua) = user_agent.to_str()
    {
        metadata = metadata.with_user_agent(ua.to_string());
    }

    if let Some(session) = headers.get(SESSION_HEADER)
        && let Ok(id) = session.to_str()
        && !id.trim().is_empty()
    {
        metadata = metadata.with_session_id(id.trim().to_string());
    }

    let request_id = metadata.request_id.clone();

    req.extensions_mut().insert(RequestMetadataExt(metadata));

    let mut response = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

/// Middleware counting error responses by status
pub async fn error_metrics_middleware(
    State(metrics): State<Arc<Metrics>>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        metrics.record_error(status.as_u16());
    }

    response
}
