//! Shared ingress types and utilities

use axum::http::StatusCode;
use reso_core::RequestOrigin;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request ID for tracing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new request ID
    pub fn generate() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let count = COUNTER.fetch_add(1, Ordering::Relaxed);
        let timestamp = chrono::Utc::now().timestamp_micros();

        Self(format!("req_{:x}_{:x}", timestamp, count))
    }

    /// Create from existing string
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    /// Get the string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ingress error types
#[derive(Debug, Error)]
pub enum IngressError {
    /// Invalid request format or missing field
    #[error("{0}")]
    InvalidRequest(String),

    /// Requested record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Body was not valid JSON for the endpoint
    #[error("Invalid JSON body: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error raised while building or storing a record
    #[error(transparent)]
    Core(#[from] reso_core::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IngressError {
    /// HTTP status the error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            IngressError::InvalidRequest(_) | IngressError::Serialization(_) => {
                StatusCode::BAD_REQUEST
            }
            IngressError::NotFound(_) => StatusCode::NOT_FOUND,
            IngressError::Core(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            IngressError::Core(_) | IngressError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for IngressError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        // server-side details stay in the log
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
            self.to_string()
        };

        let body = serde_json::json!({
            "success": false,
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Ingress result type
pub type IngressResult<T> = Result<T, IngressError>;

/// Request metadata collected during ingress
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// Request ID
    pub request_id: RequestId,
    /// Client address, user agent and session
    pub origin: RequestOrigin,
    /// Request timestamp
    pub timestamp: i64,
}

impl RequestMetadata {
    /// Create new request metadata
    pub fn new() -> Self {
        Self {
            request_id: RequestId::generate(),
            origin: RequestOrigin::default(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// Set client IP
    pub fn with_client_ip(mut self, ip: String) -> Self {
        self.origin.ip = ip;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, ua: String) -> Self {
        self.origin.user_agent = Some(ua);
        self
    }

    /// Set session ID
    pub fn with_session_id(mut self, id: String) -> Self {
        self.origin.session_id = id;
        self
    }
}

impl Default for RequestMetadata {
    fn default() -> Self {
        Self::new()
    }
}
