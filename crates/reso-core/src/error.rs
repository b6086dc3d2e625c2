//! Error types for Reso Core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Log store capacity must be between 1 and {max} (got {0})", max = crate::log_store::MAX_STORE_CAPACITY)]
    InvalidCapacity(usize),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the error was caused by the caller's data
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::InvalidTimestamp { .. } | Error::Serialization(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(Error::InvalidInput("productId is required".into()).is_client_error());
        assert!(
            Error::InvalidTimestamp {
                value: "yesterday".into(),
                reason: "input contains invalid characters".into(),
            }
            .is_client_error()
        );
        assert!(!Error::Internal("lock poisoned".into()).is_client_error());
        assert!(!Error::InvalidCapacity(0).is_client_error());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::InvalidCapacity(0).to_string(),
            "Log store capacity must be between 1 and 1000000 (got 0)"
        );
        assert_eq!(
            Error::InvalidInput("productId is required".into()).to_string(),
            "Invalid input: productId is required"
        );
    }
}
