//! Tracker error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Endpoint rejected batch with status {status}")]
    Status { status: u16 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tracker worker has stopped")]
    ChannelClosed,

    #[error("Tracker worker panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, TrackerError>;
