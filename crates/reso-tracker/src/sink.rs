//! Batch destinations

use crate::{Result, TrackerConfig, TrackerError};
use async_trait::async_trait;
use reqwest::Client;
use reso_core::TrackedEvent;
use std::time::Duration;
use tracing::debug;

/// Receives batches flushed by the [`EventQueue`](crate::EventQueue)
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one batch; the queue drops it on error
    async fn send_batch(&self, events: &[TrackedEvent]) -> Result<()>;
}

/// Posts batches as a JSON array to the client log endpoint
pub struct HttpSink {
    client: Client,
    endpoint: String,
}

impl HttpSink {
    pub fn new(config: &TrackerConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(TrackerError::Config("endpoint must not be empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("reso-tracker/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TrackerError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EventSink for HttpSink {
    async fn send_batch(&self, events: &[TrackedEvent]) -> Result<()> {
        let response = self.client.post(&self.endpoint).json(events).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::Status {
                status: status.as_u16(),
            });
        }

        debug!(endpoint = %self.endpoint, count = events.len(), "Posted client event batch");
        Ok(())
    }
}
