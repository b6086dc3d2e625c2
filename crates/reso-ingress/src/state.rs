//! Shared handler state

use reso_core::{AggregateOptions, Catalog, IntentClassifier, LogStores};
use reso_observability::Metrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Simulated backend latency for the catalog and intent endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayConfig {
    /// Delay before answering `/api/thread`, in milliseconds
    #[serde(default = "default_thread_ms")]
    pub thread_ms: u64,
    /// Delay before answering `/api/vibe`, in milliseconds
    #[serde(default = "default_vibe_ms")]
    pub vibe_ms: u64,
}

fn default_thread_ms() -> u64 {
    500
}

fn default_vibe_ms() -> u64 {
    800
}

impl DelayConfig {
    /// No artificial latency
    pub fn disabled() -> Self {
        Self {
            thread_ms: 0,
            vibe_ms: 0,
        }
    }

    pub fn thread(&self) -> Duration {
        Duration::from_millis(self.thread_ms)
    }

    pub fn vibe(&self) -> Duration {
        Duration::from_millis(self.vibe_ms)
    }
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            thread_ms: default_thread_ms(),
            vibe_ms: default_vibe_ms(),
        }
    }
}

/// Everything the API handlers share
pub struct AppState {
    pub stores: Arc<LogStores>,
    pub catalog: Arc<Catalog>,
    pub classifier: IntentClassifier,
    pub metrics: Arc<Metrics>,
    pub analytics: AggregateOptions,
    pub delays: DelayConfig,
}

impl AppState {
    pub fn new(stores: Arc<LogStores>, catalog: Arc<Catalog>, metrics: Arc<Metrics>) -> Self {
        Self {
            stores,
            catalog,
            classifier: IntentClassifier::new(),
            metrics,
            analytics: AggregateOptions::default(),
            delays: DelayConfig::default(),
        }
    }

    pub fn with_analytics(mut self, analytics: AggregateOptions) -> Self {
        self.analytics = analytics;
        self
    }

    pub fn with_delays(mut self, delays: DelayConfig) -> Self {
        self.delays = delays;
        self
    }
}
