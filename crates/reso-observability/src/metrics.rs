//! Metrics collection with Prometheus
//!
//! This module provides Prometheus metrics for reso:
//! - Events recorded and evicted per log store
//! - Current log store fill levels
//! - Intent classifications per bucket
//! - Analytics request counts and latency
//! - Error responses by status code

use prometheus::{Counter, CounterVec, GaugeVec, Histogram, HistogramOpts, Opts, Registry};
use std::sync::Arc;

/// Metrics collector for reso
#[derive(Clone)]
pub struct Metrics {
    /// Prometheus registry
    registry: Arc<Registry>,

    // Log store metrics
    /// Events appended to a log store
    pub events_recorded: CounterVec,
    /// Events dropped to keep a store within its capacity
    pub events_evicted: CounterVec,
    /// Entries currently held by each store
    pub log_store_entries: GaugeVec,

    // Intent metrics
    /// Queries classified, by intent bucket
    pub intent_classifications: CounterVec,

    // Analytics metrics
    /// Analytics reports generated
    pub analytics_requests: Counter,
    /// Time spent aggregating a report
    pub analytics_duration_seconds: Histogram,

    // Error metrics
    /// Error responses, by HTTP status
    pub request_errors: CounterVec,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let events_recorded = CounterVec::new(
            Opts::new(
                "reso_events_recorded_total",
                "Total number of events appended to a log store",
            ),
            &["log"],
        )?;

        let events_evicted = CounterVec::new(
            Opts::new(
                "reso_events_evicted_total",
                "Total number of events evicted from a full log store",
            ),
            &["log"],
        )?;

        let log_store_entries = GaugeVec::new(
            Opts::new(
                "reso_log_store_entries",
                "Number of entries currently held by a log store",
            ),
            &["log"],
        )?;

        let intent_classifications = CounterVec::new(
            Opts::new(
                "reso_intent_classifications_total",
                "Total number of queries classified, by intent bucket",
            ),
            &["bucket"],
        )?;

        let analytics_requests = Counter::with_opts(Opts::new(
            "reso_analytics_requests_total",
            "Total number of analytics reports generated",
        ))?;

        let analytics_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "reso_analytics_duration_seconds",
                "Analytics aggregation duration in seconds",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.05]),
        )?;

        let request_errors = CounterVec::new(
            Opts::new(
                "reso_request_errors_total",
                "Total number of error responses, by HTTP status",
            ),
            &["status"],
        )?;

        registry.register(Box::new(events_recorded.clone()))?;
        registry.register(Box::new(events_evicted.clone()))?;
        registry.register(Box::new(log_store_entries.clone()))?;
        registry.register(Box::new(intent_classifications.clone()))?;
        registry.register(Box::new(analytics_requests.clone()))?;
        registry.register(Box::new(analytics_duration_seconds.clone()))?;
        registry.register(Box::new(request_errors.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            events_recorded,
            events_evicted,
            log_store_entries,
            intent_classifications,
            analytics_requests,
            analytics_duration_seconds,
            request_errors,
        })
    }

    /// Get the Prometheus registry for exporting metrics
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record an append to a log store
    pub fn record_events(&self, log: &str, recorded: usize, evicted: usize, entries: usize) {
        self.events_recorded
            .with_label_values(&[log])
            .inc_by(recorded as f64);
        if evicted > 0 {
            self.events_evicted
                .with_label_values(&[log])
                .inc_by(evicted as f64);
        }
        self.log_store_entries
            .with_label_values(&[log])
            .set(entries as f64);
    }

    /// Record an intent classification
    pub fn record_classification(&self, bucket: &str) {
        self.intent_classifications
            .with_label_values(&[bucket])
            .inc();
    }

    /// Record a generated analytics report
    pub fn record_analytics(&self, duration_secs: f64) {
        self.analytics_requests.inc();
        self.analytics_duration_seconds.observe(duration_secs);
    }

    /// Record an error response
    pub fn record_error(&self, status: u16) {
        self.request_errors
            .with_label_values(&[status.to_string().as_str()])
            .inc();
    }
}
