//! Reso Core Types and Logic
//!
//! This crate provides the building blocks shared by the reso service:
//! - Log entry records (search, click, client behavior)
//! - Bounded in-memory log stores
//! - The analytics aggregator
//! - The keyword intent classifier
//! - The mock product catalog
//! - Core error types

pub mod aggregator;
pub mod catalog;
pub mod error;
pub mod intent;
pub mod log_entry;
pub mod log_store;

pub use aggregator::{
    AggregateOptions, AnalyticsReport, MAX_RECENT_LIMIT, MAX_TIMELINE_HOURS, MAX_TOP_N,
    client_event_counts, summarize,
};
pub use catalog::Catalog;
pub use error::{Error, Result};
pub use intent::{IntentBucket, IntentClassifier};
pub use log_entry::{
    ClickInput, ClickLog, ClientEventKind, ClientLog, LogRecord, RequestOrigin, SearchInput, SearchLog,
    TrackedEvent,
};
pub use log_store::{LogStore, LogStores, MAX_STORE_CAPACITY, StoreCapacities, StoreStatus};
