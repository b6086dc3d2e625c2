//! Reso client-side event tracker
//!
//! Buffers behavior events (pageviews, scrolls, clicks, hovers, searches)
//! and ships them in batches to the client log endpoint:
//! - [`EventQueue`]: the idle-flush batching queue
//! - [`EventSink`]: where batches go; [`HttpSink`] posts them with reqwest
//! - [`Tracker`]: page-level helpers on top of the queue

pub mod config;
pub mod error;
pub mod queue;
pub mod sink;
pub mod tracker;

pub use config::{TrackerConfig, TrackerContext};
pub use error::{Result, TrackerError};
pub use queue::EventQueue;
pub use sink::{EventSink, HttpSink};
pub use tracker::Tracker;
