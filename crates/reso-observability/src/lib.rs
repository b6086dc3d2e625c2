//! Reso Observability
//!
//! This crate provides observability features:
//! - Metrics collection (Prometheus)
//! - Health endpoints reporting log store pressure

pub mod health;
pub mod metrics;

pub use health::{HealthState, StorePressure, StoreReport, health_router};
pub use metrics::Metrics;
