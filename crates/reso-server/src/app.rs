//! Wiring from configuration to a ready-to-serve router

use crate::config::ServerConfig;
use anyhow::Context;
use axum::Router;
use reso_core::{Catalog, LogStores};
use reso_ingress::AppState;
use reso_observability::{HealthState, Metrics};
use std::sync::Arc;
use tracing::info;

pub fn load_catalog(config: &ServerConfig) -> anyhow::Result<Catalog> {
    match &config.catalog_path {
        Some(path) => {
            let catalog = Catalog::from_file(path)
                .with_context(|| format!("Failed to load catalog from {}", path.display()))?;
            info!(
                "📦 Loaded catalog from {} ({} products, {} threads)",
                path.display(),
                catalog.products().len(),
                catalog.thread_count()
            );
            Ok(catalog)
        }
        None => {
            info!("📦 Using built-in demo catalog");
            Ok(Catalog::builtin())
        }
    }
}

/// Build the full application router from a validated config
pub fn build_app(config: &ServerConfig) -> anyhow::Result<Router> {
    let stores = Arc::new(LogStores::new(config.stores)?);
    let catalog = Arc::new(load_catalog(config)?);
    let metrics = Arc::new(Metrics::new()?);

    let state = AppState::new(stores.clone(), catalog, metrics.clone())
        .with_analytics(config.analytics)
        .with_delays(config.delays);

    let health_state = HealthState::new(metrics).with_stores(stores);

    Ok(reso_ingress::router(Arc::new(state), health_state))
}
