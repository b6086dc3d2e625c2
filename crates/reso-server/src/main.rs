//! Reso server
//!
//! This server provides:
//! - Search, click and client-behavior logging into bounded in-memory stores
//! - An analytics report (unique users, top lists, 24h timeline, recent activity)
//! - Mock product listing and product detail endpoints
//! - Keyword-based search intent lookup
//! - Health, readiness and Prometheus metrics endpoints
//!
//! Usage:
//! ```bash
//! # With config file
//! reso-server --config config.yaml
//!
//! # Or with environment variables
//! RESO_PORT=8080 RESO_DISABLE_DELAYS=true reso-server
//!
//! # Validate a config file without starting
//! reso-server --config config.yaml check-config
//! ```
//!
//! Test with:
//! ```bash
//! curl http://localhost:3000/api/log-search \
//!   -H "Content-Type: application/json" \
//!   -H "x-session-id: demo" \
//!   -d '{"query": "wireless headphones"}'
//!
//! curl http://localhost:3000/api/analytics
//! ```

mod app;
mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::{LogFormat, ServerConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Reso Server - behavior logging, analytics and intent lookup
#[derive(Parser)]
#[command(name = "reso-server", version)]
#[command(about = "Reso behavior-logging and intent service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "RESO_CONFIG",
        global = true
    )]
    config: Option<String>,

    /// Address to bind (overrides config and environment)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port to listen on (overrides config and environment)
    #[arg(short, long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server (default if no command specified)
    Serve,
    /// Load and validate the configuration, then exit
    CheckConfig,
}

fn load_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => ServerConfig::default(),
    };

    // Merge environment variables (they override config file)
    config.merge_env();

    // CLI flags have the highest precedence
    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    config.validate()?;
    Ok(config)
}

fn init_tracing(config: &ServerConfig) -> anyhow::Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // RUST_LOG wins when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}", log_level)));

    let builder = FmtSubscriber::builder().with_env_filter(filter);
    match config.logging.format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if let Some(Commands::CheckConfig) = cli.command {
        println!("{}", serde_yaml::to_string(&config)?);
        println!("✅ Configuration is valid");
        return Ok(());
    }

    init_tracing(&config)?;

    info!("🚀 Initializing Reso server");
    info!(
        "🗃️  Log stores: search={}, click={}, client={}",
        config.stores.search_capacity, config.stores.click_capacity, config.stores.client_capacity
    );
    info!(
        "⏱️  Simulated latency: thread={}ms, vibe={}ms",
        config.delays.thread_ms, config.delays.vibe_ms
    );

    let app = app::build_app(&config)?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("");
    info!("✅ Reso listening on http://{}", addr);
    info!("   API endpoints:");
    info!("   - Logging:   http://{}/api/log-search, /api/log-click, /api/client-log", addr);
    info!("   - Analytics: http://{}/api/analytics", addr);
    info!("   - Catalog:   http://{}/api/products, /api/thread?id=", addr);
    info!("   - Intent:    http://{}/api/vibe", addr);
    info!("   Observability:");
    info!("   - Health check:       http://{}/healthz", addr);
    info!("   - Readiness check:    http://{}/readyz", addr);
    info!("   - Prometheus metrics: http://{}/metrics", addr);
    info!("");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
