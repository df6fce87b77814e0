//! leme-api - Learning track suggestion and success prediction service
//!
//! Loads the exported models, encoders and track catalog once at startup,
//! then serves:
//! - GET  /health
//! - POST /suggest_track
//! - POST /predict_success

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use leme_api::artifacts::{load_service, ArtifactPaths};
use leme_api::{build_router, AppState, HttpLimits};
use leme_common::config::{load_bootstrap_config, ConfigOverrides, ServiceSettings};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for leme-api
#[derive(Parser, Debug)]
#[command(name = "leme-api")]
#[command(about = "Learning track suggestion and success prediction service")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "LEME_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "LEME_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "LEME_PORT")]
    port: Option<u16>,

    /// Directory containing model, scaler and encoder artifacts
    #[arg(short, long, env = "LEME_ARTIFACTS_DIR")]
    artifacts_dir: Option<PathBuf>,

    /// Track catalog JSON (defaults to <artifacts-dir>/tracks.json)
    #[arg(long, env = "LEME_CATALOG")]
    catalog: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before the subscriber exists so its log level can apply;
    // where it came from is logged once the subscriber is up
    let bootstrap =
        load_bootstrap_config(args.config.as_deref()).context("Failed to load config")?;
    let settings = ServiceSettings::resolve(
        ConfigOverrides {
            host: args.host,
            port: args.port,
            artifacts_dir: args.artifacts_dir,
            catalog_path: args.catalog,
        },
        bootstrap.config.clone(),
    )
    .context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=info", settings.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting LEME prediction API (leme-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    bootstrap.log_source();
    info!("Artifacts directory: {}", settings.artifacts_dir.display());
    info!("Catalog: {}", settings.catalog_path.display());

    let paths = ArtifactPaths::in_dir(&settings.artifacts_dir, settings.catalog_path.clone());
    let service = load_service(&paths, settings.track_variant_suffixes.clone())
        .context("Failed to load model artifacts")?;
    info!("✓ All models loaded");

    let state = AppState::new(
        service,
        HttpLimits {
            request_timeout: settings.request_timeout,
            max_body_bytes: settings.max_body_bytes,
        },
    );
    let app = build_router(state);

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("leme-api listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
