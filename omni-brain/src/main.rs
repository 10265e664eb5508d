//! omni-brain - Inference Orchestration Service
//!
//! **Module Identity:**
//! - Name: omni-brain
//! - Port: 5500
//!
//! **[BRN-OV-010]** Long-lived backend behind the desktop launcher and
//! the boot dashboard. Lazily loads the language model, embedding model
//! and vector store, and serves `/ask`, `/search`, `/action` and
//! `/install_plan`.

use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use omni_brain::config::{BrainConfig, CliArgs};
use omni_brain::AppState;

/// Delay before the background warm load kicks in.
const WARM_LOAD_DELAY: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = CliArgs::parse();
    let config = BrainConfig::resolve(&cli)?;

    info!("Starting omni-brain (inference orchestration) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Model: {}", config.model_path.display());
    info!("Store: {}", config.store_path.display());

    let bind_addr = format!("{}:{}", config.host, config.port);
    let state = AppState::from_config(config)?;
    let app = omni_brain::build_router(state.clone());

    // Warm load shortly after boot so the first request doesn't pay the
    // full load cost; earlier requests block on the same attempt
    let registry = state.registry.clone();
    tokio::spawn(async move {
        tokio::time::sleep(WARM_LOAD_DELAY).await;
        registry.ensure_ready().await;
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
