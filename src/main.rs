//! toktune - Song recognition service for social-media video links
//!
//! Pipeline per request: validate source URL, format the clip start offset,
//! extract a 10-second audio clip via the configured downloader, submit it to
//! the audd.io recognition API, return formatted track metadata.

use std::net::SocketAddr;

use anyhow::Result;
use clap::Parser;
use toktune::config::{Cli, Config};
use toktune::{build_router, AppState};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification IMMEDIATELY after tracing init for instant startup feedback
    info!(
        "Starting toktune v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();
    let config = Config::resolve(&cli)?;

    if config.audd_token.is_empty() {
        warn!("No audd.io API token configured; recognition requests will be rejected upstream");
    }
    info!(
        downloader = %config.downloader,
        work_dir = %config.work_dir.display(),
        "Using external downloader"
    );

    let bind = config.bind.clone();
    let state = AppState::new(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("toktune listening on http://{bind}");
    info!("Health check: http://{bind}/health");

    // ConnectInfo supplies the peer address the rate limiter falls back to
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
