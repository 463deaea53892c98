//! formcheck-va - Exercise Video Analysis Service
//!
//! Analyzes uploaded exercise videos along two independent axes — facial
//! expression and body-posture quality — and fuses them into one coached
//! score. Frame extraction and emotion detection run behind collaborator
//! interfaces; this binary wires the ffmpeg and HTTP implementations.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use formcheck_va::config::ServiceConfig;
use formcheck_va::services::{
    FfmpegMediaProbe, FrameSampler, HttpEmotionDetector, LandmarkAggregator,
};
use formcheck_va::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting formcheck-va (Exercise Video Analysis) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let toml_config = formcheck_common::config::load_default_config()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    let config = ServiceConfig::resolve(&toml_config);

    let probe = FfmpegMediaProbe::new(config.ffmpeg_path.clone(), config.ffprobe_path.clone());
    let detector = HttpEmotionDetector::new(config.emotion_endpoint.clone());
    let sampler =
        FrameSampler::new(Arc::new(probe), Arc::new(detector)).with_tail_count(config.tail_count);
    let aggregator = LandmarkAggregator::new();

    let state = AppState::new(sampler, aggregator.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", config.listen_port)).await?;
    info!("Listening on http://127.0.0.1:{}", config.listen_port);
    info!("Health check: http://127.0.0.1:{}/health", config.listen_port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // One best-effort flush of any partially filled landmark batch; by now
    // the caller has moved on, so its outcome is only logged.
    aggregator.finish().await;
    info!("formcheck-va stopped");

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
