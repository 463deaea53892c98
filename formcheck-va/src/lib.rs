//! formcheck-va library interface
//!
//! Exposes the scoring pipeline, services, and router for integration
//! testing.

pub mod api;
pub mod config;
pub mod error;
pub mod scoring;
pub mod services;
pub mod types;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::services::{FrameSampler, LandmarkAggregator};

/// Upload size bound for the analyze endpoint
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Frame sampling orchestrator with its collaborators
    pub sampler: Arc<FrameSampler>,
    /// Running posture scores fed by landmark batches
    pub aggregator: LandmarkAggregator,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last fatal error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(sampler: FrameSampler, aggregator: LandmarkAggregator) -> Self {
        Self {
            sampler: Arc::new(sampler),
            aggregator,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::analyze_routes())
        .merge(api::posture_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
