//! classwise -- timetable conflict checking and adaptive stream quality
//! advice for self-hosted e-learning deployments.
//!
//! The decision logic lives in [`timetable`] (hard/soft conflict
//! classification) and [`quality`] (tier recommendation); the rest of
//! the crate is the service shell around it: SQLite persistence, an
//! HTTP API, and a background network monitor.

pub mod api;
pub mod config;
pub mod quality;
pub mod storage;
pub mod timetable;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::config::AppConfig;
use crate::quality::monitor::{self, LinkSpeedProvider, SampleProvider};

/// Start the classwise daemon: API server + quality monitor.
pub async fn serve(bind: &str, config: AppConfig) -> Result<()> {
    // 1. Initialize Storage
    tracing::info!(db_path = %config.storage.db_path, "Initializing database");
    let pool = storage::open_pool(&config.storage.db_path)?;

    // 2. Start Quality Monitor (background task)
    let provider: Arc<dyn SampleProvider> = Arc::new(LinkSpeedProvider);
    let monitor_pool = pool.clone();
    let ladder = config.quality.ladder.clone();
    let poll = Duration::from_secs(config.quality.poll_interval_secs);
    tokio::spawn(async move {
        monitor::run_monitor_loop(provider, monitor_pool, ladder, poll).await;
    });

    // 3. Start API Server
    let addr: std::net::SocketAddr = bind.parse()?;
    let state = api::state::AppState { pool, config };
    let app = api::router(state);

    tracing::info!(%addr, "classwise listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
