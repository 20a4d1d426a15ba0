// ABOUTME: axum routes for cutoff queries, training triggers, and readiness.
// ABOUTME: Bodies are plain text so peers and operators can read them directly.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::sync::SyncDriver;

/// Body returned by `/train` when a cycle fails.
pub const FAILURE_BODY: &str = "-1";

/// Build the router over a shared driver.
///
/// - `GET /train/timestamp`: current cutoff in epoch millis
/// - `GET /train`: run one cycle, answer with the record count
/// - `GET /train/isready`: whether a cycle has completed
pub fn router(driver: Arc<SyncDriver>) -> Router {
    Router::new()
        .route("/train", get(train))
        .route("/train/timestamp", get(timestamp))
        .route("/train/isready", get(is_ready))
        .with_state(driver)
}

/// Serve the router on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, driver: Arc<SyncDriver>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Serving training endpoints");
    }
    axum::serve(listener, router(driver)).await
}

async fn timestamp(State(driver): State<Arc<SyncDriver>>) -> String {
    driver.state().wire_value().to_string()
}

async fn train(State(driver): State<Arc<SyncDriver>>) -> (StatusCode, String) {
    match driver.run().await {
        Ok(count) => (StatusCode::OK, count.to_string()),
        Err(error) => {
            warn!(%error, "Training cycle failed");
            (StatusCode::INTERNAL_SERVER_ERROR, FAILURE_BODY.to_string())
        }
    }
}

async fn is_ready(State(driver): State<Arc<SyncDriver>>) -> String {
    driver.is_ready().to_string()
}
