// ABOUTME: Recommender instance binary - serves the cutoff and training endpoints.
// ABOUTME: Runs one synchronization cycle at startup, then waits for triggers.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use recsync::prelude::*;

/// Hands training data to the log; the model itself lives elsewhere.
struct LoggingTrainer;

#[async_trait]
impl Trainer for LoggingTrainer {
    async fn train(&self, set: TrainingSet) {
        let products: HashSet<i64> = set.items.iter().map(|i| i.product_id).collect();
        info!(
            orders = set.orders.len(),
            items = set.items.len(),
            products = products.len(),
            "Training set handed off"
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SyncConfig::from_env().context("reading configuration")?;
    info!(persistence = %config.persistence_url, "Starting recommender synchronization");

    let state = Arc::new(CutoffState::new());
    let driver = Arc::new(config.build_driver(state, Arc::new(LoggingTrainer))?);

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;

    let startup = driver.clone();
    tokio::spawn(async move {
        match startup.run().await {
            Ok(count) => info!(records = count, "Startup training finished"),
            Err(e) => error!(error = %e, "Startup training failed"),
        }
    });

    tokio::select! {
        result = serve(listener, driver) => result.context("serving")?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}
