// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! Drivedesk API Server
//!
//! Fronts Google Drive as a document store for the inspection admin
//! portal: template and user records, the local site registry, and
//! template PDF rendering.

use drivedesk::{config::Config, store::KvStore, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Drivedesk API");

    // Open the local state store (token, preferences, site registry)
    let state_path = std::path::Path::new(&config.data_dir).join("state.json");
    let kv = KvStore::open(&state_path).expect("Failed to open local state store");
    tracing::info!(path = %state_path.display(), "Local state store opened");

    let state = Arc::new(AppState::new(config.clone(), kv));

    // Build router
    let app = drivedesk::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("drivedesk=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
