//! nexus-crm - Client record management service
//!
//! Serves the browser UI and REST API over the clients table, keeps the
//! in-memory collection synchronized with the store, and coordinates
//! on-demand AI insight requests.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use nexus_common::config::ServiceConfig;
use nexus_common::db::init_database;
use nexus_common::events::EventBus;
use nexus_crm::insight::{GeminiInsightClient, InsightCoordinator};
use nexus_crm::store::SqliteRecordStore;
use nexus_crm::{build_router, AppState, SyncEngine};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "nexus-crm", about = "Client record management service")]
struct Args {
    /// Root folder holding the database (overrides env and config file)
    #[arg(long)]
    root_folder: Option<String>,

    /// Listen port (overrides env and config file)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Nexus CRM (nexus-crm) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = ServiceConfig::resolve(args.root_folder.as_deref(), args.port);
    config.ensure_root_folder()?;

    let db_path = config.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;
    info!("✓ Connected to database");

    // Wire the core: store → engine, provider → coordinator, bus → both
    let events = Arc::new(EventBus::new(100));
    let store = Arc::new(SqliteRecordStore::new(pool));
    let provider = Arc::new(GeminiInsightClient::new(config.gemini_api_key.clone())?);
    let insight = Arc::new(InsightCoordinator::new(provider, events.clone()));
    let engine = Arc::new(SyncEngine::new(store, insight.clone(), events.clone()));

    // Initial synchronization; a failure here just starts the UI offline
    engine.load().await;
    info!(
        "Initial load complete ({} clients, {:?})",
        engine.snapshot().await.len(),
        engine.connectivity().await
    );

    let state = AppState::new(engine, insight, events);
    let app = build_router(state);

    let addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("nexus-crm listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
