//! Trade Approvals server binary.

use std::sync::Arc;

use trade_approvals::adapters::http::{app_router, ProposalHandlers};
use trade_approvals::adapters::storage::{InMemoryDocumentStore, RedisDocumentStore};
use trade_approvals::application::{LiveBoard, ProposalSynchronizer};
use trade_approvals::config::{AppConfig, StoreBackend, StoreConfig};
use trade_approvals::ports::{DocumentStore, StoreError};
use trade_approvals::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.server);

    let store = build_store(&config.store).await?;
    let synchronizer = Arc::new(ProposalSynchronizer::new(
        store,
        config.proposal.store_path()?,
        config.proposal.roster()?,
    ));
    let board = Arc::new(LiveBoard::attach(&synchronizer).await?);

    let app = app_router(
        ProposalHandlers::new(synchronizer, board.clone()),
        config.server.request_timeout(),
        config.server.cors_header_values()?,
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        backend = ?config.store.backend,
        path = %config.proposal.path,
        "Trade approvals server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    board.shutdown().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn build_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; proposals are lost on restart");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
        StoreBackend::Redis => {
            let connect = RedisDocumentStore::connect(&config.redis_url, config.key_prefix.clone());
            let store = tokio::time::timeout(config.timeout(), connect)
                .await
                .map_err(|_| StoreError::Unavailable("Redis connection timed out".to_string()))??;
            tracing::info!("Connected to Redis document store");
            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
