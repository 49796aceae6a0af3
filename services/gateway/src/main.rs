mod error;
mod handlers;
mod models;
mod rate_limit;
mod router;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use auction_engine::clock::SystemClock;
use auction_engine::events::BroadcastSink;
use auction_engine::AuctionRegistry;
use persistence::{AuctionRepository, FileStore, MemoryRepository};
use router::create_router;
use state::AppState;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting auction gateway");

    // AUCTION_DATA selects the durable file store; without it the
    // gateway runs on the in-memory repository.
    let repo: Arc<dyn AuctionRepository> = match std::env::var("AUCTION_DATA") {
        Ok(path) => {
            tracing::info!(path, "using file store");
            Arc::new(FileStore::open(path)?)
        }
        Err(_) => {
            tracing::warn!("AUCTION_DATA not set; state will not survive restarts");
            Arc::new(MemoryRepository::new())
        }
    };

    let sink = Arc::new(BroadcastSink::new(1024));
    let events = sink.sender();
    let registry = Arc::new(AuctionRegistry::new(
        Arc::clone(&repo),
        sink,
        Arc::new(SystemClock),
    ));

    // Resume interrupted auctions before accepting traffic.
    let resumed = registry.recover().await?;
    if !resumed.is_empty() {
        tracing::info!(count = resumed.len(), "resumed active auctions");
    }

    let state = AppState::new(registry, repo, events);
    let app = create_router(state);

    let addr: SocketAddr = std::env::var("GATEWAY_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
