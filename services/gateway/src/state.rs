use std::sync::Arc;

use auction_engine::events::AuctionEvent;
use auction_engine::AuctionRegistry;
use persistence::AuctionRepository;
use tokio::sync::broadcast;

use crate::rate_limit::BidRateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<AuctionRegistry>,
    pub repo: Arc<dyn AuctionRepository>,
    /// Engine event fan-out consumed by the SSE handlers.
    pub events: broadcast::Sender<AuctionEvent>,
    pub rate_limiter: Arc<BidRateLimiter>,
}

impl AppState {
    pub fn new(
        registry: Arc<AuctionRegistry>,
        repo: Arc<dyn AuctionRepository>,
        events: broadcast::Sender<AuctionEvent>,
    ) -> Self {
        Self {
            registry,
            repo,
            events,
            // Per-user bid budget: bursts of 20, refilled at 20/s.
            rate_limiter: Arc::new(BidRateLimiter::new(20, 20.0)),
        }
    }
}
