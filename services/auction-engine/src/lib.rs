//! Auction engine core
//!
//! Runs multi-round sealed-budget gift auctions: participants submit
//! monotonically increasing bids against an escrowed star balance; at
//! each round's deadline the top-K bidders win gifts, losers' bids carry
//! forward, winners' bids are consumed.
//!
//! # Architecture
//!
//! ```text
//!        placeBid                    deadline timer
//!           │                              │
//!       ┌───▼──────────────────────────────▼───┐
//!       │            AuctionEngine             │
//!       │  per-auction lock over:              │
//!       │   BalanceLedger ── escrow debits     │
//!       │   Leaderboard ──── (amount↓, time↑)  │
//!       │   round state ──── deadline, round   │
//!       └───────┬──────────────────┬───────────┘
//!               │                  │
//!         AuctionRepository   EventSink
//!         (winners, status,   (roundEnded,
//!          balances)           auctionEnded)
//! ```
//!
//! All mutations of one auction happen under its engine lock, so bid
//! admission and round close never interleave. [`registry::AuctionRegistry`]
//! is the process-wide directory of live engines and owns crash recovery.

pub mod balance;
pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod leaderboard;
pub mod registry;

pub use engine::{AuctionEngine, EngineSnapshot, SNIPE_EXTENSION_MS, SNIPE_WINDOW_MS};
pub use error::EngineError;
pub use registry::AuctionRegistry;
