//! Repository contract
//!
//! The engine's sole external dependency. Writes are scoped by auction
//! id, so no cross-auction transaction is ever required. `append_winners`
//! must be atomic and order-preserving: the winner list's length is what
//! crash recovery derives the resume round from.

use async_trait::async_trait;
use types::auction::{AuctionRecord, AuctionStatus};
use types::bid::Winner;
use types::ids::{AuctionId, UserId};
use types::user::{BalanceRecord, UserRecord};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("auction not found: {0}")]
    NotFound(AuctionId),

    #[error("store corrupt: {0}")]
    Corrupt(String),
}

/// Durable storage seen by the engine and the registry.
#[async_trait]
pub trait AuctionRepository: Send + Sync {
    /// Load the full balance snapshot.
    async fn load_balances(&self) -> Result<Vec<BalanceRecord>, RepositoryError>;

    /// Write back a balance snapshot. Rows for unknown users are ignored.
    async fn save_balances(&self, records: &[BalanceRecord]) -> Result<(), RepositoryError>;

    /// Create many users at once (used by the load generator).
    async fn bulk_create_users(&self, users: &[UserRecord]) -> Result<(), RepositoryError>;

    /// Ids of every user flagged as a bot.
    async fn bot_ids(&self) -> Result<Vec<UserId>, RepositoryError>;

    /// Persist a new auction record (status `pending`).
    async fn create_auction(&self, record: &AuctionRecord) -> Result<(), RepositoryError>;

    async fn get_auction(&self, id: AuctionId) -> Result<Option<AuctionRecord>, RepositoryError>;

    async fn list_auctions(&self) -> Result<Vec<AuctionRecord>, RepositoryError>;

    async fn set_status(
        &self,
        id: AuctionId,
        status: AuctionStatus,
    ) -> Result<(), RepositoryError>;

    /// Append winners to the record, preserving assignment order.
    async fn append_winners(
        &self,
        id: AuctionId,
        winners: &[Winner],
    ) -> Result<(), RepositoryError>;

    /// Terminal transition: `status = finished`, `finished_at` set.
    async fn finish_auction(&self, id: AuctionId, finished_at: i64)
        -> Result<(), RepositoryError>;

    /// All records in the given status (recovery queries `active`).
    async fn auctions_by_status(
        &self,
        status: AuctionStatus,
    ) -> Result<Vec<AuctionRecord>, RepositoryError>;
}
