//! In-memory repository
//!
//! DashMap-backed implementation used by tests, the load generator, and
//! as the gateway default when no data directory is configured. Each
//! trait method touches a single map entry, which gives the atomicity
//! `append_winners` requires.

use async_trait::async_trait;
use dashmap::DashMap;
use types::auction::{AuctionRecord, AuctionStatus};
use types::bid::Winner;
use types::ids::{AuctionId, UserId};
use types::user::{BalanceRecord, UserRecord};

use crate::repository::{AuctionRepository, RepositoryError};

/// Concurrent in-memory store of auctions and users.
#[derive(Default, Debug)]
pub struct MemoryRepository {
    auctions: DashMap<AuctionId, AuctionRecord>,
    users: DashMap<UserId, UserRecord>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dump full contents, sorted by id for deterministic output.
    pub(crate) fn dump(&self) -> (Vec<AuctionRecord>, Vec<UserRecord>) {
        let mut auctions: Vec<AuctionRecord> =
            self.auctions.iter().map(|e| e.value().clone()).collect();
        auctions.sort_by_key(|a| *a.id.as_uuid());
        let mut users: Vec<UserRecord> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by_key(|u| *u.id.as_uuid());
        (auctions, users)
    }

    /// Replace full contents from a loaded snapshot.
    pub(crate) fn restore(&self, auctions: Vec<AuctionRecord>, users: Vec<UserRecord>) {
        self.auctions.clear();
        for auction in auctions {
            self.auctions.insert(auction.id, auction);
        }
        self.users.clear();
        for user in users {
            self.users.insert(user.id, user);
        }
    }
}

#[async_trait]
impl AuctionRepository for MemoryRepository {
    async fn load_balances(&self) -> Result<Vec<BalanceRecord>, RepositoryError> {
        Ok(self
            .users
            .iter()
            .map(|e| BalanceRecord::new(e.key().to_owned(), e.value().balance))
            .collect())
    }

    async fn save_balances(&self, records: &[BalanceRecord]) -> Result<(), RepositoryError> {
        for record in records {
            if let Some(mut user) = self.users.get_mut(&record.user_id) {
                user.balance = record.balance;
            }
        }
        Ok(())
    }

    async fn bulk_create_users(&self, users: &[UserRecord]) -> Result<(), RepositoryError> {
        for user in users {
            self.users.insert(user.id, user.clone());
        }
        Ok(())
    }

    async fn bot_ids(&self) -> Result<Vec<UserId>, RepositoryError> {
        Ok(self
            .users
            .iter()
            .filter(|e| e.value().is_bot)
            .map(|e| *e.key())
            .collect())
    }

    async fn create_auction(&self, record: &AuctionRecord) -> Result<(), RepositoryError> {
        self.auctions.insert(record.id, record.clone());
        Ok(())
    }

    async fn get_auction(&self, id: AuctionId) -> Result<Option<AuctionRecord>, RepositoryError> {
        Ok(self.auctions.get(&id).map(|e| e.value().clone()))
    }

    async fn list_auctions(&self) -> Result<Vec<AuctionRecord>, RepositoryError> {
        let (auctions, _) = self.dump();
        Ok(auctions)
    }

    async fn set_status(
        &self,
        id: AuctionId,
        status: AuctionStatus,
    ) -> Result<(), RepositoryError> {
        let mut record = self.auctions.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        record.status = status;
        Ok(())
    }

    async fn append_winners(
        &self,
        id: AuctionId,
        winners: &[Winner],
    ) -> Result<(), RepositoryError> {
        let mut record = self.auctions.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        record.winners.extend_from_slice(winners);
        Ok(())
    }

    async fn finish_auction(
        &self,
        id: AuctionId,
        finished_at: i64,
    ) -> Result<(), RepositoryError> {
        let mut record = self.auctions.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        record.status = AuctionStatus::Finished;
        record.finished_at = Some(finished_at);
        Ok(())
    }

    async fn auctions_by_status(
        &self,
        status: AuctionStatus,
    ) -> Result<Vec<AuctionRecord>, RepositoryError> {
        let (auctions, _) = self.dump();
        Ok(auctions.into_iter().filter(|a| a.status == status).collect())
    }
}
