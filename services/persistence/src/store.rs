//! File-backed snapshot store
//!
//! Persists the whole database (auctions + users) as one JSON document
//! with a CRC32C integrity checksum, rewritten atomically (temp file +
//! rename) after every mutation. On open, the document is reloaded and
//! the checksum verified; a corrupt or truncated file is refused rather
//! than silently dropped.

use async_trait::async_trait;
use crc32c::crc32c;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use types::auction::{AuctionRecord, AuctionStatus};
use types::bid::Winner;
use types::ids::{AuctionId, UserId};
use types::user::{BalanceRecord, UserRecord};

use crate::memory::MemoryRepository;
use crate::repository::{AuctionRepository, RepositoryError};

/// Current document format version.
pub const STORE_VERSION: u32 = 1;

/// On-disk document shape. The checksum covers the serialized body.
#[derive(Serialize, Deserialize)]
struct StoreDocument {
    version: u32,
    checksum: u32,
    body: StoreBody,
}

#[derive(Serialize, Deserialize)]
struct StoreBody {
    auctions: Vec<AuctionRecord>,
    users: Vec<UserRecord>,
}

impl StoreBody {
    fn compute_checksum(&self) -> Result<u32, RepositoryError> {
        let bytes = serde_json::to_vec(self)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        Ok(crc32c(&bytes))
    }
}

/// Snapshot-per-write repository over a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryRepository,
}

impl FileStore {
    /// Open the store at `path`, loading and verifying an existing
    /// document if present.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let inner = MemoryRepository::new();

        if path.exists() {
            let raw = fs::read(&path)?;
            let doc: StoreDocument = serde_json::from_slice(&raw)
                .map_err(|e| RepositoryError::Corrupt(format!("unreadable document: {}", e)))?;
            if doc.version != STORE_VERSION {
                return Err(RepositoryError::Corrupt(format!(
                    "unsupported store version {}",
                    doc.version
                )));
            }
            let computed = doc.body.compute_checksum()?;
            if computed != doc.checksum {
                return Err(RepositoryError::Corrupt(format!(
                    "checksum mismatch: stored {:08x}, computed {:08x}",
                    doc.checksum, computed
                )));
            }
            info!(
                path = %path.display(),
                auctions = doc.body.auctions.len(),
                users = doc.body.users.len(),
                "store loaded"
            );
            inner.restore(doc.body.auctions, doc.body.users);
        } else if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        Ok(Self { path, inner })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), RepositoryError> {
        let (auctions, users) = self.inner.dump();
        let body = StoreBody { auctions, users };
        let doc = StoreDocument {
            version: STORE_VERSION,
            checksum: body.compute_checksum()?,
            body,
        };
        let bytes = serde_json::to_vec_pretty(&doc)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        // Write-then-rename keeps the previous snapshot intact if the
        // process dies mid-write.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl AuctionRepository for FileStore {
    async fn load_balances(&self) -> Result<Vec<BalanceRecord>, RepositoryError> {
        self.inner.load_balances().await
    }

    async fn save_balances(&self, records: &[BalanceRecord]) -> Result<(), RepositoryError> {
        self.inner.save_balances(records).await?;
        self.flush()
    }

    async fn bulk_create_users(&self, users: &[UserRecord]) -> Result<(), RepositoryError> {
        self.inner.bulk_create_users(users).await?;
        self.flush()
    }

    async fn bot_ids(&self) -> Result<Vec<UserId>, RepositoryError> {
        self.inner.bot_ids().await
    }

    async fn create_auction(&self, record: &AuctionRecord) -> Result<(), RepositoryError> {
        self.inner.create_auction(record).await?;
        self.flush()
    }

    async fn get_auction(&self, id: AuctionId) -> Result<Option<AuctionRecord>, RepositoryError> {
        self.inner.get_auction(id).await
    }

    async fn list_auctions(&self) -> Result<Vec<AuctionRecord>, RepositoryError> {
        self.inner.list_auctions().await
    }

    async fn set_status(
        &self,
        id: AuctionId,
        status: AuctionStatus,
    ) -> Result<(), RepositoryError> {
        self.inner.set_status(id, status).await?;
        self.flush()
    }

    async fn append_winners(
        &self,
        id: AuctionId,
        winners: &[Winner],
    ) -> Result<(), RepositoryError> {
        self.inner.append_winners(id, winners).await?;
        self.flush()
    }

    async fn finish_auction(
        &self,
        id: AuctionId,
        finished_at: i64,
    ) -> Result<(), RepositoryError> {
        self.inner.finish_auction(id, finished_at).await?;
        self.flush()
    }

    async fn auctions_by_status(
        &self,
        status: AuctionStatus,
    ) -> Result<Vec<AuctionRecord>, RepositoryError> {
        self.inner.auctions_by_status(status).await
    }
}
