//! Auction record and lifecycle status
//!
//! The persisted shape of an auction: identity, the gift being awarded,
//! the round plan, the append-only winner list, and lifecycle status.

use crate::bid::Winner;
use crate::ids::{AuctionId, GiftId};
use crate::plan::RoundPlan;
use serde::{Deserialize, Serialize};

/// The gift class awarded by an auction. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    pub id: GiftId,
    pub name: String,
}

impl Gift {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: GiftId::new(),
            name: name.into(),
        }
    }
}

/// Auction lifecycle status.
///
/// `Pending -> Active -> Finished`, no reverse transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    /// Created but no round started yet.
    Pending,
    /// At least one round has started; recoverable after a crash.
    Active,
    /// Terminal; all rounds closed and balances flushed.
    Finished,
}

impl AuctionStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, AuctionStatus::Finished)
    }
}

/// Persisted auction record.
///
/// `winners` is append-only and ordered by assignment, which makes the
/// resume round derivable from its length alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionRecord {
    pub id: AuctionId,
    pub name: String,
    pub gift: Gift,
    pub plan: Vec<RoundPlan>,
    pub winners: Vec<Winner>,
    pub status: AuctionStatus,
    /// Unix milliseconds.
    pub created_at: i64,
    /// Unix milliseconds, set once on finish.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<i64>,
}

impl AuctionRecord {
    /// Create a new pending record
    pub fn new(name: impl Into<String>, gift: Gift, plan: Vec<RoundPlan>, created_at: i64) -> Self {
        Self {
            id: AuctionId::new(),
            name: name.into(),
            gift,
            plan,
            winners: Vec::new(),
            status: AuctionStatus::Pending,
            created_at,
            finished_at: None,
        }
    }
}
