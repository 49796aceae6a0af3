//! User and balance records

use crate::ids::UserId;
use serde::{Deserialize, Serialize};

/// Persisted user row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Spendable stars.
    pub balance: u64,
    pub is_bot: bool,
    /// Unix milliseconds.
    pub created_at: i64,
    /// Unix milliseconds.
    pub last_active_at: i64,
}

impl UserRecord {
    /// Create a minimal user row with the given balance
    pub fn new(username: impl Into<String>, balance: u64, is_bot: bool, now: i64) -> Self {
        let username = username.into();
        Self {
            id: UserId::new(),
            first_name: username.clone(),
            username,
            last_name: None,
            avatar: None,
            balance,
            is_bot,
            created_at: now,
            last_active_at: now,
        }
    }
}

/// One row of a balance snapshot, as exchanged with the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRecord {
    pub user_id: UserId,
    pub balance: u64,
}

impl BalanceRecord {
    pub fn new(user_id: UserId, balance: u64) -> Self {
        Self { user_id, balance }
    }
}
