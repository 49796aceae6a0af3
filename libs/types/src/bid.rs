//! Bid and winner types
//!
//! A `Bid` is a live entry in an auction's ledger; a `Winner` is the
//! persisted outcome of a round close. Amounts are integral stars.

use crate::ids::UserId;
use serde::{Deserialize, Serialize};

/// A live bid held in escrow.
///
/// `timestamp` is assigned by the engine at admission time and is
/// strictly increasing across accepted bids of one auction, so
/// (amount, timestamp) is a total order over live bids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub user_id: UserId,
    /// Total bid amount in stars (positive).
    pub amount: u64,
    /// Admission time, Unix milliseconds.
    pub timestamp: i64,
}

impl Bid {
    /// Create a bid at the given admission time
    pub fn new(user_id: UserId, amount: u64, timestamp: i64) -> Self {
        Self {
            user_id,
            amount,
            timestamp,
        }
    }
}

/// A persisted round winner.
///
/// `gift_number` is the 1-based index into the auction's flattened gift
/// sequence: winners of round r receive numbers
/// `1 + sum(K_i, i < r) ..= sum(K_i, i <= r)`, assigned in leaderboard
/// order at round close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    pub user_id: UserId,
    /// Stars consumed from the winning bid.
    pub stars: u64,
    pub gift_number: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bid_serialization_uses_camel_case() {
        let bid = Bid::new(UserId::new(), 42, 1_700_000_000_000);
        let json = serde_json::to_string(&bid).unwrap();
        assert!(json.contains("\"userId\""));
        assert!(json.contains("\"amount\":42"));
        assert!(json.contains("\"timestamp\""));
    }

    #[test]
    fn test_winner_roundtrip() {
        let winner = Winner {
            user_id: UserId::new(),
            stars: 500,
            gift_number: 3,
        };
        let json = serde_json::to_string(&winner).unwrap();
        assert!(json.contains("\"giftNumber\":3"));
        let back: Winner = serde_json::from_str(&json).unwrap();
        assert_eq!(winner, back);
    }
}
