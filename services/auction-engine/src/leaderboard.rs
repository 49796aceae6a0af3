//! Sorted leaderboard
//!
//! Live bids ordered by (amount descending, timestamp ascending).
//! Uses a BTreeMap keyed by the rank tuple plus a user index, so a
//! replacement is two O(log n) map operations and the top-K prefix is a
//! forward iteration. Admission timestamps are strictly increasing per
//! auction, which makes rank keys unique and the tie-break stable.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use types::bid::Bid;
use types::ids::UserId;

/// Rank key: higher amount first, earlier timestamp first among equals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct RankKey {
    amount: Reverse<u64>,
    timestamp: i64,
}

impl RankKey {
    fn of(bid: &Bid) -> Self {
        Self {
            amount: Reverse(bid.amount),
            timestamp: bid.timestamp,
        }
    }
}

/// Ordered view of the live bids of one auction.
#[derive(Debug, Default)]
pub struct Leaderboard {
    ranked: BTreeMap<RankKey, Bid>,
    index: HashMap<UserId, RankKey>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a bid, replacing the user's previous entry if any.
    pub fn replace(&mut self, bid: Bid) {
        if let Some(old_key) = self.index.remove(&bid.user_id) {
            self.ranked.remove(&old_key);
        }
        let key = RankKey::of(&bid);
        self.index.insert(bid.user_id, key);
        self.ranked.insert(key, bid);
    }

    /// Remove a user's bid, returning it if present.
    pub fn remove(&mut self, user_id: &UserId) -> Option<Bid> {
        let key = self.index.remove(user_id)?;
        self.ranked.remove(&key)
    }

    pub fn get(&self, user_id: &UserId) -> Option<&Bid> {
        let key = self.index.get(user_id)?;
        self.ranked.get(key)
    }

    /// Top `k` bids in rank order (fewer if the board is smaller).
    pub fn top_k(&self, k: usize) -> Vec<Bid> {
        self.ranked.values().take(k).copied().collect()
    }

    /// Remove and return the top `k` bids in rank order.
    pub fn take_top(&mut self, k: usize) -> Vec<Bid> {
        let taken: Vec<Bid> = self.ranked.values().take(k).copied().collect();
        for bid in &taken {
            self.index.remove(&bid.user_id);
            self.ranked.remove(&RankKey::of(bid));
        }
        taken
    }

    /// Amount of the k-th ranked bid, or 0 when fewer than `k` bids are
    /// live. This is the cut-line a new bid must beat to displace the
    /// marginal winner.
    pub fn threshold(&self, k: usize) -> u64 {
        if k == 0 {
            return 0;
        }
        self.ranked
            .values()
            .nth(k - 1)
            .map(|bid| bid.amount)
            .unwrap_or(0)
    }

    /// All live bids in rank order.
    pub fn ranked_bids(&self) -> impl Iterator<Item = &Bid> {
        self.ranked.values()
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn clear(&mut self) {
        self.ranked.clear();
        self.index.clear();
    }

    /// Both internal views agree on membership. Asserted at observable
    /// boundaries in debug builds.
    pub fn is_consistent(&self) -> bool {
        self.ranked.len() == self.index.len()
            && self
                .ranked
                .values()
                .all(|bid| self.index.get(&bid.user_id) == Some(&RankKey::of(bid)))
    }
}
