//! Load runner
//!
//! Drives a set of bots against one engine, one decision pass per tick,
//! and tallies admission outcomes per rejection kind. Every bot in a
//! tick decides from the same pre-tick view, so later bots race earlier
//! ones exactly like concurrent clients would.

use auction_engine::clock::Clock;
use auction_engine::AuctionEngine;
use std::sync::Arc;
use tracing::debug;
use types::bid::Bid;
use types::errors::BidError;

use crate::bots::{Bidder, RoundView};

/// Admission outcome tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadMetrics {
    pub attempts: u64,
    pub accepted: u64,
    pub not_active: u64,
    pub non_positive: u64,
    pub not_higher: u64,
    pub insufficient_funds: u64,
}

impl LoadMetrics {
    pub fn record(&mut self, result: &Result<Bid, BidError>) {
        self.attempts += 1;
        match result {
            Ok(_) => self.accepted += 1,
            Err(BidError::NotActive) => self.not_active += 1,
            Err(BidError::NonPositive) => self.non_positive += 1,
            Err(BidError::NotHigher { .. }) => self.not_higher += 1,
            Err(BidError::InsufficientFunds { .. }) => self.insufficient_funds += 1,
        }
    }

    pub fn rejected(&self) -> u64 {
        self.attempts - self.accepted
    }
}

pub struct LoadRunner {
    engine: AuctionEngine,
    clock: Arc<dyn Clock>,
    pub metrics: LoadMetrics,
}

impl LoadRunner {
    pub fn new(engine: AuctionEngine, clock: Arc<dyn Clock>) -> Self {
        Self {
            engine,
            clock,
            metrics: LoadMetrics::default(),
        }
    }

    /// One decision pass over all bots. Returns false once the engine
    /// stops accepting (round closed or auction over).
    pub async fn tick(&mut self, bots: &mut [Box<dyn Bidder>]) -> bool {
        let snapshot = self.engine.snapshot().await;
        if !snapshot.is_active {
            return false;
        }
        let k = self.engine.plan()[snapshot.current_round].count_of_gifts as usize;
        let cut_line = if k > 0 {
            snapshot
                .leaderboard
                .get(k - 1)
                .map(|bid| bid.amount)
                .unwrap_or(0)
        } else {
            0
        };
        let now_ms = self.clock.now_ms();

        for bot in bots.iter_mut() {
            let my_current = snapshot
                .leaderboard
                .iter()
                .find(|bid| bid.user_id == bot.user_id())
                .map(|bid| bid.amount)
                .unwrap_or(0);
            let view = RoundView {
                now_ms,
                round_end_ms: snapshot.round_end_time,
                cut_line,
                my_current,
            };
            if let Some(amount) = bot.next_bid(&view) {
                let result = self.engine.place_bid(bot.user_id(), amount).await;
                self.metrics.record(&result);
            }
        }
        debug!(
            attempts = self.metrics.attempts,
            accepted = self.metrics.accepted,
            "load tick complete"
        );
        true
    }
}
