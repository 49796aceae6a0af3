//! Steady escalating bidder
//!
//! Opens early and keeps raising its own bid by a random increment each
//! tick until its budget is exhausted. Deterministic under a fixed seed.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use types::ids::UserId;

use super::{Bidder, RoundView};

/// Configuration for the escalating bidder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalatorConfig {
    /// Opening bid amount.
    pub opening: u64,
    /// Minimum raise per tick.
    pub min_raise: u64,
    /// Maximum raise per tick.
    pub max_raise: u64,
    /// Highest total bid the bot will reach.
    pub budget: u64,
}

impl Default for EscalatorConfig {
    fn default() -> Self {
        Self {
            opening: 10,
            min_raise: 1,
            max_raise: 20,
            budget: 500,
        }
    }
}

pub struct Escalator {
    user_id: UserId,
    config: EscalatorConfig,
    rng: ChaCha8Rng,
    pub bids_attempted: usize,
}

impl Escalator {
    /// Create an escalator with a deterministic seed.
    pub fn new(user_id: UserId, config: EscalatorConfig, seed: u64) -> Self {
        Self {
            user_id,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            bids_attempted: 0,
        }
    }
}

impl Bidder for Escalator {
    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn next_bid(&mut self, view: &RoundView) -> Option<u64> {
        let next = if view.my_current == 0 {
            if self.config.opening > self.config.budget {
                return None;
            }
            self.config.opening
        } else {
            let raise = self
                .rng
                .gen_range(self.config.min_raise..=self.config.max_raise);
            let target = view.my_current.saturating_add(raise);
            if target > self.config.budget {
                // Budget exhausted once the current bid sits at the cap.
                if view.my_current >= self.config.budget {
                    return None;
                }
                self.config.budget
            } else {
                target
            }
        };
        self.bids_attempted += 1;
        Some(next)
    }
}
