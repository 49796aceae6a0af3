//! Deadline sniper
//!
//! Sits out until the closing seconds of a round, then jumps over the
//! cut-line to displace the marginal winner. The strategy exists to
//! exercise the engine's anti-snipe extension under load.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use types::ids::UserId;

use super::{Bidder, RoundView};

/// Configuration for the sniper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SniperConfig {
    /// The bot wakes up with this much round time remaining.
    pub trigger_ms: i64,
    /// Minimum jump over the cut-line.
    pub min_jump: u64,
    /// Maximum jump over the cut-line.
    pub max_jump: u64,
    /// Highest total bid the bot will reach.
    pub budget: u64,
}

impl Default for SniperConfig {
    fn default() -> Self {
        Self {
            trigger_ms: 3_000,
            min_jump: 1,
            max_jump: 25,
            budget: 500,
        }
    }
}

pub struct Sniper {
    user_id: UserId,
    config: SniperConfig,
    rng: ChaCha8Rng,
    pub bids_attempted: usize,
}

impl Sniper {
    /// Create a sniper with a deterministic seed.
    pub fn new(user_id: UserId, config: SniperConfig, seed: u64) -> Self {
        Self {
            user_id,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            bids_attempted: 0,
        }
    }
}

impl Bidder for Sniper {
    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn next_bid(&mut self, view: &RoundView) -> Option<u64> {
        if view.remaining_ms() > self.config.trigger_ms {
            return None;
        }
        let jump = self.rng.gen_range(self.config.min_jump..=self.config.max_jump);
        // Beat the cut-line and our own previous bid in one move.
        let target = (view.cut_line + jump).max(view.my_current + 1);
        if target > self.config.budget {
            return None;
        }
        self.bids_attempted += 1;
        Some(target)
    }
}
