//! Round plans and plan arithmetic
//!
//! An auction's plan is a non-empty ordered sequence of rounds, each
//! with a winner count and a duration. Gift numbering and crash-recovery
//! round derivation are pure functions of the plan, so they live here.

use serde::{Deserialize, Serialize};

/// One round of an auction plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundPlan {
    /// 0-based round index.
    pub round_number: u32,
    /// Number of gifts awarded when this round closes (K, at least 1).
    pub count_of_gifts: u32,
    /// Round duration in seconds.
    pub time: u64,
}

impl RoundPlan {
    pub fn new(round_number: u32, count_of_gifts: u32, time: u64) -> Self {
        Self {
            round_number,
            count_of_gifts,
            time,
        }
    }
}

/// Number of gifts awarded before round `round` opens.
///
/// Winners of `round` receive gift numbers `offset + 1 ..= offset + K`.
pub fn gift_offset(plan: &[RoundPlan], round: usize) -> u32 {
    plan[..round.min(plan.len())]
        .iter()
        .map(|r| r.count_of_gifts)
        .sum()
}

/// Total gifts across the whole plan.
pub fn total_gifts(plan: &[RoundPlan]) -> u32 {
    plan.iter().map(|r| r.count_of_gifts).sum()
}

/// Derive the round to resume after a crash from the number of
/// persisted winners.
///
/// Walks the plan subtracting each round's winner count until the
/// remainder is non-positive. A round that closed underfilled counts as
/// complete, so any remainder short of a full round still advances past
/// it. Returns `plan.len()` when every round has closed.
pub fn resume_round(plan: &[RoundPlan], persisted_winners: usize) -> usize {
    let mut remaining = persisted_winners as i64;
    let mut round = 0;
    while remaining > 0 && round < plan.len() {
        remaining -= plan[round].count_of_gifts as i64;
        round += 1;
    }
    round
}
