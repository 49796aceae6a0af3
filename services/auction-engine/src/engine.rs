//! Auction engine
//!
//! State machine of one auction: the bid ledger, the sorted leaderboard,
//! the balance ledger, the round deadline timer, and the commit path to
//! the repository. All mutable state lives behind one per-engine lock;
//! bid admission does no I/O under that lock, while lifecycle operations
//! hold it across their repository writes so admission and round close
//! never interleave.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use persistence::AuctionRepository;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use types::auction::{AuctionRecord, AuctionStatus, Gift};
use types::bid::{Bid, Winner};
use types::errors::BidError;
use types::ids::{AuctionId, UserId};
use types::plan::{gift_offset, RoundPlan};

use crate::balance::BalanceLedger;
use crate::clock::Clock;
use crate::error::EngineError;
use crate::events::{AuctionEvent, EventSink};
use crate::leaderboard::Leaderboard;

/// Anti-snipe window: a displacing bid admitted with less than this much
/// time remaining extends the round.
pub const SNIPE_WINDOW_MS: i64 = 5_000;

/// Anti-snipe extension, measured from the displacing bid's admission.
pub const SNIPE_EXTENSION_MS: i64 = 10_000;

/// Handle to one auction's engine. Cheap to clone; all clones share the
/// same state.
#[derive(Clone)]
pub struct AuctionEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    id: AuctionId,
    name: String,
    gift: Gift,
    plan: Vec<RoundPlan>,
    repo: Arc<dyn AuctionRepository>,
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    state: Mutex<EngineState>,
}

struct EngineState {
    /// Index of the open round; `plan.len()` is terminal.
    current_round: usize,
    /// Live bids by user. Mirrors `board` exactly.
    bids: HashMap<UserId, Bid>,
    board: Leaderboard,
    ledger: BalanceLedger,
    /// Balances are loaded once per activation and kept across rounds;
    /// reloading mid-auction would discard the escrow accounting of
    /// carried bids.
    ledger_loaded: bool,
    /// Wall-clock deadline of the open round, Unix milliseconds.
    round_end_ms: i64,
    is_active: bool,
    finished: bool,
    /// Set on internal invariant violation; the engine refuses all
    /// further work.
    halted: bool,
    /// Last admission timestamp handed out; the admission clock is
    /// strictly monotonic.
    last_admission_ms: i64,
    /// Stale deadline fires carry an older epoch and are ignored, which
    /// is what makes re-arming cancel the outstanding fire.
    timer_epoch: u64,
}

/// Point-in-time view of an engine for read APIs.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub auction_id: AuctionId,
    pub current_round: usize,
    pub round_count: usize,
    pub is_active: bool,
    /// Deadline of the open round, Unix milliseconds.
    pub round_end_time: i64,
    /// Live bids in rank order.
    pub leaderboard: Vec<Bid>,
}

impl AuctionEngine {
    /// Build an engine over a persisted record, resuming at
    /// `start_at_round` (0 for a fresh auction).
    pub fn new(
        record: &AuctionRecord,
        start_at_round: usize,
        repo: Arc<dyn AuctionRepository>,
        sink: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                id: record.id,
                name: record.name.clone(),
                gift: record.gift.clone(),
                plan: record.plan.clone(),
                repo,
                sink,
                clock,
                state: Mutex::new(EngineState {
                    current_round: start_at_round,
                    bids: HashMap::new(),
                    board: Leaderboard::new(),
                    ledger: BalanceLedger::new(),
                    ledger_loaded: false,
                    round_end_ms: 0,
                    is_active: false,
                    finished: false,
                    halted: false,
                    last_admission_ms: 0,
                    timer_epoch: 0,
                }),
            }),
        }
    }

    pub fn id(&self) -> AuctionId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn gift(&self) -> &Gift {
        &self.inner.gift
    }

    pub fn plan(&self) -> &[RoundPlan] {
        &self.inner.plan
    }

    /// Open the current round: load balances on first activation, write
    /// `active` status, set the deadline, arm the timer. Past the last
    /// round this routes to [`AuctionEngine::end_auction`].
    pub async fn start_round(&self) -> Result<(), EngineError> {
        let mut state = self.inner.state.lock().await;
        if state.halted {
            return Err(EngineError::Halted);
        }
        self.start_round_locked(&mut state).await
    }

    /// Admit or reject a bid. Synchronous under the engine lock: no I/O,
    /// so the caller observes a consistent snapshot.
    ///
    /// Rejections are evaluated in a fixed order; the first match wins:
    /// not active, non-positive, not higher than the user's current bid,
    /// insufficient funds for the delta.
    pub async fn place_bid(&self, user_id: UserId, amount: u64) -> Result<Bid, BidError> {
        let mut state = self.inner.state.lock().await;

        if state.halted || !state.is_active {
            return Err(BidError::NotActive);
        }
        if amount == 0 {
            return Err(BidError::NonPositive);
        }
        let current = state.bids.get(&user_id).map(|b| b.amount).unwrap_or(0);
        if amount <= current {
            return Err(BidError::NotHigher { current });
        }
        let delta = amount - current;
        let balance = state.ledger.get(&user_id);
        if balance < delta {
            return Err(BidError::InsufficientFunds {
                deficit: delta - balance,
            });
        }

        // Anti-snipe inputs are taken before the new bid lands: the
        // cut-line must be the one this bid displaces.
        let now = self.inner.clock.now_ms();
        let remaining = state.round_end_ms - now;
        let k = self.inner.plan[state.current_round].count_of_gifts as usize;
        let cut_line = state.board.threshold(k);

        if !state.ledger.try_debit(&user_id, delta) {
            // Unreachable after the funds check above; a failure here
            // means escrow accounting is broken.
            state.halted = true;
            error!(
                auction = %self.inner.id,
                user = %user_id,
                "escrow debit failed after admission checks; engine halted"
            );
            return Err(BidError::NotActive);
        }

        let timestamp = now.max(state.last_admission_ms + 1);
        state.last_admission_ms = timestamp;
        let bid = Bid::new(user_id, amount, timestamp);
        state.bids.insert(user_id, bid);
        state.board.replace(bid);
        debug_assert!(state.board.is_consistent());
        debug_assert_eq!(state.bids.len(), state.board.len());

        if remaining > 0 && remaining < SNIPE_WINDOW_MS && cut_line > 0 && amount > cut_line {
            state.round_end_ms = now + SNIPE_EXTENSION_MS;
            self.arm_timer(&mut state);
            debug!(
                auction = %self.inner.id,
                user = %user_id,
                deadline = state.round_end_ms,
                "late displacing bid; deadline extended"
            );
        }

        Ok(bid)
    }

    /// Close the open round: persist the top-K winners and the balance
    /// snapshot, emit the round event, then either open the next round
    /// or finish the auction. Returns immediately when no round is open,
    /// so a duplicate close is harmless.
    pub async fn end_round(&self) -> Result<(), EngineError> {
        let mut state = self.inner.state.lock().await;
        if state.halted {
            return Err(EngineError::Halted);
        }
        if !state.is_active {
            return Ok(());
        }
        self.close_round(&mut state).await
    }

    /// Finish the auction: refund every live bid, flush balances, write
    /// terminal status. Idempotent once finished.
    pub async fn end_auction(&self) -> Result<(), EngineError> {
        let mut state = self.inner.state.lock().await;
        if state.halted {
            return Err(EngineError::Halted);
        }
        self.end_auction_locked(&mut state).await
    }

    /// Read-only view of the live state.
    pub async fn snapshot(&self) -> EngineSnapshot {
        let state = self.inner.state.lock().await;
        EngineSnapshot {
            auction_id: self.inner.id,
            current_round: state.current_round,
            round_count: self.inner.plan.len(),
            is_active: state.is_active,
            round_end_time: state.round_end_ms,
            leaderboard: state.board.ranked_bids().copied().collect(),
        }
    }

    /// Detach from the process: stop admissions and cancel the pending
    /// timer. The persisted record keeps its status, so an active
    /// auction remains recoverable elsewhere.
    pub async fn shutdown(&self) {
        let mut state = self.inner.state.lock().await;
        state.is_active = false;
        state.timer_epoch += 1;
    }

    async fn start_round_locked(&self, state: &mut EngineState) -> Result<(), EngineError> {
        if state.current_round >= self.inner.plan.len() {
            return self.end_auction_locked(state).await;
        }
        if state.is_active {
            return Err(EngineError::AlreadyActive);
        }

        // Repository I/O first; state is only touched once both reads
        // and writes have succeeded.
        let loaded = if state.ledger_loaded {
            None
        } else {
            Some(self.inner.repo.load_balances().await?)
        };
        self.inner
            .repo
            .set_status(self.inner.id, AuctionStatus::Active)
            .await?;

        if let Some(records) = loaded {
            state.ledger.load(records);
            state.ledger_loaded = true;
        }
        if state.current_round == 0 {
            state.bids.clear();
            state.board.clear();
        }
        let round = &self.inner.plan[state.current_round];
        state.round_end_ms = self.inner.clock.now_ms() + round.time as i64 * 1000;
        state.is_active = true;
        self.arm_timer(state);
        info!(
            auction = %self.inner.id,
            round = state.current_round,
            gifts = round.count_of_gifts,
            deadline = state.round_end_ms,
            "round started"
        );
        Ok(())
    }

    async fn close_round(&self, state: &mut EngineState) -> Result<(), EngineError> {
        let round = state.current_round;
        let k = self.inner.plan[round].count_of_gifts as usize;
        let offset = gift_offset(&self.inner.plan, round);
        let winners: Vec<Winner> = state
            .board
            .top_k(k)
            .iter()
            .enumerate()
            .map(|(i, bid)| Winner {
                user_id: bid.user_id,
                stars: bid.amount,
                gift_number: offset + i as u32 + 1,
            })
            .collect();

        // Balances first: a retry after a failed winner append repeats
        // the same snapshot, while the reverse order would append the
        // winners twice.
        self.inner.repo.save_balances(&state.ledger.export()).await?;
        self.inner.repo.append_winners(self.inner.id, &winners).await?;

        let taken = state.board.take_top(k);
        for bid in &taken {
            state.bids.remove(&bid.user_id);
        }
        state.is_active = false;
        state.timer_epoch += 1;
        state.current_round += 1;
        debug_assert!(state.board.is_consistent());
        debug_assert_eq!(state.bids.len(), state.board.len());

        info!(
            auction = %self.inner.id,
            round,
            winners = winners.len(),
            carried = state.bids.len(),
            "round closed"
        );
        self.inner.sink.publish(AuctionEvent::RoundEnded {
            auction_id: self.inner.id,
            round: round as u32,
            winners,
        });

        if state.current_round < self.inner.plan.len() {
            self.start_round_locked(state).await
        } else {
            self.end_auction_locked(state).await
        }
    }

    async fn end_auction_locked(&self, state: &mut EngineState) -> Result<(), EngineError> {
        if state.finished {
            return Ok(());
        }

        // Settle refunds on a copy so a failed write leaves live state
        // untouched for the host to retry.
        let mut settled = state.ledger.clone();
        let refunds = state.bids.len();
        for bid in state.bids.values() {
            settled.add(bid.user_id, bid.amount);
        }
        self.inner.repo.save_balances(&settled.export()).await?;
        self.inner
            .repo
            .finish_auction(self.inner.id, self.inner.clock.now_ms())
            .await?;

        state.ledger = settled;
        state.bids.clear();
        state.board.clear();
        state.is_active = false;
        state.finished = true;
        state.timer_epoch += 1;

        info!(auction = %self.inner.id, refunds, "auction finished");
        self.inner.sink.publish(AuctionEvent::AuctionEnded {
            auction_id: self.inner.id,
        });
        Ok(())
    }

    /// Arm the single-shot deadline timer for the open round. Bumping
    /// the epoch turns any previously armed fire into a no-op.
    fn arm_timer(&self, state: &mut EngineState) {
        state.timer_epoch += 1;
        let epoch = state.timer_epoch;
        let wait_ms = (state.round_end_ms - self.inner.clock.now_ms()).max(0) as u64;
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(wait_ms)).await;
            if let Some(inner) = weak.upgrade() {
                AuctionEngine { inner }.deadline_fired(epoch).await;
            }
        });
    }

    async fn deadline_fired(&self, epoch: u64) {
        let mut state = self.inner.state.lock().await;
        if state.halted || !state.is_active || state.timer_epoch != epoch {
            return;
        }
        // Timer-driven closes have no caller to propagate to; the host
        // is expected to retry end_round on failure.
        if let Err(e) = self.close_round(&mut state).await {
            error!(
                auction = %self.inner.id,
                error = %e,
                "deadline close failed; host must retry end_round"
            );
        }
    }
}
