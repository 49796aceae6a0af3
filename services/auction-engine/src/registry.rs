//! Auction registry
//!
//! Process-wide directory of live engines. Owns creation (plan
//! validation + pending record), lookup, removal, and crash recovery:
//! on startup every `active` record is resumed at the round derived from
//! its persisted winner count.

use std::sync::Arc;

use dashmap::DashMap;
use persistence::AuctionRepository;
use tracing::{info, warn};
use types::auction::{AuctionRecord, Gift};
use types::ids::AuctionId;
use types::plan::{resume_round, RoundPlan};

use crate::clock::Clock;
use crate::engine::AuctionEngine;
use crate::error::EngineError;
use crate::events::EventSink;

pub struct AuctionRegistry {
    repo: Arc<dyn AuctionRepository>,
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    engines: DashMap<AuctionId, AuctionEngine>,
}

impl AuctionRegistry {
    pub fn new(
        repo: Arc<dyn AuctionRepository>,
        sink: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            sink,
            clock,
            engines: DashMap::new(),
        }
    }

    /// Persist a new pending auction and register its engine.
    pub async fn create(
        &self,
        name: &str,
        gift: Gift,
        plan: Vec<RoundPlan>,
    ) -> Result<AuctionEngine, EngineError> {
        let plan = Self::validate_plan(plan)?;
        let record = AuctionRecord::new(name, gift, plan, self.clock.now_ms());
        self.repo.create_auction(&record).await?;

        let engine = self.build_engine(&record, 0);
        self.engines.insert(record.id, engine.clone());
        info!(auction = %record.id, name, rounds = record.plan.len(), "auction created");
        Ok(engine)
    }

    pub fn get(&self, id: AuctionId) -> Option<AuctionEngine> {
        self.engines.get(&id).map(|e| e.value().clone())
    }

    pub fn list(&self) -> Vec<AuctionEngine> {
        self.engines.iter().map(|e| e.value().clone()).collect()
    }

    /// Unregister an engine, shutting it down so no timer outlives it.
    pub async fn remove(&self, id: AuctionId) -> Option<AuctionEngine> {
        let (_, engine) = self.engines.remove(&id)?;
        engine.shutdown().await;
        Some(engine)
    }

    /// Resume every persisted `active` auction. The round to restart is
    /// derived by walking the plan against the persisted winner count;
    /// a fully awarded plan routes straight to auction finish.
    pub async fn recover(&self) -> Result<Vec<AuctionId>, EngineError> {
        let records = self
            .repo
            .auctions_by_status(types::auction::AuctionStatus::Active)
            .await?;

        let mut resumed = Vec::with_capacity(records.len());
        for record in records {
            let round = resume_round(&record.plan, record.winners.len());
            info!(
                auction = %record.id,
                winners = record.winners.len(),
                round,
                "recovering active auction"
            );
            let engine = self.build_engine(&record, round);
            engine.start_round().await?;
            self.engines.insert(record.id, engine);
            resumed.push(record.id);
        }
        if !resumed.is_empty() {
            info!(count = resumed.len(), "recovery complete");
        }
        Ok(resumed)
    }

    fn build_engine(&self, record: &AuctionRecord, round: usize) -> AuctionEngine {
        AuctionEngine::new(
            record,
            round,
            Arc::clone(&self.repo),
            Arc::clone(&self.sink),
            Arc::clone(&self.clock),
        )
    }

    fn validate_plan(mut plan: Vec<RoundPlan>) -> Result<Vec<RoundPlan>, EngineError> {
        if plan.is_empty() {
            return Err(EngineError::InvalidPlan("plan must not be empty".into()));
        }
        for (i, round) in plan.iter_mut().enumerate() {
            if round.count_of_gifts == 0 {
                return Err(EngineError::InvalidPlan(format!(
                    "round {} awards zero gifts",
                    i
                )));
            }
            if round.time == 0 {
                return Err(EngineError::InvalidPlan(format!(
                    "round {} has zero duration",
                    i
                )));
            }
            if round.round_number != i as u32 {
                warn!(round = i, stated = round.round_number, "normalizing round number");
                round.round_number = i as u32;
            }
        }
        Ok(plan)
    }
}
