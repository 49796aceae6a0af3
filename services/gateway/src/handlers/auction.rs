use crate::error::AppError;
use crate::models::{AuctionView, CreateAuctionRequest, LeaderboardEntry};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use types::auction::{AuctionRecord, Gift};
use types::ids::AuctionId;
use types::plan::RoundPlan;

pub async fn create_auction(
    State(state): State<AppState>,
    Json(payload): Json<CreateAuctionRequest>,
) -> Result<(StatusCode, Json<AuctionRecord>), AppError> {
    let plan: Vec<RoundPlan> = payload
        .plan
        .iter()
        .enumerate()
        .map(|(i, entry)| RoundPlan::new(i as u32, entry.count_of_gifts, entry.time))
        .collect();

    let engine = state
        .registry
        .create(&payload.name, Gift::new(payload.gift_name), plan)
        .await?;

    let record = state
        .repo
        .get_auction(engine.id())
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .ok_or(AppError::NotFound(engine.id()))?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Kick off the first round of a pending auction.
pub async fn start_auction(
    State(state): State<AppState>,
    Path(id): Path<AuctionId>,
) -> Result<StatusCode, AppError> {
    let engine = state.registry.get(id).ok_or(AppError::NotFound(id))?;
    engine.start_round().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_auctions(
    State(state): State<AppState>,
) -> Result<Json<Vec<AuctionRecord>>, AppError> {
    let records = state
        .repo
        .list_auctions()
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(Json(records))
}

pub async fn get_auction(
    State(state): State<AppState>,
    Path(id): Path<AuctionId>,
) -> Result<Json<AuctionView>, AppError> {
    let record = state
        .repo
        .get_auction(id)
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .ok_or(AppError::NotFound(id))?;

    let live = match state.registry.get(id) {
        Some(engine) => Some(engine.snapshot().await),
        None => None,
    };
    Ok(Json(AuctionView { record, live }))
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(id): Path<AuctionId>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let engine = state.registry.get(id).ok_or(AppError::NotFound(id))?;
    let snapshot = engine.snapshot().await;
    let entries = snapshot
        .leaderboard
        .iter()
        .enumerate()
        .map(|(i, bid)| LeaderboardEntry {
            rank: i + 1,
            user_id: bid.user_id,
            amount: bid.amount,
            timestamp: bid.timestamp,
        })
        .collect();
    Ok(Json(entries))
}
