use crate::error::AppError;
use crate::models::{BidAccepted, BidRequest};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use types::ids::AuctionId;

/// Bid submission: rate limit, engine lookup, synchronous admission.
///
/// Rejections come back as `{ok: false, error, message}` with the kind
/// taken from the engine's typed taxonomy; they are expected traffic and
/// are not logged as failures.
pub async fn place_bid(
    State(state): State<AppState>,
    Path(id): Path<AuctionId>,
    Json(payload): Json<BidRequest>,
) -> Result<Json<BidAccepted>, AppError> {
    state.rate_limiter.check_user(payload.user_id)?;

    let engine = state.registry.get(id).ok_or(AppError::NotFound(id))?;
    let new_bid = engine.place_bid(payload.user_id, payload.amount).await?;

    Ok(Json(BidAccepted { ok: true, new_bid }))
}
