use crate::error::AppError;
use crate::models::{BulkUsersRequest, BulkUsersResponse};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use std::time::{SystemTime, UNIX_EPOCH};
use types::ids::UserId;
use types::user::UserRecord;

/// Bulk user creation, used by load generators to seed bot fleets.
pub async fn bulk_create_users(
    State(state): State<AppState>,
    Json(payload): Json<BulkUsersRequest>,
) -> Result<(StatusCode, Json<BulkUsersResponse>), AppError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(e.into()))?
        .as_millis() as i64;

    let users: Vec<UserRecord> = payload
        .users
        .into_iter()
        .map(|u| UserRecord::new(u.username, u.balance, u.is_bot, now))
        .collect();
    let ids: Vec<UserId> = users.iter().map(|u| u.id).collect();

    state
        .repo
        .bulk_create_users(&users)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok((
        StatusCode::CREATED,
        Json(BulkUsersResponse {
            created: ids.len(),
            ids,
        }),
    ))
}

pub async fn list_bot_ids(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserId>>, AppError> {
    let ids = state
        .repo
        .bot_ids()
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(Json(ids))
}
