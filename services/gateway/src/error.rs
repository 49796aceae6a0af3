use auction_engine::EngineError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use types::errors::BidError;
use types::ids::{AuctionId, UserId};

/// Central error type for the gateway application
#[derive(Debug, Error)]
pub enum AppError {
    /// Typed bid rejection; the kind string is the wire contract.
    #[error(transparent)]
    Bid(#[from] BidError),

    #[error("auction not found: {0}")]
    NotFound(AuctionId),

    #[error("rate limit exceeded for user {0}")]
    RateLimited(UserId),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidPlan(msg) => AppError::BadRequest(msg),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Bid(err) => {
                let status = match err {
                    BidError::NonPositive => StatusCode::BAD_REQUEST,
                    BidError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
                    BidError::NotActive | BidError::NotHigher { .. } => StatusCode::CONFLICT,
                };
                let body = Json(json!({
                    "ok": false,
                    "error": err.kind(),
                    "message": err.to_string(),
                }));
                (status, body).into_response()
            }
            AppError::NotFound(id) => error_response(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("auction not found: {}", id),
            ),
            AppError::RateLimited(user) => error_response(
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMIT_EXCEEDED",
                format!("too many bid attempts for user {}", user),
            ),
            AppError::BadRequest(msg) => {
                error_response(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "request failed");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal server error".to_string(),
                )
            }
        }
    }
}

fn error_response(status: StatusCode, code: &str, message: String) -> Response {
    let body = Json(json!({
        "error": code,
        "message": message,
    }));
    (status, body).into_response()
}
