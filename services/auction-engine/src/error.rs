//! Engine lifecycle errors
//!
//! Bid rejections are not errors at this level; they are the typed
//! [`types::errors::BidError`] returned from admission. These variants
//! cover lifecycle operations, where a failed repository write fails the
//! operation and leaves in-memory state unchanged.

use persistence::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    #[error("round already active")]
    AlreadyActive,

    #[error("engine halted after invariant violation")]
    Halted,
}
