//! Bid rejection taxonomy
//!
//! These four kinds are the wire contract for bid submission; the
//! display strings are presentation only. Rejections are per-request
//! and never mutate engine state.

use thiserror::Error;

/// Typed rejection returned synchronously from bid admission.
///
/// Variants are checked in declaration order; the first match wins.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidError {
    #[error("auction is not accepting bids")]
    NotActive,

    #[error("bid amount must be positive")]
    NonPositive,

    #[error("bid must exceed the current bid of {current}")]
    NotHigher { current: u64 },

    #[error("insufficient funds: {deficit} more stars needed")]
    InsufficientFunds { deficit: u64 },
}

impl BidError {
    /// Stable wire identifier for the rejection kind.
    pub fn kind(&self) -> &'static str {
        match self {
            BidError::NotActive => "NOT_ACTIVE",
            BidError::NonPositive => "NON_POSITIVE",
            BidError::NotHigher { .. } => "NOT_HIGHER",
            BidError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
        }
    }
}
