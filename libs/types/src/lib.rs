//! Shared domain types for the gift auction platform
//!
//! Everything that crosses a crate boundary lives here: identifiers,
//! bids and winners, round plans, persisted records, and the typed
//! bid-rejection taxonomy that forms the wire contract.

pub mod auction;
pub mod bid;
pub mod errors;
pub mod ids;
pub mod plan;
pub mod user;
