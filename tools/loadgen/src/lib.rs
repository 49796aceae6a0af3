//! Synthetic bid load generation
//!
//! Deterministic seeded bot strategies driving the auction engine's bid
//! API, plus a runner that tallies admission outcomes. Used to stress
//! the engine's admission path and by the concurrency test suite; the
//! strategies are fixtures, not engine behavior.

pub mod bots;
pub mod runner;

pub use runner::{LoadMetrics, LoadRunner};
