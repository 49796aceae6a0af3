//! Balance ledger
//!
//! In-memory star balances for one auction, loaded from the repository
//! when the engine activates and flushed back at round close and finish.
//! The conditional debit is the admission gate: a live bid's full amount
//! has always already been debited, so the ledger plus the bid ledger
//! together conserve stars.

use std::collections::HashMap;
use types::ids::UserId;
use types::user::BalanceRecord;

/// Mapping from user to spendable stars.
#[derive(Debug, Clone, Default)]
pub struct BalanceLedger {
    balances: HashMap<UserId, u64>,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole map from a repository snapshot.
    pub fn load(&mut self, records: impl IntoIterator<Item = BalanceRecord>) {
        self.balances = records
            .into_iter()
            .map(|r| (r.user_id, r.balance))
            .collect();
    }

    /// Snapshot for persistence, sorted by user id for stable output.
    pub fn export(&self) -> Vec<BalanceRecord> {
        let mut records: Vec<BalanceRecord> = self
            .balances
            .iter()
            .map(|(user_id, balance)| BalanceRecord::new(*user_id, *balance))
            .collect();
        records.sort_by_key(|r| *r.user_id.as_uuid());
        records
    }

    /// Current balance, zero for unknown users.
    pub fn get(&self, user_id: &UserId) -> u64 {
        self.balances.get(user_id).copied().unwrap_or(0)
    }

    pub fn set(&mut self, user_id: UserId, balance: u64) {
        self.balances.insert(user_id, balance);
    }

    pub fn has(&self, user_id: &UserId) -> bool {
        self.balances.contains_key(user_id)
    }

    pub fn count(&self) -> usize {
        self.balances.len()
    }

    /// Credit `amount` stars; returns the new balance.
    pub fn add(&mut self, user_id: UserId, amount: u64) -> u64 {
        let balance = self.balances.entry(user_id).or_insert(0);
        *balance += amount;
        *balance
    }

    /// Debit `amount` stars if the balance covers it.
    ///
    /// Returns false and leaves the balance untouched otherwise. Callers
    /// serialize through the engine lock, which makes check-and-decrement
    /// atomic with respect to every other ledger operation.
    pub fn try_debit(&mut self, user_id: &UserId, amount: u64) -> bool {
        match self.balances.get_mut(user_id) {
            Some(balance) if *balance >= amount => {
                *balance -= amount;
                true
            }
            _ => false,
        }
    }
}
