//! Fungible asset ledger collaborator
//!
//! The core only reads balances and historical voting weight, and writes
//! issuance. `InMemoryLedger` keeps checkpointed voting weight so that
//! snapshot lookups behave like a delegated-votes token.

use crate::address::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Cannot issue to the zero address")]
    ZeroRecipient,

    #[error("Recipient and amount arrays differ in length: {recipients} vs {amounts}")]
    LengthMismatch { recipients: usize, amounts: usize },

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u128, available: u128 },

    #[error("Supply overflow")]
    Overflow,

    #[error("Ledger is paused")]
    Paused,
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Operations the core performs against the token ledger.
pub trait Ledger {
    fn issue(&mut self, recipient: &Address, amount: u128, now: u64) -> LedgerResult<()>;

    /// Issue to several recipients in one call. Lengths and recipients are
    /// validated before anything is issued.
    fn issue_split(
        &mut self,
        recipients: &[Address],
        amounts: &[u128],
        now: u64,
    ) -> LedgerResult<()> {
        if recipients.len() != amounts.len() {
            return Err(LedgerError::LengthMismatch {
                recipients: recipients.len(),
                amounts: amounts.len(),
            });
        }
        if recipients.iter().any(Address::is_zero) {
            return Err(LedgerError::ZeroRecipient);
        }
        for (recipient, amount) in recipients.iter().zip(amounts) {
            self.issue(recipient, *amount, now)?;
        }
        Ok(())
    }

    fn balance_of(&self, account: &Address) -> u128;

    fn voting_weight_at(&self, account: &Address, snapshot: u64) -> u128;

    fn total_supply_at(&self, snapshot: u64) -> u128;

    fn is_contract(&self, account: &Address) -> bool;
}

/// `(timestamp, value)` pairs, timestamps non-decreasing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Checkpoints(Vec<(u64, u128)>);

impl Checkpoints {
    fn latest(&self) -> u128 {
        self.0.last().map(|(_, v)| *v).unwrap_or(0)
    }

    fn at(&self, ts: u64) -> u128 {
        let idx = self.0.partition_point(|(t, _)| *t <= ts);
        if idx == 0 {
            0
        } else {
            self.0[idx - 1].1
        }
    }

    fn push(&mut self, ts: u64, value: u128) {
        match self.0.last_mut() {
            Some((last_ts, last_val)) if *last_ts >= ts => *last_val = value,
            _ => self.0.push((ts, value)),
        }
    }
}

/// In-memory token ledger. Accounts are self-delegated until `delegate` is called.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryLedger {
    balances: BTreeMap<Address, u128>,
    delegates: BTreeMap<Address, Address>,
    votes: BTreeMap<Address, Checkpoints>,
    supply: Checkpoints,
    contracts: BTreeSet<Address>,
    paused: bool,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_contract(&mut self, account: Address) {
        self.contracts.insert(account);
    }

    /// While paused every issuance fails; used to exercise rollback paths.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn delegate_of(&self, account: &Address) -> Address {
        self.delegates.get(account).copied().unwrap_or(*account)
    }

    pub fn total_supply(&self) -> u128 {
        self.supply.latest()
    }

    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
        now: u64,
    ) -> LedgerResult<()> {
        if to.is_zero() {
            return Err(LedgerError::ZeroRecipient);
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        *self.balances.entry(*from).or_default() -= amount;
        *self.balances.entry(*to).or_default() += amount;
        let (src, dst) = (self.delegate_of(from), self.delegate_of(to));
        self.move_votes(Some(src), Some(dst), amount, now);
        Ok(())
    }

    pub fn delegate(&mut self, account: &Address, delegatee: &Address, now: u64) {
        let previous = self.delegate_of(account);
        self.delegates.insert(*account, *delegatee);
        let balance = self.balance_of(account);
        self.move_votes(Some(previous), Some(*delegatee), balance, now);
    }

    fn move_votes(&mut self, from: Option<Address>, to: Option<Address>, amount: u128, now: u64) {
        if from == to || amount == 0 {
            return;
        }
        if let Some(src) = from {
            let cp = self.votes.entry(src).or_default();
            let next = cp.latest().saturating_sub(amount);
            cp.push(now, next);
        }
        if let Some(dst) = to {
            let cp = self.votes.entry(dst).or_default();
            let next = cp.latest().saturating_add(amount);
            cp.push(now, next);
        }
    }
}

impl Ledger for InMemoryLedger {
    fn issue(&mut self, recipient: &Address, amount: u128, now: u64) -> LedgerResult<()> {
        if self.paused {
            return Err(LedgerError::Paused);
        }
        if recipient.is_zero() {
            return Err(LedgerError::ZeroRecipient);
        }
        let new_supply = self
            .supply
            .latest()
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        *self.balances.entry(*recipient).or_default() += amount;
        self.supply.push(now, new_supply);
        let delegatee = self.delegate_of(recipient);
        self.move_votes(None, Some(delegatee), amount, now);
        log::debug!("Issued {} units to {} at {}", amount, recipient, now);
        Ok(())
    }

    fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn voting_weight_at(&self, account: &Address, snapshot: u64) -> u128 {
        self.votes.get(account).map(|cp| cp.at(snapshot)).unwrap_or(0)
    }

    fn total_supply_at(&self, snapshot: u64) -> u128 {
        self.supply.at(snapshot)
    }

    fn is_contract(&self, account: &Address) -> bool {
        self.contracts.contains(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_updates_supply_and_weight() {
        let mut ledger = InMemoryLedger::new();
        let alice = Address::repeat_byte(1);

        ledger.issue(&alice, 100, 10).unwrap();
        ledger.issue(&alice, 50, 20).unwrap();

        assert_eq!(ledger.balance_of(&alice), 150);
        assert_eq!(ledger.total_supply_at(5), 0);
        assert_eq!(ledger.total_supply_at(10), 100);
        assert_eq!(ledger.total_supply_at(15), 100);
        assert_eq!(ledger.total_supply_at(20), 150);
        assert_eq!(ledger.voting_weight_at(&alice, 15), 100);
    }

    #[test]
    fn test_delegation_moves_weight() {
        let mut ledger = InMemoryLedger::new();
        let alice = Address::repeat_byte(1);
        let bob = Address::repeat_byte(2);

        ledger.issue(&alice, 100, 10).unwrap();
        ledger.delegate(&alice, &bob, 20);

        assert_eq!(ledger.voting_weight_at(&alice, 15), 100);
        assert_eq!(ledger.voting_weight_at(&alice, 20), 0);
        assert_eq!(ledger.voting_weight_at(&bob, 20), 100);
        // Balance stays with the owner
        assert_eq!(ledger.balance_of(&alice), 100);
    }

    #[test]
    fn test_transfer_moves_weight() {
        let mut ledger = InMemoryLedger::new();
        let alice = Address::repeat_byte(1);
        let bob = Address::repeat_byte(2);

        ledger.issue(&alice, 100, 10).unwrap();
        ledger.transfer(&alice, &bob, 40, 30).unwrap();
        assert_eq!(ledger.voting_weight_at(&alice, 30), 60);
        assert_eq!(ledger.voting_weight_at(&bob, 30), 40);

        let err = ledger.transfer(&bob, &alice, 41, 31).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                requested: 41,
                available: 40
            }
        );
    }

    #[test]
    fn test_issue_split_length_mismatch() {
        let mut ledger = InMemoryLedger::new();
        let err = ledger
            .issue_split(&[Address::repeat_byte(1)], &[1, 2], 0)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::LengthMismatch {
                recipients: 1,
                amounts: 2
            }
        );
    }

    #[test]
    fn test_paused_ledger_rejects_issue() {
        let mut ledger = InMemoryLedger::new();
        ledger.set_paused(true);
        assert_eq!(
            ledger.issue(&Address::repeat_byte(1), 1, 0),
            Err(LedgerError::Paused)
        );
    }
}
