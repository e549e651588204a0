//! Per-year supply counters
//!
//! `minted[year] + pending[year] <= cap(year)` holds after every mutation.
//! Only the scheduler mutates these; everything else gets read-only views.

use crate::error::{IssuanceError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyStats {
    pub total_minted: u128,
    pub total_pending: u128,
    pub years_with_issuance: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualSupply {
    minted: BTreeMap<u32, u128>,
    pending: BTreeMap<u32, u128>,
}

impl AnnualSupply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn minted(&self, year: u32) -> u128 {
        self.minted.get(&year).copied().unwrap_or(0)
    }

    pub fn pending(&self, year: u32) -> u128 {
        self.pending.get(&year).copied().unwrap_or(0)
    }

    pub fn remaining(&self, year: u32, cap: u128) -> u128 {
        cap.saturating_sub(self.minted(year))
            .saturating_sub(self.pending(year))
    }

    /// Reserve `amount` against `year`'s cap.
    pub(crate) fn reserve(&mut self, year: u32, amount: u128, cap: u128) -> Result<()> {
        let available = self.remaining(year, cap);
        if amount > available {
            return Err(IssuanceError::ExceedsAnnualMintCap {
                year,
                requested: amount,
                available,
            });
        }
        *self.pending.entry(year).or_default() += amount;
        Ok(())
    }

    /// Drop a reservation without issuing.
    pub(crate) fn release(&mut self, year: u32, amount: u128) {
        let entry = self.pending.entry(year).or_default();
        debug_assert!(*entry >= amount, "release exceeds pending for year {}", year);
        *entry = entry.saturating_sub(amount);
        if *entry == 0 {
            self.pending.remove(&year);
        }
    }

    /// Convert a reservation into issued supply for the same year.
    pub(crate) fn settle(&mut self, year: u32, amount: u128) {
        self.release(year, amount);
        *self.minted.entry(year).or_default() += amount;
    }

    pub fn total_minted(&self) -> u128 {
        self.minted.values().sum()
    }

    pub fn total_pending(&self) -> u128 {
        self.pending.values().sum()
    }

    pub fn stats(&self) -> SupplyStats {
        SupplyStats {
            total_minted: self.total_minted(),
            total_pending: self.total_pending(),
            years_with_issuance: self.minted.len(),
        }
    }
}
