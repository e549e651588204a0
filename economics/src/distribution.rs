//! Fixed-percentage fan-out of executed issuance
//!
//! Configured once; six contract wallets whose percentages sum to 100.

use crate::error::{IssuanceError, Result};
use civitas_core::constants::DISTRIBUTION_WALLET_COUNT;
use civitas_core::{Address, Ledger};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionWallet {
    pub wallet: Address,
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    wallets: Vec<DistributionWallet>,
}

impl Distribution {
    pub fn new(wallets: Vec<DistributionWallet>, ledger: &dyn Ledger) -> Result<Self> {
        if wallets.len() != DISTRIBUTION_WALLET_COUNT {
            return Err(IssuanceError::InvalidArrayLength {
                expected: DISTRIBUTION_WALLET_COUNT,
                actual: wallets.len(),
            });
        }

        let mut seen = HashSet::new();
        for entry in &wallets {
            if entry.wallet.is_zero() {
                return Err(IssuanceError::ZeroAddress);
            }
            if !seen.insert(entry.wallet) {
                return Err(IssuanceError::DuplicateWallet(entry.wallet));
            }
            if !ledger.is_contract(&entry.wallet) {
                return Err(IssuanceError::NotAContract(entry.wallet));
            }
        }

        let total: u32 = wallets.iter().map(|w| w.percent as u32).sum();
        if total != 100 {
            return Err(IssuanceError::InvalidPercentages { total });
        }

        Ok(Self { wallets })
    }

    pub fn wallets(&self) -> &[DistributionWallet] {
        &self.wallets
    }

    /// Split `amount` by percentage. Rounding dust goes to the last wallet
    /// so the parts always sum to `amount`.
    pub fn split(&self, amount: u128) -> (Vec<Address>, Vec<u128>) {
        let mut recipients = Vec::with_capacity(self.wallets.len());
        let mut amounts = Vec::with_capacity(self.wallets.len());
        let mut distributed = 0u128;

        for (idx, entry) in self.wallets.iter().enumerate() {
            let share = if idx + 1 == self.wallets.len() {
                amount - distributed
            } else {
                amount / 100 * entry.percent as u128 + amount % 100 * entry.percent as u128 / 100
            };
            distributed += share;
            recipients.push(entry.wallet);
            amounts.push(share);
        }
        (recipients, amounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civitas_core::InMemoryLedger;

    fn wallets(percents: [u8; 6]) -> (Vec<DistributionWallet>, InMemoryLedger) {
        let mut ledger = InMemoryLedger::new();
        let wallets = percents
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let wallet = Address::repeat_byte(i as u8 + 1);
                ledger.register_contract(wallet);
                DistributionWallet {
                    wallet,
                    percent: *p,
                }
            })
            .collect();
        (wallets, ledger)
    }

    #[test]
    fn test_split_sums_to_amount() {
        let (w, ledger) = wallets([30, 25, 20, 10, 10, 5]);
        let dist = Distribution::new(w, &ledger).unwrap();

        let (recipients, amounts) = dist.split(1_000_003);
        assert_eq!(recipients.len(), 6);
        assert_eq!(amounts.iter().sum::<u128>(), 1_000_003);
        assert_eq!(amounts[0], 300_000);
        assert_eq!(amounts[1], 250_000);
    }

    #[test]
    fn test_rejects_bad_percentages() {
        let (w, ledger) = wallets([30, 25, 20, 10, 10, 4]);
        assert_eq!(
            Distribution::new(w, &ledger),
            Err(IssuanceError::InvalidPercentages { total: 99 })
        );
    }

    #[test]
    fn test_rejects_duplicates_and_eoas() {
        let (mut w, ledger) = wallets([30, 25, 20, 10, 10, 5]);
        w[5].wallet = w[0].wallet;
        assert_eq!(
            Distribution::new(w.clone(), &ledger),
            Err(IssuanceError::DuplicateWallet(w[0].wallet))
        );

        let (mut w, ledger) = wallets([30, 25, 20, 10, 10, 5]);
        let eoa = Address::repeat_byte(0xee);
        w[2].wallet = eoa;
        assert_eq!(
            Distribution::new(w, &ledger),
            Err(IssuanceError::NotAContract(eoa))
        );
    }

    #[test]
    fn test_rejects_wrong_length() {
        let (mut w, ledger) = wallets([30, 25, 20, 10, 10, 5]);
        w.pop();
        assert_eq!(
            Distribution::new(w, &ledger),
            Err(IssuanceError::InvalidArrayLength {
                expected: 6,
                actual: 5
            })
        );
    }
}
