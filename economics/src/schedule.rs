//! Tiered annual issuance caps
//!
//! Years are 1-indexed from `start_time`; each tier covers a contiguous
//! range of years and caps strictly decrease from one tier to the next.
//! Any year past the last tier has a cap of zero.

use crate::error::{IssuanceError, Result};
use civitas_core::config::{IssuanceConfig, TierConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierInfo {
    /// 1-indexed tier number
    pub tier: u8,
    pub first_year: u32,
    pub last_year: u32,
    pub annual_cap: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceSchedule {
    start_time: u64,
    period_secs: u64,
    tiers: Vec<TierConfig>,
}

impl IssuanceSchedule {
    pub fn new(start_time: u64, period_secs: u64, tiers: Vec<TierConfig>) -> Result<Self> {
        if period_secs == 0 {
            return Err(IssuanceError::InvalidSchedule(
                "period length cannot be zero".to_string(),
            ));
        }
        if tiers.is_empty() {
            return Err(IssuanceError::InvalidSchedule(
                "at least one tier required".to_string(),
            ));
        }
        for pair in tiers.windows(2) {
            if pair[1].last_year <= pair[0].last_year {
                return Err(IssuanceError::InvalidSchedule(format!(
                    "tier ending at year {} does not follow year {}",
                    pair[1].last_year, pair[0].last_year
                )));
            }
            if pair[1].annual_cap >= pair[0].annual_cap {
                return Err(IssuanceError::InvalidSchedule(format!(
                    "caps must strictly decrease: {} after {}",
                    pair[1].annual_cap, pair[0].annual_cap
                )));
            }
        }
        if tiers[0].last_year == 0 {
            return Err(IssuanceError::InvalidSchedule(
                "first tier must cover year 1".to_string(),
            ));
        }
        Ok(Self {
            start_time,
            period_secs,
            tiers,
        })
    }

    pub fn from_config(config: &IssuanceConfig) -> Result<Self> {
        Self::new(config.start_time, config.period_secs, config.tiers.clone())
    }

    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    pub fn period_secs(&self) -> u64 {
        self.period_secs
    }

    /// Last year with a non-zero cap
    pub fn final_year(&self) -> u32 {
        self.tiers.last().map(|t| t.last_year).unwrap_or(0)
    }

    /// 1-indexed year containing `now`. Instants before the start are year 1.
    pub fn year_at(&self, now: u64) -> u32 {
        let elapsed = now.saturating_sub(self.start_time);
        let index = elapsed / self.period_secs;
        u32::try_from(index)
            .unwrap_or(u32::MAX - 1)
            .saturating_add(1)
    }

    pub fn tier_for_year(&self, year: u32) -> Option<TierInfo> {
        if year == 0 {
            return None;
        }
        let mut first_year = 1;
        for (idx, tier) in self.tiers.iter().enumerate() {
            if year <= tier.last_year {
                return Some(TierInfo {
                    tier: (idx + 1) as u8,
                    first_year,
                    last_year: tier.last_year,
                    annual_cap: tier.annual_cap,
                });
            }
            first_year = tier.last_year + 1;
        }
        None
    }

    pub fn cap_for_year(&self, year: u32) -> u128 {
        self.tier_for_year(year).map(|t| t.annual_cap).unwrap_or(0)
    }

    /// Seconds from `now` until the next year begins.
    pub fn time_until_next_year(&self, now: u64) -> u64 {
        let year = self.year_at(now) as u64;
        let boundary = self
            .start_time
            .saturating_add(year.saturating_mul(self.period_secs));
        boundary.saturating_sub(now)
    }

    /// Total units the whole schedule can ever issue.
    pub fn lifetime_cap(&self) -> u128 {
        let mut total = 0u128;
        let mut prev_last = 0u32;
        for tier in &self.tiers {
            let years = tier.last_year.saturating_sub(prev_last) as u128;
            total = total.saturating_add(tier.annual_cap.saturating_mul(years));
            prev_last = tier.last_year;
        }
        total
    }
}

impl Default for IssuanceSchedule {
    fn default() -> Self {
        let config = IssuanceConfig::default();
        Self {
            start_time: config.start_time,
            period_secs: config.period_secs,
            tiers: config.tiers,
        }
    }
}
