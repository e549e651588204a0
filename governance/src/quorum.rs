//! Per-class quorum settings
//!
//! Quorums are basis points of total supply at the proposal snapshot and
//! must keep standard < emergency < upgrade < constitutional.

use crate::error::{GovernanceError, Result};
use crate::proposal::ProposalClass;
use civitas_core::config::QuorumSettings;
use civitas_core::constants::{BPS_DENOMINATOR, MIN_QUORUM_BPS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuorumConfig {
    standard: u16,
    emergency: u16,
    upgrade: u16,
    constitutional: u16,
}

impl QuorumConfig {
    pub fn new(standard: u16, emergency: u16, upgrade: u16, constitutional: u16) -> Result<Self> {
        let config = Self {
            standard,
            emergency,
            upgrade,
            constitutional,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_settings(settings: &QuorumSettings) -> Result<Self> {
        Self::new(
            settings.standard_bps,
            settings.emergency_bps,
            settings.upgrade_bps,
            settings.constitutional_bps,
        )
    }

    pub fn bps(&self, class: ProposalClass) -> u16 {
        match class {
            ProposalClass::Standard => self.standard,
            ProposalClass::Emergency => self.emergency,
            ProposalClass::Upgrade => self.upgrade,
            ProposalClass::Constitutional => self.constitutional,
        }
    }

    /// Copy with one class changed, validated as a whole.
    pub fn with_class(&self, class: ProposalClass, bps: u16) -> Result<Self> {
        let mut next = *self;
        match class {
            ProposalClass::Standard => next.standard = bps,
            ProposalClass::Emergency => next.emergency = bps,
            ProposalClass::Upgrade => next.upgrade = bps,
            ProposalClass::Constitutional => next.constitutional = bps,
        }
        next.validate()?;
        Ok(next)
    }

    fn validate(&self) -> Result<()> {
        for bps in [self.standard, self.emergency, self.upgrade, self.constitutional] {
            if !(MIN_QUORUM_BPS..=BPS_DENOMINATOR).contains(&bps) {
                return Err(GovernanceError::InvalidQuorumValue(bps));
            }
        }
        if self.standard >= self.emergency
            || self.emergency >= self.upgrade
            || self.upgrade >= self.constitutional
        {
            return Err(GovernanceError::QuorumHierarchyViolated {
                standard: self.standard,
                emergency: self.emergency,
                upgrade: self.upgrade,
                constitutional: self.constitutional,
            });
        }
        Ok(())
    }
}

impl Default for QuorumConfig {
    fn default() -> Self {
        let settings = QuorumSettings::default();
        Self {
            standard: settings.standard_bps,
            emergency: settings.emergency_bps,
            upgrade: settings.upgrade_bps,
            constitutional: settings.constitutional_bps,
        }
    }
}

/// `supply * bps / 10000` without overflowing on large supplies.
pub fn quorum_amount(supply: u128, bps: u16) -> u128 {
    let denom = BPS_DENOMINATOR as u128;
    let bps = bps as u128;
    (supply / denom) * bps + (supply % denom) * bps / denom
}
