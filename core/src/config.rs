//! Treasury configuration (civitas.toml)
//!
//! Every field has a default, so an empty file yields the production
//! parameters. Example:
//!
//! ```toml
//! [issuance]
//! start_time = 1735689600
//! execution_delay_secs = 172800
//!
//! [governance.quorum]
//! standard_bps = 500
//! emergency_bps = 1000
//! upgrade_bps = 1500
//! constitutional_bps = 2000
//! ```

use crate::constants::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// One contiguous range of years sharing an annual cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Last year (1-indexed, inclusive) covered by this tier
    pub last_year: u32,
    /// Maximum units issued per year within the tier
    pub annual_cap: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuanceConfig {
    pub start_time: u64,
    pub period_secs: u64,
    pub execution_delay_secs: u64,
    pub expiry_window_secs: u64,
    pub tiers: Vec<TierConfig>,
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self {
            start_time: 0,
            period_secs: YEAR_SECS,
            execution_delay_secs: MINT_EXECUTION_DELAY_SECS,
            expiry_window_secs: MINT_EXPIRY_WINDOW_SECS,
            tiers: vec![
                TierConfig {
                    last_year: 10,
                    annual_cap: TIER1_ANNUAL_CAP,
                },
                TierConfig {
                    last_year: 15,
                    annual_cap: TIER2_ANNUAL_CAP,
                },
                TierConfig {
                    last_year: TOTAL_ISSUANCE_YEARS,
                    annual_cap: TIER3_ANNUAL_CAP,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuorumSettings {
    pub standard_bps: u16,
    pub emergency_bps: u16,
    pub upgrade_bps: u16,
    pub constitutional_bps: u16,
}

impl Default for QuorumSettings {
    fn default() -> Self {
        Self {
            standard_bps: DEFAULT_STANDARD_QUORUM_BPS,
            emergency_bps: DEFAULT_EMERGENCY_QUORUM_BPS,
            upgrade_bps: DEFAULT_UPGRADE_QUORUM_BPS,
            constitutional_bps: DEFAULT_CONSTITUTIONAL_QUORUM_BPS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    pub voting_delay_secs: u64,
    pub voting_period_secs: u64,
    pub timelock_delay_secs: u64,
    pub grace_period_secs: u64,
    pub proposal_threshold_bps: u16,
    pub quorum: QuorumSettings,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            voting_delay_secs: VOTING_DELAY_SECS,
            voting_period_secs: VOTING_PERIOD_SECS,
            timelock_delay_secs: PROPOSAL_TIMELOCK_SECS,
            grace_period_secs: PROPOSAL_GRACE_PERIOD_SECS,
            proposal_threshold_bps: PROPOSAL_THRESHOLD_BPS,
            quorum: QuorumSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultisigConfig {
    pub min_signatures: usize,
    pub max_signatures: usize,
}

impl Default for MultisigConfig {
    fn default() -> Self {
        Self {
            min_signatures: MIN_SIGNATURES,
            max_signatures: MAX_SIGNATURES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelockConfig {
    pub min_delay_secs: u64,
}

impl Default for TimelockConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: TIMELOCK_MIN_DELAY_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CivitasConfig {
    pub issuance: IssuanceConfig,
    pub governance: GovernanceConfig,
    pub multisig: MultisigConfig,
    pub timelock: TimelockConfig,
}

impl CivitasConfig {
    /// Load and validate configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CivitasConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_issuance()?;
        self.validate_governance()?;

        let ms = &self.multisig;
        if ms.min_signatures < 2 || ms.min_signatures > ms.max_signatures {
            return Err(ConfigError::Invalid(format!(
                "multisig bounds {}..={} are invalid",
                ms.min_signatures, ms.max_signatures
            )));
        }
        if self.timelock.min_delay_secs == 0 {
            return Err(ConfigError::Invalid(
                "timelock min_delay_secs cannot be zero".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_issuance(&self) -> Result<(), ConfigError> {
        let iss = &self.issuance;
        if iss.period_secs == 0 {
            return Err(ConfigError::Invalid("period_secs cannot be zero".to_string()));
        }
        if iss.execution_delay_secs >= iss.expiry_window_secs {
            return Err(ConfigError::Invalid(format!(
                "execution delay {}s must be shorter than expiry window {}s",
                iss.execution_delay_secs, iss.expiry_window_secs
            )));
        }
        if iss.tiers.is_empty() {
            return Err(ConfigError::Invalid("at least one tier required".to_string()));
        }
        let mut prev_last = 0u32;
        let mut prev_cap: Option<u128> = None;
        for tier in &iss.tiers {
            if tier.last_year <= prev_last {
                return Err(ConfigError::Invalid(format!(
                    "tier ending at year {} does not follow year {}",
                    tier.last_year, prev_last
                )));
            }
            if tier.annual_cap == 0 {
                return Err(ConfigError::Invalid("tier cap cannot be zero".to_string()));
            }
            if let Some(prev) = prev_cap {
                if tier.annual_cap >= prev {
                    return Err(ConfigError::Invalid(format!(
                        "tier caps must strictly decrease: {} after {}",
                        tier.annual_cap, prev
                    )));
                }
            }
            prev_last = tier.last_year;
            prev_cap = Some(tier.annual_cap);
        }
        Ok(())
    }

    fn validate_governance(&self) -> Result<(), ConfigError> {
        let gov = &self.governance;
        if gov.voting_period_secs == 0 {
            return Err(ConfigError::Invalid(
                "voting_period_secs cannot be zero".to_string(),
            ));
        }
        if gov.proposal_threshold_bps as u32 > BPS_DENOMINATOR as u32 {
            return Err(ConfigError::Invalid(format!(
                "proposal threshold {} bps exceeds 100%",
                gov.proposal_threshold_bps
            )));
        }
        let q = &gov.quorum;
        let values = [
            q.standard_bps,
            q.emergency_bps,
            q.upgrade_bps,
            q.constitutional_bps,
        ];
        if values
            .iter()
            .any(|v| *v < MIN_QUORUM_BPS || *v > BPS_DENOMINATOR)
        {
            return Err(ConfigError::Invalid(format!(
                "quorum values {:?} must lie within [{}, {}]",
                values, MIN_QUORUM_BPS, BPS_DENOMINATOR
            )));
        }
        if !values.windows(2).all(|w| w[0] < w[1]) {
            return Err(ConfigError::Invalid(format!(
                "quorum values {:?} must strictly increase",
                values
            )));
        }
        Ok(())
    }
}
