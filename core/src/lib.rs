//! Civitas Core Library
//!
//! Shared primitives for the treasury control core:
//! - Addresses, digests and field hashing
//! - Role-based access control
//! - Ledger and upgrade-layer collaborator traits (with in-memory versions)
//! - TOML configuration

pub mod access;
pub mod address;
pub mod codec;
pub mod config;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod upgrade;

pub use access::{
    AccessControl, AccessError, Role, DEFAULT_ADMIN_ROLE, EMERGENCY_ROLE, GOVERNANCE_ROLE,
    MINTER_ROLE, UPGRADER_ROLE,
};
pub use address::Address;
pub use codec::CodecError;
pub use config::{CivitasConfig, ConfigError};
pub use error::{Classify, ErrorKind};
pub use hash::{sha256, FieldHasher, H256};
pub use ledger::{InMemoryLedger, Ledger, LedgerError};
pub use upgrade::{ProxyAdmin, UpgradeError, UpgradeLayer};

/// Protocol constants
pub mod constants {
    pub const DAY_SECS: u64 = 86_400;

    /// Length of one issuance period (365 days)
    pub const YEAR_SECS: u64 = 365 * DAY_SECS;

    /// Number of years with a non-zero issuance cap
    pub const TOTAL_ISSUANCE_YEARS: u32 = 25;

    /// Years 1-10
    pub const TIER1_ANNUAL_CAP: u128 = 2_500_000_000;

    /// Years 11-15
    pub const TIER2_ANNUAL_CAP: u128 = 1_250_000_000;

    /// Years 16-25
    pub const TIER3_ANNUAL_CAP: u128 = 625_000_000;

    /// A mint request matures 2 days after creation
    pub const MINT_EXECUTION_DELAY_SECS: u64 = 2 * DAY_SECS;

    /// A mint request can no longer execute 30 days after creation
    pub const MINT_EXPIRY_WINDOW_SECS: u64 = 30 * DAY_SECS;

    pub const BPS_DENOMINATOR: u16 = 10_000;

    pub const MIN_QUORUM_BPS: u16 = 100;
    pub const DEFAULT_STANDARD_QUORUM_BPS: u16 = 500;
    pub const DEFAULT_EMERGENCY_QUORUM_BPS: u16 = 1_000;
    pub const DEFAULT_UPGRADE_QUORUM_BPS: u16 = 1_500;
    pub const DEFAULT_CONSTITUTIONAL_QUORUM_BPS: u16 = 2_000;

    /// Standard proposals need 3% of supply in voting weight
    pub const PROPOSAL_THRESHOLD_BPS: u16 = 300;

    pub const VOTING_DELAY_SECS: u64 = DAY_SECS;
    pub const VOTING_PERIOD_SECS: u64 = 7 * DAY_SECS;
    pub const PROPOSAL_TIMELOCK_SECS: u64 = 2 * DAY_SECS;
    pub const PROPOSAL_GRACE_PERIOD_SECS: u64 = 14 * DAY_SECS;

    pub const MIN_SIGNATURES: usize = 2;
    pub const MAX_SIGNATURES: usize = 20;

    pub const TIMELOCK_MIN_DELAY_SECS: u64 = 2 * DAY_SECS;

    /// Number of fixed distribution wallets
    pub const DISTRIBUTION_WALLET_COUNT: usize = 6;
}

#[cfg(test)]
mod tests {
    use super::constants::*;

    #[test]
    fn test_tier_caps_decrease() {
        assert!(TIER1_ANNUAL_CAP > TIER2_ANNUAL_CAP);
        assert!(TIER2_ANNUAL_CAP > TIER3_ANNUAL_CAP);
        assert_eq!(YEAR_SECS, 31_536_000);
    }

    #[test]
    fn test_default_quorums_ordered() {
        assert!(MIN_QUORUM_BPS <= DEFAULT_STANDARD_QUORUM_BPS);
        assert!(DEFAULT_STANDARD_QUORUM_BPS < DEFAULT_EMERGENCY_QUORUM_BPS);
        assert!(DEFAULT_EMERGENCY_QUORUM_BPS < DEFAULT_UPGRADE_QUORUM_BPS);
        assert!(DEFAULT_UPGRADE_QUORUM_BPS < DEFAULT_CONSTITUTIONAL_QUORUM_BPS);
    }
}
