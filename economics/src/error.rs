//! Issuance error types

use civitas_core::{AccessError, Address, Classify, ErrorKind, LedgerError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IssuanceError {
    #[error("Zero address")]
    ZeroAddress,

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Minting period ended: year {year} is past the final issuance year {final_year}")]
    MintingPeriodEnded { year: u32, final_year: u32 },

    #[error("Exceeds annual mint cap for year {year}: requested {requested}, available {available}")]
    ExceedsAnnualMintCap {
        year: u32,
        requested: u128,
        available: u128,
    },

    #[error("Mint request {0} already executed")]
    AlreadyExecuted(u64),

    #[error("Mint request {0} already cancelled")]
    AlreadyCancelled(u64),

    #[error("Mint delay not met for request {id}: matures at {matures_at}, now {now}")]
    MintDelayNotMet { id: u64, matures_at: u64, now: u64 },

    #[error("Mint request {id} expired at {expires_at} (now {now})")]
    RequestExpired { id: u64, expires_at: u64, now: u64 },

    #[error("Distribution wallets already configured")]
    DistributionAlreadyConfigured,

    #[error("Invalid array length: expected {expected}, got {actual}")]
    InvalidArrayLength { expected: usize, actual: usize },

    #[error("Duplicate distribution wallet: {0}")]
    DuplicateWallet(Address),

    #[error("Distribution wallet is not a contract: {0}")]
    NotAContract(Address),

    #[error("Distribution percentages sum to {total}, expected 100")]
    InvalidPercentages { total: u32 },

    #[error("Invalid issuance schedule: {0}")]
    InvalidSchedule(String),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Ledger rejected issuance: {0}")]
    Ledger(#[from] LedgerError),
}

impl Classify for IssuanceError {
    fn kind(&self) -> ErrorKind {
        match self {
            IssuanceError::Access(_) => ErrorKind::Authorization,
            IssuanceError::ZeroAddress
            | IssuanceError::InvalidAmount
            | IssuanceError::InvalidArrayLength { .. }
            | IssuanceError::DuplicateWallet(_)
            | IssuanceError::NotAContract(_)
            | IssuanceError::InvalidPercentages { .. }
            | IssuanceError::InvalidSchedule(_)
            | IssuanceError::Ledger(_) => ErrorKind::Validation,
            IssuanceError::MintingPeriodEnded { .. }
            | IssuanceError::MintDelayNotMet { .. }
            | IssuanceError::RequestExpired { .. } => ErrorKind::Temporal,
            IssuanceError::AlreadyExecuted(_)
            | IssuanceError::AlreadyCancelled(_)
            | IssuanceError::DistributionAlreadyConfigured => ErrorKind::StateConflict,
            IssuanceError::ExceedsAnnualMintCap { .. } => ErrorKind::Invariant,
        }
    }
}

pub type Result<T> = std::result::Result<T, IssuanceError>;
