//! Treasury error types

use civitas_core::{AccessError, Address, Classify, ErrorKind, Role, H256};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreasuryError {
    #[error("Invalid signatures: have {signatures}, threshold {threshold}")]
    InvalidSignatures { signatures: usize, threshold: usize },

    #[error("Zero address")]
    ZeroAddress,

    #[error("Duplicate signer: {0}")]
    DuplicateSigner(Address),

    #[error("Role not configured: {0}")]
    RoleNotConfigured(Role),

    #[error("Already signed: {0}")]
    AlreadySigned(Address),

    #[error("Action not found: {0}")]
    ActionNotFound(H256),

    #[error("Action already executed: {0}")]
    ActionAlreadyExecuted(H256),

    #[error("Action already cancelled: {0}")]
    ActionAlreadyCancelled(H256),

    #[error("Action not ready: ready at {ready_at}, now {now}")]
    ActionNotReady { ready_at: u64, now: u64 },

    #[error("Invalid delay: {delay}s is below the {min_delay}s minimum")]
    InvalidDelay { delay: u64, min_delay: u64 },

    #[error("Unauthorized: {0}")]
    Unauthorized(Address),

    #[error("Invalid treasury configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Access(#[from] AccessError),
}

impl Classify for TreasuryError {
    fn kind(&self) -> ErrorKind {
        use TreasuryError::*;
        match self {
            InvalidSignatures { .. } | Unauthorized(_) | Access(_) => ErrorKind::Authorization,
            ZeroAddress
            | DuplicateSigner(_)
            | RoleNotConfigured(_)
            | ActionNotFound(_)
            | InvalidDelay { .. }
            | InvalidConfig(_) => ErrorKind::Validation,
            ActionNotReady { .. } => ErrorKind::Temporal,
            AlreadySigned(_) | ActionAlreadyExecuted(_) | ActionAlreadyCancelled(_) => {
                ErrorKind::StateConflict
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, TreasuryError>;
