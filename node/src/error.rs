//! Router error types

use civitas_core::{Address, Classify, CodecError, ConfigError, ErrorKind, UpgradeError};
use civitas_economics::IssuanceError;
use civitas_governance::GovernanceError;
use civitas_treasury::TreasuryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DaoError {
    #[error("No component at {0}")]
    UnknownTarget(Address),

    #[error("Component {target} does not accept value (got {value})")]
    ValueNotAccepted { target: Address, value: u128 },

    #[error("Call depth {0} exceeds the limit")]
    CallDepthExceeded(usize),

    #[error("Upgrade calls from {0} are not authorized")]
    UpgradeNotAuthorized(Address),

    #[error("Malformed payload: {0}")]
    Codec(#[from] CodecError),

    #[error("Issuance: {0}")]
    Issuance(#[from] IssuanceError),

    #[error("Governance: {0}")]
    Governance(#[from] GovernanceError),

    #[error("Treasury: {0}")]
    Treasury(#[from] TreasuryError),

    #[error("Upgrade: {0}")]
    Upgrade(#[from] UpgradeError),

    #[error("Configuration: {0}")]
    Config(#[from] ConfigError),
}

impl Classify for DaoError {
    fn kind(&self) -> ErrorKind {
        match self {
            DaoError::UnknownTarget(_)
            | DaoError::ValueNotAccepted { .. }
            | DaoError::Codec(_)
            | DaoError::Config(_) => ErrorKind::Validation,
            DaoError::CallDepthExceeded(_) => ErrorKind::Invariant,
            DaoError::UpgradeNotAuthorized(_) => ErrorKind::Authorization,
            DaoError::Issuance(e) => e.kind(),
            DaoError::Governance(e) => e.kind(),
            DaoError::Treasury(e) => e.kind(),
            DaoError::Upgrade(e) => match e {
                UpgradeError::ZeroAddress(_) => ErrorKind::Validation,
                UpgradeError::NothingScheduled(_) => ErrorKind::StateConflict,
                UpgradeError::AdminMismatch { .. } => ErrorKind::Authorization,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, DaoError>;
