//! Governance error types

use crate::proposal::{ProposalClass, ProposalState};
use civitas_core::{AccessError, Address, Classify, ErrorKind, H256};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("Proposal not found: {0}")]
    ProposalNotFound(H256),

    #[error("Proposal already exists: {0}")]
    ProposalAlreadyExists(H256),

    #[error("Invalid proposal length: {targets} targets, {values} values, {payloads} payloads")]
    InvalidProposalLength {
        targets: usize,
        values: usize,
        payloads: usize,
    },

    #[error("Insufficient voting power for standard proposal: have {weight}, need {required}")]
    InsufficientVotingPowerForStandardProposal { weight: u128, required: u128 },

    #[error("Only the privileged multisig wallet may submit {0:?} proposals")]
    OnlyPrivilegedMultisigWallet(ProposalClass),

    #[error("Only the security council may submit emergency proposals")]
    OnlySecurityCouncil,

    #[error("Only governance may call this: {0}")]
    OnlyGovernance(Address),

    #[error("Unauthorized cancellation by {0}")]
    UnauthorizedCancellation(Address),

    #[error("Proposal already cancelled: {0}")]
    ProposalAlreadyCancelled(H256),

    #[error("Proposal {id} cannot change from state {state:?}")]
    UnexpectedProposalState { id: H256, state: ProposalState },

    #[error("Voting period not active for {id}: state {state:?}")]
    VotingNotActive { id: H256, state: ProposalState },

    #[error("Already voted: {0}")]
    AlreadyVoted(Address),

    #[error("No voting power at snapshot: {0}")]
    NoVotingPower(Address),

    #[error("Proposal {id} did not succeed: state {state:?}")]
    ProposalNotSuccessful { id: H256, state: ProposalState },

    #[error("Proposal {id} is not queued: state {state:?}")]
    ProposalNotQueued { id: H256, state: ProposalState },

    #[error("Timelock not elapsed: eta {eta}, now {now}")]
    TimelockNotElapsed { eta: u64, now: u64 },

    #[error("Invalid quorum value: {0} bps")]
    InvalidQuorumValue(u16),

    #[error(
        "Quorum hierarchy violated: standard {standard} < emergency {emergency} < upgrade {upgrade} < constitutional {constitutional} must hold"
    )]
    QuorumHierarchyViolated {
        standard: u16,
        emergency: u16,
        upgrade: u16,
        constitutional: u16,
    },

    #[error("Zero address")]
    ZeroAddress,

    #[error("Already a security council member: {0}")]
    AlreadySecurityCouncilMember(Address),

    #[error("Not a security council member: {0}")]
    NotSecurityCouncilMember(Address),

    #[error("Invalid governance configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Access(#[from] AccessError),
}

impl Classify for GovernanceError {
    fn kind(&self) -> ErrorKind {
        use GovernanceError::*;
        match self {
            InsufficientVotingPowerForStandardProposal { .. }
            | OnlyPrivilegedMultisigWallet(_)
            | OnlySecurityCouncil
            | OnlyGovernance(_)
            | UnauthorizedCancellation(_)
            | NoVotingPower(_)
            | Access(_) => ErrorKind::Authorization,
            ProposalNotFound(_)
            | InvalidProposalLength { .. }
            | InvalidQuorumValue(_)
            | ZeroAddress
            | InvalidConfig(_) => ErrorKind::Validation,
            VotingNotActive { .. } | TimelockNotElapsed { .. } => ErrorKind::Temporal,
            ProposalAlreadyExists(_)
            | ProposalAlreadyCancelled(_)
            | UnexpectedProposalState { .. }
            | AlreadyVoted(_)
            | ProposalNotSuccessful { .. }
            | ProposalNotQueued { .. }
            | AlreadySecurityCouncilMember(_)
            | NotSecurityCouncilMember(_) => ErrorKind::StateConflict,
            QuorumHierarchyViolated { .. } => ErrorKind::Invariant,
        }
    }
}

pub type Result<T> = std::result::Result<T, GovernanceError>;
