//! Civitas Governance Module
//!
//! Token-weighted proposal governor:
//! - Four proposal classes with their own submission rules and quorums
//! - Snapshot voting (for / against / abstain)
//! - Queue, timelock and grace period before execution expires
//! - Security council with cancellation and emergency powers

pub mod calls;
pub mod council;
pub mod error;
pub mod governor;
pub mod proposal;
pub mod quorum;
pub mod voting;

pub use calls::GovernorCall;
pub use council::SecurityCouncil;
pub use error::{GovernanceError, Result};
pub use governor::{GovernorEvent, ProposalGovernor};
pub use proposal::{
    hash_description, proposal_id, Lifecycle, Proposal, ProposalCall, ProposalClass, ProposalId,
    ProposalState,
};
pub use quorum::{quorum_amount, QuorumConfig};
pub use voting::{ProposalVotes, Vote, VoteChoice, VotingRecord};

#[cfg(test)]
mod proptests;
