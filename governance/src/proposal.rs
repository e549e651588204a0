//! Proposal types and identity

use crate::error::{GovernanceError, Result};
use civitas_core::{sha256, Address, FieldHasher, H256};
use serde::{Deserialize, Serialize};

pub type ProposalId = H256;

/// Each class carries its own quorum and submission rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProposalClass {
    Standard,
    Emergency,
    Upgrade,
    Constitutional,
}

impl ProposalClass {
    pub const ALL: [ProposalClass; 4] = [
        ProposalClass::Standard,
        ProposalClass::Emergency,
        ProposalClass::Upgrade,
        ProposalClass::Constitutional,
    ];
}

/// Derived state, computed from the stored lifecycle and the clock.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProposalState {
    Pending,
    Active,
    Canceled,
    Defeated,
    Succeeded,
    Queued,
    Expired,
    Executed,
}

impl ProposalState {
    /// No further transition is possible from here.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProposalState::Canceled
                | ProposalState::Defeated
                | ProposalState::Expired
                | ProposalState::Executed
        )
    }
}

/// What has been written for a proposal. Voting windows are derived.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Lifecycle {
    Open,
    Queued { eta: u64 },
    Executed { at: u64 },
    Canceled { by: Address, at: u64 },
}

/// One call carried by a proposal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProposalCall {
    pub target: Address,
    pub value: u128,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub class: ProposalClass,
    pub proposer: Address,
    pub calls: Vec<ProposalCall>,
    pub description: String,
    pub description_hash: H256,
    pub submitted_at: u64,
    /// Voting weight and quorum are read at this instant.
    pub snapshot: u64,
    pub vote_start: u64,
    pub vote_end: u64,
    pub lifecycle: Lifecycle,
}

impl Proposal {
    pub fn is_canceled(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Canceled { .. })
    }

    pub fn eta(&self) -> Option<u64> {
        match self.lifecycle {
            Lifecycle::Queued { eta } => Some(eta),
            _ => None,
        }
    }
}

pub fn hash_description(description: &str) -> H256 {
    sha256(description.as_bytes())
}

/// Deterministic id over the call arrays and the description hash.
pub fn proposal_id(
    targets: &[Address],
    values: &[u128],
    payloads: &[Vec<u8>],
    description_hash: &H256,
) -> ProposalId {
    let mut hasher = FieldHasher::new("civitas.governor.proposal");
    hasher.u64(targets.len() as u64);
    for target in targets {
        hasher.bytes(target.as_bytes());
    }
    for value in values {
        hasher.u128(*value);
    }
    for payload in payloads {
        hasher.bytes(payload);
    }
    hasher.bytes(description_hash.as_bytes());
    hasher.finish()
}

/// Zip the three arrays, rejecting empty or mismatched input.
pub fn zip_calls(
    targets: &[Address],
    values: &[u128],
    payloads: &[Vec<u8>],
) -> Result<Vec<ProposalCall>> {
    if targets.is_empty() || targets.len() != values.len() || targets.len() != payloads.len() {
        return Err(GovernanceError::InvalidProposalLength {
            targets: targets.len(),
            values: values.len(),
            payloads: payloads.len(),
        });
    }
    Ok(targets
        .iter()
        .zip(values)
        .zip(payloads)
        .map(|((target, value), payload)| ProposalCall {
            target: *target,
            value: *value,
            payload: payload.clone(),
        })
        .collect())
}
