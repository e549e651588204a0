//! Proposal governor
//!
//! Proposals move Pending -> Active -> Succeeded/Defeated -> Queued ->
//! Executed, with Expired and Canceled as side exits. Only the lifecycle
//! tag is stored; the voting-window states are derived from the clock and
//! the tally every time they are asked for.

use crate::council::SecurityCouncil;
use crate::error::{GovernanceError, Result};
use crate::proposal::{
    hash_description, proposal_id, zip_calls, Lifecycle, Proposal, ProposalCall, ProposalClass,
    ProposalId, ProposalState,
};
use crate::quorum::{quorum_amount, QuorumConfig};
use crate::voting::{ProposalVotes, Vote, VoteChoice, VotingRecord};
use civitas_core::config::GovernanceConfig;
use civitas_core::constants::BPS_DENOMINATOR;
use civitas_core::{AccessControl, Address, Ledger, Role, H256, GOVERNANCE_ROLE};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernorEvent {
    ProposalCreated {
        id: ProposalId,
        class: ProposalClass,
        proposer: Address,
        vote_start: u64,
        vote_end: u64,
    },
    VoteCast {
        id: ProposalId,
        voter: Address,
        choice: VoteChoice,
        weight: u128,
    },
    ProposalQueued {
        id: ProposalId,
        eta: u64,
    },
    ProposalExecuted {
        id: ProposalId,
    },
    ProposalCanceled {
        id: ProposalId,
        by: Address,
    },
    QuorumUpdated {
        class: ProposalClass,
        old_bps: u16,
        new_bps: u16,
    },
    SecurityCouncilMemberAdded {
        member: Address,
    },
    SecurityCouncilMemberRemoved {
        member: Address,
    },
    PrivilegedMultisigUpdated {
        old: Address,
        new: Address,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalGovernor {
    address: Address,
    access: AccessControl,
    privileged_multisig: Address,
    council: SecurityCouncil,
    quorums: QuorumConfig,
    voting_delay: u64,
    voting_period: u64,
    timelock_delay: u64,
    grace_period: u64,
    proposal_threshold_bps: u16,
    proposals: BTreeMap<ProposalId, Proposal>,
    votes: BTreeMap<ProposalId, VotingRecord>,
    events: Vec<GovernorEvent>,
}

impl ProposalGovernor {
    /// `address` is the governor's own identity. It holds `GOVERNANCE_ROLE`
    /// so executed proposals can manage the council and quorums.
    pub fn new(
        address: Address,
        admin: Address,
        privileged_multisig: Address,
        council: Vec<Address>,
        config: &GovernanceConfig,
    ) -> Result<Self> {
        if address.is_zero() || admin.is_zero() || privileged_multisig.is_zero() {
            return Err(GovernanceError::ZeroAddress);
        }
        if config.voting_period_secs == 0 {
            return Err(GovernanceError::InvalidConfig(
                "voting period cannot be zero".to_string(),
            ));
        }
        if config.proposal_threshold_bps > BPS_DENOMINATOR {
            return Err(GovernanceError::InvalidConfig(format!(
                "proposal threshold {} bps exceeds {}",
                config.proposal_threshold_bps, BPS_DENOMINATOR
            )));
        }

        let mut access = AccessControl::with_admin(admin);
        access.grant(GOVERNANCE_ROLE.into(), address);

        Ok(Self {
            address,
            access,
            privileged_multisig,
            council: SecurityCouncil::new(council)?,
            quorums: QuorumConfig::from_settings(&config.quorum)?,
            voting_delay: config.voting_delay_secs,
            voting_period: config.voting_period_secs,
            timelock_delay: config.timelock_delay_secs,
            grace_period: config.grace_period_secs,
            proposal_threshold_bps: config.proposal_threshold_bps,
            proposals: BTreeMap::new(),
            votes: BTreeMap::new(),
            events: Vec::new(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    // ------------------------------------------------------------------
    // Proposal lifecycle
    // ------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn submit(
        &mut self,
        caller: &Address,
        class: ProposalClass,
        targets: Vec<Address>,
        values: Vec<u128>,
        payloads: Vec<Vec<u8>>,
        description: String,
        now: u64,
        ledger: &dyn Ledger,
    ) -> Result<ProposalId> {
        let calls = zip_calls(&targets, &values, &payloads)?;
        self.check_submitter(caller, class, now, ledger)?;

        let description_hash = hash_description(&description);
        let id = proposal_id(&targets, &values, &payloads, &description_hash);
        if self.proposals.contains_key(&id) {
            return Err(GovernanceError::ProposalAlreadyExists(id));
        }

        let vote_start = now.saturating_add(self.voting_delay);
        let vote_end = vote_start.saturating_add(self.voting_period);
        let proposal = Proposal {
            id,
            class,
            proposer: *caller,
            calls,
            description,
            description_hash,
            submitted_at: now,
            snapshot: vote_start,
            vote_start,
            vote_end,
            lifecycle: Lifecycle::Open,
        };

        info!(
            "Proposal {} submitted: {:?} by {}, voting {}..{}",
            id.short(),
            class,
            caller,
            vote_start,
            vote_end
        );
        self.events.push(GovernorEvent::ProposalCreated {
            id,
            class,
            proposer: *caller,
            vote_start,
            vote_end,
        });
        self.proposals.insert(id, proposal);
        self.votes.insert(id, VotingRecord::new());
        Ok(id)
    }

    fn check_submitter(
        &self,
        caller: &Address,
        class: ProposalClass,
        now: u64,
        ledger: &dyn Ledger,
    ) -> Result<()> {
        match class {
            ProposalClass::Standard => {
                let weight = ledger.voting_weight_at(caller, now);
                let required = quorum_amount(ledger.total_supply_at(now), self.proposal_threshold_bps);
                if weight < required {
                    return Err(GovernanceError::InsufficientVotingPowerForStandardProposal {
                        weight,
                        required,
                    });
                }
            }
            ProposalClass::Emergency => {
                if *caller != self.privileged_multisig && !self.council.contains(caller) {
                    return Err(GovernanceError::OnlySecurityCouncil);
                }
            }
            ProposalClass::Upgrade | ProposalClass::Constitutional => {
                if *caller != self.privileged_multisig {
                    return Err(GovernanceError::OnlyPrivilegedMultisigWallet(class));
                }
            }
        }
        Ok(())
    }

    /// Vote with the caller's weight at the proposal snapshot.
    pub fn cast_vote(
        &mut self,
        caller: &Address,
        id: &ProposalId,
        choice: VoteChoice,
        now: u64,
        ledger: &dyn Ledger,
    ) -> Result<u128> {
        let proposal = self.get(id)?;
        let state = self.state_of(proposal, now, ledger);
        if state != ProposalState::Active {
            return Err(GovernanceError::VotingNotActive { id: *id, state });
        }
        let snapshot = proposal.snapshot;

        let record = self.votes.entry(*id).or_default();
        if record.has_voted(caller) {
            return Err(GovernanceError::AlreadyVoted(*caller));
        }
        let weight = ledger.voting_weight_at(caller, snapshot);
        if weight == 0 {
            return Err(GovernanceError::NoVotingPower(*caller));
        }
        record.add_vote(Vote {
            voter: *caller,
            choice,
            weight,
            timestamp: now,
        });

        debug!("Vote on {}: {} {:?} with {}", id.short(), caller, choice, weight);
        self.events.push(GovernorEvent::VoteCast {
            id: *id,
            voter: *caller,
            choice,
            weight,
        });
        Ok(weight)
    }

    pub fn queue(
        &mut self,
        targets: &[Address],
        values: &[u128],
        payloads: &[Vec<u8>],
        description_hash: &H256,
        now: u64,
        ledger: &dyn Ledger,
    ) -> Result<ProposalId> {
        let id = proposal_id(targets, values, payloads, description_hash);
        let state = self.state(&id, now, ledger)?;
        if state != ProposalState::Succeeded {
            return Err(GovernanceError::ProposalNotSuccessful { id, state });
        }

        let eta = now.saturating_add(self.timelock_delay);
        if let Some(proposal) = self.proposals.get_mut(&id) {
            proposal.lifecycle = Lifecycle::Queued { eta };
        }
        info!("Proposal {} queued, eta {}", id.short(), eta);
        self.events.push(GovernorEvent::ProposalQueued { id, eta });
        Ok(id)
    }

    /// Mark a queued proposal executed and hand back its calls. The caller
    /// dispatches them and discards this governor's state if any fails.
    pub fn execute(
        &mut self,
        targets: &[Address],
        values: &[u128],
        payloads: &[Vec<u8>],
        description_hash: &H256,
        now: u64,
        ledger: &dyn Ledger,
    ) -> Result<(ProposalId, Vec<ProposalCall>)> {
        let id = proposal_id(targets, values, payloads, description_hash);
        let state = self.state(&id, now, ledger)?;
        if state != ProposalState::Queued {
            return Err(GovernanceError::ProposalNotQueued { id, state });
        }

        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        if let Lifecycle::Queued { eta } = proposal.lifecycle {
            if now < eta {
                return Err(GovernanceError::TimelockNotElapsed { eta, now });
            }
        }
        proposal.lifecycle = Lifecycle::Executed { at: now };
        let calls = proposal.calls.clone();

        info!("Proposal {} executed ({} calls)", id.short(), calls.len());
        self.events.push(GovernorEvent::ProposalExecuted { id });
        Ok((id, calls))
    }

    /// Proposers may withdraw while Pending; council members may cancel
    /// anything that has not been executed.
    #[allow(clippy::too_many_arguments)]
    pub fn cancel(
        &mut self,
        caller: &Address,
        targets: &[Address],
        values: &[u128],
        payloads: &[Vec<u8>],
        description_hash: &H256,
        now: u64,
        ledger: &dyn Ledger,
    ) -> Result<ProposalId> {
        let id = proposal_id(targets, values, payloads, description_hash);
        let proposal = self.get(&id)?;
        if proposal.is_canceled() {
            return Err(GovernanceError::ProposalAlreadyCancelled(id));
        }

        let state = self.state_of(proposal, now, ledger);
        if state == ProposalState::Executed {
            return Err(GovernanceError::UnexpectedProposalState { id, state });
        }
        let by_council = self.council.contains(caller);
        let by_proposer = proposal.proposer == *caller && state == ProposalState::Pending;
        if !by_council && !by_proposer {
            warn!("Rejected cancellation of {} by {}", id.short(), caller);
            return Err(GovernanceError::UnauthorizedCancellation(*caller));
        }

        if let Some(proposal) = self.proposals.get_mut(&id) {
            proposal.lifecycle = Lifecycle::Canceled {
                by: *caller,
                at: now,
            };
        }
        info!(
            "Proposal {} canceled by {} ({})",
            id.short(),
            caller,
            if by_council { "council" } else { "proposer" }
        );
        self.events
            .push(GovernorEvent::ProposalCanceled { id, by: *caller });
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    pub fn state(&self, id: &ProposalId, now: u64, ledger: &dyn Ledger) -> Result<ProposalState> {
        let proposal = self.get(id)?;
        Ok(self.state_of(proposal, now, ledger))
    }

    fn state_of(&self, proposal: &Proposal, now: u64, ledger: &dyn Ledger) -> ProposalState {
        match proposal.lifecycle {
            Lifecycle::Canceled { .. } => ProposalState::Canceled,
            Lifecycle::Executed { .. } => ProposalState::Executed,
            Lifecycle::Queued { eta } => {
                if now >= eta.saturating_add(self.grace_period) {
                    ProposalState::Expired
                } else {
                    ProposalState::Queued
                }
            }
            Lifecycle::Open => {
                if now <= proposal.vote_start {
                    ProposalState::Pending
                } else if now <= proposal.vote_end {
                    ProposalState::Active
                } else if self.succeeded(proposal, ledger) {
                    ProposalState::Succeeded
                } else {
                    ProposalState::Defeated
                }
            }
        }
    }

    fn succeeded(&self, proposal: &Proposal, ledger: &dyn Ledger) -> bool {
        let tally = self.proposal_votes(&proposal.id);
        let quorum = self.quorum_at(proposal, ledger);
        tally.quorum_reached(quorum) && tally.vote_succeeded()
    }

    fn quorum_at(&self, proposal: &Proposal, ledger: &dyn Ledger) -> u128 {
        quorum_amount(
            ledger.total_supply_at(proposal.snapshot),
            self.quorums.bps(proposal.class),
        )
    }

    /// Absolute quorum for a proposal, from supply at its snapshot.
    pub fn quorum_for(&self, id: &ProposalId, ledger: &dyn Ledger) -> Result<u128> {
        let proposal = self.get(id)?;
        Ok(self.quorum_at(proposal, ledger))
    }

    pub fn proposal(&self, id: &ProposalId) -> Option<&Proposal> {
        self.proposals.get(id)
    }

    pub fn proposal_votes(&self, id: &ProposalId) -> ProposalVotes {
        self.votes
            .get(id)
            .map(VotingRecord::tally)
            .unwrap_or_default()
    }

    pub fn has_voted(&self, id: &ProposalId, account: &Address) -> bool {
        self.votes
            .get(id)
            .map(|record| record.has_voted(account))
            .unwrap_or(false)
    }

    pub fn vote_of(&self, id: &ProposalId, account: &Address) -> Option<&Vote> {
        self.votes.get(id).and_then(|record| record.vote_of(account))
    }

    pub fn proposal_count(&self) -> usize {
        self.proposals.len()
    }

    pub fn quorums(&self) -> QuorumConfig {
        self.quorums
    }

    pub fn quorum_bps(&self, class: ProposalClass) -> u16 {
        self.quorums.bps(class)
    }

    pub fn privileged_multisig(&self) -> Address {
        self.privileged_multisig
    }

    pub fn is_security_council_member(&self, account: &Address) -> bool {
        self.council.contains(account)
    }

    pub fn security_council(&self) -> Vec<Address> {
        self.council.members()
    }

    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    pub fn events(&self) -> &[GovernorEvent] {
        &self.events
    }

    fn get(&self, id: &ProposalId) -> Result<&Proposal> {
        self.proposals
            .get(id)
            .ok_or(GovernanceError::ProposalNotFound(*id))
    }

    // ------------------------------------------------------------------
    // Self-governed parameters
    // ------------------------------------------------------------------

    fn only_governance(&self, caller: &Address) -> Result<()> {
        if *caller != self.address {
            return Err(GovernanceError::OnlyGovernance(*caller));
        }
        Ok(())
    }

    fn set_quorum(&mut self, caller: &Address, class: ProposalClass, bps: u16) -> Result<()> {
        self.only_governance(caller)?;
        let next = self.quorums.with_class(class, bps)?;
        let old_bps = self.quorums.bps(class);
        self.quorums = next;
        info!("{:?} quorum {} -> {} bps", class, old_bps, bps);
        self.events.push(GovernorEvent::QuorumUpdated {
            class,
            old_bps,
            new_bps: bps,
        });
        Ok(())
    }

    pub fn set_standard_quorum(&mut self, caller: &Address, bps: u16) -> Result<()> {
        self.set_quorum(caller, ProposalClass::Standard, bps)
    }

    pub fn set_emergency_quorum(&mut self, caller: &Address, bps: u16) -> Result<()> {
        self.set_quorum(caller, ProposalClass::Emergency, bps)
    }

    pub fn set_upgrade_quorum(&mut self, caller: &Address, bps: u16) -> Result<()> {
        self.set_quorum(caller, ProposalClass::Upgrade, bps)
    }

    pub fn set_constitutional_quorum(&mut self, caller: &Address, bps: u16) -> Result<()> {
        self.set_quorum(caller, ProposalClass::Constitutional, bps)
    }

    /// Replace all four quorums at once. The hierarchy is checked on the
    /// final values only, so moves that would be invalid one by one work.
    pub fn set_all_quorums(
        &mut self,
        caller: &Address,
        standard: u16,
        emergency: u16,
        upgrade: u16,
        constitutional: u16,
    ) -> Result<()> {
        self.only_governance(caller)?;
        let next = QuorumConfig::new(standard, emergency, upgrade, constitutional)?;
        for class in ProposalClass::ALL {
            let (old_bps, new_bps) = (self.quorums.bps(class), next.bps(class));
            if old_bps != new_bps {
                self.events.push(GovernorEvent::QuorumUpdated {
                    class,
                    old_bps,
                    new_bps,
                });
            }
        }
        self.quorums = next;
        info!(
            "Quorums set to {}/{}/{}/{} bps",
            standard, emergency, upgrade, constitutional
        );
        Ok(())
    }

    pub fn set_privileged_multisig(&mut self, caller: &Address, new: Address) -> Result<()> {
        self.only_governance(caller)?;
        if new.is_zero() {
            return Err(GovernanceError::ZeroAddress);
        }
        let old = std::mem::replace(&mut self.privileged_multisig, new);
        info!("Privileged multisig rotated {} -> {}", old, new);
        self.events
            .push(GovernorEvent::PrivilegedMultisigUpdated { old, new });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Council and roles
    // ------------------------------------------------------------------

    pub fn add_security_council_member(&mut self, caller: &Address, member: Address) -> Result<()> {
        self.access.check_role(&GOVERNANCE_ROLE.into(), caller)?;
        self.council.add(member)?;
        info!("Security council member added: {}", member);
        self.events
            .push(GovernorEvent::SecurityCouncilMemberAdded { member });
        Ok(())
    }

    pub fn remove_security_council_member(
        &mut self,
        caller: &Address,
        member: &Address,
    ) -> Result<()> {
        self.access.check_role(&GOVERNANCE_ROLE.into(), caller)?;
        self.council.remove(member)?;
        info!("Security council member removed: {}", member);
        self.events
            .push(GovernorEvent::SecurityCouncilMemberRemoved { member: *member });
        Ok(())
    }

    pub fn grant_role(&mut self, caller: &Address, role: Role, account: Address) -> Result<bool> {
        if account.is_zero() {
            return Err(GovernanceError::ZeroAddress);
        }
        Ok(self.access.grant_role(caller, role, account)?)
    }

    pub fn revoke_role(&mut self, caller: &Address, role: &Role, account: &Address) -> Result<bool> {
        Ok(self.access.revoke_role(caller, role, account)?)
    }
}
