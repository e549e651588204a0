//! N-of-M role manager
//!
//! Each role carries a threshold and a signer set. Any signer may propose
//! an action under that role, which counts as its first signature. The
//! signature that brings the count to the threshold executes the action
//! and removes it from the pending set.

use crate::error::{Result, TreasuryError};
use civitas_core::config::MultisigConfig;
use civitas_core::{AccessControl, Address, FieldHasher, Role, H256};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// True once enough signatures have been collected.
pub fn should_execute(signatures: usize, threshold: usize) -> bool {
    threshold > 0 && signatures >= threshold
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    pub threshold: usize,
    pub signers: Vec<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAction {
    pub hash: H256,
    pub role: Role,
    pub target: Address,
    pub payload: Vec<u8>,
    pub signatures: BTreeSet<Address>,
    pub proposer: Address,
    pub created_at: u64,
}

/// An action cleared for dispatch against `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyAction {
    pub hash: H256,
    pub role: Role,
    pub target: Address,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignOutcome {
    Pending { signatures: usize, threshold: usize },
    Executed(ReadyAction),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultisigEvent {
    RoleConfigured {
        role: Role,
        threshold: usize,
        signers: Vec<Address>,
    },
    ActionProposed {
        hash: H256,
        role: Role,
        proposer: Address,
    },
    ActionSigned {
        hash: H256,
        signer: Address,
        signatures: usize,
    },
    ActionExecuted {
        hash: H256,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiSigRoleManager {
    address: Address,
    access: AccessControl,
    min_signatures: usize,
    max_signatures: usize,
    roles: BTreeMap<Role, RoleConfig>,
    pending: BTreeMap<H256, PendingAction>,
    executed: BTreeSet<H256>,
    nonce: u64,
    events: Vec<MultisigEvent>,
}

impl MultiSigRoleManager {
    /// Both `admin` and the manager's own `address` hold the admin role, so
    /// a signed action addressed to the manager can reconfigure roles.
    pub fn new(address: Address, admin: Address, config: &MultisigConfig) -> Result<Self> {
        if address.is_zero() || admin.is_zero() {
            return Err(TreasuryError::ZeroAddress);
        }
        if config.min_signatures < 2 || config.min_signatures > config.max_signatures {
            return Err(TreasuryError::InvalidConfig(format!(
                "signature bounds {}..={} are invalid",
                config.min_signatures, config.max_signatures
            )));
        }
        let mut access = AccessControl::with_admin(admin);
        access.grant(Role::admin(), address);
        Ok(Self {
            address,
            access,
            min_signatures: config.min_signatures,
            max_signatures: config.max_signatures,
            roles: BTreeMap::new(),
            pending: BTreeMap::new(),
            executed: BTreeSet::new(),
            nonce: 0,
            events: Vec::new(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Replace the signer set and threshold for `role`. Previous signers
    /// lose the role.
    pub fn configure_role(
        &mut self,
        caller: &Address,
        role: Role,
        threshold: usize,
        signers: Vec<Address>,
    ) -> Result<()> {
        self.access.check_role(&Role::admin(), caller)?;

        if threshold < self.min_signatures
            || threshold > self.max_signatures
            || threshold > signers.len()
        {
            return Err(TreasuryError::InvalidSignatures {
                signatures: signers.len(),
                threshold,
            });
        }
        let mut seen = BTreeSet::new();
        for signer in &signers {
            if signer.is_zero() {
                return Err(TreasuryError::ZeroAddress);
            }
            if !seen.insert(*signer) {
                return Err(TreasuryError::DuplicateSigner(*signer));
            }
        }

        if let Some(previous) = self.roles.get(&role) {
            for signer in &previous.signers {
                self.access.revoke(&role, signer);
            }
        }
        for signer in &signers {
            self.access.grant(role.clone(), *signer);
        }

        info!(
            "Role {} configured: {}-of-{}",
            role,
            threshold,
            signers.len()
        );
        self.events.push(MultisigEvent::RoleConfigured {
            role: role.clone(),
            threshold,
            signers: signers.clone(),
        });
        self.roles.insert(role, RoleConfig { threshold, signers });
        Ok(())
    }

    pub fn propose_action(
        &mut self,
        caller: &Address,
        role: Role,
        target: Address,
        payload: Vec<u8>,
        now: u64,
    ) -> Result<H256> {
        if !self.roles.contains_key(&role) {
            return Err(TreasuryError::RoleNotConfigured(role));
        }
        self.access.check_role(&role, caller)?;

        self.nonce += 1;
        let hash = FieldHasher::new("civitas.multisig.action")
            .bytes(role.id().as_bytes())
            .bytes(target.as_bytes())
            .bytes(&payload)
            .bytes(caller.as_bytes())
            .u64(now)
            .u64(self.nonce)
            .finish();

        let mut signatures = BTreeSet::new();
        signatures.insert(*caller);
        info!("Action {} proposed under {} by {}", hash.short(), role, caller);
        self.events.push(MultisigEvent::ActionProposed {
            hash,
            role: role.clone(),
            proposer: *caller,
        });
        self.pending.insert(
            hash,
            PendingAction {
                hash,
                role,
                target,
                payload,
                signatures,
                proposer: *caller,
                created_at: now,
            },
        );
        Ok(hash)
    }

    /// Add the caller's signature. Returns the action itself when this
    /// signature reaches the threshold.
    pub fn sign_action(&mut self, caller: &Address, hash: &H256) -> Result<SignOutcome> {
        let action = self.pending_or_err(hash)?;
        self.access.check_role(&action.role, caller)?;
        if action.signatures.contains(caller) {
            return Err(TreasuryError::AlreadySigned(*caller));
        }
        let threshold = self.threshold_of(&action.role)?;

        match self.pending.get_mut(hash) {
            Some(action) => {
                action.signatures.insert(*caller);
            }
            None => return Err(TreasuryError::ActionNotFound(*hash)),
        }
        let signatures = self.valid_signatures(hash);
        debug!(
            "Action {} signed by {} ({}/{})",
            hash.short(),
            caller,
            signatures,
            threshold
        );
        self.events.push(MultisigEvent::ActionSigned {
            hash: *hash,
            signer: *caller,
            signatures,
        });

        if should_execute(signatures, threshold) {
            return self.finalize(hash).map(SignOutcome::Executed);
        }
        Ok(SignOutcome::Pending {
            signatures,
            threshold,
        })
    }

    /// Execute an action whose signatures already meet the threshold.
    pub fn execute_action(&mut self, caller: &Address, hash: &H256) -> Result<ReadyAction> {
        let action = self.pending_or_err(hash)?;
        self.access.check_role(&action.role, caller)?;
        let threshold = self.threshold_of(&action.role)?;
        let signatures = self.valid_signatures(hash);
        if !should_execute(signatures, threshold) {
            warn!(
                "Execute of {} refused: {}/{} signatures",
                hash.short(),
                signatures,
                threshold
            );
            return Err(TreasuryError::InvalidSignatures {
                signatures,
                threshold,
            });
        }
        self.finalize(hash)
    }

    fn finalize(&mut self, hash: &H256) -> Result<ReadyAction> {
        let action = self
            .pending
            .remove(hash)
            .ok_or(TreasuryError::ActionNotFound(*hash))?;
        self.executed.insert(*hash);
        info!("Action {} executed against {}", hash.short(), action.target);
        self.events.push(MultisigEvent::ActionExecuted { hash: *hash });
        Ok(ReadyAction {
            hash: *hash,
            role: action.role,
            target: action.target,
            payload: action.payload,
        })
    }

    fn pending_or_err(&self, hash: &H256) -> Result<&PendingAction> {
        if self.executed.contains(hash) {
            return Err(TreasuryError::ActionAlreadyExecuted(*hash));
        }
        self.pending
            .get(hash)
            .ok_or(TreasuryError::ActionNotFound(*hash))
    }

    fn threshold_of(&self, role: &Role) -> Result<usize> {
        self.roles
            .get(role)
            .map(|config| config.threshold)
            .ok_or_else(|| TreasuryError::RoleNotConfigured(role.clone()))
    }

    /// Signatures from accounts that still hold the action's role.
    fn valid_signatures(&self, hash: &H256) -> usize {
        self.pending
            .get(hash)
            .map(|action| {
                action
                    .signatures
                    .iter()
                    .filter(|signer| self.access.has_role(&action.role, signer))
                    .count()
            })
            .unwrap_or(0)
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    pub fn role_config(&self, role: &Role) -> Option<&RoleConfig> {
        self.roles.get(role)
    }

    pub fn pending_action(&self, hash: &H256) -> Option<&PendingAction> {
        self.pending.get(hash)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_executed(&self, hash: &H256) -> bool {
        self.executed.contains(hash)
    }

    pub fn has_role(&self, role: &Role, account: &Address) -> bool {
        self.access.has_role(role, account)
    }

    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    pub fn events(&self) -> &[MultisigEvent] {
        &self.events
    }
}
