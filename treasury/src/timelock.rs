//! Delayed actions
//!
//! Anyone may schedule; only a holder of the action's role may execute,
//! and only once the delay has passed. Role membership is read from the
//! role manager at execution time.

use crate::error::{Result, TreasuryError};
use crate::multisig::ReadyAction;
use civitas_core::config::TimelockConfig;
use civitas_core::{AccessControl, Address, FieldHasher, Role, H256};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelockStatus {
    Scheduled,
    Executed { at: u64 },
    Cancelled { at: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelockAction {
    pub hash: H256,
    pub target: Address,
    pub payload: Vec<u8>,
    pub role: Role,
    pub proposer: Address,
    pub scheduled_at: u64,
    pub ready_at: u64,
    pub status: TimelockStatus,
}

impl TimelockAction {
    pub fn is_ready(&self, now: u64) -> bool {
        self.status == TimelockStatus::Scheduled && now >= self.ready_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelockEvent {
    ActionScheduled {
        hash: H256,
        role: Role,
        ready_at: u64,
    },
    ActionExecuted {
        hash: H256,
        executor: Address,
    },
    ActionCancelled {
        hash: H256,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelockActions {
    address: Address,
    min_delay: u64,
    actions: BTreeMap<H256, TimelockAction>,
    nonce: u64,
    events: Vec<TimelockEvent>,
}

impl TimelockActions {
    pub fn new(address: Address, config: &TimelockConfig) -> Result<Self> {
        if address.is_zero() {
            return Err(TreasuryError::ZeroAddress);
        }
        if config.min_delay_secs == 0 {
            return Err(TreasuryError::InvalidConfig(
                "minimum delay cannot be zero".to_string(),
            ));
        }
        Ok(Self {
            address,
            min_delay: config.min_delay_secs,
            actions: BTreeMap::new(),
            nonce: 0,
            events: Vec::new(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn min_delay(&self) -> u64 {
        self.min_delay
    }

    pub fn schedule_action(
        &mut self,
        caller: &Address,
        target: Address,
        payload: Vec<u8>,
        role: Role,
        delay: u64,
        now: u64,
    ) -> Result<H256> {
        if delay < self.min_delay {
            return Err(TreasuryError::InvalidDelay {
                delay,
                min_delay: self.min_delay,
            });
        }

        self.nonce += 1;
        let hash = FieldHasher::new("civitas.timelock.action")
            .bytes(target.as_bytes())
            .bytes(&payload)
            .bytes(role.id().as_bytes())
            .bytes(caller.as_bytes())
            .u64(now)
            .u64(self.nonce)
            .finish();
        let ready_at = now.saturating_add(delay);

        info!(
            "Timelock action {} scheduled under {}, ready at {}",
            hash.short(),
            role,
            ready_at
        );
        self.events.push(TimelockEvent::ActionScheduled {
            hash,
            role: role.clone(),
            ready_at,
        });
        self.actions.insert(
            hash,
            TimelockAction {
                hash,
                target,
                payload,
                role,
                proposer: *caller,
                scheduled_at: now,
                ready_at,
                status: TimelockStatus::Scheduled,
            },
        );
        Ok(hash)
    }

    /// Mark the action executed and hand it back for dispatch.
    pub fn execute_action(
        &mut self,
        caller: &Address,
        hash: &H256,
        now: u64,
        roles: &AccessControl,
    ) -> Result<ReadyAction> {
        let action = self.scheduled_or_err(hash)?;
        if now < action.ready_at {
            return Err(TreasuryError::ActionNotReady {
                ready_at: action.ready_at,
                now,
            });
        }
        if !roles.has_role(&action.role, caller) {
            warn!(
                "Timelock execute of {} refused: {} lacks {}",
                hash.short(),
                caller,
                action.role
            );
            return Err(TreasuryError::Unauthorized(*caller));
        }

        let action = self
            .actions
            .get_mut(hash)
            .ok_or(TreasuryError::ActionNotFound(*hash))?;
        action.status = TimelockStatus::Executed { at: now };
        let ready = ReadyAction {
            hash: *hash,
            role: action.role.clone(),
            target: action.target,
            payload: action.payload.clone(),
        };
        info!("Timelock action {} executed by {}", hash.short(), caller);
        self.events.push(TimelockEvent::ActionExecuted {
            hash: *hash,
            executor: *caller,
        });
        Ok(ready)
    }

    pub fn cancel_action(&mut self, caller: &Address, hash: &H256, now: u64) -> Result<()> {
        let action = self.scheduled_or_err(hash)?;
        if action.proposer != *caller {
            return Err(TreasuryError::Unauthorized(*caller));
        }
        if let Some(action) = self.actions.get_mut(hash) {
            action.status = TimelockStatus::Cancelled { at: now };
        }
        info!("Timelock action {} cancelled", hash.short());
        self.events
            .push(TimelockEvent::ActionCancelled { hash: *hash });
        Ok(())
    }

    fn scheduled_or_err(&self, hash: &H256) -> Result<&TimelockAction> {
        let action = self
            .actions
            .get(hash)
            .ok_or(TreasuryError::ActionNotFound(*hash))?;
        match action.status {
            TimelockStatus::Scheduled => Ok(action),
            TimelockStatus::Executed { .. } => Err(TreasuryError::ActionAlreadyExecuted(*hash)),
            TimelockStatus::Cancelled { .. } => Err(TreasuryError::ActionAlreadyCancelled(*hash)),
        }
    }

    pub fn action(&self, hash: &H256) -> Option<&TimelockAction> {
        self.actions.get(hash)
    }

    pub fn scheduled(&self) -> Vec<&TimelockAction> {
        self.actions
            .values()
            .filter(|a| a.status == TimelockStatus::Scheduled)
            .collect()
    }

    pub fn events(&self) -> &[TimelockEvent] {
        &self.events
    }
}
