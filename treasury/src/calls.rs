//! Payloads routed into the role manager and the timelock

use crate::error::Result;
use crate::multisig::{MultiSigRoleManager, ReadyAction, SignOutcome};
use crate::timelock::TimelockActions;
use civitas_core::codec::{self, CodecError};
use civitas_core::{AccessControl, Address, Role, H256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleManagerCall {
    ConfigureRole {
        role: String,
        threshold: usize,
        signers: Vec<Address>,
    },
    ProposeAction {
        role: String,
        target: Address,
        payload: Vec<u8>,
    },
    SignAction {
        hash: H256,
    },
    ExecuteAction {
        hash: H256,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelockCall {
    ScheduleAction {
        target: Address,
        payload: Vec<u8>,
        role: String,
        delay: u64,
    },
    ExecuteAction {
        hash: H256,
    },
    CancelAction {
        hash: H256,
    },
}

macro_rules! json_codec {
    ($ty:ty) => {
        impl $ty {
            pub fn encode(&self) -> std::result::Result<Vec<u8>, CodecError> {
                codec::encode(self)
            }

            pub fn decode(payload: &[u8]) -> std::result::Result<Self, CodecError> {
                codec::decode(payload)
            }
        }
    };
}

json_codec!(RoleManagerCall);
json_codec!(TimelockCall);

/// Result of a routed call: either nothing further, a freshly created
/// action hash, or an action cleared for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Done,
    Created(H256),
    Dispatch(ReadyAction),
}

impl MultiSigRoleManager {
    pub fn handle(&mut self, caller: &Address, call: RoleManagerCall, now: u64) -> Result<ActionOutcome> {
        match call {
            RoleManagerCall::ConfigureRole {
                role,
                threshold,
                signers,
            } => {
                self.configure_role(caller, Role::new(role), threshold, signers)?;
                Ok(ActionOutcome::Done)
            }
            RoleManagerCall::ProposeAction {
                role,
                target,
                payload,
            } => self
                .propose_action(caller, Role::new(role), target, payload, now)
                .map(ActionOutcome::Created),
            RoleManagerCall::SignAction { hash } => Ok(match self.sign_action(caller, &hash)? {
                SignOutcome::Executed(action) => ActionOutcome::Dispatch(action),
                SignOutcome::Pending { .. } => ActionOutcome::Done,
            }),
            RoleManagerCall::ExecuteAction { hash } => self
                .execute_action(caller, &hash)
                .map(ActionOutcome::Dispatch),
        }
    }
}

impl TimelockActions {
    pub fn handle(
        &mut self,
        caller: &Address,
        call: TimelockCall,
        now: u64,
        roles: &AccessControl,
    ) -> Result<ActionOutcome> {
        match call {
            TimelockCall::ScheduleAction {
                target,
                payload,
                role,
                delay,
            } => self
                .schedule_action(caller, target, payload, Role::new(role), delay, now)
                .map(ActionOutcome::Created),
            TimelockCall::ExecuteAction { hash } => self
                .execute_action(caller, &hash, now, roles)
                .map(ActionOutcome::Dispatch),
            TimelockCall::CancelAction { hash } => {
                self.cancel_action(caller, &hash, now)?;
                Ok(ActionOutcome::Done)
            }
        }
    }
}
