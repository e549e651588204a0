//! Routed calls and the upgrade-layer payload

use civitas_core::codec::{self, CodecError};
use civitas_core::{Address, H256};
use civitas_governance::ProposalCall;
use civitas_treasury::ReadyAction;
use serde::{Deserialize, Serialize};

/// One call into a component. `payload` is the component's encoded call enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub target: Address,
    pub value: u128,
    pub payload: Vec<u8>,
}

impl Call {
    pub fn new(target: Address, payload: Vec<u8>) -> Self {
        Self {
            target,
            value: 0,
            payload,
        }
    }
}

impl From<ProposalCall> for Call {
    fn from(call: ProposalCall) -> Self {
        Self {
            target: call.target,
            value: call.value,
            payload: call.payload,
        }
    }
}

impl From<ReadyAction> for Call {
    fn from(action: ReadyAction) -> Self {
        Self::new(action.target, action.payload)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeCall {
    ScheduleUpgrade {
        proxy: Address,
        new_implementation: Address,
        data: Vec<u8>,
        force_import: bool,
    },
    ExecuteUpgrade {
        admin_registry: Address,
        proxy: Address,
    },
}

impl UpgradeCall {
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(self)
    }

    pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
        codec::decode(payload)
    }
}

/// What a routed call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Done,
    MintRequestCreated(u64),
    ActionCreated(H256),
    /// A signed or timelocked action reached execution and was dispatched.
    ActionDispatched {
        hash: H256,
        inner: Box<CallOutcome>,
    },
}
