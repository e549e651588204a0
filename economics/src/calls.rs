//! Payloads that proposals and signed actions can carry into the scheduler

use crate::distribution::DistributionWallet;
use crate::error::Result;
use crate::scheduler::IssuanceScheduler;
use civitas_core::codec::{self, CodecError};
use civitas_core::{Address, Ledger};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssuanceCall {
    CreateRequest {
        recipient: Address,
        amount: u128,
        purpose: String,
    },
    CancelRequest {
        id: u64,
    },
    ExecuteRequest {
        id: u64,
    },
    GrantMinter {
        account: Address,
    },
    RevokeMinter {
        account: Address,
    },
    ConfigureDistribution {
        wallets: Vec<DistributionWallet>,
    },
}

/// What a routed call produced, for callers that need the new request id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuanceOutcome {
    RequestCreated(u64),
    Done,
}

impl IssuanceCall {
    pub fn encode(&self) -> std::result::Result<Vec<u8>, CodecError> {
        codec::encode(self)
    }

    pub fn decode(payload: &[u8]) -> std::result::Result<Self, CodecError> {
        codec::decode(payload)
    }
}

impl IssuanceScheduler {
    /// Apply a decoded call on behalf of `caller`.
    pub fn handle(
        &mut self,
        caller: &Address,
        call: IssuanceCall,
        now: u64,
        ledger: &mut dyn Ledger,
    ) -> Result<IssuanceOutcome> {
        match call {
            IssuanceCall::CreateRequest {
                recipient,
                amount,
                purpose,
            } => self
                .create_request(caller, recipient, amount, purpose, now)
                .map(IssuanceOutcome::RequestCreated),
            IssuanceCall::CancelRequest { id } => {
                self.cancel_request(caller, id, now)?;
                Ok(IssuanceOutcome::Done)
            }
            IssuanceCall::ExecuteRequest { id } => {
                self.execute_request(caller, id, now, ledger)?;
                Ok(IssuanceOutcome::Done)
            }
            IssuanceCall::GrantMinter { account } => {
                self.grant_minter(caller, account)?;
                Ok(IssuanceOutcome::Done)
            }
            IssuanceCall::RevokeMinter { account } => {
                self.revoke_minter(caller, &account)?;
                Ok(IssuanceOutcome::Done)
            }
            IssuanceCall::ConfigureDistribution { wallets } => {
                self.configure_distribution(caller, wallets, ledger)?;
                Ok(IssuanceOutcome::Done)
            }
        }
    }
}
