//! Civitas Treasury Module
//!
//! Lower-level authorization primitives that sit beside token voting:
//! - N-of-M signature collection per role, executing at threshold
//! - Time-delayed actions that anyone may schedule and role holders execute

pub mod calls;
pub mod error;
pub mod multisig;
pub mod timelock;

pub use calls::{ActionOutcome, RoleManagerCall, TimelockCall};
pub use error::{Result, TreasuryError};
pub use multisig::{
    should_execute, MultiSigRoleManager, MultisigEvent, PendingAction, ReadyAction, RoleConfig,
    SignOutcome,
};
pub use timelock::{TimelockAction, TimelockActions, TimelockEvent, TimelockStatus};

#[cfg(test)]
mod proptests;
