//! Upgrade/proxy collaborator
//!
//! The core never swaps implementations itself. Upgrade-class proposals and
//! timelocked actions call into an `UpgradeLayer`; `ProxyAdmin` is an
//! in-memory stand-in that records what was asked of it.

use crate::address::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpgradeError {
    #[error("Zero address: {0}")]
    ZeroAddress(&'static str),

    #[error("No upgrade scheduled for proxy {0}")]
    NothingScheduled(Address),

    #[error("Admin registry mismatch for proxy {proxy}: expected {expected}, got {actual}")]
    AdminMismatch {
        proxy: Address,
        expected: Address,
        actual: Address,
    },
}

pub type UpgradeResult<T> = std::result::Result<T, UpgradeError>;

pub trait UpgradeLayer {
    fn schedule_upgrade(
        &mut self,
        proxy: Address,
        new_implementation: Address,
        data: Vec<u8>,
        force_import: bool,
    ) -> UpgradeResult<()>;

    fn execute_upgrade(&mut self, admin_registry: Address, proxy: Address) -> UpgradeResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledUpgrade {
    pub new_implementation: Address,
    pub data: Vec<u8>,
    pub force_import: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyAdmin {
    admin_registry: Address,
    scheduled: BTreeMap<Address, ScheduledUpgrade>,
    implementations: BTreeMap<Address, Address>,
}

impl ProxyAdmin {
    pub fn new(admin_registry: Address) -> Self {
        Self {
            admin_registry,
            ..Self::default()
        }
    }

    pub fn implementation_of(&self, proxy: &Address) -> Option<Address> {
        self.implementations.get(proxy).copied()
    }

    pub fn scheduled(&self, proxy: &Address) -> Option<&ScheduledUpgrade> {
        self.scheduled.get(proxy)
    }
}

impl UpgradeLayer for ProxyAdmin {
    fn schedule_upgrade(
        &mut self,
        proxy: Address,
        new_implementation: Address,
        data: Vec<u8>,
        force_import: bool,
    ) -> UpgradeResult<()> {
        if proxy.is_zero() {
            return Err(UpgradeError::ZeroAddress("proxy"));
        }
        if new_implementation.is_zero() {
            return Err(UpgradeError::ZeroAddress("implementation"));
        }
        log::info!(
            "Upgrade scheduled: proxy {} -> implementation {}",
            proxy,
            new_implementation
        );
        self.scheduled.insert(
            proxy,
            ScheduledUpgrade {
                new_implementation,
                data,
                force_import,
            },
        );
        Ok(())
    }

    fn execute_upgrade(&mut self, admin_registry: Address, proxy: Address) -> UpgradeResult<()> {
        if admin_registry != self.admin_registry {
            return Err(UpgradeError::AdminMismatch {
                proxy,
                expected: self.admin_registry,
                actual: admin_registry,
            });
        }
        let upgrade = self
            .scheduled
            .remove(&proxy)
            .ok_or(UpgradeError::NothingScheduled(proxy))?;
        log::info!(
            "Upgrade executed: proxy {} now at {}",
            proxy,
            upgrade.new_implementation
        );
        self.implementations.insert(proxy, upgrade.new_implementation);
        Ok(())
    }
}
