//! Role-based access control shared by every component
//!
//! Each component owns its own `AccessControl`; nothing here is global.
//! Holders of `DEFAULT_ADMIN_ROLE` may grant and revoke any role.

use crate::address::Address;
use crate::hash::{sha256, H256};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

pub const DEFAULT_ADMIN_ROLE: &str = "DEFAULT_ADMIN_ROLE";
pub const MINTER_ROLE: &str = "MINTER_ROLE";
pub const GOVERNANCE_ROLE: &str = "GOVERNANCE_ROLE";
pub const EMERGENCY_ROLE: &str = "EMERGENCY_ROLE";
pub const UPGRADER_ROLE: &str = "UPGRADER_ROLE";

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Role(String);

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn admin() -> Self {
        Self::new(DEFAULT_ADMIN_ROLE)
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn id(&self) -> H256 {
        sha256(self.0.as_bytes())
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Role::new(name)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Role({})", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("Account {account} is missing role {role}")]
    AccessControlUnauthorizedAccount { account: Address, role: Role },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessControl {
    members: BTreeMap<Role, BTreeSet<Address>>,
}

impl AccessControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Access control whose only entry is `admin` holding `DEFAULT_ADMIN_ROLE`.
    pub fn with_admin(admin: Address) -> Self {
        let mut ac = Self::new();
        ac.grant(Role::admin(), admin);
        ac
    }

    pub fn has_role(&self, role: &Role, account: &Address) -> bool {
        self.members
            .get(role)
            .map(|set| set.contains(account))
            .unwrap_or(false)
    }

    pub fn check_role(&self, role: &Role, account: &Address) -> Result<(), AccessError> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(AccessError::AccessControlUnauthorizedAccount {
                account: *account,
                role: role.clone(),
            })
        }
    }

    /// Grant without an authorization check; returns whether the set changed.
    pub fn grant(&mut self, role: Role, account: Address) -> bool {
        self.members.entry(role).or_default().insert(account)
    }

    /// Revoke without an authorization check; returns whether the set changed.
    pub fn revoke(&mut self, role: &Role, account: &Address) -> bool {
        let Some(set) = self.members.get_mut(role) else {
            return false;
        };
        let removed = set.remove(account);
        if set.is_empty() {
            self.members.remove(role);
        }
        removed
    }

    pub fn grant_role(
        &mut self,
        caller: &Address,
        role: Role,
        account: Address,
    ) -> Result<bool, AccessError> {
        self.check_role(&Role::admin(), caller)?;
        log::debug!("Granting {} to {} (by {})", role, account, caller);
        Ok(self.grant(role, account))
    }

    pub fn revoke_role(
        &mut self,
        caller: &Address,
        role: &Role,
        account: &Address,
    ) -> Result<bool, AccessError> {
        self.check_role(&Role::admin(), caller)?;
        log::debug!("Revoking {} from {} (by {})", role, account, caller);
        Ok(self.revoke(role, account))
    }

    pub fn members(&self, role: &Role) -> Vec<Address> {
        self.members
            .get(role)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_grants_and_revokes() {
        let admin = Address::repeat_byte(1);
        let minter = Address::repeat_byte(2);
        let mut ac = AccessControl::with_admin(admin);

        assert!(ac.grant_role(&admin, MINTER_ROLE.into(), minter).unwrap());
        assert!(ac.has_role(&MINTER_ROLE.into(), &minter));
        // Second grant is a no-op
        assert!(!ac.grant_role(&admin, MINTER_ROLE.into(), minter).unwrap());

        assert!(ac.revoke_role(&admin, &MINTER_ROLE.into(), &minter).unwrap());
        assert!(!ac.has_role(&MINTER_ROLE.into(), &minter));
        assert!(ac.members(&MINTER_ROLE.into()).is_empty());
    }

    #[test]
    fn test_non_admin_rejected() {
        let admin = Address::repeat_byte(1);
        let outsider = Address::repeat_byte(9);
        let mut ac = AccessControl::with_admin(admin);

        let err = ac
            .grant_role(&outsider, MINTER_ROLE.into(), outsider)
            .unwrap_err();
        assert_eq!(
            err,
            AccessError::AccessControlUnauthorizedAccount {
                account: outsider,
                role: Role::admin(),
            }
        );
    }
}
