//! Security council membership

use crate::error::{GovernanceError, Result};
use civitas_core::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityCouncil {
    members: BTreeSet<Address>,
}

impl SecurityCouncil {
    pub fn new(members: impl IntoIterator<Item = Address>) -> Result<Self> {
        let mut council = Self::default();
        for member in members {
            council.add(member)?;
        }
        Ok(council)
    }

    pub fn add(&mut self, member: Address) -> Result<()> {
        if member.is_zero() {
            return Err(GovernanceError::ZeroAddress);
        }
        if !self.members.insert(member) {
            return Err(GovernanceError::AlreadySecurityCouncilMember(member));
        }
        Ok(())
    }

    pub fn remove(&mut self, member: &Address) -> Result<()> {
        if !self.members.remove(member) {
            return Err(GovernanceError::NotSecurityCouncilMember(*member));
        }
        Ok(())
    }

    pub fn contains(&self, account: &Address) -> bool {
        self.members.contains(account)
    }

    pub fn members(&self) -> Vec<Address> {
        self.members.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership() {
        let a = Address::repeat_byte(1);
        let mut council = SecurityCouncil::new([a]).unwrap();
        assert!(council.contains(&a));
        assert_eq!(
            council.add(a).unwrap_err(),
            GovernanceError::AlreadySecurityCouncilMember(a)
        );
        assert_eq!(council.add(Address::ZERO).unwrap_err(), GovernanceError::ZeroAddress);

        council.remove(&a).unwrap();
        assert!(council.is_empty());
        assert_eq!(
            council.remove(&a).unwrap_err(),
            GovernanceError::NotSecurityCouncilMember(a)
        );
    }
}
