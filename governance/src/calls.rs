//! Payloads an executed proposal can send back to the governor

use crate::error::Result;
use crate::governor::ProposalGovernor;
use civitas_core::codec::{self, CodecError};
use civitas_core::{Address, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernorCall {
    SetStandardQuorum {
        bps: u16,
    },
    SetEmergencyQuorum {
        bps: u16,
    },
    SetUpgradeQuorum {
        bps: u16,
    },
    SetConstitutionalQuorum {
        bps: u16,
    },
    SetAllQuorums {
        standard: u16,
        emergency: u16,
        upgrade: u16,
        constitutional: u16,
    },
    AddSecurityCouncilMember {
        member: Address,
    },
    RemoveSecurityCouncilMember {
        member: Address,
    },
    SetPrivilegedMultisig {
        account: Address,
    },
    GrantRole {
        role: String,
        account: Address,
    },
    RevokeRole {
        role: String,
        account: Address,
    },
}

impl GovernorCall {
    pub fn encode(&self) -> std::result::Result<Vec<u8>, CodecError> {
        codec::encode(self)
    }

    pub fn decode(payload: &[u8]) -> std::result::Result<Self, CodecError> {
        codec::decode(payload)
    }
}

impl ProposalGovernor {
    pub fn handle(&mut self, caller: &Address, call: GovernorCall) -> Result<()> {
        match call {
            GovernorCall::SetStandardQuorum { bps } => self.set_standard_quorum(caller, bps),
            GovernorCall::SetEmergencyQuorum { bps } => self.set_emergency_quorum(caller, bps),
            GovernorCall::SetUpgradeQuorum { bps } => self.set_upgrade_quorum(caller, bps),
            GovernorCall::SetConstitutionalQuorum { bps } => {
                self.set_constitutional_quorum(caller, bps)
            }
            GovernorCall::SetAllQuorums {
                standard,
                emergency,
                upgrade,
                constitutional,
            } => self.set_all_quorums(caller, standard, emergency, upgrade, constitutional),
            GovernorCall::AddSecurityCouncilMember { member } => {
                self.add_security_council_member(caller, member)
            }
            GovernorCall::RemoveSecurityCouncilMember { member } => {
                self.remove_security_council_member(caller, &member)
            }
            GovernorCall::SetPrivilegedMultisig { account } => {
                self.set_privileged_multisig(caller, account)
            }
            GovernorCall::GrantRole { role, account } => {
                self.grant_role(caller, Role::new(role), account).map(|_| ())
            }
            GovernorCall::RevokeRole { role, account } => {
                self.revoke_role(caller, &Role::new(role), &account).map(|_| ())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::ProposalClass;
    use civitas_core::config::GovernanceConfig;

    #[test]
    fn test_handle_decoded_quorum_change() {
        let me = Address::from_label("governor");
        let mut gov = ProposalGovernor::new(
            me,
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            vec![],
            &GovernanceConfig::default(),
        )
        .unwrap();

        let payload = GovernorCall::SetEmergencyQuorum { bps: 1200 }.encode().unwrap();
        gov.handle(&me, GovernorCall::decode(&payload).unwrap())
            .unwrap();
        assert_eq!(gov.quorum_bps(ProposalClass::Emergency), 1200);

        let member = Address::repeat_byte(9);
        gov.handle(&me, GovernorCall::AddSecurityCouncilMember { member })
            .unwrap();
        assert!(gov.is_security_council_member(&member));
    }
}
