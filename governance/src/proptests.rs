//! Property-based tests for quorum updates
//!
//! Whatever sequence of setter calls is applied, the stored quorums stay
//! in range and strictly ordered, and a rejected call leaves them untouched.

use crate::governor::ProposalGovernor;
use crate::proposal::ProposalClass;
use civitas_core::config::GovernanceConfig;
use civitas_core::Address;
use proptest::prelude::*;

fn class() -> impl Strategy<Value = ProposalClass> {
    prop_oneof![
        Just(ProposalClass::Standard),
        Just(ProposalClass::Emergency),
        Just(ProposalClass::Upgrade),
        Just(ProposalClass::Constitutional),
    ]
}

proptest! {
    #[test]
    fn quorum_hierarchy_always_holds(
        updates in prop::collection::vec((class(), 0u16..12_000), 1..60)
    ) {
        let me = Address::from_label("governor");
        let mut gov = ProposalGovernor::new(
            me,
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            vec![],
            &GovernanceConfig::default(),
        )
        .unwrap();

        for (class, bps) in updates {
            let before = gov.quorums();
            let result = match class {
                ProposalClass::Standard => gov.set_standard_quorum(&me, bps),
                ProposalClass::Emergency => gov.set_emergency_quorum(&me, bps),
                ProposalClass::Upgrade => gov.set_upgrade_quorum(&me, bps),
                ProposalClass::Constitutional => gov.set_constitutional_quorum(&me, bps),
            };
            if result.is_err() {
                prop_assert_eq!(gov.quorums(), before);
            } else {
                prop_assert_eq!(gov.quorum_bps(class), bps);
            }

            let q = gov.quorums();
            let values = ProposalClass::ALL.map(|c| q.bps(c));
            prop_assert!(values.iter().all(|v| (100..=10_000).contains(v)));
            prop_assert!(values.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
