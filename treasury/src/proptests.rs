//! Property-based tests for threshold execution
//!
//! However signers interleave sign and execute attempts, an action
//! executes exactly once, on the call that reaches the threshold.

use crate::multisig::{MultiSigRoleManager, SignOutcome};
use civitas_core::config::MultisigConfig;
use civitas_core::{Address, Role};
use proptest::prelude::*;

proptest! {
    #[test]
    fn executes_exactly_once(
        signer_count in 2usize..8,
        threshold_seed in any::<usize>(),
        attempts in prop::collection::vec((any::<usize>(), any::<bool>()), 1..40),
    ) {
        let admin = Address::repeat_byte(0xad);
        let signers: Vec<Address> = (1..=signer_count as u8).map(Address::repeat_byte).collect();
        let threshold = 2 + threshold_seed % (signer_count - 1);
        let role = Role::new("OPS_ROLE");

        let mut m = MultiSigRoleManager::new(Address::from_label("roles"), admin, &MultisigConfig::default()).unwrap();
        m.configure_role(&admin, role.clone(), threshold, signers.clone()).unwrap();
        let hash = m.propose_action(&signers[0], role, admin, vec![], 0).unwrap();

        let mut signed = 1usize;
        let mut executions = 0usize;
        for (pick, explicit) in attempts {
            let signer = signers[pick % signers.len()];
            if explicit {
                if m.execute_action(&signer, &hash).is_ok() {
                    executions += 1;
                }
                continue;
            }
            match m.sign_action(&signer, &hash) {
                Ok(SignOutcome::Executed(_)) => {
                    signed += 1;
                    prop_assert_eq!(signed, threshold);
                    executions += 1;
                }
                Ok(SignOutcome::Pending { signatures, .. }) => {
                    signed += 1;
                    prop_assert_eq!(signatures, signed);
                    prop_assert!(signed < threshold);
                }
                Err(_) => {}
            }
        }

        prop_assert!(executions <= 1);
        prop_assert_eq!(executions == 1, m.is_executed(&hash));
    }
}
