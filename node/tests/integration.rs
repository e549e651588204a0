use civitas_core::constants::*;
use civitas_core::{
    Address, CivitasConfig, Classify, ErrorKind, Ledger, EMERGENCY_ROLE, UPGRADER_ROLE,
};
use civitas_economics::IssuanceCall;
use civitas_governance::{
    hash_description, GovernanceError, GovernorCall, ProposalClass, ProposalState, VoteChoice,
};
use civitas_node::*;
use civitas_treasury::{RoleManagerCall, TimelockCall};
use std::io::Write;

const ADMIN: Address = Address([0xad; 20]);
const MULTISIG: Address = Address([0x33; 20]);
const COUNCIL: Address = Address([0xcc; 20]);
const HOLDER: Address = Address([0x01; 20]);
const RECIPIENT: Address = Address([0x42; 20]);

fn setup() -> Dao {
    civitas_node::logging::init_for_tests();
    let mut dao = Dao::from_config(
        &CivitasConfig::default(),
        DaoSetup {
            admin: ADMIN,
            privileged_multisig: MULTISIG,
            council: vec![COUNCIL],
        },
    )
    .unwrap();
    dao.ledger_mut().issue(&HOLDER, 1_000, 0).unwrap();
    dao
}

struct Batch {
    targets: Vec<Address>,
    values: Vec<u128>,
    payloads: Vec<Vec<u8>>,
    description: String,
}

impl Batch {
    fn new(description: &str, calls: Vec<(Address, Vec<u8>)>) -> Self {
        let (targets, payloads): (Vec<_>, Vec<_>) = calls.into_iter().unzip();
        Self {
            values: vec![0; targets.len()],
            targets,
            payloads,
            description: description.to_string(),
        }
    }

    fn submit(&self, dao: &mut Dao, who: &Address, class: ProposalClass, now: u64) -> Result<civitas_governance::ProposalId> {
        dao.submit_proposal(
            who,
            class,
            self.targets.clone(),
            self.values.clone(),
            self.payloads.clone(),
            self.description.clone(),
            now,
        )
    }

    fn queue(&self, dao: &mut Dao, now: u64) -> Result<civitas_governance::ProposalId> {
        dao.queue_proposal(
            &self.targets,
            &self.values,
            &self.payloads,
            &hash_description(&self.description),
            now,
        )
    }

    fn execute(&self, dao: &mut Dao, now: u64) -> Result<Vec<CallOutcome>> {
        dao.execute_proposal(
            &self.targets,
            &self.values,
            &self.payloads,
            &hash_description(&self.description),
            now,
        )
    }

    fn cancel(&self, dao: &mut Dao, who: &Address, now: u64) -> Result<civitas_governance::ProposalId> {
        dao.cancel_proposal(
            who,
            &self.targets,
            &self.values,
            &self.payloads,
            &hash_description(&self.description),
            now,
        )
    }
}

/// Submit at `start`, vote it through, queue it. Returns the earliest
/// execution time.
fn pass(dao: &mut Dao, batch: &Batch, class: ProposalClass, proposer: &Address, start: u64) -> u64 {
    let id = batch.submit(dao, proposer, class, start).unwrap();
    dao.cast_vote(&HOLDER, &id, VoteChoice::For, start + VOTING_DELAY_SECS + 1)
        .unwrap();
    let closed = start + VOTING_DELAY_SECS + VOTING_PERIOD_SECS + 1;
    batch.queue(dao, closed).unwrap();
    closed + PROPOSAL_TIMELOCK_SECS
}

fn issuance_call(dao: &Dao, call: IssuanceCall) -> (Address, Vec<u8>) {
    (dao.addresses().issuance, call.encode().unwrap())
}

#[test]
fn test_proposal_to_mint_end_to_end() {
    let mut dao = setup();

    let create = Batch::new(
        "fund the grants program",
        vec![issuance_call(
            &dao,
            IssuanceCall::CreateRequest {
                recipient: RECIPIENT,
                amount: 5_000,
                purpose: "grants".to_string(),
            },
        )],
    );
    let execute = Batch::new(
        "release grant request 1",
        vec![issuance_call(&dao, IssuanceCall::ExecuteRequest { id: 1 })],
    );

    let eta = pass(&mut dao, &create, ProposalClass::Standard, &HOLDER, 0);
    pass(&mut dao, &execute, ProposalClass::Standard, &HOLDER, 0);

    let outcomes = create.execute(&mut dao, eta).unwrap();
    assert_eq!(outcomes, vec![CallOutcome::MintRequestCreated(1)]);
    assert_eq!(dao.issuance().pending(1), 5_000);

    // Same eta: the request has not matured, so the whole execution unwinds
    let err = execute.execute(&mut dao, eta).unwrap_err();
    assert!(matches!(err, DaoError::Issuance(_)));
    assert_eq!(err.kind(), ErrorKind::Temporal);
    let requeue = execute.queue(&mut dao, eta).unwrap_err();
    assert!(matches!(
        requeue,
        DaoError::Governance(GovernanceError::ProposalNotSuccessful {
            state: ProposalState::Queued,
            ..
        })
    ));

    let later = eta + MINT_EXECUTION_DELAY_SECS;
    execute.execute(&mut dao, later).unwrap();
    assert_eq!(dao.ledger().balance_of(&RECIPIENT), 5_000);
    assert_eq!(dao.issuance().minted(1), 5_000);
    assert_eq!(dao.issuance().pending(1), 0);
}

#[test]
fn test_failed_call_rolls_back_whole_proposal() {
    let mut dao = setup();
    let batch = Batch::new(
        "mint then call nowhere",
        vec![
            issuance_call(
                &dao,
                IssuanceCall::CreateRequest {
                    recipient: RECIPIENT,
                    amount: 10,
                    purpose: "ops".to_string(),
                },
            ),
            (Address::repeat_byte(0x99), vec![]),
        ],
    );
    let eta = pass(&mut dao, &batch, ProposalClass::Standard, &HOLDER, 0);
    let id = dao.governor().events().iter().find_map(|e| match e {
        civitas_governance::GovernorEvent::ProposalCreated { id, .. } => Some(*id),
        _ => None,
    });
    let id = id.unwrap();

    let err = batch.execute(&mut dao, eta).unwrap_err();
    assert!(matches!(err, DaoError::UnknownTarget(_)));

    // Neither the mint request nor the Executed mark survived
    assert_eq!(dao.issuance().pending(1), 0);
    assert!(dao.issuance().request(1).is_none());
    assert_eq!(dao.proposal_state(&id, eta).unwrap(), ProposalState::Queued);
}

#[test]
fn test_council_cancels_passing_proposal() {
    let mut dao = setup();
    let batch = Batch::new(
        "drain",
        vec![issuance_call(
            &dao,
            IssuanceCall::CreateRequest {
                recipient: HOLDER,
                amount: TIER1_ANNUAL_CAP,
                purpose: "all of it".to_string(),
            },
        )],
    );
    let eta = pass(&mut dao, &batch, ProposalClass::Standard, &HOLDER, 0);

    // Proposer can no longer withdraw once voting has started
    assert!(matches!(
        batch.cancel(&mut dao, &HOLDER, eta).unwrap_err(),
        DaoError::Governance(GovernanceError::UnauthorizedCancellation(_))
    ));
    let id = batch.cancel(&mut dao, &COUNCIL, eta).unwrap();
    assert_eq!(dao.proposal_state(&id, eta).unwrap(), ProposalState::Canceled);
    assert!(matches!(
        batch.cancel(&mut dao, &COUNCIL, eta).unwrap_err(),
        DaoError::Governance(GovernanceError::ProposalAlreadyCancelled(_))
    ));
    assert!(batch.execute(&mut dao, eta).is_err());
}

#[test]
fn test_governance_updates_its_own_quorum() {
    let mut dao = setup();
    let governor = dao.addresses().governor;
    let batch = Batch::new(
        "raise standard quorum",
        vec![(
            governor,
            GovernorCall::SetStandardQuorum { bps: 800 }.encode().unwrap(),
        )],
    );
    let eta = pass(&mut dao, &batch, ProposalClass::Standard, &HOLDER, 0);
    batch.execute(&mut dao, eta).unwrap();
    assert_eq!(dao.governor().quorum_bps(ProposalClass::Standard), 800);

    // Direct calls are not governance
    let direct = Call::new(
        governor,
        GovernorCall::SetStandardQuorum { bps: 600 }.encode().unwrap(),
    );
    assert!(dao.dispatch(&ADMIN, direct, eta).is_err());
}

#[test]
fn test_upgrade_requires_upgrade_class() {
    let mut dao = setup();
    let proxy = Address::repeat_byte(0x70);
    let implementation = Address::repeat_byte(0x71);
    let upgrades = dao.addresses().upgrades;
    let payload = UpgradeCall::ScheduleUpgrade {
        proxy,
        new_implementation: implementation,
        data: vec![],
        force_import: false,
    }
    .encode()
    .unwrap();

    let standard = Batch::new("sneaky upgrade", vec![(upgrades, payload.clone())]);
    let eta = pass(&mut dao, &standard, ProposalClass::Standard, &HOLDER, 0);
    assert!(matches!(
        standard.execute(&mut dao, eta).unwrap_err(),
        DaoError::UpgradeNotAuthorized(_)
    ));

    let governor = dao.addresses().governor;
    let upgrade = Batch::new(
        "upgrade issuance",
        vec![
            (upgrades, payload),
            (
                upgrades,
                UpgradeCall::ExecuteUpgrade {
                    admin_registry: governor,
                    proxy,
                }
                .encode()
                .unwrap(),
            ),
        ],
    );
    let eta = pass(&mut dao, &upgrade, ProposalClass::Upgrade, &MULTISIG, 0);
    upgrade.execute(&mut dao, eta).unwrap();
    assert_eq!(dao.upgrades().implementation_of(&proxy), Some(implementation));
}

#[test]
fn test_multisig_action_dispatches_once() {
    let mut dao = setup();
    let roles = dao.addresses().roles;
    let (a, b) = (Address::repeat_byte(0x0a), Address::repeat_byte(0x0b));

    let configure = RoleManagerCall::ConfigureRole {
        role: EMERGENCY_ROLE.to_string(),
        threshold: 2,
        signers: vec![a, b],
    };
    dao.dispatch(&ADMIN, Call::new(roles, configure.encode().unwrap()), 0)
        .unwrap();

    // The action reconfigures a second role through the manager itself
    let inner = RoleManagerCall::ConfigureRole {
        role: "OPS_ROLE".to_string(),
        threshold: 2,
        signers: vec![a, b],
    };
    let propose = RoleManagerCall::ProposeAction {
        role: EMERGENCY_ROLE.to_string(),
        target: roles,
        payload: inner.encode().unwrap(),
    };
    let hash = match dao
        .dispatch(&a, Call::new(roles, propose.encode().unwrap()), 1)
        .unwrap()
    {
        CallOutcome::ActionCreated(hash) => hash,
        other => panic!("unexpected {:?}", other),
    };

    let execute = Call::new(roles, RoleManagerCall::ExecuteAction { hash }.encode().unwrap());
    assert!(dao.dispatch(&a, execute.clone(), 2).is_err());

    let sign = Call::new(roles, RoleManagerCall::SignAction { hash }.encode().unwrap());
    let outcome = dao.dispatch(&b, sign, 3).unwrap();
    assert_eq!(
        outcome,
        CallOutcome::ActionDispatched {
            hash,
            inner: Box::new(CallOutcome::Done)
        }
    );
    assert!(dao
        .roles()
        .role_config(&civitas_core::Role::new("OPS_ROLE"))
        .is_some());

    let err = dao.dispatch(&a, execute, 4).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StateConflict);
}

#[test]
fn test_timelocked_upgrade() {
    let mut dao = setup();
    let (roles, timelock, upgrades, governor) = {
        let a = dao.addresses();
        (a.roles, a.timelock, a.upgrades, a.governor)
    };
    let operator = Address::repeat_byte(0x0e);
    let proxy = Address::repeat_byte(0x70);

    dao.dispatch(
        &ADMIN,
        Call::new(
            roles,
            RoleManagerCall::ConfigureRole {
                role: UPGRADER_ROLE.to_string(),
                threshold: 2,
                signers: vec![operator, ADMIN],
            }
            .encode()
            .unwrap(),
        ),
        0,
    )
    .unwrap();

    let schedule_upgrade = UpgradeCall::ScheduleUpgrade {
        proxy,
        new_implementation: Address::repeat_byte(0x72),
        data: vec![],
        force_import: true,
    };
    let schedule = TimelockCall::ScheduleAction {
        target: upgrades,
        payload: schedule_upgrade.encode().unwrap(),
        role: UPGRADER_ROLE.to_string(),
        delay: TIMELOCK_MIN_DELAY_SECS,
    };
    // Anyone can put an action on notice
    let hash = match dao
        .dispatch(&HOLDER, Call::new(timelock, schedule.encode().unwrap()), 10)
        .unwrap()
    {
        CallOutcome::ActionCreated(hash) => hash,
        other => panic!("unexpected {:?}", other),
    };

    let execute = Call::new(timelock, TimelockCall::ExecuteAction { hash }.encode().unwrap());
    let early = dao.dispatch(&operator, execute.clone(), 11).unwrap_err();
    assert_eq!(early.kind(), ErrorKind::Temporal);
    let stranger = dao
        .dispatch(&HOLDER, execute.clone(), 10 + TIMELOCK_MIN_DELAY_SECS)
        .unwrap_err();
    assert_eq!(stranger.kind(), ErrorKind::Authorization);

    dao.dispatch(&operator, execute, 10 + TIMELOCK_MIN_DELAY_SECS)
        .unwrap();
    assert!(dao.upgrades().scheduled(&proxy).unwrap().force_import);
    assert_ne!(governor, timelock);
}

#[test]
fn test_lone_role_holder_cannot_mint_through_timelock() {
    let mut dao = setup();
    let (roles, timelock) = (dao.addresses().roles, dao.addresses().timelock);
    let signers: Vec<Address> = (0x51..0x56).map(Address::repeat_byte).collect();
    let lone = signers[0];

    let configure = RoleManagerCall::ConfigureRole {
        role: EMERGENCY_ROLE.to_string(),
        threshold: 3,
        signers: signers.clone(),
    };
    dao.dispatch(&ADMIN, Call::new(roles, configure.encode().unwrap()), 0)
        .unwrap();

    let (issuance, payload) = issuance_call(
        &dao,
        IssuanceCall::CreateRequest {
            recipient: lone,
            amount: TIER1_ANNUAL_CAP,
            purpose: "side door".to_string(),
        },
    );
    let schedule = TimelockCall::ScheduleAction {
        target: issuance,
        payload,
        role: EMERGENCY_ROLE.to_string(),
        delay: TIMELOCK_MIN_DELAY_SECS,
    };
    let hash = match dao
        .dispatch(&lone, Call::new(timelock, schedule.encode().unwrap()), 1)
        .unwrap()
    {
        CallOutcome::ActionCreated(hash) => hash,
        other => panic!("unexpected {:?}", other),
    };

    let ready = 1 + TIMELOCK_MIN_DELAY_SECS;
    let execute = Call::new(timelock, TimelockCall::ExecuteAction { hash }.encode().unwrap());
    let err = dao.dispatch(&lone, execute, ready).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    assert!(dao.issuance().request(1).is_none());
    assert_eq!(dao.issuance().pending(1), 0);
    assert_eq!(dao.ledger().balance_of(&lone), 0);
    assert_eq!(
        dao.timelock().action(&hash).unwrap().status,
        civitas_treasury::TimelockStatus::Scheduled
    );
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[governance]
voting_delay_secs = 60

[governance.quorum]
standard_bps = 400
"#
    )
    .unwrap();

    let dao = Dao::load(
        file.path(),
        DaoSetup {
            admin: ADMIN,
            privileged_multisig: MULTISIG,
            council: vec![],
        },
    )
    .unwrap();
    assert_eq!(dao.governor().quorum_bps(ProposalClass::Standard), 400);
    assert_eq!(dao.governor().quorum_bps(ProposalClass::Emergency), 1000);
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = CivitasConfig::default();
    config.governance.quorum.emergency_bps = 400;
    let err = Dao::from_config(
        &config,
        DaoSetup {
            admin: ADMIN,
            privileged_multisig: MULTISIG,
            council: vec![],
        },
    )
    .err()
    .unwrap();
    assert!(matches!(err, DaoError::Config(_)));
}
