//! Composition root
//!
//! `Dao` owns every component and both external collaborators. Each public
//! entry point runs inside `transact`: the whole state is cloned first and
//! put back if anything in the call chain fails, so a call either commits
//! every effect or none.

use crate::call::{Call, CallOutcome, UpgradeCall};
use crate::error::{DaoError, Result};
use civitas_core::{
    Address, CivitasConfig, InMemoryLedger, Ledger, ProxyAdmin, UpgradeLayer, H256,
};
use civitas_economics::{IssuanceCall, IssuanceOutcome, IssuanceScheduler};
use civitas_governance::{
    GovernorCall, ProposalClass, ProposalGovernor, ProposalId, ProposalState, VoteChoice,
};
use civitas_treasury::{
    ActionOutcome, MultiSigRoleManager, RoleManagerCall, TimelockActions, TimelockCall,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Nested dispatches allowed below a top-level call.
pub const MAX_CALL_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoAddresses {
    pub issuance: Address,
    pub governor: Address,
    pub roles: Address,
    pub timelock: Address,
    pub upgrades: Address,
}

impl DaoAddresses {
    /// Deterministic component addresses under `namespace`.
    pub fn derive(namespace: &str) -> Self {
        let at = |name: &str| Address::from_label(&format!("{}.{}", namespace, name));
        Self {
            issuance: at("issuance"),
            governor: at("governor"),
            roles: at("roles"),
            timelock: at("timelock"),
            upgrades: at("upgrades"),
        }
    }
}

impl Default for DaoAddresses {
    fn default() -> Self {
        Self::derive("civitas")
    }
}

/// Accounts that exist before the first proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaoSetup {
    /// Holds the admin role on the governor and the role manager.
    pub admin: Address,
    pub privileged_multisig: Address,
    pub council: Vec<Address>,
}

#[derive(Debug, Clone)]
struct DaoState<L, U> {
    ledger: L,
    upgrades: U,
    issuance: IssuanceScheduler,
    governor: ProposalGovernor,
    roles: MultiSigRoleManager,
    timelock: TimelockActions,
}

pub struct Dao<L = InMemoryLedger, U = ProxyAdmin> {
    addresses: DaoAddresses,
    state: DaoState<L, U>,
}

impl Dao<InMemoryLedger, ProxyAdmin> {
    pub fn from_config(config: &CivitasConfig, setup: DaoSetup) -> Result<Self> {
        let addresses = DaoAddresses::default();
        Self::with_collaborators(
            addresses,
            config,
            setup,
            InMemoryLedger::new(),
            ProxyAdmin::new(addresses.governor),
        )
    }

    pub fn load<P: AsRef<Path>>(path: P, setup: DaoSetup) -> Result<Self> {
        let config = CivitasConfig::load_from_file(path)?;
        Self::from_config(&config, setup)
    }
}

impl<L: Ledger + Clone, U: UpgradeLayer + Clone> Dao<L, U> {
    /// The governor administers issuance and is its only minter, so every
    /// mint passes through a proposal vote.
    pub fn with_collaborators(
        addresses: DaoAddresses,
        config: &CivitasConfig,
        setup: DaoSetup,
        ledger: L,
        upgrades: U,
    ) -> Result<Self> {
        config.validate()?;

        let mut issuance =
            IssuanceScheduler::new(addresses.issuance, addresses.governor, &config.issuance)?;
        issuance.grant_minter(&addresses.governor, addresses.governor)?;

        let governor = ProposalGovernor::new(
            addresses.governor,
            setup.admin,
            setup.privileged_multisig,
            setup.council,
            &config.governance,
        )?;
        let roles = MultiSigRoleManager::new(addresses.roles, setup.admin, &config.multisig)?;
        let timelock = TimelockActions::new(addresses.timelock, &config.timelock)?;

        info!(
            "DAO assembled: issuance {}, governor {}, roles {}, timelock {}",
            addresses.issuance, addresses.governor, addresses.roles, addresses.timelock
        );
        Ok(Self {
            addresses,
            state: DaoState {
                ledger,
                upgrades,
                issuance,
                governor,
                roles,
                timelock,
            },
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn addresses(&self) -> &DaoAddresses {
        &self.addresses
    }

    pub fn ledger(&self) -> &L {
        &self.state.ledger
    }

    /// Direct ledger access for the asset's own operations (transfers,
    /// delegation), which sit outside the core.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.state.ledger
    }

    pub fn upgrades(&self) -> &U {
        &self.state.upgrades
    }

    pub fn issuance(&self) -> &IssuanceScheduler {
        &self.state.issuance
    }

    pub fn governor(&self) -> &ProposalGovernor {
        &self.state.governor
    }

    pub fn roles(&self) -> &MultiSigRoleManager {
        &self.state.roles
    }

    pub fn timelock(&self) -> &TimelockActions {
        &self.state.timelock
    }

    // ------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------

    /// Send an encoded call to a component on behalf of `caller`.
    pub fn dispatch(&mut self, caller: &Address, call: Call, now: u64) -> Result<CallOutcome> {
        let caller = *caller;
        self.transact(|dao| dao.route(caller, call, now, 0))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn submit_proposal(
        &mut self,
        caller: &Address,
        class: ProposalClass,
        targets: Vec<Address>,
        values: Vec<u128>,
        payloads: Vec<Vec<u8>>,
        description: String,
        now: u64,
    ) -> Result<ProposalId> {
        self.transact(|dao| {
            let state = &mut dao.state;
            Ok(state.governor.submit(
                caller,
                class,
                targets,
                values,
                payloads,
                description,
                now,
                &state.ledger,
            )?)
        })
    }

    pub fn cast_vote(
        &mut self,
        caller: &Address,
        id: &ProposalId,
        choice: VoteChoice,
        now: u64,
    ) -> Result<u128> {
        self.transact(|dao| {
            let state = &mut dao.state;
            Ok(state
                .governor
                .cast_vote(caller, id, choice, now, &state.ledger)?)
        })
    }

    pub fn queue_proposal(
        &mut self,
        targets: &[Address],
        values: &[u128],
        payloads: &[Vec<u8>],
        description_hash: &H256,
        now: u64,
    ) -> Result<ProposalId> {
        self.transact(|dao| {
            let state = &mut dao.state;
            Ok(state
                .governor
                .queue(targets, values, payloads, description_hash, now, &state.ledger)?)
        })
    }

    /// Execute a queued proposal and dispatch each of its calls with the
    /// governor as caller. Upgrade-layer targets need an Upgrade or
    /// Constitutional proposal.
    pub fn execute_proposal(
        &mut self,
        targets: &[Address],
        values: &[u128],
        payloads: &[Vec<u8>],
        description_hash: &H256,
        now: u64,
    ) -> Result<Vec<CallOutcome>> {
        self.transact(|dao| {
            let state = &mut dao.state;
            let (id, calls) = state.governor.execute(
                targets,
                values,
                payloads,
                description_hash,
                now,
                &state.ledger,
            )?;
            let upgrades_allowed = matches!(
                state.governor.proposal(&id).map(|p| p.class),
                Some(ProposalClass::Upgrade | ProposalClass::Constitutional)
            );

            let governor = dao.addresses.governor;
            let mut outcomes = Vec::with_capacity(calls.len());
            for call in calls {
                if call.target == dao.addresses.upgrades && !upgrades_allowed {
                    return Err(DaoError::UpgradeNotAuthorized(governor));
                }
                outcomes.push(dao.route(governor, call.into(), now, 1)?);
            }
            info!("Proposal {} dispatched {} calls", id.short(), outcomes.len());
            Ok(outcomes)
        })
    }

    pub fn cancel_proposal(
        &mut self,
        caller: &Address,
        targets: &[Address],
        values: &[u128],
        payloads: &[Vec<u8>],
        description_hash: &H256,
        now: u64,
    ) -> Result<ProposalId> {
        self.transact(|dao| {
            let state = &mut dao.state;
            Ok(state.governor.cancel(
                caller,
                targets,
                values,
                payloads,
                description_hash,
                now,
                &state.ledger,
            )?)
        })
    }

    pub fn proposal_state(&self, id: &ProposalId, now: u64) -> Result<ProposalState> {
        Ok(self.state.governor.state(id, now, &self.state.ledger)?)
    }

    // ------------------------------------------------------------------
    // Routing
    // ------------------------------------------------------------------

    fn transact<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.state.clone();
        let result = f(self);
        if let Err(e) = &result {
            warn!("Call rolled back: {}", e);
            self.state = snapshot;
        }
        result
    }

    fn route(&mut self, caller: Address, call: Call, now: u64, depth: usize) -> Result<CallOutcome> {
        if depth > MAX_CALL_DEPTH {
            return Err(DaoError::CallDepthExceeded(depth));
        }
        if call.value != 0 {
            return Err(DaoError::ValueNotAccepted {
                target: call.target,
                value: call.value,
            });
        }
        debug!(
            "Routing {} bytes from {} to {} (depth {})",
            call.payload.len(),
            caller,
            call.target,
            depth
        );

        let a = self.addresses;
        match call.target {
            t if t == a.issuance => {
                let decoded = IssuanceCall::decode(&call.payload)?;
                let state = &mut self.state;
                Ok(
                    match state
                        .issuance
                        .handle(&caller, decoded, now, &mut state.ledger)?
                    {
                        IssuanceOutcome::RequestCreated(id) => CallOutcome::MintRequestCreated(id),
                        IssuanceOutcome::Done => CallOutcome::Done,
                    },
                )
            }
            t if t == a.governor => {
                let decoded = GovernorCall::decode(&call.payload)?;
                self.state.governor.handle(&caller, decoded)?;
                Ok(CallOutcome::Done)
            }
            t if t == a.roles => {
                let decoded = RoleManagerCall::decode(&call.payload)?;
                let outcome = self.state.roles.handle(&caller, decoded, now)?;
                self.follow(a.roles, outcome, now, depth)
            }
            t if t == a.timelock => {
                let decoded = TimelockCall::decode(&call.payload)?;
                let state = &mut self.state;
                let outcome = state
                    .timelock
                    .handle(&caller, decoded, now, state.roles.access())?;
                self.follow(a.timelock, outcome, now, depth)
            }
            t if t == a.upgrades => {
                let decoded = UpgradeCall::decode(&call.payload)?;
                self.upgrade(caller, decoded)
            }
            other => Err(DaoError::UnknownTarget(other)),
        }
    }

    /// Dispatch an action released by the role manager or the timelock,
    /// with the releasing component as caller.
    fn follow(
        &mut self,
        executor: Address,
        outcome: ActionOutcome,
        now: u64,
        depth: usize,
    ) -> Result<CallOutcome> {
        match outcome {
            ActionOutcome::Done => Ok(CallOutcome::Done),
            ActionOutcome::Created(hash) => Ok(CallOutcome::ActionCreated(hash)),
            ActionOutcome::Dispatch(action) => {
                let hash = action.hash;
                let inner = self.route(executor, action.into(), now, depth + 1)?;
                Ok(CallOutcome::ActionDispatched {
                    hash,
                    inner: Box::new(inner),
                })
            }
        }
    }

    fn upgrade(&mut self, caller: Address, call: UpgradeCall) -> Result<CallOutcome> {
        if caller != self.addresses.governor && caller != self.addresses.timelock {
            return Err(DaoError::UpgradeNotAuthorized(caller));
        }
        match call {
            UpgradeCall::ScheduleUpgrade {
                proxy,
                new_implementation,
                data,
                force_import,
            } => self
                .state
                .upgrades
                .schedule_upgrade(proxy, new_implementation, data, force_import)?,
            UpgradeCall::ExecuteUpgrade {
                admin_registry,
                proxy,
            } => self.state.upgrades.execute_upgrade(admin_registry, proxy)?,
        }
        Ok(CallOutcome::Done)
    }
}
