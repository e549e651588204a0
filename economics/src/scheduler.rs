//! Issuance scheduler (mint engine)
//!
//! Requests reserve capacity in the year they are created and keep that
//! attribution for life: executing after a year boundary still debits the
//! creation year. Every mutating call validates first, then updates local
//! counters, and only then touches the ledger.

use crate::distribution::{Distribution, DistributionWallet};
use crate::error::{IssuanceError, Result};
use crate::request::{MintRequest, MintRequestStatus};
use crate::schedule::{IssuanceSchedule, TierInfo};
use crate::supply::{AnnualSupply, SupplyStats};
use civitas_core::config::IssuanceConfig;
use civitas_core::{AccessControl, Address, Ledger, Role, MINTER_ROLE};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MintEvent {
    RequestCreated {
        id: u64,
        recipient: Address,
        amount: u128,
        year: u32,
        timestamp: u64,
    },
    RequestCancelled {
        id: u64,
        amount: u128,
        year: u32,
        timestamp: u64,
    },
    RequestExecuted {
        id: u64,
        amount: u128,
        year: u32,
        timestamp: u64,
    },
    DistributionConfigured {
        wallets: Vec<DistributionWallet>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuanceScheduler {
    address: Address,
    schedule: IssuanceSchedule,
    execution_delay: u64,
    expiry_window: u64,
    access: AccessControl,
    supply: AnnualSupply,
    requests: BTreeMap<u64, MintRequest>,
    next_request_id: u64,
    distribution: Option<Distribution>,
    events: Vec<MintEvent>,
}

impl IssuanceScheduler {
    pub fn new(address: Address, admin: Address, config: &IssuanceConfig) -> Result<Self> {
        if admin.is_zero() {
            return Err(IssuanceError::ZeroAddress);
        }
        if config.execution_delay_secs >= config.expiry_window_secs {
            return Err(IssuanceError::InvalidSchedule(format!(
                "execution delay {}s must be shorter than expiry window {}s",
                config.execution_delay_secs, config.expiry_window_secs
            )));
        }
        Ok(Self {
            address,
            schedule: IssuanceSchedule::from_config(config)?,
            execution_delay: config.execution_delay_secs,
            expiry_window: config.expiry_window_secs,
            access: AccessControl::with_admin(admin),
            supply: AnnualSupply::new(),
            requests: BTreeMap::new(),
            next_request_id: 1,
            distribution: None,
            events: Vec::new(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    pub fn grant_minter(&mut self, caller: &Address, account: Address) -> Result<()> {
        if account.is_zero() {
            return Err(IssuanceError::ZeroAddress);
        }
        self.access.grant_role(caller, MINTER_ROLE.into(), account)?;
        Ok(())
    }

    pub fn revoke_minter(&mut self, caller: &Address, account: &Address) -> Result<()> {
        self.access.revoke_role(caller, &MINTER_ROLE.into(), account)?;
        Ok(())
    }

    pub fn is_minter(&self, account: &Address) -> bool {
        self.access.has_role(&MINTER_ROLE.into(), account)
    }

    /// Set the distribution wallets. Allowed exactly once.
    pub fn configure_distribution(
        &mut self,
        caller: &Address,
        wallets: Vec<DistributionWallet>,
        ledger: &dyn Ledger,
    ) -> Result<()> {
        self.access.check_role(&Role::admin(), caller)?;
        if self.distribution.is_some() {
            return Err(IssuanceError::DistributionAlreadyConfigured);
        }
        let distribution = Distribution::new(wallets, ledger)?;
        info!(
            "Distribution configured across {} wallets",
            distribution.wallets().len()
        );
        self.events.push(MintEvent::DistributionConfigured {
            wallets: distribution.wallets().to_vec(),
        });
        self.distribution = Some(distribution);
        Ok(())
    }

    pub fn distribution(&self) -> Option<&Distribution> {
        self.distribution.as_ref()
    }

    // ------------------------------------------------------------------
    // Request lifecycle
    // ------------------------------------------------------------------

    pub fn create_request(
        &mut self,
        caller: &Address,
        recipient: Address,
        amount: u128,
        purpose: String,
        now: u64,
    ) -> Result<u64> {
        self.access.check_role(&MINTER_ROLE.into(), caller)?;
        if recipient.is_zero() {
            return Err(IssuanceError::ZeroAddress);
        }
        if amount == 0 {
            return Err(IssuanceError::InvalidAmount);
        }
        let year = self.schedule.year_at(now);
        let final_year = self.schedule.final_year();
        if year > final_year {
            return Err(IssuanceError::MintingPeriodEnded { year, final_year });
        }

        self.supply
            .reserve(year, amount, self.schedule.cap_for_year(year))?;

        let id = self.next_request_id;
        self.next_request_id += 1;
        let request = MintRequest {
            id,
            recipient,
            amount,
            purpose,
            created_at: now,
            year_created: year,
            matures_at: now.saturating_add(self.execution_delay),
            expires_at: now.saturating_add(self.expiry_window),
            executed: false,
            cancelled: false,
        };
        info!(
            "Mint request #{} created: {} units to {} (year {}, matures at {})",
            id, amount, recipient, year, request.matures_at
        );
        self.requests.insert(id, request);
        self.events.push(MintEvent::RequestCreated {
            id,
            recipient,
            amount,
            year,
            timestamp: now,
        });
        Ok(id)
    }

    /// Cancel an unexecuted request and release its reservation.
    /// Expired requests are released only through this call.
    pub fn cancel_request(&mut self, caller: &Address, id: u64, now: u64) -> Result<()> {
        self.access.check_role(&MINTER_ROLE.into(), caller)?;
        let request = self
            .requests
            .get_mut(&id)
            .ok_or(IssuanceError::InvalidAmount)?;
        if request.executed {
            return Err(IssuanceError::AlreadyExecuted(id));
        }
        if request.cancelled {
            return Err(IssuanceError::AlreadyCancelled(id));
        }

        request.cancelled = true;
        let (amount, year) = (request.amount, request.year_created);
        if now > request.expires_at {
            warn!("Releasing expired mint request #{} ({} units)", id, amount);
        }
        self.supply.release(year, amount);
        info!("Mint request #{} cancelled, {} units released for year {}", id, amount, year);
        self.events.push(MintEvent::RequestCancelled {
            id,
            amount,
            year,
            timestamp: now,
        });
        Ok(())
    }

    pub fn execute_request(
        &mut self,
        caller: &Address,
        id: u64,
        now: u64,
        ledger: &mut dyn Ledger,
    ) -> Result<()> {
        self.access.check_role(&MINTER_ROLE.into(), caller)?;
        let request = self
            .requests
            .get(&id)
            .ok_or(IssuanceError::InvalidAmount)?;
        match request.status(now) {
            MintRequestStatus::Executed => return Err(IssuanceError::AlreadyExecuted(id)),
            MintRequestStatus::Cancelled => return Err(IssuanceError::AlreadyCancelled(id)),
            MintRequestStatus::Maturing => {
                return Err(IssuanceError::MintDelayNotMet {
                    id,
                    matures_at: request.matures_at,
                    now,
                })
            }
            MintRequestStatus::Expired => {
                return Err(IssuanceError::RequestExpired {
                    id,
                    expires_at: request.expires_at,
                    now,
                })
            }
            MintRequestStatus::Ready => {}
        }

        let (amount, year, recipient) = (request.amount, request.year_created, request.recipient);
        let supply_before = self.supply.clone();

        // Local state first, so a ledger callback sees a settled request
        self.supply.settle(year, amount);
        self.set_executed(id, true);

        let issued = match &self.distribution {
            Some(distribution) => {
                let (recipients, amounts) = distribution.split(amount);
                ledger.issue_split(&recipients, &amounts, now)
            }
            None => ledger.issue(&recipient, amount, now),
        };
        if let Err(e) = issued {
            warn!("Ledger rejected mint request #{}: {}", id, e);
            self.supply = supply_before;
            self.set_executed(id, false);
            return Err(e.into());
        }

        info!(
            "Mint request #{} executed: {} units charged to year {}",
            id, amount, year
        );
        self.events.push(MintEvent::RequestExecuted {
            id,
            amount,
            year,
            timestamp: now,
        });
        Ok(())
    }

    fn set_executed(&mut self, id: u64, executed: bool) {
        if let Some(request) = self.requests.get_mut(&id) {
            request.executed = executed;
        }
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    pub fn schedule(&self) -> &IssuanceSchedule {
        &self.schedule
    }

    pub fn annual_cap(&self, year: u32) -> u128 {
        self.schedule.cap_for_year(year)
    }

    pub fn remaining_capacity(&self, year: u32) -> u128 {
        self.supply.remaining(year, self.schedule.cap_for_year(year))
    }

    pub fn minted(&self, year: u32) -> u128 {
        self.supply.minted(year)
    }

    pub fn pending(&self, year: u32) -> u128 {
        self.supply.pending(year)
    }

    pub fn current_year(&self, now: u64) -> u32 {
        self.schedule.year_at(now)
    }

    /// `None` once the schedule has ended
    pub fn current_tier(&self, now: u64) -> Option<TierInfo> {
        self.schedule.tier_for_year(self.current_year(now))
    }

    pub fn time_until_next_year(&self, now: u64) -> u64 {
        self.schedule.time_until_next_year(now)
    }

    pub fn request(&self, id: u64) -> Option<&MintRequest> {
        self.requests.get(&id)
    }

    pub fn requests_for_year(&self, year: u32) -> Vec<&MintRequest> {
        self.requests
            .values()
            .filter(|r| r.year_created == year)
            .collect()
    }

    /// Open requests that are past their expiry and still hold capacity
    pub fn expired_requests(&self, now: u64) -> Vec<&MintRequest> {
        self.requests
            .values()
            .filter(|r| r.status(now) == MintRequestStatus::Expired)
            .collect()
    }

    pub fn total_minted(&self) -> u128 {
        self.supply.total_minted()
    }

    pub fn stats(&self) -> SupplyStats {
        self.supply.stats()
    }

    pub fn events(&self) -> &[MintEvent] {
        &self.events
    }
}
