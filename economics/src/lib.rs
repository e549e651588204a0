//! Civitas Economics Module
//!
//! Implements the tiered issuance engine:
//! - 25-year schedule with strictly decreasing annual caps
//! - Two-stage mint requests (create, mature, execute or cancel)
//! - Per-year minted/pending accounting with fixed year attribution
//! - One-time distribution split across six contract wallets

pub mod calls;
pub mod distribution;
pub mod error;
pub mod request;
pub mod schedule;
pub mod scheduler;
pub mod supply;

pub use calls::{IssuanceCall, IssuanceOutcome};
pub use distribution::{Distribution, DistributionWallet};
pub use error::{IssuanceError, Result};
pub use request::{MintRequest, MintRequestStatus};
pub use schedule::{IssuanceSchedule, TierInfo};
pub use scheduler::{IssuanceScheduler, MintEvent};
pub use supply::{AnnualSupply, SupplyStats};

#[cfg(test)]
mod proptests;
