//! Civitas Node
//!
//! Composition root for the treasury core. `Dao` owns the ledger, the
//! upgrade layer and every component, routes encoded calls between them
//! and applies each public call all-or-nothing.

pub mod call;
pub mod dao;
pub mod error;
pub mod logging;

pub use call::{Call, CallOutcome, UpgradeCall};
pub use dao::{Dao, DaoAddresses, DaoSetup, MAX_CALL_DEPTH};
pub use error::{DaoError, Result};
