//! Error taxonomy shared by every component
//!
//! Component errors stay component-specific (`IssuanceError`,
//! `GovernanceError`, ...). `ErrorKind` lets callers branch on the broad
//! category without matching every variant.

use crate::access::AccessError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Caller lacks the required role, threshold or membership
    Authorization,
    /// Zero address, zero amount, malformed lengths, out-of-range config
    Validation,
    /// Too early or too late
    Temporal,
    /// Already executed, cancelled or configured
    StateConflict,
    /// Quorum hierarchy, annual cap
    Invariant,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Authorization => "authorization",
            ErrorKind::Validation => "validation",
            ErrorKind::Temporal => "temporal",
            ErrorKind::StateConflict => "state-conflict",
            ErrorKind::Invariant => "invariant",
        };
        f.write_str(s)
    }
}

pub trait Classify {
    fn kind(&self) -> ErrorKind;
}

impl Classify for AccessError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Authorization
    }
}
