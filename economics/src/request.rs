//! Two-stage mint requests

use civitas_core::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MintRequestStatus {
    /// Created, delay not yet elapsed
    Maturing,
    /// Executable now
    Ready,
    /// Past the expiry window; only cancellation remains
    Expired,
    Executed,
    Cancelled,
}

impl MintRequestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MintRequestStatus::Executed | MintRequestStatus::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    pub id: u64,
    pub recipient: Address,
    pub amount: u128,
    pub purpose: String,
    pub created_at: u64,
    /// Year whose cap this request is charged against, fixed at creation
    pub year_created: u32,
    pub matures_at: u64,
    pub expires_at: u64,
    pub executed: bool,
    pub cancelled: bool,
}

impl MintRequest {
    pub fn status(&self, now: u64) -> MintRequestStatus {
        if self.executed {
            MintRequestStatus::Executed
        } else if self.cancelled {
            MintRequestStatus::Cancelled
        } else if now < self.matures_at {
            MintRequestStatus::Maturing
        } else if now > self.expires_at {
            MintRequestStatus::Expired
        } else {
            MintRequestStatus::Ready
        }
    }

    /// Still holding a reservation against its year's cap
    pub fn is_open(&self) -> bool {
        !self.executed && !self.cancelled
    }
}
