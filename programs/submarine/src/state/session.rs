//! Per-commitment session state
//!
//! Reveal and unlock arrive independently and in either order. Each flips
//! its own flag and records its own amount; neither flag ever goes back.
//!
//! ## Lifecycle
//!
//! ```text
//!   Untouched ──reveal──▶ Revealed ──unlock──▶ Finished
//!       │                                         ▲
//!       └──────unlock──▶ Unlocked ──reveal────────┘
//! ```

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::config::SweepPolicy;
use crate::error::{Result, SubmarineError};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct Session {
    /// Set once a valid inclusion proof has been accepted
    pub revealed: bool,

    /// Set once the one-time address has been swept
    pub unlocked: bool,

    /// Unlock value the sender committed to
    pub revealed_amount: u128,

    /// Value carried by the most recent accepted sweep
    pub unlocked_amount: u128,
}

impl Session {
    /// revealed (1) + unlocked (1) + revealed_amount (16) + unlocked_amount (16)
    pub const SIZE: usize = 1 + 1 + 16 + 16;

    pub fn is_finished(&self) -> bool {
        self.revealed && self.unlocked
    }

    pub fn revealed_with(self, amount: u128) -> Self {
        Self { revealed: true, revealed_amount: amount, ..self }
    }

    /// Session after a sweep of `amount`, or the reason the sweep must revert.
    pub fn swept_with(self, amount: u128, policy: SweepPolicy) -> Result<Self> {
        if amount == 0 {
            return Err(SubmarineError::InvalidParameters("sweep carries no value"));
        }
        let recorded = self.unlocked_amount;
        let rejected = match policy {
            SweepPolicy::AtLeast => recorded > amount,
            SweepPolicy::Exact => recorded != 0 && recorded != amount,
        };
        if rejected {
            return Err(SubmarineError::SweepRejected { recorded, offered: amount });
        }
        Ok(Self { unlocked: true, unlocked_amount: amount, ..self })
    }
}
