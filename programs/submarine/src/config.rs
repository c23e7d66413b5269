//! Protocol parameters

use serde::{Deserialize, Serialize};

use crate::error::{Result, SubmarineError};

/// Blocks a commit must age before it may be revealed.
pub const DEFAULT_COMMIT_PERIOD_LENGTH: u64 = 3;

/// How far back the ledger still serves block hashes.
pub const DEFAULT_MAX_REVEAL_LOOKBACK: u64 = 256;

/// How a repeated sweep of the one-time address is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepPolicy {
    /// Later sweeps may only match or raise the recorded amount
    #[default]
    AtLeast,
    /// Once an amount is recorded, only that exact amount may be swept again
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmarineConfig {
    pub commit_period_length: u64,
    pub max_reveal_lookback: u64,
    pub sweep_policy: SweepPolicy,
}

impl Default for SubmarineConfig {
    fn default() -> Self {
        Self {
            commit_period_length: DEFAULT_COMMIT_PERIOD_LENGTH,
            max_reveal_lookback: DEFAULT_MAX_REVEAL_LOOKBACK,
            sweep_policy: SweepPolicy::AtLeast,
        }
    }
}

impl SubmarineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.commit_period_length >= self.max_reveal_lookback {
            return Err(SubmarineError::InvalidParameters(
                "commit period must be shorter than the reveal lookback",
            ));
        }
        Ok(())
    }

    /// `commit_block + period < current_block <= commit_block + lookback`
    pub fn reveal_window_contains(&self, commit_block: u64, current_block: u64) -> bool {
        let opens_after = commit_block.saturating_add(self.commit_period_length);
        let closes_at = commit_block.saturating_add(self.max_reveal_lookback);
        opens_after < current_block && current_block <= closes_at
    }
}
