//! Seams to the host ledger
//!
//! The engine never talks to a node. Whatever embeds it supplies the
//! trusted view of finalized blocks, the side effect that pays the real
//! target, and any listeners for session transitions.

use serde::{Deserialize, Serialize};

use crate::types::{CommitId, H256};

/// Trusted view of the ledger's finalized history.
pub trait ChainView {
    fn current_block(&self) -> u64;

    /// Hash of block `number`, or `None` once it has fallen out of the
    /// ledger's lookback window (or does not exist yet).
    fn block_hash(&self, number: u64) -> Option<H256>;
}

/// Hands swept funds and the embedded payload to the real target.
pub trait FundsForwarder {
    fn forward(&mut self, commit_id: &CommitId, amount: u128, embedded: &[u8]) -> Result<(), String>;
}

/// Session transitions, emitted after the new state is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SubmarineEvent {
    Revealed { commit_id: CommitId, amount: u128 },
    Unlocked { commit_id: CommitId, amount: u128 },
}

impl SubmarineEvent {
    pub fn commit_id(&self) -> &CommitId {
        match self {
            SubmarineEvent::Revealed { commit_id, .. } | SubmarineEvent::Unlocked { commit_id, .. } => commit_id,
        }
    }
}

pub trait SessionObserver {
    fn on_event(&mut self, event: &SubmarineEvent);
}

/// Forwarder for deployments where the funds already sit with the target
/// and only the bookkeeping matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopForwarder;

impl FundsForwarder for NoopForwarder {
    fn forward(&mut self, _commit_id: &CommitId, _amount: u128, _embedded: &[u8]) -> Result<(), String> {
        Ok(())
    }
}
