//! Unlock
//!
//! The unsigned unlock transaction sweeps the one-time address into the
//! target. Anyone may broadcast it; the call data names the commitment.

use tracing::warn;

use crate::config::SweepPolicy;
use crate::crypto::derivation::parse_unlock_payload;
use crate::error::Result;
use crate::state::{Session, SessionStore};
use crate::types::{Address, CommitId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockCall {
    /// Whoever delivered the sweep; not authenticated
    pub from: Address,
    pub value: u128,
    /// `UNLOCK_SELECTOR ‖ commit_id ‖ embedded payload`
    pub data: Vec<u8>,
}

pub(crate) struct PreparedSweep<'a> {
    pub commit_id: CommitId,
    pub next: Session,
    pub embedded: &'a [u8],
}

pub(crate) fn prepare_sweep<'a, S: SessionStore>(
    store: &S,
    policy: SweepPolicy,
    call: &'a UnlockCall,
) -> Result<PreparedSweep<'a>> {
    let (commit_id, embedded) = parse_unlock_payload(&call.data)?;
    let next = sweep_session(store, policy, &commit_id, call.value)?;
    Ok(PreparedSweep { commit_id, next, embedded })
}

pub(crate) fn sweep_session<S: SessionStore>(
    store: &S,
    policy: SweepPolicy,
    commit_id: &CommitId,
    amount: u128,
) -> Result<Session> {
    store
        .get(commit_id)
        .unwrap_or_default()
        .swept_with(amount, policy)
        .map_err(|e| {
            warn!(%commit_id, amount, error = %e, "sweep rejected");
            e
        })
}
