//! Reveal
//!
//! The sender discloses the witness and every commitment input, together
//! with a proof that the commit transaction was mined.
//!
//! ## Flow
//!
//! 1. Re-derive the commitment from the disclosed inputs
//! 2. Short-circuit if this commitment was already revealed
//! 3. Check the commit block lies inside the reveal window
//! 4. Check the claimed unlock transaction hash is the derived one
//! 5. Bind the proof's header to the ledger's hash for the commit block
//! 6. Walk the transaction trie to the commit transaction
//! 7. Check it pays the one-time address, carries enough value and was
//!    signed by the sender
//!
//! Nothing is written until every check has passed.

use std::fmt;

use subtle::ConstantTimeEq;
use tracing::debug;

use crate::config::SubmarineConfig;
use crate::crypto::derivation::{derive, CommitParams};
use crate::error::{Result, SubmarineError};
use crate::ledger::ChainView;
use crate::proof_blob::ProofBlob;
use crate::state::{Session, SessionStore};
use crate::transaction::SignedTransaction;
use crate::types::{Address, CommitId, Witness, H256};

#[derive(Clone)]
pub struct RevealRequest {
    /// Account that signed the commit transaction
    pub sender: Address,

    /// Block the commit transaction was mined in
    pub commit_block_number: u64,

    /// Dapp payload embedded in the unlock call
    pub embedded_data: Vec<u8>,

    /// Value the unlock transaction delivers to the target
    pub unlock_amount: u128,

    pub witness: Witness,

    pub unlock_gas_price: u128,

    pub unlock_gas_limit: u64,

    /// Hash of the unsigned unlock transaction the sender precomputed
    pub unlock_tx_hash: H256,

    /// Encoded [`ProofBlob`]
    pub proof_blob: Vec<u8>,
}

impl fmt::Debug for RevealRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealRequest")
            .field("sender", &self.sender)
            .field("commit_block_number", &self.commit_block_number)
            .field("unlock_amount", &self.unlock_amount)
            .field("unlock_tx_hash", &self.unlock_tx_hash)
            .field("proof_blob_len", &self.proof_blob.len())
            .finish_non_exhaustive()
    }
}

pub(crate) enum RevealOutcome {
    /// Nothing to write; the stored session is returned as-is
    AlreadyRevealed(Session),
    Accepted { commit_id: CommitId, session: Session },
}

pub(crate) fn check_reveal<S: SessionStore, C: ChainView>(
    config: &SubmarineConfig,
    store: &S,
    chain: &C,
    target: &Address,
    request: &RevealRequest,
) -> Result<RevealOutcome> {
    let params = CommitParams {
        sender: request.sender,
        target: *target,
        value: request.unlock_amount,
        payload: request.embedded_data.clone(),
        gas_price: request.unlock_gas_price,
        gas_limit: request.unlock_gas_limit,
    };
    let commitment = derive(&params, &request.witness)?;
    let commit_id = commitment.commit_id;

    let session = store.get(&commit_id).unwrap_or_default();
    if session.revealed {
        debug!(%commit_id, "commitment already revealed");
        return Ok(RevealOutcome::AlreadyRevealed(session));
    }

    let current_block = chain.current_block();
    if !config.reveal_window_contains(request.commit_block_number, current_block) {
        return Err(SubmarineError::StaleOrFutureBlock {
            commit_block: request.commit_block_number,
            current_block,
        });
    }

    let derived: &[u8] = commitment.unlock_hash.as_ref();
    let claimed: &[u8] = request.unlock_tx_hash.as_ref();
    if !bool::from(derived.ct_eq(claimed)) {
        return Err(SubmarineError::SignatureMismatch("unlock transaction hash does not match the commitment"));
    }

    let blob = ProofBlob::decode(&request.proof_blob)?;
    if blob.header.number != request.commit_block_number {
        return Err(SubmarineError::InvalidProof("proof header is not the commit block"));
    }
    let trusted_hash = chain
        .block_hash(request.commit_block_number)
        .ok_or(SubmarineError::InvalidProof("ledger has no hash for the commit block"))?;
    let raw_tx = blob.verify_transaction(&trusted_hash)?;

    let commit_tx = SignedTransaction::decode(&raw_tx)?;
    if commit_tx.tx.to != Some(commitment.one_time_address) {
        return Err(SubmarineError::RecipientMismatch {
            expected: commitment.one_time_address,
            actual: commit_tx.tx.to,
        });
    }

    let required = commitment.required_commit_amount();
    if commit_tx.tx.value < required {
        return Err(SubmarineError::InsufficientTransfer { transferred: commit_tx.tx.value, required });
    }

    if commit_tx.recover_sender()? != request.sender {
        return Err(SubmarineError::SignatureMismatch("commit transaction was not signed by the sender"));
    }

    Ok(RevealOutcome::Accepted { commit_id, session: session.revealed_with(request.unlock_amount) })
}
