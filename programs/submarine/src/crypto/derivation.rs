//! Deterministic one-time address derivation
//!
//! A commitment binds the sender, the real target, the value, the dapp
//! payload, the unlock gas terms and a secret witness. Everything the
//! sender later needs (the commitment id, the one-time address `B` and the
//! unsigned unlock transaction) is a pure function of those inputs.
//!
//! ## Derivation
//!
//! 1. `commit_id = keccak(sender ‖ target ‖ u256(value) ‖ payload ‖ witness ‖ u256(gasPrice) ‖ u256(gasLimit))`
//! 2. `unlock_tx = [0, gasPrice, gasLimit, target, value, selector ‖ commit_id ‖ payload]`
//! 3. `keyless_sender = keccak("submarine-keyless-v1" ‖ commit_id ‖ keccak(unlock_tx))[12..]`
//! 4. `B = keccak(rlp([keyless_sender, 0]))[12..]`
//!
//! `B` is the address the keyless sender's first contract creation would
//! occupy. Nobody observing `B` can tell which target or payload it hides
//! without the witness.

use crate::crypto::hash::{keccak256, keccak256_concat};
use crate::error::{Result, SubmarineError, INTRINSIC_TRANSFER_GAS};
use crate::rlp::{encode_bytes, encode_list, encode_uint};
use crate::transaction::UnsignedTransaction;
use crate::types::{Address, CommitId, Witness, H256};

/// `keccak256("unlock(bytes32)")[..4]`
pub const UNLOCK_SELECTOR: [u8; 4] = [0xec, 0x9b, 0x5b, 0x3a];

/// Selector plus commitment id.
pub const UNLOCK_PAYLOAD_PREFIX_LEN: usize = 4 + 32;

const KEYLESS_SENDER_DOMAIN: &[u8] = b"submarine-keyless-v1";

/// Public inputs of a commitment. The witness is passed separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitParams {
    pub sender: Address,
    pub target: Address,
    /// Amount the unlock transaction delivers to `target`
    pub value: u128,
    /// Embedded dapp payload
    pub payload: Vec<u8>,
    pub gas_price: u128,
    pub gas_limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commitment {
    pub commit_id: CommitId,
    pub one_time_address: Address,
    pub keyless_sender: Address,
    pub unlock_tx: UnsignedTransaction,
    /// Canonical encoding of `unlock_tx`
    pub unlock_tx_bytes: Vec<u8>,
    pub unlock_hash: H256,
    required_commit_amount: u128,
}

impl Commitment {
    /// What the commit transaction must move to `B`: the unlock value plus
    /// the gas the unlock transaction will burn.
    pub fn required_commit_amount(&self) -> u128 {
        self.required_commit_amount
    }
}

pub fn derive(params: &CommitParams, witness: &Witness) -> Result<Commitment> {
    if params.value == 0 {
        return Err(SubmarineError::InvalidParameters("unlock value must be non-zero"));
    }
    if params.gas_limit < INTRINSIC_TRANSFER_GAS {
        return Err(SubmarineError::InvalidParameters("unlock gas limit below intrinsic transfer cost"));
    }
    let required_commit_amount = params
        .gas_price
        .checked_mul(params.gas_limit as u128)
        .and_then(|fee| fee.checked_add(params.value))
        .ok_or(SubmarineError::InvalidParameters("value plus unlock fee overflows"))?;

    let commit_id = compute_commit_id(params, witness);

    let unlock_tx = UnsignedTransaction {
        nonce: 0,
        gas_price: params.gas_price,
        gas_limit: params.gas_limit,
        to: Some(params.target),
        value: params.value,
        data: unlock_payload(&commit_id, &params.payload),
    };
    let unlock_tx_bytes = unlock_tx.rlp_bytes();
    let unlock_hash = keccak256(&unlock_tx_bytes);

    let keyless_sender = address_from_digest(&keccak256_concat(&[
        KEYLESS_SENDER_DOMAIN,
        commit_id.as_bytes(),
        unlock_hash.as_bytes(),
    ]));
    let one_time_address = create_address(&keyless_sender, 0);

    Ok(Commitment {
        commit_id,
        one_time_address,
        keyless_sender,
        unlock_tx,
        unlock_tx_bytes,
        unlock_hash,
        required_commit_amount,
    })
}

pub fn compute_commit_id(params: &CommitParams, witness: &Witness) -> CommitId {
    keccak256_concat(&[
        params.sender.as_bytes(),
        params.target.as_bytes(),
        &u256_be(params.value),
        &params.payload,
        witness.as_bytes(),
        &u256_be(params.gas_price),
        &u256_be(params.gas_limit as u128),
    ])
}

/// `UNLOCK_SELECTOR ‖ commit_id ‖ embedded`
pub fn unlock_payload(commit_id: &CommitId, embedded: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(UNLOCK_PAYLOAD_PREFIX_LEN + embedded.len());
    data.extend_from_slice(&UNLOCK_SELECTOR);
    data.extend_from_slice(commit_id.as_bytes());
    data.extend_from_slice(embedded);
    data
}

/// Split unlock call data into the commitment id and the embedded payload.
pub fn parse_unlock_payload(data: &[u8]) -> Result<(CommitId, &[u8])> {
    if data.len() < UNLOCK_PAYLOAD_PREFIX_LEN {
        return Err(SubmarineError::InvalidParameters("unlock payload too short"));
    }
    if data[..4] != UNLOCK_SELECTOR {
        return Err(SubmarineError::InvalidParameters("unlock payload has the wrong selector"));
    }
    let mut id = [0u8; 32];
    id.copy_from_slice(&data[4..UNLOCK_PAYLOAD_PREFIX_LEN]);
    Ok((H256(id), &data[UNLOCK_PAYLOAD_PREFIX_LEN..]))
}

/// Address of the contract `sender` creates with `nonce`.
pub fn create_address(sender: &Address, nonce: u64) -> Address {
    let encoded = encode_list(&[encode_bytes(sender.as_bytes()), encode_uint(nonce as u128)]);
    address_from_digest(&keccak256(&encoded))
}

fn address_from_digest(digest: &H256) -> Address {
    let mut address = [0u8; 20];
    address.copy_from_slice(&digest.0[12..]);
    Address(address)
}

fn u256_be(value: u128) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[16..].copy_from_slice(&value.to_be_bytes());
    out
}
