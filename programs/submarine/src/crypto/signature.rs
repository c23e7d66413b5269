//! secp256k1 signer recovery for ledger transactions
//!
//! The ledger never transmits public keys. A transaction carries `(v, r, s)`
//! and the sender is whoever's key recovers from the signing hash. Only
//! low-s signatures are accepted, matching the ledger's malleability rule.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

use crate::crypto::hash::keccak256;
use crate::error::{Result, SubmarineError};
use crate::types::{Address, H256};

/// `(r, s)` plus the y-parity bit needed for recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// 0 or 1
    pub y_parity: u8,
}

/// Ledger address of a public key: last 20 bytes of the keccak of the
/// uncompressed point without its `0x04` tag.
pub fn address_from_key(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&digest.0[12..]);
    Address(address)
}

pub fn address_from_secret(secret: &[u8; 32]) -> Result<Address> {
    let signing_key = SigningKey::from_slice(secret)
        .map_err(|_| SubmarineError::InvalidParameters("secret key is not a valid scalar"))?;
    Ok(address_from_key(signing_key.verifying_key()))
}

/// Recover the signer of `prehash`.
pub fn recover_address(prehash: &H256, signature: &RecoverableSignature) -> Result<Address> {
    let mut rs = [0u8; 64];
    rs[..32].copy_from_slice(&signature.r);
    rs[32..].copy_from_slice(&signature.s);

    let sig = Signature::from_slice(&rs)
        .map_err(|_| SubmarineError::SignatureMismatch("r or s out of range"))?;
    if sig.normalize_s().is_some() {
        return Err(SubmarineError::SignatureMismatch("high-s signature"));
    }
    if signature.y_parity > 1 {
        return Err(SubmarineError::SignatureMismatch("recovery id out of range"));
    }
    let recovery_id = RecoveryId::from_byte(signature.y_parity)
        .ok_or(SubmarineError::SignatureMismatch("recovery id out of range"))?;

    let key = VerifyingKey::recover_from_prehash(prehash.as_bytes(), &sig, recovery_id)
        .map_err(|_| SubmarineError::SignatureMismatch("public key recovery failed"))?;
    Ok(address_from_key(&key))
}

/// Sign a 32-byte digest. Used to produce commit transactions offline and in tests.
pub fn sign_prehash(secret: &[u8; 32], prehash: &H256) -> Result<RecoverableSignature> {
    let signing_key = SigningKey::from_slice(secret)
        .map_err(|_| SubmarineError::InvalidParameters("secret key is not a valid scalar"))?;
    let (sig, recovery_id) = signing_key
        .sign_prehash_recoverable(prehash.as_bytes())
        .map_err(|_| SubmarineError::InvalidParameters("signing failed"))?;

    let (r, s) = sig.split_bytes();
    let mut out = RecoverableSignature { r: [0u8; 32], s: [0u8; 32], y_parity: recovery_id.to_byte() & 1 };
    out.r.copy_from_slice(&r);
    out.s.copy_from_slice(&s);
    Ok(out)
}
