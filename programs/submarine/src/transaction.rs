//! Legacy ledger transactions
//!
//! `[nonce, gasPrice, gasLimit, to, value, data]` unsigned, with
//! `[v, r, s]` appended once signed. Signatures are either pre-replay-protection
//! (`v ∈ {27, 28}`, signing hash over the six fields) or EIP-155
//! (`v = chainId·2 + 35 + parity`, signing hash over the six fields followed by
//! `chainId, 0, 0`).

use crate::crypto::hash::keccak256;
use crate::crypto::signature::{recover_address, sign_prehash, RecoverableSignature};
use crate::error::{Result, SubmarineError};
use crate::rlp::{encode_bytes, encode_list, encode_uint, Rlp};
use crate::types::{Address, H256};

const LEGACY_V_BASE: u64 = 27;
const EIP155_V_BASE: u64 = 35;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnsignedTransaction {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    /// `None` for contract creation
    pub to: Option<Address>,
    pub value: u128,
    pub data: Vec<u8>,
}

impl UnsignedTransaction {
    fn encoded_fields(&self) -> Vec<Vec<u8>> {
        vec![
            encode_uint(self.nonce as u128),
            encode_uint(self.gas_price),
            encode_uint(self.gas_limit as u128),
            encode_bytes(self.to.as_ref().map_or(&[][..], |a| &a.0[..])),
            encode_uint(self.value),
            encode_bytes(&self.data),
        ]
    }

    /// Canonical six-field encoding.
    pub fn rlp_bytes(&self) -> Vec<u8> {
        encode_list(&self.encoded_fields())
    }

    /// keccak of the six-field encoding.
    pub fn hash(&self) -> H256 {
        keccak256(&self.rlp_bytes())
    }

    pub fn signing_hash(&self, chain_id: Option<u64>) -> H256 {
        match chain_id {
            None => self.hash(),
            Some(id) => {
                let mut fields = self.encoded_fields();
                fields.push(encode_uint(id as u128));
                fields.push(encode_uint(0));
                fields.push(encode_uint(0));
                keccak256(&encode_list(&fields))
            }
        }
    }

    /// Decode a six-field unsigned transaction.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let items = Rlp::new(bytes)?.items()?;
        if items.len() != 6 {
            return Err(SubmarineError::MalformedEncoding("unsigned transaction must have 6 fields"));
        }
        Self::from_fields(&items)
    }

    fn from_fields(items: &[Rlp<'_>]) -> Result<Self> {
        let to = match items[3].as_bytes()? {
            [] => None,
            bytes => Some(
                Address::from_slice(bytes)
                    .ok_or(SubmarineError::MalformedEncoding("recipient must be 20 bytes"))?,
            ),
        };
        Ok(Self {
            nonce: items[0].as_u64()?,
            gas_price: items[1].as_u128()?,
            gas_limit: items[2].as_u64()?,
            to,
            value: items[4].as_u128()?,
            data: items[5].as_bytes()?.to_vec(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub tx: UnsignedTransaction,
    pub v: u64,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl SignedTransaction {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let items = Rlp::new(bytes)?.items()?;
        if items.len() != 9 {
            return Err(SubmarineError::MalformedEncoding("signed transaction must have 9 fields"));
        }
        Ok(Self {
            tx: UnsignedTransaction::from_fields(&items[..6])?,
            v: items[6].as_u64()?,
            r: scalar_32(&items[7])?,
            s: scalar_32(&items[8])?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut fields = self.tx.encoded_fields();
        fields.push(encode_uint(self.v as u128));
        fields.push(encode_bytes(strip_leading_zeros(&self.r)));
        fields.push(encode_bytes(strip_leading_zeros(&self.s)));
        encode_list(&fields)
    }

    /// Transaction hash as the ledger reports it.
    pub fn hash(&self) -> H256 {
        keccak256(&self.encode())
    }

    /// Replay-protection chain id, if the signature carries one.
    pub fn chain_id(&self) -> Option<u64> {
        (self.v >= EIP155_V_BASE).then(|| (self.v - EIP155_V_BASE) / 2)
    }

    fn y_parity(&self) -> Result<u8> {
        match self.v {
            27 | 28 => Ok((self.v - LEGACY_V_BASE) as u8),
            v if v >= EIP155_V_BASE => Ok(((v - EIP155_V_BASE) % 2) as u8),
            _ => Err(SubmarineError::SignatureMismatch("unsupported v value")),
        }
    }

    pub fn recover_sender(&self) -> Result<Address> {
        let signature = RecoverableSignature { r: self.r, s: self.s, y_parity: self.y_parity()? };
        recover_address(&self.tx.signing_hash(self.chain_id()), &signature)
    }
}

/// Sign `tx` with a raw secret key, optionally replay-protected for `chain_id`.
pub fn sign_transaction(
    tx: UnsignedTransaction,
    secret: &[u8; 32],
    chain_id: Option<u64>,
) -> Result<SignedTransaction> {
    let signature = sign_prehash(secret, &tx.signing_hash(chain_id))?;
    let v = match chain_id {
        None => LEGACY_V_BASE + signature.y_parity as u64,
        Some(id) => id
            .checked_mul(2)
            .and_then(|x| x.checked_add(EIP155_V_BASE + signature.y_parity as u64))
            .ok_or(SubmarineError::InvalidParameters("chain id too large"))?,
    };
    Ok(SignedTransaction { tx, v, r: signature.r, s: signature.s })
}

fn scalar_32(item: &Rlp<'_>) -> Result<[u8; 32]> {
    let bytes = item.as_bytes()?;
    if bytes.len() > 32 {
        return Err(SubmarineError::MalformedEncoding("signature scalar wider than 32 bytes"));
    }
    if bytes.first() == Some(&0) {
        return Err(SubmarineError::MalformedEncoding("signature scalar has a leading zero byte"));
    }
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(bytes);
    Ok(out)
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}
