//! Block headers as carried inside a proof blob
//!
//! Only `number` and `transactions_root` drive verification, but the header
//! is decoded field by field so that a malformed header is rejected before
//! its hash is compared with the ledger's. Post-fork trailing fields (base
//! fee, withdrawals root and so on) are preserved verbatim and hashed along
//! with the rest.

use crate::crypto::hash::keccak256;
use crate::error::{Result, SubmarineError};
use crate::rlp::{encode_bytes, encode_list, encode_uint, Rlp};
use crate::types::{Address, H256};

pub const LOGS_BLOOM_LEN: usize = 256;

const BASE_FIELD_COUNT: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub parent_hash: H256,
    pub uncles_hash: H256,
    pub miner: Address,
    pub state_root: H256,
    pub transactions_root: H256,
    pub receipts_root: H256,
    pub logs_bloom: Vec<u8>,
    pub difficulty: u128,
    pub number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: Vec<u8>,
    pub mix_hash: H256,
    pub nonce: [u8; 8],
    /// Encoded items following the nonce, kept as-is
    pub extra_fields: Vec<Vec<u8>>,
}

impl Default for BlockHeader {
    fn default() -> Self {
        Self {
            parent_hash: H256::default(),
            uncles_hash: H256::default(),
            miner: Address::default(),
            state_root: H256::default(),
            transactions_root: H256::default(),
            receipts_root: H256::default(),
            logs_bloom: vec![0u8; LOGS_BLOOM_LEN],
            difficulty: 0,
            number: 0,
            gas_limit: 0,
            gas_used: 0,
            timestamp: 0,
            extra_data: Vec::new(),
            mix_hash: H256::default(),
            nonce: [0u8; 8],
            extra_fields: Vec::new(),
        }
    }
}

impl BlockHeader {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::from_rlp(&Rlp::new(bytes)?)
    }

    pub(crate) fn from_rlp(item: &Rlp<'_>) -> Result<Self> {
        let fields = item.items()?;
        if fields.len() < BASE_FIELD_COUNT {
            return Err(SubmarineError::MalformedEncoding("block header has too few fields"));
        }

        let logs_bloom = fields[6].as_bytes()?;
        if logs_bloom.len() != LOGS_BLOOM_LEN {
            return Err(SubmarineError::MalformedEncoding("logs bloom must be 256 bytes"));
        }

        Ok(Self {
            parent_hash: H256(fields[0].as_fixed()?),
            uncles_hash: H256(fields[1].as_fixed()?),
            miner: Address(fields[2].as_fixed()?),
            state_root: H256(fields[3].as_fixed()?),
            transactions_root: H256(fields[4].as_fixed()?),
            receipts_root: H256(fields[5].as_fixed()?),
            logs_bloom: logs_bloom.to_vec(),
            difficulty: fields[7].as_u128()?,
            number: fields[8].as_u64()?,
            gas_limit: fields[9].as_u64()?,
            gas_used: fields[10].as_u64()?,
            timestamp: fields[11].as_u64()?,
            extra_data: fields[12].as_bytes()?.to_vec(),
            mix_hash: H256(fields[13].as_fixed()?),
            nonce: fields[14].as_fixed()?,
            extra_fields: fields[BASE_FIELD_COUNT..].iter().map(|f| f.as_raw().to_vec()).collect(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut fields = vec![
            encode_bytes(self.parent_hash.as_bytes()),
            encode_bytes(self.uncles_hash.as_bytes()),
            encode_bytes(self.miner.as_bytes()),
            encode_bytes(self.state_root.as_bytes()),
            encode_bytes(self.transactions_root.as_bytes()),
            encode_bytes(self.receipts_root.as_bytes()),
            encode_bytes(&self.logs_bloom),
            encode_uint(self.difficulty),
            encode_uint(self.number as u128),
            encode_uint(self.gas_limit as u128),
            encode_uint(self.gas_used as u128),
            encode_uint(self.timestamp as u128),
            encode_bytes(&self.extra_data),
            encode_bytes(self.mix_hash.as_bytes()),
            encode_bytes(&self.nonce),
        ];
        fields.extend(self.extra_fields.iter().cloned());
        encode_list(&fields)
    }

    /// Block hash. Canonical decoding guarantees this equals the hash of
    /// the bytes the header was decoded from.
    pub fn hash(&self) -> H256 {
        keccak256(&self.encode())
    }
}
