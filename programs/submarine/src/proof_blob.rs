//! Proof blob wire format
//!
//! `rlp([version, header, txIndex, [node₀, node₁, …]])` where `header` is the
//! block header list and each node is carried as a byte string holding the
//! node's own encoding. Only version 1 exists.

use tracing::debug;

use crate::block::BlockHeader;
use crate::error::{Result, SubmarineError};
use crate::rlp::{encode_bytes, encode_list, encode_uint, Rlp};
use crate::trie::{transaction_key, verify_proof};
use crate::types::H256;

pub const PROOF_BLOB_VERSION: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofBlob {
    pub header: BlockHeader,
    pub tx_index: u64,
    pub nodes: Vec<Vec<u8>>,
}

impl ProofBlob {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let items = Rlp::new(bytes)?.items()?;
        if items.len() != 4 {
            return Err(SubmarineError::MalformedEncoding("proof blob must have 4 fields"));
        }
        if items[0].as_u64()? != PROOF_BLOB_VERSION {
            return Err(SubmarineError::MalformedEncoding("unsupported proof blob version"));
        }
        let header = BlockHeader::from_rlp(&items[1])?;
        let tx_index = items[2].as_u64()?;
        let nodes = items[3]
            .items()?
            .iter()
            .map(|node| node.as_bytes().map(<[u8]>::to_vec))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { header, tx_index, nodes })
    }

    pub fn encode(&self) -> Vec<u8> {
        let nodes: Vec<Vec<u8>> = self.nodes.iter().map(|n| encode_bytes(n)).collect();
        encode_list(&[
            encode_uint(PROOF_BLOB_VERSION as u128),
            self.header.encode(),
            encode_uint(self.tx_index as u128),
            encode_list(&nodes),
        ])
    }

    /// Check the blob against a block hash the ledger vouches for and
    /// return the raw bytes of the proven transaction.
    pub fn verify_transaction(&self, trusted_block_hash: &H256) -> Result<Vec<u8>> {
        if self.header.hash() != *trusted_block_hash {
            return Err(SubmarineError::InvalidProof("header does not hash to the trusted block hash"));
        }
        debug!(
            block = self.header.number,
            tx_index = self.tx_index,
            nodes = self.nodes.len(),
            "verifying transaction inclusion"
        );
        verify_proof(&self.header.transactions_root, &transaction_key(self.tx_index), &self.nodes)?
            .ok_or(SubmarineError::InvalidProof("transaction is absent from the block"))
    }
}
