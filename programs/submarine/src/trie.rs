//! Merkle-Patricia inclusion proofs
//!
//! Walks a proof path from a trusted root down to the value stored under a
//! key, checking every hash link on the way. A proof either shows the value
//! (`Some`), shows that no value exists (`None`), or is rejected.
//!
//! ## Node shapes
//!
//! - Branch: 17 items, one child per nibble plus a value slot
//! - Leaf / extension: 2 items, hex-prefix encoded path then value / child
//!
//! A child reference is either the 32-byte hash of the next proof node or,
//! for nodes whose encoding is shorter than 32 bytes, the node itself
//! embedded inline. Inline nodes do not occupy a slot in the proof.

use tracing::debug;

use crate::crypto::hash::{keccak256, EMPTY_TRIE_ROOT};
use crate::error::{Result, SubmarineError};
use crate::rlp::{encode_uint, Rlp};
use crate::types::H256;

const BRANCH_ARITY: usize = 17;
const SHORT_NODE_ARITY: usize = 2;

/// Trie key of the transaction at `index` within its block.
pub fn transaction_key(index: u64) -> Vec<u8> {
    encode_uint(index as u128)
}

pub fn verify_proof(root: &H256, key: &[u8], proof: &[Vec<u8>]) -> Result<Option<Vec<u8>>> {
    let first = match proof.first() {
        Some(node) => node,
        None if *root == EMPTY_TRIE_ROOT => return Ok(None),
        None => return Err(SubmarineError::InvalidProof("empty proof for a non-empty trie")),
    };
    if keccak256(first) != *root {
        return Err(SubmarineError::InvalidProof("first node does not hash to the trusted root"));
    }

    let key = to_nibbles(key);
    let mut offset = 0usize;
    let mut consumed = 1usize;
    let mut node = Rlp::new(first).map_err(undecodable)?;

    loop {
        let items = node.items().map_err(undecodable)?;
        let child = match items.len() {
            BRANCH_ARITY => {
                if offset == key.len() {
                    let value = items[16].as_bytes().map_err(undecodable)?;
                    return conclude(consumed, proof, value);
                }
                let child = items[key[offset] as usize];
                offset += 1;
                child
            }
            SHORT_NODE_ARITY => {
                let (is_leaf, path) = decode_hex_prefix(items[0].as_bytes().map_err(undecodable)?)?;
                let remaining = &key[offset..];
                if is_leaf {
                    if remaining != path.as_slice() {
                        return conclude(consumed, proof, &[]);
                    }
                    let value = items[1].as_bytes().map_err(undecodable)?;
                    return conclude(consumed, proof, value);
                }
                if !remaining.starts_with(&path) {
                    return conclude(consumed, proof, &[]);
                }
                offset += path.len();
                items[1]
            }
            _ => return Err(SubmarineError::InvalidProof("trie node must have 2 or 17 items")),
        };

        if child.is_list() {
            if child.as_raw().len() >= 32 {
                return Err(SubmarineError::InvalidProof("inline node of 32 bytes or more must be hashed"));
            }
            node = child;
            continue;
        }
        let reference = child.as_bytes().map_err(undecodable)?;
        match reference.len() {
            0 => return conclude(consumed, proof, &[]),
            32 => {
                let next = proof
                    .get(consumed)
                    .ok_or(SubmarineError::InvalidProof("proof ends before the path resolves"))?;
                if keccak256(next).as_bytes()[..] != *reference {
                    return Err(SubmarineError::InvalidProof("node does not hash to its parent's reference"));
                }
                consumed += 1;
                node = Rlp::new(next).map_err(undecodable)?;
            }
            _ => return Err(SubmarineError::InvalidProof("child reference is neither a hash nor an inline node")),
        }
    }
}

fn conclude(consumed: usize, proof: &[Vec<u8>], value: &[u8]) -> Result<Option<Vec<u8>>> {
    if consumed != proof.len() {
        return Err(SubmarineError::InvalidProof("proof carries unused trailing nodes"));
    }
    debug!(depth = consumed, found = !value.is_empty(), "trie proof resolved");
    Ok((!value.is_empty()).then(|| value.to_vec()))
}

fn undecodable(_: SubmarineError) -> SubmarineError {
    SubmarineError::InvalidProof("undecodable trie node")
}

fn to_nibbles(key: &[u8]) -> Vec<u8> {
    key.iter().flat_map(|b| [b >> 4, b & 0x0f]).collect()
}

/// Returns `(is_leaf, path nibbles)`.
fn decode_hex_prefix(encoded: &[u8]) -> Result<(bool, Vec<u8>)> {
    let first = *encoded
        .first()
        .ok_or(SubmarineError::InvalidProof("empty hex-prefix path"))?;
    let flag = first >> 4;
    if flag > 3 {
        return Err(SubmarineError::InvalidProof("hex-prefix flag out of range"));
    }
    let is_leaf = flag & 0x2 != 0;
    let is_odd = flag & 0x1 != 0;

    let mut nibbles = Vec::with_capacity(encoded.len() * 2);
    if is_odd {
        nibbles.push(first & 0x0f);
    } else if first & 0x0f != 0 {
        return Err(SubmarineError::InvalidProof("even hex-prefix path has a non-zero pad nibble"));
    }
    nibbles.extend(to_nibbles(&encoded[1..]));
    Ok((is_leaf, nibbles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rlp::{encode_bytes, encode_list};
    use crate::test_utils::TestTrie;

    fn puppy_trie() -> TestTrie {
        let mut trie = TestTrie::new();
        trie.insert(b"doe", b"reindeer".to_vec());
        trie.insert(b"dog", b"puppy".to_vec());
        trie.insert(b"dogglesworth", b"cat".to_vec());
        trie
    }

    fn tx_trie(count: u64) -> TestTrie {
        let mut trie = TestTrie::new();
        for i in 0..count {
            trie.insert(&transaction_key(i), format!("transaction number {:04} with padding", i).into_bytes());
        }
        trie
    }

    // ====== Inclusion Tests ======

    #[test]
    fn test_known_root() {
        assert_eq!(
            puppy_trie().root().to_string(),
            "0x8aad789dff2f538bca5d8ea56e8abe10f4c7ba3a5dea95fea4cd6e7c3a1168d3"
        );
    }

    #[test]
    fn test_proves_every_key() {
        let trie = puppy_trie();
        let expected: [(&[u8], &[u8]); 3] =
            [(b"doe", b"reindeer"), (b"dog", b"puppy"), (b"dogglesworth", b"cat")];
        for (key, value) in expected {
            let proof = trie.proof(key);
            assert_eq!(verify_proof(&trie.root(), key, &proof).unwrap(), Some(value.to_vec()));
        }
    }

    #[test]
    fn test_transaction_trie_inclusion() {
        let trie = tx_trie(200);
        for index in [0u64, 1, 15, 127, 128, 199] {
            let key = transaction_key(index);
            let proof = trie.proof(&key);
            let value = verify_proof(&trie.root(), &key, &proof).unwrap();
            assert_eq!(value, Some(format!("transaction number {:04} with padding", index).into_bytes()));
        }
    }

    #[test]
    fn test_inline_nodes_are_walked() {
        let mut trie = TestTrie::new();
        trie.insert(&[0x01], b"a".to_vec());
        trie.insert(&[0x02], b"b".to_vec());
        let proof = trie.proof(&[0x02]);
        // everything below the root fits inline
        assert_eq!(proof.len(), 1);
        assert_eq!(verify_proof(&trie.root(), &[0x02], &proof).unwrap(), Some(b"b".to_vec()));
    }

    // ====== Absence Tests ======

    #[test]
    fn test_empty_trie_absence() {
        assert_eq!(verify_proof(&EMPTY_TRIE_ROOT, &transaction_key(0), &[]).unwrap(), None);
        assert!(verify_proof(&H256([1; 32]), &transaction_key(0), &[]).is_err());
    }

    #[test]
    fn test_absence_via_empty_branch_slot() {
        let trie = tx_trie(3);
        let key = transaction_key(9);
        let proof = trie.proof(&key);
        assert_eq!(verify_proof(&trie.root(), &key, &proof).unwrap(), None);
    }

    #[test]
    fn test_absence_via_leaf_divergence() {
        let trie = puppy_trie();
        let proof = trie.proof(b"doggle");
        assert_eq!(verify_proof(&trie.root(), b"doggle", &proof).unwrap(), None);
    }

    // ====== Rejection Tests ======

    #[test]
    fn test_wrong_root_rejected() {
        let trie = tx_trie(20);
        let key = transaction_key(5);
        let proof = trie.proof(&key);
        assert!(matches!(
            verify_proof(&H256([0xee; 32]), &key, &proof),
            Err(SubmarineError::InvalidProof(_))
        ));
    }

    #[test]
    fn test_tampered_node_rejected() {
        let trie = tx_trie(20);
        let key = transaction_key(5);
        let mut proof = trie.proof(&key);
        assert!(proof.len() >= 2);
        let last = proof.len() - 1;
        let end = proof[last].len() - 1;
        proof[last][end] ^= 0x01;
        assert!(matches!(
            verify_proof(&trie.root(), &key, &proof),
            Err(SubmarineError::InvalidProof(_))
        ));
    }

    #[test]
    fn test_truncated_and_padded_proofs_rejected() {
        let trie = tx_trie(20);
        let key = transaction_key(5);
        let proof = trie.proof(&key);

        let truncated = &proof[..proof.len() - 1];
        assert!(matches!(
            verify_proof(&trie.root(), &key, truncated),
            Err(SubmarineError::InvalidProof(_))
        ));

        let mut padded = proof.clone();
        padded.push(encode_list(&[encode_bytes(b"junk"), encode_bytes(b"node")]));
        assert!(matches!(
            verify_proof(&trie.root(), &key, &padded),
            Err(SubmarineError::InvalidProof(_))
        ));
    }

    #[test]
    fn test_bad_node_shapes_rejected() {
        // three-item node
        let node = encode_list(&[encode_bytes(b"a"), encode_bytes(b"b"), encode_bytes(b"c")]);
        let root = keccak256(&node);
        assert!(verify_proof(&root, b"a", &[node]).is_err());

        // not a list at all
        let node = encode_bytes(b"just a string");
        let root = keccak256(&node);
        assert!(verify_proof(&root, b"a", &[node]).is_err());

        // branch child reference of 5 bytes
        let mut slots = vec![encode_bytes(&[]); 17];
        slots[0] = encode_bytes(&[1, 2, 3, 4, 5]);
        let node = encode_list(&slots);
        let root = keccak256(&node);
        assert!(verify_proof(&root, &[0x00], &[node]).is_err());
    }

    /// A root branch whose slot 1 holds the leaf for key `0x12` inline.
    fn branch_with_inline_leaf(value: &[u8]) -> Vec<u8> {
        let leaf = encode_list(&[encode_bytes(&[0x32]), encode_bytes(value)]);
        let mut slots = vec![encode_bytes(&[]); 17];
        slots[1] = leaf;
        encode_list(&slots)
    }

    #[test]
    fn test_inline_node_size_limit() {
        let small = branch_with_inline_leaf(b"short value");
        assert_eq!(verify_proof(&keccak256(&small), &[0x12], &[small.clone()]).unwrap(), Some(b"short value".to_vec()));

        // 40-byte value makes the leaf too large to be embedded
        let large = branch_with_inline_leaf(&[0x55; 40]);
        assert_eq!(
            verify_proof(&keccak256(&large), &[0x12], &[large]),
            Err(SubmarineError::InvalidProof("inline node of 32 bytes or more must be hashed"))
        );
    }

    #[test]
    fn test_hex_prefix_rules() {
        assert_eq!(decode_hex_prefix(&[0x20, 0xab]).unwrap(), (true, vec![0xa, 0xb]));
        assert_eq!(decode_hex_prefix(&[0x3c, 0xab]).unwrap(), (true, vec![0xc, 0xa, 0xb]));
        assert_eq!(decode_hex_prefix(&[0x00]).unwrap(), (false, vec![]));
        assert_eq!(decode_hex_prefix(&[0x15]).unwrap(), (false, vec![0x5]));
        assert!(decode_hex_prefix(&[0x25, 0xab]).is_err());
        assert!(decode_hex_prefix(&[0x40]).is_err());
        assert!(decode_hex_prefix(&[]).is_err());
    }
}
