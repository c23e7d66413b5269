//! Fixtures shared by unit and scenario tests: an in-memory trie that can
//! produce proofs, a scripted chain, and recording collaborators.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::block::BlockHeader;
use crate::crypto::hash::{keccak256, EMPTY_TRIE_ROOT};
use crate::error::{self, SubmarineError};
use crate::ledger::{ChainView, FundsForwarder, SessionObserver, SubmarineEvent};
use crate::proof_blob::ProofBlob;
use crate::rlp::{encode_bytes, encode_list};
use crate::state::{MemorySessionStore, Session, SessionStore};
use crate::trie::transaction_key;
use crate::types::{CommitId, H256};

type Entry = (Vec<u8>, Vec<u8>);

/// Builds canonical trie nodes on demand. Not efficient, only exact.
#[derive(Default)]
pub struct TestTrie {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl TestTrie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &[u8], value: Vec<u8>) {
        self.entries.insert(nibbles(key), value);
    }

    pub fn root(&self) -> H256 {
        if self.entries.is_empty() {
            return EMPTY_TRIE_ROOT;
        }
        keccak256(&node_rlp(&self.sorted()))
    }

    /// Root first, then every hash-referenced node on the way to `key`.
    pub fn proof(&self, key: &[u8]) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        if !self.entries.is_empty() {
            collect_proof(&self.sorted(), &nibbles(key), true, &mut out);
        }
        out
    }

    fn sorted(&self) -> Vec<Entry> {
        self.entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

fn nibbles(key: &[u8]) -> Vec<u8> {
    key.iter().flat_map(|b| [b >> 4, b & 0x0f]).collect()
}

fn hex_prefix(path: &[u8], leaf: bool) -> Vec<u8> {
    let flag = if leaf { 2 } else { 0 };
    let mut out = Vec::new();
    let rest = if path.len() % 2 == 1 {
        out.push(((flag + 1) << 4) | path[0]);
        &path[1..]
    } else {
        out.push(flag << 4);
        path
    };
    out.extend(rest.chunks(2).map(|pair| (pair[0] << 4) | pair[1]));
    out
}

fn common_prefix_len(entries: &[Entry]) -> usize {
    let first = &entries[0].0;
    let mut len = 0;
    while len < first.len() && entries.iter().all(|(k, _)| k.len() > len && k[len] == first[len]) {
        len += 1;
    }
    len
}

fn strip(entries: &[Entry], count: usize) -> Vec<Entry> {
    entries.iter().map(|(k, v)| (k[count..].to_vec(), v.clone())).collect()
}

fn group(entries: &[Entry], nibble: u8) -> Vec<Entry> {
    entries
        .iter()
        .filter(|(k, _)| k.first() == Some(&nibble))
        .map(|(k, v)| (k[1..].to_vec(), v.clone()))
        .collect()
}

fn child_reference(node: &[u8]) -> Vec<u8> {
    if node.len() < 32 {
        node.to_vec()
    } else {
        encode_bytes(keccak256(node).as_bytes())
    }
}

fn node_rlp(entries: &[Entry]) -> Vec<u8> {
    if entries.len() == 1 {
        let (path, value) = &entries[0];
        return encode_list(&[encode_bytes(&hex_prefix(path, true)), encode_bytes(value)]);
    }
    let common = common_prefix_len(entries);
    if common > 0 {
        let child = node_rlp(&strip(entries, common));
        return encode_list(&[
            encode_bytes(&hex_prefix(&entries[0].0[..common], false)),
            child_reference(&child),
        ]);
    }
    let mut slots = vec![encode_bytes(&[]); 17];
    for nibble in 0..16u8 {
        let members = group(entries, nibble);
        if !members.is_empty() {
            slots[nibble as usize] = child_reference(&node_rlp(&members));
        }
    }
    if let Some((_, value)) = entries.iter().find(|(k, _)| k.is_empty()) {
        slots[16] = encode_bytes(value);
    }
    encode_list(&slots)
}

fn collect_proof(entries: &[Entry], key: &[u8], is_root: bool, out: &mut Vec<Vec<u8>>) {
    let node = node_rlp(entries);
    if is_root || node.len() >= 32 {
        out.push(node);
    }
    if entries.len() == 1 {
        return;
    }
    let common = common_prefix_len(entries);
    if common > 0 {
        if key.starts_with(&entries[0].0[..common]) {
            collect_proof(&strip(entries, common), &key[common..], false, out);
        }
        return;
    }
    if let Some(&nibble) = key.first() {
        let members = group(entries, nibble);
        if !members.is_empty() {
            collect_proof(&members, &key[1..], false, out);
        }
    }
}

/// A block holding `raw_txs` plus a proof blob for the one at `index`.
pub fn block_with_transactions(number: u64, raw_txs: &[Vec<u8>], index: u64) -> (BlockHeader, ProofBlob) {
    let mut trie = TestTrie::new();
    for (i, raw) in raw_txs.iter().enumerate() {
        trie.insert(&transaction_key(i as u64), raw.clone());
    }
    let header = BlockHeader {
        number,
        transactions_root: trie.root(),
        gas_limit: 8_000_000,
        timestamp: 1_530_000_000 + number * 15,
        ..BlockHeader::default()
    };
    let blob = ProofBlob {
        header: header.clone(),
        tx_index: index,
        nodes: trie.proof(&transaction_key(index)),
    };
    (header, blob)
}

/// Scripted ledger view.
#[derive(Default)]
pub struct TestChain {
    pub current: u64,
    pub hashes: HashMap<u64, H256>,
}

impl TestChain {
    pub fn at(current: u64) -> Self {
        Self { current, hashes: HashMap::new() }
    }

    pub fn add_block(&mut self, header: &BlockHeader) {
        self.hashes.insert(header.number, header.hash());
    }
}

impl ChainView for TestChain {
    fn current_block(&self) -> u64 {
        self.current
    }

    fn block_hash(&self, number: u64) -> Option<H256> {
        self.hashes.get(&number).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forwarded {
    pub commit_id: CommitId,
    pub amount: u128,
    pub embedded: Vec<u8>,
}

/// Records every forward; can be switched to fail.
#[derive(Default)]
pub struct RecordingForwarder {
    pub forwarded: Vec<Forwarded>,
    pub fail: bool,
}

impl FundsForwarder for RecordingForwarder {
    fn forward(&mut self, commit_id: &CommitId, amount: u128, embedded: &[u8]) -> Result<(), String> {
        if self.fail {
            return Err("target rejected the call".to_string());
        }
        self.forwarded.push(Forwarded { commit_id: *commit_id, amount, embedded: embedded.to_vec() });
        Ok(())
    }
}

/// Observer whose log stays readable after it is handed to the engine.
#[derive(Clone, Default)]
pub struct EventLog(pub Rc<RefCell<Vec<SubmarineEvent>>>);

impl EventLog {
    pub fn events(&self) -> Vec<SubmarineEvent> {
        self.0.borrow().clone()
    }
}

impl SessionObserver for EventLog {
    fn on_event(&mut self, event: &SubmarineEvent) {
        self.0.borrow_mut().push(event.clone());
    }
}

/// Memory store whose writes can be switched off.
#[derive(Default)]
pub struct FailingStore {
    pub inner: MemorySessionStore,
    pub fail_writes: bool,
}

impl SessionStore for FailingStore {
    fn get(&self, commit_id: &CommitId) -> Option<Session> {
        self.inner.get(commit_id)
    }

    fn put(&mut self, commit_id: CommitId, session: Session) -> error::Result<()> {
        if self.fail_writes {
            return Err(SubmarineError::Storage("disk full".to_string()));
        }
        self.inner.put(commit_id, session)
    }

    fn remove(&mut self, commit_id: &CommitId) -> error::Result<()> {
        self.inner.remove(commit_id)
    }
}
