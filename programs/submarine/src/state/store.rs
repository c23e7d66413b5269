//! Session storage
//!
//! Sessions are created lazily on first touch. `remove` only exists so the
//! engine can undo a write whose side effect then failed.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::{Result, SubmarineError};
use crate::state::Session;
use crate::types::CommitId;

pub trait SessionStore {
    fn get(&self, commit_id: &CommitId) -> Option<Session>;

    fn put(&mut self, commit_id: CommitId, session: Session) -> Result<()>;

    fn remove(&mut self, commit_id: &CommitId) -> Result<()>;
}

/// Ordered in-memory store with a borsh snapshot format:
/// `u32 count ‖ (commit_id (32) ‖ session (34))*`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemorySessionStore {
    sessions: BTreeMap<CommitId, Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CommitId, &Session)> {
        self.sessions.iter()
    }

    pub fn snapshot(&self) -> Result<Vec<u8>> {
        self.sessions
            .try_to_vec()
            .map_err(|e| SubmarineError::Storage(e.to_string()))
    }

    pub fn restore(bytes: &[u8]) -> Result<Self> {
        let sessions = BTreeMap::<CommitId, Session>::try_from_slice(bytes)
            .map_err(|e| SubmarineError::Storage(e.to_string()))?;
        Ok(Self { sessions })
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, commit_id: &CommitId) -> Option<Session> {
        self.sessions.get(commit_id).copied()
    }

    fn put(&mut self, commit_id: CommitId, session: Session) -> Result<()> {
        self.sessions.insert(commit_id, session);
        Ok(())
    }

    fn remove(&mut self, commit_id: &CommitId) -> Result<()> {
        self.sessions.remove(commit_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::H256;

    #[test]
    fn test_snapshot_layout_and_restore() {
        let mut store = MemorySessionStore::new();
        store.put(H256([1; 32]), Session { revealed: true, revealed_amount: 5, ..Session::default() }).unwrap();
        store.put(H256([2; 32]), Session { unlocked: true, unlocked_amount: 9, ..Session::default() }).unwrap();

        let bytes = store.snapshot().unwrap();
        assert_eq!(bytes.len(), 4 + 2 * (32 + Session::SIZE));

        let restored = MemorySessionStore::restore(&bytes).unwrap();
        assert_eq!(restored, store);
        assert_eq!(restored.get(&H256([2; 32])).unwrap().unlocked_amount, 9);
    }

    #[test]
    fn test_restore_rejects_truncated_snapshot() {
        let mut store = MemorySessionStore::new();
        store.put(H256([1; 32]), Session::default()).unwrap();
        let bytes = store.snapshot().unwrap();
        assert!(matches!(
            MemorySessionStore::restore(&bytes[..bytes.len() - 1]),
            Err(SubmarineError::Storage(_))
        ));
    }

    #[test]
    fn test_missing_session_is_none() {
        assert!(MemorySessionStore::new().get(&H256([3; 32])).is_none());
    }
}
