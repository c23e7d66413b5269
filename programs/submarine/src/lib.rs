//! Submarine sends
//!
//! A commit-reveal transfer protocol. The sender first pays a one-time
//! address that hides the real target, later proves the payment with a
//! Merkle-Patricia inclusion proof, and finally sweeps the funds into the
//! target together with the promised payload.
//!
//! ## Flow
//!
//! 1. COMMIT: [`crypto::derive`] gives the commitment id, the one-time
//!    address `B` and the unsigned unlock transaction; the sender pays `B`
//! 2. REVEAL: [`Submarine::reveal`] checks the commit transaction against a
//!    block hash the ledger vouches for
//! 3. UNLOCK: [`Submarine::unlock`] records the sweep and forwards the funds
//!
//! Reveal and unlock may land in either order. A commitment is finished
//! once both have been recorded.

pub mod block;
pub mod config;
pub mod crypto;
pub mod engine;
pub mod error;
pub mod instructions;
pub mod ledger;
pub mod proof_blob;
pub mod rlp;
pub mod state;
pub mod transaction;
pub mod trie;
pub mod types;

pub use block::BlockHeader;
pub use config::{SubmarineConfig, SweepPolicy};
pub use crypto::{derive, CommitParams, Commitment};
pub use engine::Submarine;
pub use error::{Result, SubmarineError};
pub use instructions::{RevealRequest, UnlockCall};
pub use ledger::{ChainView, FundsForwarder, NoopForwarder, SessionObserver, SubmarineEvent};
pub use proof_blob::ProofBlob;
pub use state::{MemorySessionStore, Session, SessionStore};
pub use transaction::{sign_transaction, SignedTransaction, UnsignedTransaction};
pub use types::{Address, CommitId, Witness, H256};

#[cfg(test)]
mod test_utils;
