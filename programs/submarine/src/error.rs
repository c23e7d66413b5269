use thiserror::Error;

use crate::types::Address;

/// Intrinsic gas of a plain value transfer on the host ledger.
/// An unlock transaction with a lower gas limit could never be mined.
pub const INTRINSIC_TRANSFER_GAS: u64 = 21_000;

pub type Result<T> = std::result::Result<T, SubmarineError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmarineError {
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(&'static str),

    #[error("Invalid inclusion proof: {0}")]
    InvalidProof(&'static str),

    #[error("Commit block {commit_block} is outside the reveal window at block {current_block}")]
    StaleOrFutureBlock { commit_block: u64, current_block: u64 },

    #[error("Insufficient transfer - committed {transferred}, required {required}")]
    InsufficientTransfer { transferred: u128, required: u128 },

    #[error("Signature mismatch: {0}")]
    SignatureMismatch(&'static str),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(&'static str),

    #[error("Commit transaction pays {actual:?}, expected one-time address {expected}")]
    RecipientMismatch {
        expected: Address,
        actual: Option<Address>,
    },

    #[error("Sweep rejected - session already records {recorded}, sweep offers {offered}")]
    SweepRejected { recorded: u128, offered: u128 },

    #[error("Forwarding swept funds failed: {0}")]
    ForwardFailed(String),

    #[error("Session store error: {0}")]
    Storage(String),
}
