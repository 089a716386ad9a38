//! Error types for LedgerChain

use thiserror::Error;

/// Errors surfaced by transaction application, block validation and the
/// submission surface. All variants are local and recoverable: a rejected
/// transaction or block never corrupts shared state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("unknown sender account {0}")]
    UnknownSender(String),

    #[error("nonce mismatch for {address}: expected {expected}, got {got}")]
    NonceMismatch {
        address: String,
        expected: u64,
        got: u64,
    },

    #[error("insufficient balance for {address}: requested {requested}, available {available}")]
    InsufficientBalance {
        address: String,
        requested: u64,
        available: u64,
    },

    #[error("contract creation requires non-empty code")]
    MissingContractCode,

    #[error("unknown or invalid parent block {0}")]
    UnknownOrInvalidParent(String),

    #[error("end state signature mismatch: derived {derived}, committed {committed}")]
    StateSignatureMismatch { derived: String, committed: String },

    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("block rejected by {validator}: {reason}")]
    PolicyRejected {
        validator: &'static str,
        reason: String,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("config error: {0}")]
    Config(String),
}

impl From<Box<bincode::ErrorKind>> for ChainError {
    fn from(err: Box<bincode::ErrorKind>) -> Self {
        ChainError::Serialization(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
