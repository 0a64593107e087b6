//! Ledger errors

use thiserror::Error;

use crate::transactions::{DataKey, Digest};

/// Error raised while admitting or resolving transactions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("transaction not found: {0}")]
    TxNotFound(Digest),

    #[error("data key not found: {0}")]
    DataKeyNotFound(DataKey),

    #[error("output {index} out of range for {tx} ({outputs} outputs)")]
    OutOfRange {
        tx: Digest,
        index: u32,
        outputs: usize,
    },

    #[error("not authorized to claim output {index} of {tx}")]
    NotAuthorized { tx: Digest, index: u32 },

    #[error("output {index} of {tx} already spent")]
    AlreadySpent { tx: Digest, index: u32 },

    #[error("storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Missing transaction or missing data key.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TxNotFound(_) | Self::DataKeyNotFound(_))
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
