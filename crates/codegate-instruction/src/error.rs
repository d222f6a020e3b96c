//! Error types for the instruction lifecycle

use crate::status::InstructionStatus;
use codegate_store::StoreError;

/// Errors raised by instruction and manager operations
///
/// Not-found is never an error: lookup-style operations return
/// `Option`/`bool` so callers can branch without error handling.
#[derive(Debug, thiserror::Error)]
pub enum InstructionError {
    /// Requirements document failed to serialize
    #[error("requirements serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Content hashing failed
    #[error("content hash error: {0}")]
    Hash(#[from] crate::hash::HashError),

    /// Record store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Status string does not name a declared status
    #[error("invalid status: {0:?}")]
    InvalidStatus(String),

    /// Transition not present in the lifecycle table
    #[error("illegal transition: {from} -> {to}")]
    IllegalTransition {
        /// Current status
        from: InstructionStatus,
        /// Requested status
        to: InstructionStatus,
    },
}
