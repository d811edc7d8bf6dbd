//! Error types for revmap core.

use crate::types::{KeyHash, MapId, Revision};
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in revmap core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Statement preparation or execution failed in the SQL engine.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// CBOR codec error on a leaf, signature or metadata payload.
    #[error("codec error: {0}")]
    Codec(#[from] revmap_codec::CodecError),

    /// An insert affected a different number of rows than expected.
    #[error("integrity violation: expected {expected} row(s) affected, got {actual}")]
    UnexpectedRowCount {
        /// Rows the statement should have affected.
        expected: usize,
        /// Rows it actually affected.
        actual: usize,
    },

    /// A signed root already exists at this revision.
    #[error("map {map_id} already has a signed root at {revision}")]
    RevisionConflict {
        /// The map being written.
        map_id: MapId,
        /// The contested revision.
        revision: Revision,
    },

    /// The key already has a leaf at this revision.
    #[error("leaf {key_hash} already written at {revision}")]
    DuplicateLeaf {
        /// The key hash written twice.
        key_hash: KeyHash,
        /// The write revision.
        revision: Revision,
    },

    /// Key hash length does not match the configured hash size.
    #[error("invalid key hash: expected {expected} bytes, got {actual}")]
    InvalidKeyHash {
        /// Configured hash size.
        expected: usize,
        /// Length of the supplied key hash.
        actual: usize,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates an unexpected row count error.
    pub fn unexpected_row_count(expected: usize, actual: usize) -> Self {
        Self::UnexpectedRowCount { expected, actual }
    }

    /// Creates an invalid key hash error.
    pub fn invalid_key_hash(actual: usize, expected: usize) -> Self {
        Self::InvalidKeyHash { expected, actual }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true if the error is a SQL unique or primary key violation.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::Storage(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }

    /// Returns true if the engine gave up waiting on another connection's
    /// lock, or refused to upgrade a read transaction whose snapshot is stale.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Storage(rusqlite::Error::SqliteFailure(err, _))
                if matches!(
                    err.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                )
        )
    }
}
