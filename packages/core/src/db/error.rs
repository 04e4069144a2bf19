//! Repository Error Types
//!
//! This module defines error types for repository operations. Domain-level
//! failures (not found, forbidden, invalid move) are handled by the service
//! layer; the store only reports storage-level outcomes.

use thiserror::Error;

/// Repository operation errors
///
/// `Conflict` is the one retryable class: it signals that a subtree
/// transaction failed to commit because of a concurrent modification of the
/// same rows, and the whole operation may be retried a bounded number of
/// times by the caller.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A subtree transaction lost a commit race
    #[error("Concurrent modification: {context}")]
    Conflict { context: String },

    /// Insert with an id that already exists
    #[error("Duplicate id: {id}")]
    DuplicateId { id: String },

    /// Backend failure with context
    #[error("Storage operation failed: {0}")]
    Internal(String),
}

impl StoreError {
    /// Create a conflict error
    pub fn conflict(context: impl Into<String>) -> Self {
        Self::Conflict {
            context: context.into(),
        }
    }

    /// Create a duplicate id error
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    /// Create an internal error with context
    pub fn internal(context: impl Into<String>) -> Self {
        Self::Internal(context.into())
    }
}
