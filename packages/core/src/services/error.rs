//! Service Layer Error Types
//!
//! This module defines the domain error taxonomy for hierarchy and
//! synchronization operations. Every variant is raised at the point of
//! detection and propagates unchanged to the boundary layer; nothing is
//! swallowed or downgraded on the way out.
//!
//! `Forbidden` is deliberately opaque: it carries no indication of which
//! check failed or whether the subject exists, so a caller cannot enumerate
//! spaces they are not a member of.

use crate::db::StoreError;
use crate::models::ValidationError;
use thiserror::Error;

/// Page service operation errors
#[derive(Error, Debug)]
pub enum PageServiceError {
    /// Referenced page does not exist
    #[error("Page not found: {id}")]
    PageNotFound { id: String },

    /// Referenced space does not exist
    #[error("Space not found: {id}")]
    SpaceNotFound { id: String },

    /// Referenced history snapshot does not exist
    #[error("Page history not found: {id}")]
    HistoryNotFound { id: String },

    /// Capability grant denies the action; intentionally detail-free
    #[error("Forbidden")]
    Forbidden,

    /// Parent reference is missing, trashed, or in the wrong space
    #[error("Invalid parent page: {parent_id}")]
    InvalidParent { parent_id: String },

    /// Structural move rejected; message names the violated invariant
    #[error("Invalid move: {context}")]
    InvalidMove { context: String },

    /// Cross-space operation targeting the page's current space
    #[error("Page is already in space {space_id}")]
    AlreadyInSpace { space_id: String },

    /// Sync page creation rejected; message names the violated invariant
    #[error("Invalid sync target: {context}")]
    InvalidSyncTarget { context: String },

    /// Sync creation pointed at an origin id that does not resolve
    #[error("Origin page not found: {id}")]
    OriginNotFound { id: String },

    /// A synced page's origin is gone — dangling pointer, data corruption.
    /// Surfaced as-is, never silently defaulted.
    #[error("Origin page missing for synced page {reference_id}")]
    OriginMissing { reference_id: String },

    /// Input validation failed
    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Repository operation failed
    #[error("Storage operation failed: {0}")]
    Store(#[from] StoreError),
}

impl PageServiceError {
    /// Create a page not found error
    pub fn page_not_found(id: impl Into<String>) -> Self {
        Self::PageNotFound { id: id.into() }
    }

    /// Create a space not found error
    pub fn space_not_found(id: impl Into<String>) -> Self {
        Self::SpaceNotFound { id: id.into() }
    }

    /// Create a history not found error
    pub fn history_not_found(id: impl Into<String>) -> Self {
        Self::HistoryNotFound { id: id.into() }
    }

    /// Create an invalid parent error
    pub fn invalid_parent(parent_id: impl Into<String>) -> Self {
        Self::InvalidParent {
            parent_id: parent_id.into(),
        }
    }

    /// Create an invalid move error
    pub fn invalid_move(context: impl Into<String>) -> Self {
        Self::InvalidMove {
            context: context.into(),
        }
    }

    /// Create an already-in-space error
    pub fn already_in_space(space_id: impl Into<String>) -> Self {
        Self::AlreadyInSpace {
            space_id: space_id.into(),
        }
    }

    /// Create an invalid sync target error
    pub fn invalid_sync_target(context: impl Into<String>) -> Self {
        Self::InvalidSyncTarget {
            context: context.into(),
        }
    }

    /// Create an origin not found error
    pub fn origin_not_found(id: impl Into<String>) -> Self {
        Self::OriginNotFound { id: id.into() }
    }

    /// Create an origin missing error
    pub fn origin_missing(reference_id: impl Into<String>) -> Self {
        Self::OriginMissing {
            reference_id: reference_id.into(),
        }
    }

    /// Whether this error is a lost commit race eligible for a bounded,
    /// whole-operation retry
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Store(StoreError::Conflict { .. }))
    }
}
