//! Page Data Structures
//!
//! This module defines the core `Page` struct and related types for the
//! Pagespace tree model.
//!
//! # Architecture
//!
//! - **Tree placement**: every page lives in exactly one space and points at
//!   an optional same-space parent; sibling order is a fractional `position`
//!   key
//! - **Tagged body**: a page is either `Standalone` (owns its content) or
//!   `Reference` (a synced placement whose content lives on an origin page);
//!   `is_synced()` is a pattern match, not a mutable flag
//! - **Soft delete**: `deleted_at` marks a page as trashed and restorable;
//!   permanent deletion removes the row entirely

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Default version value for serde deserialization (version 1)
fn default_version() -> i64 {
    1
}

/// Maximum accepted page title length, in characters
pub const MAX_TITLE_LEN: usize = 500;

/// Validation errors for Page operations
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid page ID format: {0}")]
    InvalidId(String),

    #[error("Title exceeds maximum length of {max} characters")]
    TitleTooLong { max: usize },

    #[error("Invalid parent reference: {0}")]
    InvalidParent(String),
}

/// Body of a page: either standalone content or a synced reference.
///
/// A `Reference` page is a placement-only node; its visible title, icon,
/// and content are resolved from the origin page at access time. The origin
/// of a reference is itself always `Standalone` (no transitive indirection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageBody {
    /// Page owns its content
    #[serde(rename = "standalone")]
    Standalone {
        /// Opaque rich-document payload
        content: serde_json::Value,
    },
    /// Synced placement pointing at an origin page elsewhere in the tree
    #[serde(rename = "reference")]
    Reference {
        /// Id of the page holding the authoritative content
        origin_page_id: String,
    },
}

/// A node in a per-space page tree.
///
/// # Fields
///
/// - `id`: stable unique identifier (UUID)
/// - `slug_id`: URL-safe identifier, stable across renames
/// - `title` / `icon` / `body`: content; meaningless on `Reference` pages,
///   which resolve these from their origin
/// - `space_id` / `parent_page_id` / `position`: tree placement; a `None`
///   parent means the page is a root of its space
/// - `contributor_ids`: users who have edited the page
/// - `deleted_at`: `None` = live, `Some` = in trash (restorable)
/// - `version`: bumped on each update; history snapshots record the prior
///   version number
///
/// # Invariants
///
/// - a non-null `parent_page_id` always references a page in the same space
/// - the parent chain is acyclic; mutation only ever attaches to a validated
///   existing ancestor chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Stable unique identifier (UUID)
    pub id: String,

    /// URL-safe identifier, stable across renames
    pub slug_id: String,

    /// Page title (empty for untitled and for reference pages)
    pub title: String,

    /// Optional emoji/icon shortcode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Standalone content or synced reference
    pub body: PageBody,

    /// Owning space
    pub space_id: String,

    /// Owning workspace
    pub workspace_id: String,

    /// Same-space parent; `None` means root of the space
    pub parent_page_id: Option<String>,

    /// Fractional sibling ordering key
    pub position: f64,

    /// User who created the page
    pub creator_id: String,

    /// User who last edited the page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_by_id: Option<String>,

    /// Users who have edited the page
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contributor_ids: Vec<String>,

    /// Update counter; history snapshots record the superseded version
    #[serde(default = "default_version")]
    pub version: i64,

    /// Trash marker; `None` = live
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Page {
    /// Create a new standalone page with auto-generated id and slug.
    ///
    /// The caller supplies the placement (`space_id`, `parent_page_id`,
    /// `position`); parent/space consistency is validated at the service
    /// layer before insertion.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        title: String,
        icon: Option<String>,
        content: serde_json::Value,
        space_id: String,
        workspace_id: String,
        parent_page_id: Option<String>,
        position: f64,
        creator_id: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            slug_id: generate_slug_id(),
            title,
            icon,
            body: PageBody::Standalone { content },
            space_id,
            workspace_id,
            parent_page_id,
            position,
            last_updated_by_id: None,
            contributor_ids: vec![creator_id.clone()],
            creator_id,
            version: 1,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new reference (synced) page pointing at `origin_page_id`.
    ///
    /// Reference pages carry no content of their own; title and icon stay
    /// empty and are resolved from the origin on every read.
    pub fn new_reference(
        origin_page_id: String,
        space_id: String,
        workspace_id: String,
        parent_page_id: Option<String>,
        position: f64,
        creator_id: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            slug_id: generate_slug_id(),
            title: String::new(),
            icon: None,
            body: PageBody::Reference { origin_page_id },
            space_id,
            workspace_id,
            parent_page_id,
            position,
            last_updated_by_id: None,
            contributor_ids: vec![creator_id.clone()],
            creator_id,
            version: 1,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this page is a synced reference
    pub fn is_synced(&self) -> bool {
        matches!(self.body, PageBody::Reference { .. })
    }

    /// Whether this page is in the trash
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// The standalone content, if this page owns any
    pub fn content(&self) -> Option<&serde_json::Value> {
        match &self.body {
            PageBody::Standalone { content } => Some(content),
            PageBody::Reference { .. } => None,
        }
    }

    /// The origin page id, if this page is a synced reference
    pub fn origin_page_id(&self) -> Option<&str> {
        match &self.body {
            PageBody::Reference { origin_page_id } => Some(origin_page_id),
            PageBody::Standalone { .. } => None,
        }
    }
}

/// Generate a URL-safe slug identifier.
///
/// Slugs are stable for the lifetime of a page and survive renames; a fresh
/// one is minted for every created or cloned page.
pub fn generate_slug_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Contract test: documents the exact JSON format for PageBody.
    ///
    /// Serde's `#[serde(tag = "type")]` produces an internally-tagged format
    /// where the discriminator is merged with the variant fields (flat, not
    /// nested). API clients depend on this shape.
    #[test]
    fn test_page_body_serialization_contract() {
        let standalone = PageBody::Standalone {
            content: json!({"blocks": []}),
        };
        let parsed: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&standalone).unwrap()).unwrap();
        assert_eq!(parsed.get("type").unwrap(), "standalone");
        assert_eq!(parsed.get("content").unwrap(), &json!({"blocks": []}));

        let reference = PageBody::Reference {
            origin_page_id: "origin-123".to_string(),
        };
        let parsed: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&reference).unwrap()).unwrap();
        assert_eq!(parsed.get("type").unwrap(), "reference");
        assert_eq!(parsed.get("originPageId").unwrap(), "origin-123");
        assert!(parsed.get("reference").is_none(), "must not be nested");
    }

    #[test]
    fn test_new_page_is_standalone_and_live() {
        let page = Page::new(
            "Getting started".to_string(),
            Some("🚀".to_string()),
            json!({}),
            "space-1".to_string(),
            "ws-1".to_string(),
            None,
            1.0,
            "user-1".to_string(),
        );

        assert!(!page.is_synced());
        assert!(!page.is_trashed());
        assert_eq!(page.content(), Some(&json!({})));
        assert_eq!(page.contributor_ids, vec!["user-1".to_string()]);
        assert_eq!(page.version, 1);
        assert_eq!(page.slug_id.len(), 32);
    }

    #[test]
    fn test_reference_page_has_no_own_content() {
        let page = Page::new_reference(
            "origin-1".to_string(),
            "space-2".to_string(),
            "ws-1".to_string(),
            None,
            1.0,
            "user-1".to_string(),
        );

        assert!(page.is_synced());
        assert_eq!(page.content(), None);
        assert_eq!(page.origin_page_id(), Some("origin-1"));
        assert!(page.title.is_empty());
    }
}
