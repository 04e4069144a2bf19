//! Space and Membership Models
//!
//! A space is the authorization and containment scope for a tree of pages.
//! Membership records bind a user to a role tier inside one space; the
//! capability engine in [`crate::auth`] turns a role into a grant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role tiers within a space, ordered from least to most capable.
///
/// Higher tiers are strict supersets of lower tiers for the same subject:
/// `Admin > Writer > Reader`. The derived `Ord` relies on declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceRole {
    /// Read-only access to the space's pages
    Reader,
    /// Can create and edit pages
    Writer,
    /// Full control, including trash/restore/permanent deletion and
    /// membership management
    Admin,
}

/// An authorization scope holding a tree of pages and a membership list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub workspace_id: String,
    pub created_at: DateTime<Utc>,
}

impl Space {
    pub fn new(name: String, slug: String, workspace_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            slug,
            workspace_id,
            created_at: Utc::now(),
        }
    }
}

/// A (user, role) membership record inside one space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceMember {
    pub space_id: String,
    pub user_id: String,
    pub role: SpaceRole,
    pub added_at: DateTime<Utc>,
}

impl SpaceMember {
    pub fn new(space_id: String, user_id: String, role: SpaceRole) -> Self {
        Self {
            space_id,
            user_id,
            role,
            added_at: Utc::now(),
        }
    }
}
