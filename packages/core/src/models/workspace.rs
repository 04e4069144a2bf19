//! Workspace and User Identities
//!
//! Authentication and session issuance are external collaborators; the
//! boundary layer resolves an authenticated user and workspace per request
//! and threads them explicitly through every service call. There is no
//! ambient "current user" state anywhere in the core.

use serde::{Deserialize, Serialize};

/// An authenticated user identity, as resolved by the boundary layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The tenant boundary; every space and page belongs to one workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl Workspace {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
