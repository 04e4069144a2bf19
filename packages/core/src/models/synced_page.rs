//! Synced Page Binding Records
//!
//! A binding pairs a reference page (the placement) with its origin page
//! (the source of truth for content, title, and icon). The reference's own
//! `PageBody::Reference` variant is authoritative for resolution; bindings
//! exist as the persisted index the repository exposes for reverse lookups
//! (which references point at a given origin) and for authorization
//! short-circuiting via `origin_space_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted reference/origin pair, keyed by the reference page id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncBinding {
    /// The placement node (`PageBody::Reference`)
    pub reference_page_id: String,
    /// The page holding the authoritative content
    pub origin_page_id: String,
    /// Space of the origin at binding time, kept for quick authorization
    /// short-circuiting without a second page fetch
    pub origin_space_id: String,
    pub created_at: DateTime<Utc>,
}

impl SyncBinding {
    pub fn new(
        reference_page_id: String,
        origin_page_id: String,
        origin_space_id: String,
    ) -> Self {
        Self {
            reference_page_id,
            origin_page_id,
            origin_space_id,
            created_at: Utc::now(),
        }
    }
}
