//! Page History Snapshots
//!
//! Immutable version snapshots written whenever a page's content is
//! updated. A snapshot records the state being superseded, so restoring
//! version N recovers the page as it was before update N+1 was applied.

use crate::models::page::{Page, PageBody};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One immutable version snapshot of a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageHistory {
    pub id: String,
    pub page_id: String,
    /// Space of the page at snapshot time; history reads are authorized
    /// against this, not the page's current space
    pub space_id: String,
    pub workspace_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub content: serde_json::Value,
    /// The page version this snapshot preserves
    pub version: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_by_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PageHistory {
    /// Snapshot the current state of `page`.
    ///
    /// Only standalone pages are snapshotted; reference pages never own
    /// content, and writes through them are redirected to the origin before
    /// any history is recorded.
    pub fn snapshot(page: &Page) -> Self {
        let content = match &page.body {
            PageBody::Standalone { content } => content.clone(),
            PageBody::Reference { .. } => serde_json::Value::Null,
        };

        Self {
            id: Uuid::new_v4().to_string(),
            page_id: page.id.clone(),
            space_id: page.space_id.clone(),
            workspace_id: page.workspace_id.clone(),
            title: page.title.clone(),
            icon: page.icon.clone(),
            content,
            version: page.version,
            last_updated_by_id: page.last_updated_by_id.clone(),
            created_at: Utc::now(),
        }
    }
}
