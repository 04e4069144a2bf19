//! Domain Events
//!
//! This module defines the domain events emitted by the page hierarchy
//! service when data changes. Events follow the observer pattern: other
//! parts of the system (boundary layer, collaboration transports) subscribe
//! without coupling to the service implementation.
//!
//! # Architecture
//!
//! Events are emitted on a tokio broadcast channel, allowing multiple
//! subscribers to receive notifications asynchronously. Subtree-wide
//! transitions carry the full affected id set so observers never have to
//! re-derive which rows changed.

use crate::models::Page;

/// Domain events emitted by the page hierarchy service
///
/// These represent domain-level changes, not storage operations.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A new page was created
    PageCreated(Page),

    /// A page's content/title/icon changed (for synced references, the
    /// carried page is the origin the write was redirected to)
    PageUpdated(Page),

    /// A subtree was soft-deleted into the trash
    PagesTrashed { root_id: String, page_ids: Vec<String> },

    /// A previously-trashed subtree was restored
    PagesRestored { root_id: String, page_ids: Vec<String> },

    /// A subtree was permanently deleted
    PagesDeleted { root_id: String, page_ids: Vec<String> },

    /// A page was reparented or reordered within its space
    PageMoved {
        page_id: String,
        parent_page_id: Option<String>,
        position: f64,
    },

    /// A subtree migrated to another space
    SubtreeMovedToSpace {
        root_id: String,
        space_id: String,
        page_ids: Vec<String>,
    },

    /// A subtree was cloned into another space
    SubtreeCopiedToSpace {
        source_root_id: String,
        new_root_id: String,
        space_id: String,
    },

    /// A synced reference page was created
    SyncPageCreated(Page),
}

impl DomainEvent {
    /// Get a string representation of the event type, for logging and
    /// debugging subscribers
    pub fn event_type(&self) -> &str {
        match self {
            DomainEvent::PageCreated(_) => "page:created",
            DomainEvent::PageUpdated(_) => "page:updated",
            DomainEvent::PagesTrashed { .. } => "page:trashed",
            DomainEvent::PagesRestored { .. } => "page:restored",
            DomainEvent::PagesDeleted { .. } => "page:deleted",
            DomainEvent::PageMoved { .. } => "page:moved",
            DomainEvent::SubtreeMovedToSpace { .. } => "page:moved-to-space",
            DomainEvent::SubtreeCopiedToSpace { .. } => "page:copied-to-space",
            DomainEvent::SyncPageCreated(_) => "page:sync-created",
        }
    }
}
