//! PageStore Trait - Repository Abstraction Layer
//!
//! This module defines the `PageStore` trait that abstracts persistence for
//! pages, spaces, sync bindings, and history. The trait is the repository
//! contract of the hierarchy core: the storage engine behind it is an
//! external collaborator, and the in-memory implementation in
//! [`crate::db::MemoryStore`] stands behind the same contract for tests and
//! development.
//!
//! # Design Decisions
//!
//! 1. **Async-first**: all methods are async so embedded and networked
//!    backends fit the same contract
//! 2. **Atomic subtree transitions**: the bulk methods (`trash_pages`,
//!    `restore_pages`, `delete_pages`, `move_subtree_to_space`,
//!    `insert_pages`) each execute inside one logical transaction — every
//!    affected row reaches its new state or none does. Callers collect the
//!    full affected id set first and hand it over in one call; the store
//!    never sees a half-built worklist
//! 3. **Conflict reporting**: a lost commit race surfaces as
//!    [`StoreError::Conflict`], the one error class the service retries

use crate::models::{
    Page, PageHistory, Paginated, PaginationOptions, Space, SpaceMember, SpaceRole, SyncBinding,
};
use crate::db::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Abstraction layer for page-tree persistence
///
/// Implementations must be `Send + Sync`; services hold them behind
/// `Arc<dyn PageStore>` and may issue reads concurrently.
#[async_trait]
pub trait PageStore: Send + Sync {
    //
    // PAGE CRUD
    //

    /// Insert a new page row. Fails with `DuplicateId` if the id exists.
    async fn insert_page(&self, page: Page) -> Result<Page, StoreError>;

    /// Fetch a page by id, trashed or live. `Ok(None)` when absent.
    async fn find_page_by_id(&self, id: &str) -> Result<Option<Page>, StoreError>;

    /// Replace an existing page row. Fails with `Conflict` if the row
    /// vanished since it was read.
    async fn save_page(&self, page: Page) -> Result<Page, StoreError>;

    //
    // TREE READS
    //

    /// Live children of `parent_page_id` (or the space roots when `None`),
    /// ordered by position.
    async fn find_children(
        &self,
        space_id: &str,
        parent_page_id: Option<&str>,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, StoreError>;

    /// Every live child of `parent_page_id` (or the space roots), ordered
    /// by position, without a pagination window. Used for sibling index
    /// translation during moves.
    async fn find_all_children(
        &self,
        space_id: &str,
        parent_page_id: Option<&str>,
    ) -> Result<Vec<Page>, StoreError>;

    /// Every transitive descendant of `page_id`, trashed or live, NOT
    /// including the page itself. Collected iteratively (worklist), so
    /// arbitrarily deep subtrees cannot overflow the stack.
    async fn find_descendants(&self, page_id: &str) -> Result<Vec<Page>, StoreError>;

    /// Ancestor chain of `page_id`, root first, including the page itself
    /// as the last element.
    async fn find_ancestors(&self, page_id: &str) -> Result<Vec<Page>, StoreError>;

    /// Highest position key among live siblings, if any
    async fn max_sibling_position(
        &self,
        space_id: &str,
        parent_page_id: Option<&str>,
    ) -> Result<Option<f64>, StoreError>;

    //
    // LISTINGS
    //

    /// Live pages of a space, oldest first
    async fn find_pages_in_space(
        &self,
        space_id: &str,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, StoreError>;

    /// Live pages of a space, most recently updated first
    async fn find_recent_in_space(
        &self,
        space_id: &str,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, StoreError>;

    /// Live pages across `space_ids` the user created or contributed to,
    /// most recently updated first
    async fn find_recent_for_user(
        &self,
        user_id: &str,
        space_ids: &[String],
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, StoreError>;

    /// Trashed pages of a space, most recently trashed first
    async fn find_trashed_in_space(
        &self,
        space_id: &str,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, StoreError>;

    //
    // ATOMIC SUBTREE TRANSITIONS
    //

    /// Set `deleted_at` on every listed page
    async fn trash_pages(&self, ids: &[String], deleted_at: DateTime<Utc>)
        -> Result<(), StoreError>;

    /// Clear `deleted_at` on every listed page
    async fn restore_pages(&self, ids: &[String]) -> Result<(), StoreError>;

    /// Permanently remove every listed page, dropping any sync binding
    /// whose reference or origin is among them
    async fn delete_pages(&self, ids: &[String]) -> Result<(), StoreError>;

    /// Rewrite `space_id` on every listed page; the subtree root `root_id`
    /// additionally gets `dest_parent_id` and `root_position`
    async fn move_subtree_to_space(
        &self,
        root_id: &str,
        ids: &[String],
        dest_space_id: &str,
        dest_parent_id: Option<&str>,
        root_position: f64,
    ) -> Result<(), StoreError>;

    /// Insert a cloned subtree. Fails whole with `DuplicateId` if any id
    /// collides; no partial insert.
    async fn insert_pages(&self, pages: Vec<Page>) -> Result<(), StoreError>;

    /// Reparent/reorder a single page within its space
    async fn reparent_page(
        &self,
        page_id: &str,
        new_parent_id: Option<&str>,
        position: f64,
    ) -> Result<(), StoreError>;

    //
    // SYNC BINDINGS
    //

    async fn insert_sync_binding(&self, binding: SyncBinding) -> Result<(), StoreError>;

    /// Binding keyed by the reference page id
    async fn find_sync_binding(
        &self,
        reference_page_id: &str,
    ) -> Result<Option<SyncBinding>, StoreError>;

    /// All bindings whose origin is `origin_page_id`
    async fn find_bindings_for_origin(
        &self,
        origin_page_id: &str,
    ) -> Result<Vec<SyncBinding>, StoreError>;

    //
    // SPACES & MEMBERSHIP
    //

    async fn insert_space(&self, space: Space) -> Result<Space, StoreError>;

    async fn find_space(&self, space_id: &str) -> Result<Option<Space>, StoreError>;

    async fn add_space_member(&self, member: SpaceMember) -> Result<(), StoreError>;

    /// Role of `user_id` in `space_id`; `Ok(None)` when not a member.
    /// Read freshly for every capability grant — never cached.
    async fn find_member_role(
        &self,
        space_id: &str,
        user_id: &str,
    ) -> Result<Option<SpaceRole>, StoreError>;

    /// Ids of every space the user is a member of
    async fn find_space_ids_for_user(&self, user_id: &str) -> Result<Vec<String>, StoreError>;

    //
    // HISTORY
    //

    async fn insert_history(&self, history: PageHistory) -> Result<(), StoreError>;

    async fn find_history_by_id(
        &self,
        history_id: &str,
    ) -> Result<Option<PageHistory>, StoreError>;

    /// Snapshots for a page, newest first
    async fn find_history_for_page(
        &self,
        page_id: &str,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<PageHistory>, StoreError>;
}
