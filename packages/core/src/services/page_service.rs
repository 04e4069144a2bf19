//! Page Service - Hierarchy Operations
//!
//! This module provides the main business logic layer for page operations:
//!
//! - CRUD operations with capability checks before every storage touch
//! - Hierarchy management (move, cross-space move/copy, breadcrumbs)
//! - Trash lifecycle (soft delete, restore, permanent delete) applied to
//!   whole subtrees atomically
//! - Listings with synced-page resolution
//!
//! # Authorization
//!
//! Every operation takes the acting [`User`] explicitly and computes a fresh
//! [`CapabilityGrant`] from a membership read at the moment of mutation —
//! never from an earlier request. Cross-space operations evaluate the grants
//! for both spaces before any write begins; if either denies, nothing is
//! written.
//!
//! # Subtree transitions
//!
//! Subtree-wide mutations collect the full affected id set first (the store
//! walks descendants with an iterative worklist), then apply the transition
//! in one atomic bulk call. A lost commit race (`StoreError::Conflict`)
//! retries the whole operation a bounded number of times; partial retry is
//! never attempted.

use crate::auth::{CapabilityGrant, SpaceAction, SpaceSubject};
use crate::db::events::DomainEvent;
use crate::db::{PageStore, PositionCalculator};
use crate::models::{
    Page, PageBody, PageHistory, Paginated, PaginationOptions, User, Workspace, ValidationError,
    MAX_TITLE_LEN,
};
use crate::models::generate_slug_id;
use crate::services::error::PageServiceError;
use crate::services::sync_service::{CreateSyncPageParams, SynchronizedPageService};
use chrono::Utc;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Broadcast channel capacity for domain events.
///
/// 128 provides headroom for burst operations (subtree transitions emit one
/// event carrying the whole id set, not one per row). Observer lag is
/// acceptable; subscribers track current state, not history.
const DOMAIN_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Bounded retries for subtree transactions that lose a commit race
const CONFLICT_RETRY_LIMIT: usize = 3;

// Regex pattern for UUID validation (lowercase hex, standard grouping)
const UUID_PATTERN: &str = r"^[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$";

/// Check whether a client-supplied page id is UUID-formatted.
///
/// Offline-first clients pre-generate page ids so optimistic UI state and
/// the server row agree; anything that is not a well-formed UUID is
/// rejected before it reaches storage.
pub fn is_valid_page_id(page_id: &str) -> bool {
    static UUID_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = UUID_REGEX.get_or_init(|| {
        Regex::new(UUID_PATTERN).unwrap_or_else(|e| panic!("invalid UUID pattern: {e}"))
    });
    regex.is_match(page_id)
}

/// Parameters for creating a page
#[derive(Debug, Clone, Default)]
pub struct CreatePageParams {
    /// Optional client-supplied UUID; `None` means server-side generation
    pub page_id: Option<String>,
    /// Target space
    pub space_id: String,
    /// Optional same-space parent; `None` creates a space root
    pub parent_page_id: Option<String>,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub content: Option<Value>,
}

/// Parameters for updating a page's content, title, or icon
#[derive(Debug, Clone)]
pub struct UpdatePageParams {
    pub page_id: String,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub content: Option<Value>,
}

/// Parameters for an intra-space reparent/reorder
#[derive(Debug, Clone)]
pub struct MovePageParams {
    pub page_id: String,
    /// New parent; `None` moves the page to the space root level
    pub parent_page_id: Option<String>,
    /// Target index among the new siblings; `None` appends after the last
    pub index: Option<usize>,
}

/// Orchestrates page hierarchy operations against the repository contract
pub struct PageService {
    store: Arc<dyn PageStore>,
    resolver: SynchronizedPageService,
    event_tx: broadcast::Sender<DomainEvent>,
}

impl PageService {
    pub fn new(store: Arc<dyn PageStore>) -> Self {
        let (event_tx, _) = broadcast::channel(DOMAIN_EVENT_CHANNEL_CAPACITY);
        Self {
            resolver: SynchronizedPageService::new(store.clone()),
            store,
            event_tx,
        }
    }

    /// The underlying repository
    pub fn store(&self) -> &Arc<dyn PageStore> {
        &self.store
    }

    /// The sync indirection resolver
    pub fn resolver(&self) -> &SynchronizedPageService {
        &self.resolver
    }

    /// Subscribe to domain events emitted by this service
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    //
    // READS
    //

    /// Fetch a page with sync indirection resolved.
    ///
    /// Requires Read/Page in the page's space. Trashed pages remain readable
    /// (trash previews).
    pub async fn get_page(&self, user: &User, page_id: &str) -> Result<Page, PageServiceError> {
        let page = self.find_required_page(page_id).await?;
        self.require(user, &page.space_id, SpaceAction::Read, SpaceSubject::Page)
            .await?;
        self.resolver.resolve_for_read(page).await
    }

    /// Live children of a space root or a given parent, sync-resolved.
    ///
    /// A supplied parent must belong to the listed space; mismatches are
    /// reported as an opaque `Forbidden` so space membership cannot be
    /// probed through the sidebar.
    pub async fn get_sidebar_pages(
        &self,
        user: &User,
        space_id: &str,
        parent_page_id: Option<&str>,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, PageServiceError> {
        self.require(user, space_id, SpaceAction::Read, SpaceSubject::Page)
            .await?;

        if let Some(parent_id) = parent_page_id {
            let parent = self.find_required_page(parent_id).await?;
            if parent.space_id != space_id {
                return Err(PageServiceError::Forbidden);
            }
        }

        let listing = self
            .store
            .find_children(space_id, parent_page_id, pagination)
            .await?;
        Ok(self.resolve_listing(listing).await)
    }

    /// All live pages of a space, oldest first, sync-resolved
    pub async fn get_pages_in_space(
        &self,
        user: &User,
        space_id: &str,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, PageServiceError> {
        self.require(user, space_id, SpaceAction::Read, SpaceSubject::Page)
            .await?;
        let listing = self.store.find_pages_in_space(space_id, pagination).await?;
        Ok(self.resolve_listing(listing).await)
    }

    /// Most recently updated live pages of one space
    pub async fn get_recent_space_pages(
        &self,
        user: &User,
        space_id: &str,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, PageServiceError> {
        self.require(user, space_id, SpaceAction::Read, SpaceSubject::Page)
            .await?;
        let listing = self.store.find_recent_in_space(space_id, pagination).await?;
        Ok(self.resolve_listing(listing).await)
    }

    /// Most recently updated pages the user touched, across every space
    /// they can read
    pub async fn get_recent_pages(
        &self,
        user: &User,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, PageServiceError> {
        let mut readable = Vec::new();
        for space_id in self.store.find_space_ids_for_user(&user.id).await? {
            let grant = self.grant_for(user, &space_id).await?;
            if grant.can(SpaceAction::Read, SpaceSubject::Page) {
                readable.push(space_id);
            }
        }

        let listing = self
            .store
            .find_recent_for_user(&user.id, &readable, pagination)
            .await?;
        Ok(self.resolve_listing(listing).await)
    }

    /// Trashed pages of a space, most recently trashed first.
    ///
    /// Rows are returned as stored; trash listings show placements, not
    /// resolved sync content.
    pub async fn get_deleted_space_pages(
        &self,
        user: &User,
        space_id: &str,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, PageServiceError> {
        self.require(user, space_id, SpaceAction::Read, SpaceSubject::Page)
            .await?;
        Ok(self.store.find_trashed_in_space(space_id, pagination).await?)
    }

    /// Ancestor chain of a page, root first, ending with the page itself.
    ///
    /// Synced rows resolve their title/icon from the origin; a dangling row
    /// stays in the chain unresolved so the structure is never broken.
    pub async fn get_breadcrumbs(
        &self,
        user: &User,
        page_id: &str,
    ) -> Result<Vec<Page>, PageServiceError> {
        let page = self.find_required_page(page_id).await?;
        self.require(user, &page.space_id, SpaceAction::Read, SpaceSubject::Page)
            .await?;

        let chain = self.store.find_ancestors(page_id).await?;
        let mut crumbs = Vec::with_capacity(chain.len());
        for entry in chain {
            if entry.is_synced() {
                match self.resolver.resolve_for_read(entry.clone()).await {
                    Ok(resolved) => crumbs.push(resolved),
                    Err(_) => crumbs.push(entry),
                }
            } else {
                crumbs.push(entry);
            }
        }
        Ok(crumbs)
    }

    //
    // MUTATIONS
    //

    /// Create a page.
    ///
    /// Requires Create/Page in the target space. A supplied parent must be
    /// live and belong to the same space. The new page is appended after
    /// the last existing sibling.
    pub async fn create(
        &self,
        user: &User,
        workspace: &Workspace,
        params: CreatePageParams,
    ) -> Result<Page, PageServiceError> {
        self.require(user, &params.space_id, SpaceAction::Create, SpaceSubject::Page)
            .await?;

        let title = params.title.unwrap_or_default();
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::TitleTooLong { max: MAX_TITLE_LEN }.into());
        }

        if let Some(parent_id) = &params.parent_page_id {
            self.store
                .find_page_by_id(parent_id)
                .await?
                .filter(|p| !p.is_trashed() && p.space_id == params.space_id)
                .ok_or_else(|| PageServiceError::invalid_parent(parent_id.as_str()))?;
        }

        let max_position = self
            .store
            .max_sibling_position(&params.space_id, params.parent_page_id.as_deref())
            .await?;
        let position = PositionCalculator::between(max_position, None);

        let mut page = Page::new(
            title,
            params.icon,
            params.content.unwrap_or_else(|| Value::Object(Default::default())),
            params.space_id,
            workspace.id.clone(),
            params.parent_page_id,
            position,
            user.id.clone(),
        );

        if let Some(id) = params.page_id {
            if !is_valid_page_id(&id) {
                return Err(ValidationError::InvalidId(id).into());
            }
            page.id = id;
        }

        let page = self.store.insert_page(page).await?;
        info!(page_id = %page.id, space_id = %page.space_id, "created page");
        self.emit_event(DomainEvent::PageCreated(page.clone()));
        Ok(page)
    }

    /// Update a page's title, icon, or content.
    ///
    /// Requires Edit/Page in the page's space. For synced references the
    /// write is redirected to the origin row; the reference never holds
    /// content. The superseded state is snapshotted into page history.
    pub async fn update(
        &self,
        user: &User,
        params: UpdatePageParams,
    ) -> Result<Page, PageServiceError> {
        let page = self.find_required_page(&params.page_id).await?;
        self.require(user, &page.space_id, SpaceAction::Edit, SpaceSubject::Page)
            .await?;

        let mut target = self.resolver.resolve_for_write(page).await?;
        let snapshot = PageHistory::snapshot(&target);

        if let Some(title) = params.title {
            if title.chars().count() > MAX_TITLE_LEN {
                return Err(ValidationError::TitleTooLong { max: MAX_TITLE_LEN }.into());
            }
            target.title = title;
        }
        if let Some(icon) = params.icon {
            target.icon = Some(icon);
        }
        if let Some(content) = params.content {
            target.body = PageBody::Standalone { content };
        }

        if !target.contributor_ids.iter().any(|c| c == &user.id) {
            target.contributor_ids.push(user.id.clone());
        }
        target.last_updated_by_id = Some(user.id.clone());
        target.version += 1;
        target.updated_at = Utc::now();

        let target = self.store.save_page(target).await?;
        self.store.insert_history(snapshot).await?;
        debug!(page_id = %target.id, version = target.version, "updated page");
        self.emit_event(DomainEvent::PageUpdated(target.clone()));
        Ok(target)
    }

    /// Soft-delete a page and its entire subtree into the trash.
    ///
    /// Requires Manage/Page. Idempotent on already-trashed pages.
    pub async fn remove(&self, user: &User, page_id: &str) -> Result<(), PageServiceError> {
        self.with_conflict_retry(|| self.remove_inner(user, page_id))
            .await
    }

    /// Restore a trashed page and its subtree, preserving structure.
    ///
    /// Requires Manage/Page. Idempotent on live pages.
    pub async fn restore(&self, user: &User, page_id: &str) -> Result<(), PageServiceError> {
        self.with_conflict_retry(|| self.restore_inner(user, page_id))
            .await
    }

    /// Permanently delete a page and its entire subtree.
    ///
    /// Requires Manage/Page. Sync bindings touching the deleted rows are
    /// dropped; references pointing at a deleted origin are left in place
    /// and report `OriginMissing` on resolution.
    pub async fn force_delete(&self, user: &User, page_id: &str) -> Result<(), PageServiceError> {
        self.with_conflict_retry(|| self.force_delete_inner(user, page_id))
            .await
    }

    /// Reparent or reorder a page within its space.
    ///
    /// Requires Edit/Page. Rejects moves that would detach the page into
    /// another space or create a cycle.
    pub async fn move_page(
        &self,
        user: &User,
        params: &MovePageParams,
    ) -> Result<(), PageServiceError> {
        self.with_conflict_retry(|| self.move_page_inner(user, params))
            .await
    }

    /// Migrate a page and its entire subtree to another space.
    ///
    /// Requires Edit/Page in the source space AND the destination space,
    /// both evaluated before any write. The moved root becomes a
    /// destination root unless `dest_parent_id` is supplied.
    pub async fn move_page_to_space(
        &self,
        user: &User,
        page_id: &str,
        dest_space_id: &str,
        dest_parent_id: Option<&str>,
    ) -> Result<Page, PageServiceError> {
        self.with_conflict_retry(|| {
            self.move_page_to_space_inner(user, page_id, dest_space_id, dest_parent_id)
        })
        .await
    }

    /// Clone a page and its live subtree into another space.
    ///
    /// Requires Edit/Page in both spaces. Every clone gets fresh ids and
    /// slugs, the acting user as creator, and independent content: synced
    /// references are materialized from their origin's current state
    /// rather than re-bound.
    pub async fn copy_page_to_space(
        &self,
        user: &User,
        page_id: &str,
        dest_space_id: &str,
    ) -> Result<Page, PageServiceError> {
        self.with_conflict_retry(|| self.copy_page_to_space_inner(user, page_id, dest_space_id))
            .await
    }

    /// Create a synced reference page.
    ///
    /// Requires Create/Page in the destination space; placement and origin
    /// validation is delegated to the resolver.
    pub async fn create_sync_page(
        &self,
        user: &User,
        workspace: &Workspace,
        params: CreateSyncPageParams,
    ) -> Result<Page, PageServiceError> {
        self.require(user, &params.space_id, SpaceAction::Create, SpaceSubject::Page)
            .await?;

        let reference = self.resolver.create_sync_page(user, workspace, params).await?;
        info!(
            reference_id = %reference.id,
            origin_id = ?reference.origin_page_id(),
            "created sync page"
        );
        self.emit_event(DomainEvent::SyncPageCreated(reference.clone()));
        Ok(reference)
    }

    //
    // INTERNALS
    //

    async fn remove_inner(&self, user: &User, page_id: &str) -> Result<(), PageServiceError> {
        let page = self.find_required_page(page_id).await?;
        self.require(user, &page.space_id, SpaceAction::Manage, SpaceSubject::Page)
            .await?;

        if page.is_trashed() {
            return Ok(());
        }

        let ids = self.subtree_ids(&page).await?;
        self.store.trash_pages(&ids, Utc::now()).await?;
        info!(page_id, subtree = ids.len(), "moved subtree to trash");
        self.emit_event(DomainEvent::PagesTrashed {
            root_id: page.id,
            page_ids: ids,
        });
        Ok(())
    }

    async fn restore_inner(&self, user: &User, page_id: &str) -> Result<(), PageServiceError> {
        let page = self.find_required_page(page_id).await?;
        self.require(user, &page.space_id, SpaceAction::Manage, SpaceSubject::Page)
            .await?;

        if !page.is_trashed() {
            return Ok(());
        }

        let ids = self.subtree_ids(&page).await?;
        self.store.restore_pages(&ids).await?;
        info!(page_id, subtree = ids.len(), "restored subtree from trash");
        self.emit_event(DomainEvent::PagesRestored {
            root_id: page.id,
            page_ids: ids,
        });
        Ok(())
    }

    async fn force_delete_inner(&self, user: &User, page_id: &str) -> Result<(), PageServiceError> {
        let page = self.find_required_page(page_id).await?;
        self.require(user, &page.space_id, SpaceAction::Manage, SpaceSubject::Page)
            .await?;

        let ids = self.subtree_ids(&page).await?;

        // References bound to deleted origins are left in place and will
        // report OriginMissing from now on.
        for id in &ids {
            let bindings = self.store.find_bindings_for_origin(id).await?;
            if !bindings.is_empty() {
                warn!(
                    origin_id = %id,
                    references = bindings.len(),
                    "deleting origin page with live sync references"
                );
            }
        }

        self.store.delete_pages(&ids).await?;
        info!(page_id, subtree = ids.len(), "permanently deleted subtree");
        self.emit_event(DomainEvent::PagesDeleted {
            root_id: page.id,
            page_ids: ids,
        });
        Ok(())
    }

    async fn move_page_inner(
        &self,
        user: &User,
        params: &MovePageParams,
    ) -> Result<(), PageServiceError> {
        let page = self.find_required_page(&params.page_id).await?;
        if page.is_trashed() {
            return Err(PageServiceError::invalid_move("cannot move a page in the trash"));
        }
        self.require(user, &page.space_id, SpaceAction::Edit, SpaceSubject::Page)
            .await?;

        if let Some(parent_id) = &params.parent_page_id {
            if parent_id == &page.id {
                return Err(PageServiceError::invalid_move("cannot move a page under itself"));
            }
            let parent = self
                .store
                .find_page_by_id(parent_id)
                .await?
                .filter(|p| !p.is_trashed())
                .ok_or_else(|| PageServiceError::invalid_parent(parent_id.as_str()))?;
            if parent.space_id != page.space_id {
                return Err(PageServiceError::invalid_move(
                    "cannot move a page under a parent in another space",
                ));
            }
            // Cycle guard: the prospective parent's ancestor chain must not
            // pass through the page being moved.
            let ancestors = self.store.find_ancestors(&parent.id).await?;
            if ancestors.iter().any(|a| a.id == page.id) {
                return Err(PageServiceError::invalid_move(
                    "cannot move a page into its own descendant",
                ));
            }
        }

        let siblings: Vec<Page> = self
            .store
            .find_all_children(&page.space_id, params.parent_page_id.as_deref())
            .await?
            .into_iter()
            .filter(|p| p.id != page.id)
            .collect();

        let position = match params.index {
            Some(index) => {
                let index = index.min(siblings.len());
                let prev = if index == 0 {
                    None
                } else {
                    siblings.get(index - 1).map(|p| p.position)
                };
                let next = siblings.get(index).map(|p| p.position);
                PositionCalculator::between(prev, next)
            }
            None => PositionCalculator::between(siblings.last().map(|p| p.position), None),
        };

        self.store
            .reparent_page(&page.id, params.parent_page_id.as_deref(), position)
            .await?;
        debug!(page_id = %page.id, parent = ?params.parent_page_id, position, "moved page");
        self.emit_event(DomainEvent::PageMoved {
            page_id: page.id,
            parent_page_id: params.parent_page_id.clone(),
            position,
        });
        Ok(())
    }

    async fn move_page_to_space_inner(
        &self,
        user: &User,
        page_id: &str,
        dest_space_id: &str,
        dest_parent_id: Option<&str>,
    ) -> Result<Page, PageServiceError> {
        let page = self.find_required_page(page_id).await?;
        if page.is_trashed() {
            return Err(PageServiceError::invalid_move("cannot move a page in the trash"));
        }
        if page.space_id == dest_space_id {
            return Err(PageServiceError::already_in_space(dest_space_id));
        }

        // Both grants are evaluated before any write; if either denies,
        // the source tree is untouched.
        self.require(user, &page.space_id, SpaceAction::Edit, SpaceSubject::Page)
            .await?;
        self.require(user, dest_space_id, SpaceAction::Edit, SpaceSubject::Page)
            .await?;

        if let Some(parent_id) = dest_parent_id {
            self.store
                .find_page_by_id(parent_id)
                .await?
                .filter(|p| !p.is_trashed() && p.space_id == dest_space_id)
                .ok_or_else(|| PageServiceError::invalid_parent(parent_id))?;
        }

        let ids = self.subtree_ids(&page).await?;
        let max_position = self
            .store
            .max_sibling_position(dest_space_id, dest_parent_id)
            .await?;
        let position = PositionCalculator::between(max_position, None);

        self.store
            .move_subtree_to_space(&page.id, &ids, dest_space_id, dest_parent_id, position)
            .await?;
        info!(
            page_id,
            dest_space_id,
            subtree = ids.len(),
            "moved subtree to space"
        );
        self.emit_event(DomainEvent::SubtreeMovedToSpace {
            root_id: page.id.clone(),
            space_id: dest_space_id.to_string(),
            page_ids: ids,
        });

        self.find_required_page(&page.id).await
    }

    async fn copy_page_to_space_inner(
        &self,
        user: &User,
        page_id: &str,
        dest_space_id: &str,
    ) -> Result<Page, PageServiceError> {
        let page = self.find_required_page(page_id).await?;
        if page.is_trashed() {
            return Err(PageServiceError::invalid_move("cannot copy a page in the trash"));
        }
        if page.space_id == dest_space_id {
            return Err(PageServiceError::already_in_space(dest_space_id));
        }

        self.require(user, &page.space_id, SpaceAction::Edit, SpaceSubject::Page)
            .await?;
        self.require(user, dest_space_id, SpaceAction::Edit, SpaceSubject::Page)
            .await?;

        // Trashed descendants are not cloned; the copy is the live subtree.
        let mut nodes = vec![page.clone()];
        nodes.extend(
            self.store
                .find_descendants(&page.id)
                .await?
                .into_iter()
                .filter(|p| !p.is_trashed()),
        );

        let mut id_map: HashMap<String, String> = HashMap::with_capacity(nodes.len());
        for node in &nodes {
            id_map.insert(node.id.clone(), Uuid::new_v4().to_string());
        }

        let root_position = PositionCalculator::between(
            self.store.max_sibling_position(dest_space_id, None).await?,
            None,
        );
        let now = Utc::now();

        let mut clones = Vec::with_capacity(nodes.len());
        for node in &nodes {
            // Copies default to independent content: a reference clone
            // materializes the origin's current state instead of staying
            // coupled across spaces.
            let (title, icon, body) = match &node.body {
                PageBody::Standalone { content } => (
                    node.title.clone(),
                    node.icon.clone(),
                    PageBody::Standalone {
                        content: content.clone(),
                    },
                ),
                PageBody::Reference { origin_page_id } => {
                    let origin = self
                        .store
                        .find_page_by_id(origin_page_id)
                        .await?
                        .filter(|o| !o.is_synced())
                        .ok_or_else(|| PageServiceError::origin_missing(node.id.as_str()))?;
                    let content = origin.content().cloned().unwrap_or(Value::Null);
                    (
                        origin.title.clone(),
                        origin.icon.clone(),
                        PageBody::Standalone { content },
                    )
                }
            };

            let is_root = node.id == page.id;
            clones.push(Page {
                id: id_map[&node.id].clone(),
                slug_id: generate_slug_id(),
                title,
                icon,
                body,
                space_id: dest_space_id.to_string(),
                workspace_id: node.workspace_id.clone(),
                parent_page_id: if is_root {
                    None
                } else {
                    node.parent_page_id
                        .as_ref()
                        .and_then(|p| id_map.get(p))
                        .cloned()
                },
                position: if is_root { root_position } else { node.position },
                creator_id: user.id.clone(),
                last_updated_by_id: None,
                contributor_ids: vec![user.id.clone()],
                version: 1,
                deleted_at: None,
                created_at: now,
                updated_at: now,
            });
        }

        let new_root_id = id_map[&page.id].clone();
        self.store.insert_pages(clones).await?;
        info!(
            page_id,
            dest_space_id,
            subtree = nodes.len(),
            "copied subtree to space"
        );
        self.emit_event(DomainEvent::SubtreeCopiedToSpace {
            source_root_id: page.id,
            new_root_id: new_root_id.clone(),
            space_id: dest_space_id.to_string(),
        });

        self.find_required_page(&new_root_id).await
    }

    /// Compute a fresh capability grant for one (user, space) pair.
    ///
    /// Membership is read from storage on every call; grants are never
    /// cached across operations or space boundaries. A space that does not
    /// exist yields the same deny-all grant as one the user is not a member
    /// of, so absence is not distinguishable from lack of access.
    async fn grant_for(
        &self,
        user: &User,
        space_id: &str,
    ) -> Result<CapabilityGrant, PageServiceError> {
        let role = self.store.find_member_role(space_id, &user.id).await?;
        Ok(CapabilityGrant::for_role(role))
    }

    async fn require(
        &self,
        user: &User,
        space_id: &str,
        action: SpaceAction,
        subject: SpaceSubject,
    ) -> Result<(), PageServiceError> {
        let grant = self.grant_for(user, space_id).await?;
        if grant.cannot(action, subject) {
            return Err(PageServiceError::Forbidden);
        }
        Ok(())
    }

    async fn find_required_page(&self, page_id: &str) -> Result<Page, PageServiceError> {
        self.store
            .find_page_by_id(page_id)
            .await?
            .ok_or_else(|| PageServiceError::page_not_found(page_id))
    }

    /// Full affected id set for a subtree transition: the root plus every
    /// transitive descendant, collected before the transition is applied.
    async fn subtree_ids(&self, root: &Page) -> Result<Vec<String>, PageServiceError> {
        let mut ids = vec![root.id.clone()];
        ids.extend(
            self.store
                .find_descendants(&root.id)
                .await?
                .into_iter()
                .map(|p| p.id),
        );
        Ok(ids)
    }

    /// Resolve synced rows in a listing, failing closed per row: a page
    /// whose binding dangles is omitted rather than crashing the listing.
    /// Window metadata is kept as reported by the store.
    async fn resolve_listing(&self, listing: Paginated<Page>) -> Paginated<Page> {
        let mut items = Vec::with_capacity(listing.items.len());
        for page in listing.items {
            if page.is_synced() {
                match self.resolver.resolve_for_read(page).await {
                    Ok(resolved) => items.push(resolved),
                    Err(err) => {
                        warn!("omitting synced page from listing: {err}");
                    }
                }
            } else {
                items.push(page);
            }
        }
        Paginated {
            items,
            meta: listing.meta,
        }
    }

    /// Re-run a whole operation when its subtree transaction loses a commit
    /// race. Retries are bounded and always wholesale; a partially-applied
    /// transition is never retried piecemeal.
    async fn with_conflict_retry<T, F, Fut>(&self, mut op: F) -> Result<T, PageServiceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PageServiceError>>,
    {
        let mut attempts = 0;
        loop {
            match op().await {
                Err(err) if err.is_conflict() && attempts < CONFLICT_RETRY_LIMIT => {
                    attempts += 1;
                    warn!(attempt = attempts, "retrying operation after commit conflict");
                }
                result => return result,
            }
        }
    }

    fn emit_event(&self, event: DomainEvent) {
        // Send fails only when no subscriber exists, which is fine
        let _ = self.event_tx.send(event);
    }
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "page_service_test.rs"]
mod page_service_test;
