//! Synchronized Page Service - Sync Indirection Resolver
//!
//! A synced page is a placement-only tree node whose content, title, and
//! icon live on an origin page elsewhere in the tree. This service mediates
//! every read and write touching a synced page so the indirection can never
//! leak stale or contradictory content:
//!
//! - reads copy the origin's content/title/icon onto the reference's own
//!   placement identity, lazily, at access time — origin edits are visible
//!   through every reference with no propagation step
//! - writes are redirected to the origin row; the reference row never holds
//!   content of its own
//! - creation validates the origin and the placement before any row exists
//!
//! A dangling pointer (origin permanently deleted) is data corruption and
//! surfaces as [`PageServiceError::OriginMissing`]; it is never silently
//! defaulted.

use crate::db::{PageStore, PositionCalculator};
use crate::models::{Page, PageBody, SyncBinding, User, Workspace};
use crate::services::error::PageServiceError;
use std::sync::Arc;
use tracing::debug;

/// Parameters for creating a synced reference page
#[derive(Debug, Clone)]
pub struct CreateSyncPageParams {
    /// Page holding the authoritative content
    pub origin_page_id: String,
    /// Destination space for the reference placement
    pub space_id: String,
    /// Optional destination parent; `None` places the reference as a root
    pub parent_page_id: Option<String>,
}

/// Resolver for synced-page indirection
pub struct SynchronizedPageService {
    store: Arc<dyn PageStore>,
}

impl SynchronizedPageService {
    pub fn new(store: Arc<dyn PageStore>) -> Self {
        Self { store }
    }

    /// Binding for a reference page, if one exists
    pub async fn find_by_reference_id(
        &self,
        reference_page_id: &str,
    ) -> Result<Option<SyncBinding>, PageServiceError> {
        Ok(self.store.find_sync_binding(reference_page_id).await?)
    }

    /// Resolve a page for reading.
    ///
    /// Standalone pages pass through unchanged. Reference pages return a
    /// value carrying the origin's current `title`, `icon`, and content on
    /// the reference's own placement identity — `id`, `slug_id`,
    /// `space_id`, `parent_page_id`, and `position` stay the reference's.
    pub async fn resolve_for_read(&self, page: Page) -> Result<Page, PageServiceError> {
        let origin_page_id = match &page.body {
            PageBody::Standalone { .. } => return Ok(page),
            PageBody::Reference { origin_page_id } => origin_page_id.clone(),
        };

        let origin = self.require_origin(&origin_page_id, &page.id).await?;
        debug!(
            reference_id = %page.id,
            origin_id = %origin.id,
            "resolved synced page for read"
        );

        let mut resolved = page;
        resolved.title = origin.title;
        resolved.icon = origin.icon;
        resolved.body = origin.body;
        resolved.last_updated_by_id = origin.last_updated_by_id;
        resolved.contributor_ids = origin.contributor_ids;
        Ok(resolved)
    }

    /// Resolve the target row for a content write.
    ///
    /// Standalone pages are their own target; reference pages redirect the
    /// write to the origin row.
    pub async fn resolve_for_write(&self, page: Page) -> Result<Page, PageServiceError> {
        let origin_page_id = match &page.body {
            PageBody::Standalone { .. } => return Ok(page),
            PageBody::Reference { origin_page_id } => origin_page_id.clone(),
        };

        let origin = self.require_origin(&origin_page_id, &page.id).await?;
        debug!(
            reference_id = %page.id,
            origin_id = %origin.id,
            "redirected write to origin page"
        );
        Ok(origin)
    }

    /// Create a synced reference page bound to `origin_page_id`.
    ///
    /// Validation, in order:
    /// - the origin resolves (`OriginNotFound`)
    /// - the origin is not itself a reference — no transitive indirection
    ///   (`InvalidSyncTarget`)
    /// - the requested placement is not the origin's own parent slot; a
    ///   sync pointer may not sit as an immediate sibling duplicate of its
    ///   origin (`InvalidSyncTarget`)
    /// - a supplied parent exists, is live, and belongs to the destination
    ///   space (`InvalidParent`)
    ///
    /// Capability checks happen in the hierarchy service before delegation.
    pub async fn create_sync_page(
        &self,
        user: &User,
        workspace: &Workspace,
        params: CreateSyncPageParams,
    ) -> Result<Page, PageServiceError> {
        let origin = self
            .store
            .find_page_by_id(&params.origin_page_id)
            .await?
            .ok_or_else(|| PageServiceError::origin_not_found(params.origin_page_id.as_str()))?;

        if origin.is_synced() {
            return Err(PageServiceError::invalid_sync_target(
                "origin page is itself a synced page",
            ));
        }

        // Two roots of different spaces are not adjacent duplicates; the
        // parent-equality guard only applies inside the origin's own space.
        if params.space_id == origin.space_id
            && params.parent_page_id == origin.parent_page_id
        {
            return Err(PageServiceError::invalid_sync_target(
                "cannot create a sync page with the same parent page as the origin page",
            ));
        }

        if let Some(parent_id) = &params.parent_page_id {
            let parent = self
                .store
                .find_page_by_id(parent_id)
                .await?
                .filter(|p| !p.is_trashed() && p.space_id == params.space_id)
                .ok_or_else(|| PageServiceError::invalid_parent(parent_id.as_str()))?;
            debug!(parent_id = %parent.id, "validated sync page parent");
        }

        let max_position = self
            .store
            .max_sibling_position(&params.space_id, params.parent_page_id.as_deref())
            .await?;
        let position = PositionCalculator::between(max_position, None);

        let reference = Page::new_reference(
            origin.id.clone(),
            params.space_id.clone(),
            workspace.id.clone(),
            params.parent_page_id.clone(),
            position,
            user.id.clone(),
        );

        let reference = self.store.insert_page(reference).await?;
        self.store
            .insert_sync_binding(SyncBinding::new(
                reference.id.clone(),
                origin.id.clone(),
                origin.space_id.clone(),
            ))
            .await?;

        Ok(reference)
    }

    /// Fetch an origin row; a miss or a reference-typed origin is a
    /// dangling/corrupt pointer.
    async fn require_origin(
        &self,
        origin_page_id: &str,
        reference_page_id: &str,
    ) -> Result<Page, PageServiceError> {
        let origin = self
            .store
            .find_page_by_id(origin_page_id)
            .await?
            .ok_or_else(|| PageServiceError::origin_missing(reference_page_id))?;

        if origin.is_synced() {
            return Err(PageServiceError::origin_missing(reference_page_id));
        }
        Ok(origin)
    }
}
