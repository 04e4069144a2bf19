//! Page History Service
//!
//! Read side of page version history. Snapshots are written by
//! [`crate::services::PageService::update`] before a patch is applied; this
//! service authorizes and serves them back.

use crate::auth::{CapabilityGrant, SpaceAction, SpaceSubject};
use crate::db::PageStore;
use crate::models::{PageHistory, Paginated, PaginationOptions, User};
use crate::services::error::PageServiceError;
use std::sync::Arc;

pub struct PageHistoryService {
    store: Arc<dyn PageStore>,
}

impl PageHistoryService {
    pub fn new(store: Arc<dyn PageStore>) -> Self {
        Self { store }
    }

    /// Snapshots for a page, newest first.
    ///
    /// Requires Read/Page in the page's current space.
    pub async fn get_page_history(
        &self,
        user: &User,
        page_id: &str,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<PageHistory>, PageServiceError> {
        let page = self
            .store
            .find_page_by_id(page_id)
            .await?
            .ok_or_else(|| PageServiceError::page_not_found(page_id))?;

        self.require_read(user, &page.space_id).await?;
        Ok(self.store.find_history_for_page(page_id, pagination).await?)
    }

    /// One snapshot by id.
    ///
    /// Authorized against the space recorded on the snapshot itself, not
    /// the page's current space — history of a page that later moved stays
    /// readable to the members of the space where the edits happened.
    pub async fn get_history_info(
        &self,
        user: &User,
        history_id: &str,
    ) -> Result<PageHistory, PageServiceError> {
        let history = self
            .store
            .find_history_by_id(history_id)
            .await?
            .ok_or_else(|| PageServiceError::history_not_found(history_id))?;

        self.require_read(user, &history.space_id).await?;
        Ok(history)
    }

    async fn require_read(&self, user: &User, space_id: &str) -> Result<(), PageServiceError> {
        let role = self.store.find_member_role(space_id, &user.id).await?;
        let grant = CapabilityGrant::for_role(role);
        if grant.cannot(SpaceAction::Read, SpaceSubject::Page) {
            return Err(PageServiceError::Forbidden);
        }
        Ok(())
    }
}
