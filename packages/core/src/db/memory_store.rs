//! In-Memory PageStore
//!
//! Reference implementation of the repository contract backed by plain maps
//! behind a `tokio::sync::RwLock`. Every mutating method takes the write
//! guard exactly once, which makes each bulk subtree transition atomic: no
//! reader or competing writer can observe a half-applied state. This is the
//! backend used by the test suites and the development server; production
//! deployments supply their own `PageStore` over the real storage engine.

use crate::db::{PageStore, StoreError};
use crate::models::{
    Page, PageHistory, Paginated, PaginationOptions, Space, SpaceMember, SpaceRole, SyncBinding,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Default)]
struct StoreInner {
    pages: HashMap<String, Page>,
    spaces: HashMap<String, Space>,
    /// space_id -> user_id -> role
    members: HashMap<String, HashMap<String, SpaceRole>>,
    /// keyed by reference page id
    bindings: HashMap<String, SyncBinding>,
    history: HashMap<String, PageHistory>,
    /// page_id -> snapshot ids, oldest first
    history_by_page: HashMap<String, Vec<String>>,
}

impl StoreInner {
    fn sorted_by_position(&self, mut pages: Vec<Page>) -> Vec<Page> {
        pages.sort_by(|a, b| {
            a.position
                .partial_cmp(&b.position)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        pages
    }

    fn live_children(&self, space_id: &str, parent_page_id: Option<&str>) -> Vec<Page> {
        let children: Vec<Page> = self
            .pages
            .values()
            .filter(|p| {
                p.space_id == space_id
                    && !p.is_trashed()
                    && p.parent_page_id.as_deref() == parent_page_id
            })
            .cloned()
            .collect();
        self.sorted_by_position(children)
    }

    /// All ids must resolve to rows; a missing row means the caller's
    /// worklist raced a concurrent structural mutation.
    fn require_all(&self, ids: &[String], context: &str) -> Result<(), StoreError> {
        for id in ids {
            if !self.pages.contains_key(id) {
                return Err(StoreError::conflict(format!(
                    "{context}: page {id} no longer exists"
                )));
            }
        }
        Ok(())
    }
}

/// In-memory repository; cheap to construct, one instance per process/test
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PageStore for MemoryStore {
    async fn insert_page(&self, page: Page) -> Result<Page, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.pages.contains_key(&page.id) {
            return Err(StoreError::duplicate_id(page.id.as_str()));
        }
        inner.pages.insert(page.id.clone(), page.clone());
        Ok(page)
    }

    async fn find_page_by_id(&self, id: &str) -> Result<Option<Page>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.pages.get(id).cloned())
    }

    async fn save_page(&self, page: Page) -> Result<Page, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.pages.contains_key(&page.id) {
            return Err(StoreError::conflict(format!(
                "save: page {} no longer exists",
                page.id
            )));
        }
        inner.pages.insert(page.id.clone(), page.clone());
        Ok(page)
    }

    async fn find_children(
        &self,
        space_id: &str,
        parent_page_id: Option<&str>,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, StoreError> {
        let inner = self.inner.read().await;
        let children = inner.live_children(space_id, parent_page_id);
        Ok(Paginated::paginate(children, pagination))
    }

    async fn find_all_children(
        &self,
        space_id: &str,
        parent_page_id: Option<&str>,
    ) -> Result<Vec<Page>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.live_children(space_id, parent_page_id))
    }

    async fn find_descendants(&self, page_id: &str) -> Result<Vec<Page>, StoreError> {
        let inner = self.inner.read().await;

        // Iterative worklist; includes trashed rows so lifecycle transitions
        // always see the whole subtree.
        let mut result = Vec::new();
        let mut worklist = vec![page_id.to_string()];
        while let Some(current) = worklist.pop() {
            for page in inner.pages.values() {
                if page.parent_page_id.as_deref() == Some(current.as_str()) {
                    worklist.push(page.id.clone());
                    result.push(page.clone());
                }
            }
        }
        Ok(result)
    }

    async fn find_ancestors(&self, page_id: &str) -> Result<Vec<Page>, StoreError> {
        let inner = self.inner.read().await;

        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = match inner.pages.get(page_id) {
            Some(page) => page.clone(),
            None => return Ok(chain),
        };

        loop {
            if !visited.insert(current.id.clone()) {
                return Err(StoreError::internal(format!(
                    "parent chain of page {page_id} contains a cycle"
                )));
            }
            chain.push(current.clone());
            match &current.parent_page_id {
                Some(parent_id) => match inner.pages.get(parent_id) {
                    Some(parent) => current = parent.clone(),
                    None => break,
                },
                None => break,
            }
        }

        chain.reverse();
        Ok(chain)
    }

    async fn max_sibling_position(
        &self,
        space_id: &str,
        parent_page_id: Option<&str>,
    ) -> Result<Option<f64>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .live_children(space_id, parent_page_id)
            .last()
            .map(|p| p.position))
    }

    async fn find_pages_in_space(
        &self,
        space_id: &str,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, StoreError> {
        let inner = self.inner.read().await;
        let mut pages: Vec<Page> = inner
            .pages
            .values()
            .filter(|p| p.space_id == space_id && !p.is_trashed())
            .cloned()
            .collect();
        pages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(Paginated::paginate(pages, pagination))
    }

    async fn find_recent_in_space(
        &self,
        space_id: &str,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, StoreError> {
        let inner = self.inner.read().await;
        let mut pages: Vec<Page> = inner
            .pages
            .values()
            .filter(|p| p.space_id == space_id && !p.is_trashed())
            .cloned()
            .collect();
        pages.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(Paginated::paginate(pages, pagination))
    }

    async fn find_recent_for_user(
        &self,
        user_id: &str,
        space_ids: &[String],
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, StoreError> {
        let spaces: HashSet<&String> = space_ids.iter().collect();
        let inner = self.inner.read().await;
        let mut pages: Vec<Page> = inner
            .pages
            .values()
            .filter(|p| {
                !p.is_trashed()
                    && spaces.contains(&p.space_id)
                    && (p.creator_id == user_id
                        || p.contributor_ids.iter().any(|c| c == user_id))
            })
            .cloned()
            .collect();
        pages.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(Paginated::paginate(pages, pagination))
    }

    async fn find_trashed_in_space(
        &self,
        space_id: &str,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, StoreError> {
        let inner = self.inner.read().await;
        let mut pages: Vec<Page> = inner
            .pages
            .values()
            .filter(|p| p.space_id == space_id && p.is_trashed())
            .cloned()
            .collect();
        pages.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        Ok(Paginated::paginate(pages, pagination))
    }

    async fn trash_pages(
        &self,
        ids: &[String],
        deleted_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.require_all(ids, "trash")?;
        for id in ids {
            if let Some(page) = inner.pages.get_mut(id) {
                page.deleted_at = Some(deleted_at);
            }
        }
        Ok(())
    }

    async fn restore_pages(&self, ids: &[String]) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.require_all(ids, "restore")?;
        for id in ids {
            if let Some(page) = inner.pages.get_mut(id) {
                page.deleted_at = None;
            }
        }
        Ok(())
    }

    async fn delete_pages(&self, ids: &[String]) -> Result<(), StoreError> {
        let id_set: HashSet<&String> = ids.iter().collect();
        let mut inner = self.inner.write().await;
        inner.require_all(ids, "delete")?;

        for id in ids {
            inner.pages.remove(id);
            if let Some(snapshot_ids) = inner.history_by_page.remove(id) {
                for snapshot_id in snapshot_ids {
                    inner.history.remove(&snapshot_id);
                }
            }
        }
        // Bindings die with either endpoint; references to a deleted origin
        // stay behind as dangling rows and surface as OriginMissing.
        inner
            .bindings
            .retain(|reference_id, b| {
                !id_set.contains(reference_id) && !id_set.contains(&b.origin_page_id)
            });
        Ok(())
    }

    async fn move_subtree_to_space(
        &self,
        root_id: &str,
        ids: &[String],
        dest_space_id: &str,
        dest_parent_id: Option<&str>,
        root_position: f64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.require_all(ids, "move to space")?;

        for id in ids {
            if let Some(page) = inner.pages.get_mut(id) {
                page.space_id = dest_space_id.to_string();
            }
        }
        if let Some(root) = inner.pages.get_mut(root_id) {
            root.parent_page_id = dest_parent_id.map(String::from);
            root.position = root_position;
            root.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn insert_pages(&self, pages: Vec<Page>) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for page in &pages {
            if inner.pages.contains_key(&page.id) {
                return Err(StoreError::duplicate_id(page.id.as_str()));
            }
        }
        for page in pages {
            inner.pages.insert(page.id.clone(), page);
        }
        Ok(())
    }

    async fn reparent_page(
        &self,
        page_id: &str,
        new_parent_id: Option<&str>,
        position: f64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.pages.get_mut(page_id) {
            Some(page) => {
                page.parent_page_id = new_parent_id.map(String::from);
                page.position = position;
                page.updated_at = Utc::now();
                Ok(())
            }
            None => Err(StoreError::conflict(format!(
                "reparent: page {page_id} no longer exists"
            ))),
        }
    }

    async fn insert_sync_binding(&self, binding: SyncBinding) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.bindings.contains_key(&binding.reference_page_id) {
            return Err(StoreError::duplicate_id(binding.reference_page_id.as_str()));
        }
        inner
            .bindings
            .insert(binding.reference_page_id.clone(), binding);
        Ok(())
    }

    async fn find_sync_binding(
        &self,
        reference_page_id: &str,
    ) -> Result<Option<SyncBinding>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.bindings.get(reference_page_id).cloned())
    }

    async fn find_bindings_for_origin(
        &self,
        origin_page_id: &str,
    ) -> Result<Vec<SyncBinding>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .bindings
            .values()
            .filter(|b| b.origin_page_id == origin_page_id)
            .cloned()
            .collect())
    }

    async fn insert_space(&self, space: Space) -> Result<Space, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.spaces.contains_key(&space.id) {
            return Err(StoreError::duplicate_id(space.id.as_str()));
        }
        inner.spaces.insert(space.id.clone(), space.clone());
        Ok(space)
    }

    async fn find_space(&self, space_id: &str) -> Result<Option<Space>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.spaces.get(space_id).cloned())
    }

    async fn add_space_member(&self, member: SpaceMember) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .members
            .entry(member.space_id.clone())
            .or_default()
            .insert(member.user_id, member.role);
        Ok(())
    }

    async fn find_member_role(
        &self,
        space_id: &str,
        user_id: &str,
    ) -> Result<Option<SpaceRole>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .members
            .get(space_id)
            .and_then(|m| m.get(user_id))
            .copied())
    }

    async fn find_space_ids_for_user(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .members
            .iter()
            .filter(|(_, members)| members.contains_key(user_id))
            .map(|(space_id, _)| space_id.clone())
            .collect())
    }

    async fn insert_history(&self, history: PageHistory) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .history_by_page
            .entry(history.page_id.clone())
            .or_default()
            .push(history.id.clone());
        inner.history.insert(history.id.clone(), history);
        Ok(())
    }

    async fn find_history_by_id(
        &self,
        history_id: &str,
    ) -> Result<Option<PageHistory>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.history.get(history_id).cloned())
    }

    async fn find_history_for_page(
        &self,
        page_id: &str,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<PageHistory>, StoreError> {
        let inner = self.inner.read().await;
        let snapshots: Vec<PageHistory> = inner
            .history_by_page
            .get(page_id)
            .map(|ids| {
                ids.iter()
                    .rev() // stored oldest first; listings are newest first
                    .filter_map(|id| inner.history.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(Paginated::paginate(snapshots, pagination))
    }
}
