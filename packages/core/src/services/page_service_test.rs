//! Unit Tests for PageService Authorization and Retry Behavior
//!
//! Hierarchy semantics (moves, trash round-trips, cross-space atomicity)
//! are covered by the integration suites in `tests/`; this module pins the
//! capability checks, the fresh-grant re-evaluation, and the bounded
//! conflict retry.

use crate::db::{MemoryStore, PageStore, StoreError};
use crate::models::{
    Page, PageHistory, Paginated, PaginationOptions, Space, SpaceMember, SpaceRole, SyncBinding,
    User, Workspace,
};
use crate::services::{CreatePageParams, PageService, PageServiceError, UpdatePageParams};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct TestContext {
    store: Arc<MemoryStore>,
    service: PageService,
    workspace: Workspace,
    admin: User,
    writer: User,
    reader: User,
}

async fn setup() -> TestContext {
    let store = Arc::new(MemoryStore::new());
    let dyn_store: Arc<dyn PageStore> = store.clone();
    let service = PageService::new(dyn_store);

    let space = Space::new("Engineering".to_string(), "eng".to_string(), "ws-1".to_string());
    let space = Space { id: "s1".to_string(), ..space };
    store.insert_space(space).await.unwrap();

    let admin = User::new("u-admin", "Ada");
    let writer = User::new("u-writer", "Wes");
    let reader = User::new("u-reader", "Rhea");
    for (user, role) in [
        (&admin, SpaceRole::Admin),
        (&writer, SpaceRole::Writer),
        (&reader, SpaceRole::Reader),
    ] {
        store
            .add_space_member(SpaceMember::new("s1".to_string(), user.id.clone(), role))
            .await
            .unwrap();
    }

    TestContext {
        store,
        service,
        workspace: Workspace::new("ws-1", "Acme"),
        admin,
        writer,
        reader,
    }
}

fn create_params(space_id: &str, title: &str) -> CreatePageParams {
    CreatePageParams {
        space_id: space_id.to_string(),
        title: Some(title.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_reader_cannot_create() {
    let ctx = setup().await;
    let err = ctx
        .service
        .create(&ctx.reader, &ctx.workspace, create_params("s1", "Draft"))
        .await
        .unwrap_err();
    assert!(matches!(err, PageServiceError::Forbidden));
}

#[tokio::test]
async fn test_writer_cannot_force_delete() {
    let ctx = setup().await;
    let page = ctx
        .service
        .create(&ctx.writer, &ctx.workspace, create_params("s1", "Notes"))
        .await
        .unwrap();

    // Writer can edit the page but lacks Manage
    let err = ctx
        .service
        .force_delete(&ctx.writer, &page.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PageServiceError::Forbidden));

    // Page remains active
    let still_there = ctx.store.find_page_by_id(&page.id).await.unwrap().unwrap();
    assert!(!still_there.is_trashed());
}

#[tokio::test]
async fn test_unknown_space_is_opaque_forbidden() {
    let ctx = setup().await;
    let err = ctx
        .service
        .create(&ctx.writer, &ctx.workspace, create_params("no-such-space", "X"))
        .await
        .unwrap_err();
    // Absence and lack of access are indistinguishable
    assert!(matches!(err, PageServiceError::Forbidden));
}

#[tokio::test]
async fn test_grant_recomputed_after_role_change() {
    let ctx = setup().await;
    let page = ctx
        .service
        .create(&ctx.writer, &ctx.workspace, create_params("s1", "Living doc"))
        .await
        .unwrap();

    // Demote the writer between two calls; the second must see the new role
    ctx.store
        .add_space_member(SpaceMember::new(
            "s1".to_string(),
            ctx.writer.id.clone(),
            SpaceRole::Reader,
        ))
        .await
        .unwrap();

    let err = ctx
        .service
        .update(
            &ctx.writer,
            UpdatePageParams {
                page_id: page.id.clone(),
                title: Some("Stale grant".to_string()),
                icon: None,
                content: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PageServiceError::Forbidden));
}

#[tokio::test]
async fn test_update_tracks_contributors_and_versions() {
    let ctx = setup().await;
    let page = ctx
        .service
        .create(&ctx.admin, &ctx.workspace, create_params("s1", "Guide"))
        .await
        .unwrap();

    let updated = ctx
        .service
        .update(
            &ctx.writer,
            UpdatePageParams {
                page_id: page.id.clone(),
                title: None,
                icon: None,
                content: Some(json!({"blocks": ["draft"]})),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.version, 2);
    assert_eq!(updated.last_updated_by_id.as_deref(), Some("u-writer"));
    assert!(updated.contributor_ids.contains(&"u-admin".to_string()));
    assert!(updated.contributor_ids.contains(&"u-writer".to_string()));

    // Second edit by the same user does not duplicate the contributor
    let updated = ctx
        .service
        .update(
            &ctx.writer,
            UpdatePageParams {
                page_id: page.id,
                title: Some("Guide v2".to_string()),
                icon: None,
                content: None,
            },
        )
        .await
        .unwrap();
    let writers = updated
        .contributor_ids
        .iter()
        .filter(|c| *c == "u-writer")
        .count();
    assert_eq!(writers, 1);
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let ctx = setup().await;
    let page = ctx
        .service
        .create(&ctx.admin, &ctx.workspace, create_params("s1", "Old plan"))
        .await
        .unwrap();

    ctx.service.remove(&ctx.admin, &page.id).await.unwrap();
    ctx.service.remove(&ctx.admin, &page.id).await.unwrap();

    let trashed = ctx.store.find_page_by_id(&page.id).await.unwrap().unwrap();
    assert!(trashed.is_trashed());
}

#[tokio::test]
async fn test_invalid_client_page_id_rejected() {
    let ctx = setup().await;
    let mut params = create_params("s1", "With id");
    params.page_id = Some("not-a-uuid".to_string());

    let err = ctx
        .service
        .create(&ctx.admin, &ctx.workspace, params)
        .await
        .unwrap_err();
    assert!(matches!(err, PageServiceError::ValidationFailed(_)));
}

/// Store wrapper whose `trash_pages` loses the commit race a configurable
/// number of times before succeeding.
struct FlakyStore {
    inner: MemoryStore,
    trash_failures: AtomicUsize,
}

#[async_trait]
impl PageStore for FlakyStore {
    async fn insert_page(&self, page: Page) -> Result<Page, StoreError> {
        self.inner.insert_page(page).await
    }
    async fn find_page_by_id(&self, id: &str) -> Result<Option<Page>, StoreError> {
        self.inner.find_page_by_id(id).await
    }
    async fn save_page(&self, page: Page) -> Result<Page, StoreError> {
        self.inner.save_page(page).await
    }
    async fn find_children(
        &self,
        space_id: &str,
        parent_page_id: Option<&str>,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, StoreError> {
        self.inner.find_children(space_id, parent_page_id, pagination).await
    }
    async fn find_all_children(
        &self,
        space_id: &str,
        parent_page_id: Option<&str>,
    ) -> Result<Vec<Page>, StoreError> {
        self.inner.find_all_children(space_id, parent_page_id).await
    }
    async fn find_descendants(&self, page_id: &str) -> Result<Vec<Page>, StoreError> {
        self.inner.find_descendants(page_id).await
    }
    async fn find_ancestors(&self, page_id: &str) -> Result<Vec<Page>, StoreError> {
        self.inner.find_ancestors(page_id).await
    }
    async fn max_sibling_position(
        &self,
        space_id: &str,
        parent_page_id: Option<&str>,
    ) -> Result<Option<f64>, StoreError> {
        self.inner.max_sibling_position(space_id, parent_page_id).await
    }
    async fn find_pages_in_space(
        &self,
        space_id: &str,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, StoreError> {
        self.inner.find_pages_in_space(space_id, pagination).await
    }
    async fn find_recent_in_space(
        &self,
        space_id: &str,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, StoreError> {
        self.inner.find_recent_in_space(space_id, pagination).await
    }
    async fn find_recent_for_user(
        &self,
        user_id: &str,
        space_ids: &[String],
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, StoreError> {
        self.inner.find_recent_for_user(user_id, space_ids, pagination).await
    }
    async fn find_trashed_in_space(
        &self,
        space_id: &str,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<Page>, StoreError> {
        self.inner.find_trashed_in_space(space_id, pagination).await
    }
    async fn trash_pages(
        &self,
        ids: &[String],
        deleted_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if self.trash_failures.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
            n.checked_sub(1)
        }).is_ok()
        {
            return Err(StoreError::conflict("simulated commit race"));
        }
        self.inner.trash_pages(ids, deleted_at).await
    }
    async fn restore_pages(&self, ids: &[String]) -> Result<(), StoreError> {
        self.inner.restore_pages(ids).await
    }
    async fn delete_pages(&self, ids: &[String]) -> Result<(), StoreError> {
        self.inner.delete_pages(ids).await
    }
    async fn move_subtree_to_space(
        &self,
        root_id: &str,
        ids: &[String],
        dest_space_id: &str,
        dest_parent_id: Option<&str>,
        root_position: f64,
    ) -> Result<(), StoreError> {
        self.inner
            .move_subtree_to_space(root_id, ids, dest_space_id, dest_parent_id, root_position)
            .await
    }
    async fn insert_pages(&self, pages: Vec<Page>) -> Result<(), StoreError> {
        self.inner.insert_pages(pages).await
    }
    async fn reparent_page(
        &self,
        page_id: &str,
        new_parent_id: Option<&str>,
        position: f64,
    ) -> Result<(), StoreError> {
        self.inner.reparent_page(page_id, new_parent_id, position).await
    }
    async fn insert_sync_binding(&self, binding: SyncBinding) -> Result<(), StoreError> {
        self.inner.insert_sync_binding(binding).await
    }
    async fn find_sync_binding(
        &self,
        reference_page_id: &str,
    ) -> Result<Option<SyncBinding>, StoreError> {
        self.inner.find_sync_binding(reference_page_id).await
    }
    async fn find_bindings_for_origin(
        &self,
        origin_page_id: &str,
    ) -> Result<Vec<SyncBinding>, StoreError> {
        self.inner.find_bindings_for_origin(origin_page_id).await
    }
    async fn insert_space(&self, space: Space) -> Result<Space, StoreError> {
        self.inner.insert_space(space).await
    }
    async fn find_space(&self, space_id: &str) -> Result<Option<Space>, StoreError> {
        self.inner.find_space(space_id).await
    }
    async fn add_space_member(&self, member: SpaceMember) -> Result<(), StoreError> {
        self.inner.add_space_member(member).await
    }
    async fn find_member_role(
        &self,
        space_id: &str,
        user_id: &str,
    ) -> Result<Option<SpaceRole>, StoreError> {
        self.inner.find_member_role(space_id, user_id).await
    }
    async fn find_space_ids_for_user(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        self.inner.find_space_ids_for_user(user_id).await
    }
    async fn insert_history(&self, history: PageHistory) -> Result<(), StoreError> {
        self.inner.insert_history(history).await
    }
    async fn find_history_by_id(
        &self,
        history_id: &str,
    ) -> Result<Option<PageHistory>, StoreError> {
        self.inner.find_history_by_id(history_id).await
    }
    async fn find_history_for_page(
        &self,
        page_id: &str,
        pagination: &PaginationOptions,
    ) -> Result<Paginated<PageHistory>, StoreError> {
        self.inner.find_history_for_page(page_id, pagination).await
    }
}

async fn flaky_setup(failures: usize) -> (PageService, User, Workspace) {
    let store = Arc::new(FlakyStore {
        inner: MemoryStore::new(),
        trash_failures: AtomicUsize::new(failures),
    });
    let dyn_store: Arc<dyn PageStore> = store.clone();
    let service = PageService::new(dyn_store);

    let admin = User::new("u-admin", "Ada");
    store
        .add_space_member(SpaceMember::new(
            "s1".to_string(),
            admin.id.clone(),
            SpaceRole::Admin,
        ))
        .await
        .unwrap();

    (service, admin, Workspace::new("ws-1", "Acme"))
}

#[tokio::test]
async fn test_conflict_retries_whole_operation() {
    let (service, admin, workspace) = flaky_setup(2).await;
    let page = service
        .create(&admin, &workspace, create_params("s1", "Contended"))
        .await
        .unwrap();

    // Two simulated races fit inside the retry budget
    service.remove(&admin, &page.id).await.unwrap();
}

#[tokio::test]
async fn test_conflict_retry_is_bounded() {
    let (service, admin, workspace) = flaky_setup(10).await;
    let page = service
        .create(&admin, &workspace, create_params("s1", "Contended"))
        .await
        .unwrap();

    let err = service.remove(&admin, &page.id).await.unwrap_err();
    assert!(err.is_conflict());
}
