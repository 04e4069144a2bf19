//! Integration Tests for Page Version History
//!
//! Snapshots are written by `PageService::update` and read back through
//! `PageHistoryService`, authorized against the space recorded on the
//! snapshot.

use pagespace_core::db::{MemoryStore, PageStore};
use pagespace_core::models::{
    Page, PaginationOptions, Space, SpaceMember, SpaceRole, User, Workspace,
};
use pagespace_core::services::{
    CreatePageParams, PageHistoryService, PageService, PageServiceError, UpdatePageParams,
};
use serde_json::json;
use std::sync::Arc;

async fn setup() -> (PageService, PageHistoryService, User, Workspace) {
    let store = Arc::new(MemoryStore::new());
    let dyn_store: Arc<dyn PageStore> = store.clone();
    let service = PageService::new(dyn_store.clone());
    let history_service = PageHistoryService::new(dyn_store);

    for id in ["s1", "s2"] {
        let space = Space {
            id: id.to_string(),
            ..Space::new(id.to_string(), id.to_string(), "ws-1".to_string())
        };
        store.insert_space(space).await.unwrap();
    }

    let admin = User::new("u-admin", "Ada");
    for space_id in ["s1", "s2"] {
        store
            .add_space_member(SpaceMember::new(
                space_id.to_string(),
                admin.id.clone(),
                SpaceRole::Admin,
            ))
            .await
            .unwrap();
    }

    (service, history_service, admin, Workspace::new("ws-1", "Acme"))
}

async fn create_page(service: &PageService, user: &User, workspace: &Workspace) -> Page {
    service
        .create(
            user,
            workspace,
            CreatePageParams {
                space_id: "s1".to_string(),
                title: Some("v1".to_string()),
                content: Some(json!({"rev": 1})),
                ..Default::default()
            },
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_update_snapshots_superseded_state() {
    let (service, history_service, admin, workspace) = setup().await;
    let page = create_page(&service, &admin, &workspace).await;

    service
        .update(
            &admin,
            UpdatePageParams {
                page_id: page.id.clone(),
                title: Some("v2".to_string()),
                icon: None,
                content: Some(json!({"rev": 2})),
            },
        )
        .await
        .unwrap();

    let history = history_service
        .get_page_history(&admin, &page.id, &PaginationOptions::default())
        .await
        .unwrap();
    assert_eq!(history.meta.total, 1);
    let snapshot = &history.items[0];
    assert_eq!(snapshot.title, "v1");
    assert_eq!(snapshot.content, json!({"rev": 1}));
    assert_eq!(snapshot.version, 1);
}

#[tokio::test]
async fn test_history_listed_newest_first() {
    let (service, history_service, admin, workspace) = setup().await;
    let page = create_page(&service, &admin, &workspace).await;

    for rev in 2..=4 {
        service
            .update(
                &admin,
                UpdatePageParams {
                    page_id: page.id.clone(),
                    title: Some(format!("v{rev}")),
                    icon: None,
                    content: Some(json!({ "rev": rev })),
                },
            )
            .await
            .unwrap();
    }

    let history = history_service
        .get_page_history(&admin, &page.id, &PaginationOptions::default())
        .await
        .unwrap();
    assert_eq!(history.meta.total, 3);
    let versions: Vec<i64> = history.items.iter().map(|h| h.version).collect();
    assert_eq!(versions, vec![3, 2, 1]);
}

#[tokio::test]
async fn test_history_info_requires_read_in_snapshot_space() {
    let (service, history_service, admin, workspace) = setup().await;
    let page = create_page(&service, &admin, &workspace).await;
    service
        .update(
            &admin,
            UpdatePageParams {
                page_id: page.id.clone(),
                title: Some("v2".to_string()),
                icon: None,
                content: None,
            },
        )
        .await
        .unwrap();

    let history = history_service
        .get_page_history(&admin, &page.id, &PaginationOptions::default())
        .await
        .unwrap();
    let snapshot_id = history.items[0].id.clone();

    let info = history_service
        .get_history_info(&admin, &snapshot_id)
        .await
        .unwrap();
    assert_eq!(info.page_id, page.id);

    let outsider = User::new("u-nobody", "Nox");
    let err = history_service
        .get_history_info(&outsider, &snapshot_id)
        .await
        .unwrap_err();
    assert!(matches!(err, PageServiceError::Forbidden));
}

#[tokio::test]
async fn test_unknown_history_id_not_found() {
    let (_service, history_service, admin, _workspace) = setup().await;
    let err = history_service
        .get_history_info(&admin, "missing")
        .await
        .unwrap_err();
    assert!(matches!(err, PageServiceError::HistoryNotFound { .. }));
}
