//! Page Endpoints
//!
//! REST surface of the page hierarchy core. Every handler resolves the
//! authenticated user/workspace from the request, delegates to the service
//! layer, and maps domain failures through [`HttpError`]. Authorization
//! itself lives in the services; no capability decision is made here.
//!
//! # Endpoints
//!
//! - `POST /pages/info` - fetch a page, sync indirection resolved
//! - `POST /pages/create` - create a page
//! - `POST /pages/update` - update a page (redirects if synced)
//! - `POST /pages/delete` - permanent delete, whole subtree
//! - `POST /pages/remove` - soft trash, whole subtree
//! - `POST /pages/restore` - restore from trash, whole subtree
//! - `POST /pages/recent` - recent pages, per space or per user
//! - `POST /pages/deleted` - trashed pages of a space
//! - `POST /pages/history` - version history of a page
//! - `POST /pages/history/info` - single history snapshot
//! - `POST /pages/sidebar-pages` - children listing, sync-resolved
//! - `POST /pages/move-to-space` - cross-space move
//! - `POST /pages/copy-to-space` - cross-space copy
//! - `POST /pages/move` - intra-space reparent/reorder
//! - `POST /pages/breadcrumbs` - ancestor chain
//! - `POST /pages/sync-page` - create a synced reference
//! - `GET  /pages/` - pages in a space

use crate::auth::{AuthUser, AuthWorkspace};
use crate::http_error::HttpError;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use pagespace_core::models::{Page, PageHistory, Paginated, PaginationOptions};
use pagespace_core::services::{CreatePageParams, CreateSyncPageParams, MovePageParams, UpdatePageParams};
use serde::Deserialize;
use serde_json::Value;

/// Assemble the page routes; state is attached by the caller
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pages/info", post(page_info))
        .route("/pages/create", post(create_page))
        .route("/pages/update", post(update_page))
        .route("/pages/delete", post(delete_page))
        .route("/pages/remove", post(remove_page))
        .route("/pages/restore", post(restore_page))
        .route("/pages/recent", post(recent_pages))
        .route("/pages/deleted", post(deleted_pages))
        .route("/pages/history", post(page_history))
        .route("/pages/history/info", post(page_history_info))
        .route("/pages/sidebar-pages", post(sidebar_pages))
        .route("/pages/move-to-space", post(move_page_to_space))
        .route("/pages/copy-to-space", post(copy_page_to_space))
        .route("/pages/move", post(move_page))
        .route("/pages/breadcrumbs", post(page_breadcrumbs))
        .route("/pages/sync-page", post(create_sync_page))
        .route("/pages/", get(space_pages))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageIdDto {
    page_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePageDto {
    page_id: Option<String>,
    space_id: String,
    parent_page_id: Option<String>,
    title: Option<String>,
    icon: Option<String>,
    content: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePageDto {
    page_id: String,
    title: Option<String>,
    icon: Option<String>,
    content: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovePageDto {
    page_id: String,
    parent_page_id: Option<String>,
    index: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovePageToSpaceDto {
    page_id: String,
    space_id: String,
    parent_page_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CopyPageToSpaceDto {
    page_id: String,
    space_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentPageDto {
    space_id: Option<String>,
    #[serde(flatten)]
    pagination: PaginationOptions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeletedPageDto {
    space_id: String,
    #[serde(flatten)]
    pagination: PaginationOptions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageHistoryDto {
    page_id: String,
    #[serde(flatten)]
    pagination: PaginationOptions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageHistoryIdDto {
    history_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SidebarPageDto {
    space_id: String,
    page_id: Option<String>,
    #[serde(flatten)]
    pagination: PaginationOptions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSyncPageDto {
    origin_page_id: String,
    space_id: String,
    parent_page_id: Option<String>,
}

/// Query string for `GET /pages/`; pagination fields are spelled out
/// because urlencoded deserialization does not flatten
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpacePagesQuery {
    space_id: String,
    page: Option<usize>,
    limit: Option<usize>,
}

async fn page_info(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(dto): Json<PageIdDto>,
) -> Result<Json<Page>, HttpError> {
    Ok(Json(state.page_service.get_page(&user, &dto.page_id).await?))
}

async fn create_page(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AuthWorkspace(workspace): AuthWorkspace,
    Json(dto): Json<CreatePageDto>,
) -> Result<Json<Page>, HttpError> {
    let page = state
        .page_service
        .create(
            &user,
            &workspace,
            CreatePageParams {
                page_id: dto.page_id,
                space_id: dto.space_id,
                parent_page_id: dto.parent_page_id,
                title: dto.title,
                icon: dto.icon,
                content: dto.content,
            },
        )
        .await?;
    Ok(Json(page))
}

async fn update_page(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(dto): Json<UpdatePageDto>,
) -> Result<Json<Page>, HttpError> {
    let page = state
        .page_service
        .update(
            &user,
            UpdatePageParams {
                page_id: dto.page_id,
                title: dto.title,
                icon: dto.icon,
                content: dto.content,
            },
        )
        .await?;
    Ok(Json(page))
}

async fn delete_page(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(dto): Json<PageIdDto>,
) -> Result<StatusCode, HttpError> {
    state.page_service.force_delete(&user, &dto.page_id).await?;
    Ok(StatusCode::OK)
}

async fn remove_page(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(dto): Json<PageIdDto>,
) -> Result<StatusCode, HttpError> {
    state.page_service.remove(&user, &dto.page_id).await?;
    Ok(StatusCode::OK)
}

async fn restore_page(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(dto): Json<PageIdDto>,
) -> Result<StatusCode, HttpError> {
    state.page_service.restore(&user, &dto.page_id).await?;
    Ok(StatusCode::OK)
}

async fn recent_pages(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(dto): Json<RecentPageDto>,
) -> Result<Json<Paginated<Page>>, HttpError> {
    let listing = match dto.space_id {
        Some(space_id) => {
            state
                .page_service
                .get_recent_space_pages(&user, &space_id, &dto.pagination)
                .await?
        }
        None => {
            state
                .page_service
                .get_recent_pages(&user, &dto.pagination)
                .await?
        }
    };
    Ok(Json(listing))
}

async fn deleted_pages(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(dto): Json<DeletedPageDto>,
) -> Result<Json<Paginated<Page>>, HttpError> {
    let listing = state
        .page_service
        .get_deleted_space_pages(&user, &dto.space_id, &dto.pagination)
        .await?;
    Ok(Json(listing))
}

async fn page_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(dto): Json<PageHistoryDto>,
) -> Result<Json<Paginated<PageHistory>>, HttpError> {
    let listing = state
        .history_service
        .get_page_history(&user, &dto.page_id, &dto.pagination)
        .await?;
    Ok(Json(listing))
}

async fn page_history_info(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(dto): Json<PageHistoryIdDto>,
) -> Result<Json<PageHistory>, HttpError> {
    let history = state
        .history_service
        .get_history_info(&user, &dto.history_id)
        .await?;
    Ok(Json(history))
}

async fn sidebar_pages(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(dto): Json<SidebarPageDto>,
) -> Result<Json<Paginated<Page>>, HttpError> {
    let listing = state
        .page_service
        .get_sidebar_pages(
            &user,
            &dto.space_id,
            dto.page_id.as_deref(),
            &dto.pagination,
        )
        .await?;
    Ok(Json(listing))
}

async fn move_page_to_space(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(dto): Json<MovePageToSpaceDto>,
) -> Result<Json<Page>, HttpError> {
    let page = state
        .page_service
        .move_page_to_space(
            &user,
            &dto.page_id,
            &dto.space_id,
            dto.parent_page_id.as_deref(),
        )
        .await?;
    Ok(Json(page))
}

async fn copy_page_to_space(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(dto): Json<CopyPageToSpaceDto>,
) -> Result<Json<Page>, HttpError> {
    let page = state
        .page_service
        .copy_page_to_space(&user, &dto.page_id, &dto.space_id)
        .await?;
    Ok(Json(page))
}

async fn move_page(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(dto): Json<MovePageDto>,
) -> Result<StatusCode, HttpError> {
    state
        .page_service
        .move_page(
            &user,
            &MovePageParams {
                page_id: dto.page_id,
                parent_page_id: dto.parent_page_id,
                index: dto.index,
            },
        )
        .await?;
    Ok(StatusCode::OK)
}

async fn page_breadcrumbs(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(dto): Json<PageIdDto>,
) -> Result<Json<Vec<Page>>, HttpError> {
    Ok(Json(
        state.page_service.get_breadcrumbs(&user, &dto.page_id).await?,
    ))
}

async fn create_sync_page(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AuthWorkspace(workspace): AuthWorkspace,
    Json(dto): Json<CreateSyncPageDto>,
) -> Result<Json<Page>, HttpError> {
    let page = state
        .page_service
        .create_sync_page(
            &user,
            &workspace,
            CreateSyncPageParams {
                origin_page_id: dto.origin_page_id,
                space_id: dto.space_id,
                parent_page_id: dto.parent_page_id,
            },
        )
        .await?;
    Ok(Json(page))
}

async fn space_pages(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<SpacePagesQuery>,
) -> Result<Json<Paginated<Page>>, HttpError> {
    let mut pagination = PaginationOptions::default();
    if let Some(page) = query.page {
        pagination.page = page;
    }
    if let Some(limit) = query.limit {
        pagination.limit = limit;
    }

    let listing = state
        .page_service
        .get_pages_in_space(&user, &query.space_id, &pagination)
        .await?;
    Ok(Json(listing))
}
