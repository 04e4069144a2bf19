//! Pagespace server binary
//!
//! Boots the in-memory store and serves the page API on localhost. The
//! bundled store and header-trusting auth layer make this a development
//! server; production deployments wire their own storage backend and
//! session middleware around the same router.

use pagespace_core::db::{MemoryStore, PageStore};
use pagespace_core::services::{PageHistoryService, PageService};
use pagespace_server::{create_router, default_server_port, AppState};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store: Arc<dyn PageStore> = Arc::new(MemoryStore::new());
    let state = AppState {
        page_service: Arc::new(PageService::new(store.clone())),
        history_service: Arc::new(PageHistoryService::new(store)),
    };
    let app = create_router(state);

    let addr = format!("127.0.0.1:{}", default_server_port());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Pagespace server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
