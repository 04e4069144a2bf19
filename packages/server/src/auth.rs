//! Authentication context extractors
//!
//! Authentication and session issuance are external collaborators: a
//! deployment fronts this router with middleware that verifies the session
//! and inserts the resolved [`AuthUser`]/[`AuthWorkspace`] into request
//! extensions. The extractors here only read what that middleware provides.
//!
//! The bundled [`require_auth`] layer trusts `x-user-id` /
//! `x-workspace-id` headers. Local development and tests only — it performs
//! no verification and must never front a production deployment.

use crate::http_error::HttpError;
use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use pagespace_core::models::{User, Workspace};

/// The authenticated user, resolved by the fronting auth middleware
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// The resolved workspace context for the request
#[derive(Debug, Clone)]
pub struct AuthWorkspace(pub Workspace);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(HttpError::unauthenticated)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthWorkspace
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthWorkspace>()
            .cloned()
            .ok_or_else(HttpError::unauthenticated)
    }
}

/// Header-trusting auth layer for development and tests.
///
/// Rejects requests without both identity headers; everything downstream
/// can rely on the extensions being present.
pub async fn require_auth(mut request: Request, next: Next) -> Result<Response, HttpError> {
    // Scope the borrowing closure so it is dropped before the `.await`
    // below; otherwise the borrow of `request` (whose body is not `Sync`)
    // keeps the future from being `Send`, which `middleware::from_fn`
    // requires.
    let (user_id, workspace_id, user_name) = {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };

        let user_id = header("x-user-id").ok_or_else(HttpError::unauthenticated)?;
        let workspace_id = header("x-workspace-id").ok_or_else(HttpError::unauthenticated)?;
        let user_name = header("x-user-name").unwrap_or_default();
        (user_id, workspace_id, user_name)
    };

    request
        .extensions_mut()
        .insert(AuthUser(User::new(user_id, user_name)));
    request
        .extensions_mut()
        .insert(AuthWorkspace(Workspace::new(workspace_id, String::new())));

    Ok(next.run(request).await)
}
