//! Pagespace Core Business Logic Layer
//!
//! This crate provides the page hierarchy, access-scoped mutation, and
//! page-synchronization core of the Pagespace wiki platform.
//!
//! # Architecture
//!
//! - **Capability engine**: pure lookup from (role, action, subject) to
//!   allowed/denied, evaluated per request and per space
//! - **Repository contract**: tree-aware persistence behind the `PageStore`
//!   trait; the storage engine itself is an external collaborator
//! - **Synchronization resolver**: synced pages are placement-only nodes
//!   whose content redirects to an origin page, resolved lazily on access
//! - **Page hierarchy service**: orchestrates all structural mutations with
//!   atomic subtree transitions and fresh authorization at every boundary
//!
//! # Modules
//!
//! - [`models`] - data structures (Page, Space, SyncBinding, history)
//! - [`auth`] - capability grants
//! - [`db`] - repository contract, in-memory store, ordering, events
//! - [`services`] - business services (PageService, resolver, history)

pub mod auth;
pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use auth::*;
pub use models::*;
pub use services::*;
