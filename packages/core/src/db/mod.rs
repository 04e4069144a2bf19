//! Repository Layer
//!
//! This module holds the persistence contract and its in-memory reference
//! implementation:
//!
//! - [`PageStore`] - repository trait the services operate against; the
//!   storage engine behind it is an external collaborator
//! - [`MemoryStore`] - RwLock-backed implementation used by tests and the
//!   development server
//! - [`PositionCalculator`] - fractional sibling ordering keys
//! - [`DomainEvent`] - observer-pattern change notifications
//!
//! # Atomicity
//!
//! Subtree-wide transitions (trash, restore, permanent delete, cross-space
//! move, clone insert) are single calls executing inside one logical
//! transaction; partial application is never observable through the trait.

mod error;
pub mod events;
mod memory_store;
mod page_store;
mod position;

pub use error::StoreError;
pub use events::DomainEvent;
pub use memory_store::MemoryStore;
pub use page_store::PageStore;
pub use position::PositionCalculator;
