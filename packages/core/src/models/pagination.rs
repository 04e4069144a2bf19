//! Pagination Types
//!
//! Listing endpoints accept a `PaginationOptions` value and return a
//! `Paginated<T>` with the items for the requested window plus metadata for
//! cursorless paging UIs.

use serde::{Deserialize, Serialize};

/// Default page size for listings
pub const DEFAULT_LIMIT: usize = 20;
/// Upper bound on a single listing window
pub const MAX_LIMIT: usize = 100;

/// 1-based page window selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationOptions {
    pub page: usize,
    pub limit: usize,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PaginationOptions {
    pub fn new(page: usize, limit: usize) -> Self {
        Self { page, limit }
    }

    /// Page and limit with out-of-range values clamped into bounds
    pub fn clamped(&self) -> (usize, usize) {
        let page = self.page.max(1);
        let limit = self.limit.clamp(1, MAX_LIMIT);
        (page, limit)
    }

    /// Number of items skipped before this window
    pub fn offset(&self) -> usize {
        let (page, limit) = self.clamped();
        (page - 1) * limit
    }
}

/// Window metadata accompanying every paginated listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// One window of a listing plus its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> Paginated<T> {
    /// Slice one window out of a fully-materialized, already-ordered list
    pub fn paginate(all: Vec<T>, options: &PaginationOptions) -> Self {
        let (page, limit) = options.clamped();
        let total = all.len();
        let offset = options.offset();

        let items: Vec<T> = all.into_iter().skip(offset).take(limit).collect();

        Self {
            meta: PaginationMeta {
                page,
                limit,
                total,
                has_next: offset + items.len() < total,
                has_prev: page > 1,
            },
            items,
        }
    }

    /// Transform the items while keeping the window metadata intact.
    ///
    /// Used by listings that post-process rows (sync resolution) where a
    /// dropped row must not shift the reported window.
    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}
