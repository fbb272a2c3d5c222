//! Listing response shape.
//!
//! Serializes as `{ "items": [...], "pagination": { "page", "limit", "total", "totalPages" } }`.

use serde::{Deserialize, Serialize};

/// Pagination block of a listing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page number.
    pub page: u64,
    /// Page size.
    pub limit: u32,
    /// Rows matching the predicate across all pages.
    pub total: u64,
    /// `ceil(total / limit)`.
    pub total_pages: u64,
}

impl Pagination {
    /// Computes the pagination block.
    #[must_use]
    pub fn new(page: u64, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit))
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }

    /// Returns whether a page exists after this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Returns whether a page exists before this one.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Rows on this page, at most `pagination.limit`.
    pub items: Vec<T>,
    /// Pagination block.
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Creates a page.
    #[must_use]
    pub const fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self { items, pagination }
    }

    /// Maps the items, keeping the pagination block.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
