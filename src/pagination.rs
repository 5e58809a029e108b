// ABOUTME: Page/limit pagination parameters and response summaries
// ABOUTME: Shared by every listing endpoint in the REST API
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use serde::{Deserialize, Serialize};

/// Default page size for listing endpoints
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Upper bound on requested page sizes
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters accepted by paginated listing endpoints
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationParams {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_limit")]
    pub limit: i64,
}

const fn default_page() -> i64 {
    1
}

const fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PaginationParams {
    /// Page clamped to at least 1
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Limit clamped into [1, `MAX_PAGE_SIZE`]
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset for the requested page
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Pagination summary returned alongside listing results
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationSummary {
    /// Current 1-based page
    pub current: i64,
    /// Total number of pages
    pub total: i64,
    /// Whether a later page exists
    pub has_next: bool,
    /// Whether an earlier page exists
    pub has_prev: bool,
}

impl PaginationSummary {
    /// Build a summary for `total_items` rows under the given parameters
    #[must_use]
    pub fn new(params: &PaginationParams, total_items: i64) -> Self {
        let page = params.page();
        let limit = params.limit();
        let total_pages = (total_items + limit - 1) / limit;
        Self {
            current: page,
            total: total_pages,
            has_next: params.offset() + limit < total_items,
            has_prev: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_math() {
        let params = PaginationParams { page: 3, limit: 10 };
        assert_eq!(params.offset(), 20);
    }

    #[test]
    fn test_page_and_limit_clamped() {
        let params = PaginationParams {
            page: 0,
            limit: 100_000,
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), MAX_PAGE_SIZE);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_summary_boundaries() {
        let params = PaginationParams { page: 1, limit: 10 };
        let summary = PaginationSummary::new(&params, 25);
        assert_eq!(summary.total, 3);
        assert!(summary.has_next);
        assert!(!summary.has_prev);

        let last = PaginationParams { page: 3, limit: 10 };
        let summary = PaginationSummary::new(&last, 25);
        assert!(!summary.has_next);
        assert!(summary.has_prev);
    }

    #[test]
    fn test_summary_empty() {
        let params = PaginationParams::default();
        let summary = PaginationSummary::new(&params, 0);
        assert_eq!(summary.total, 0);
        assert!(!summary.has_next);
        assert!(!summary.has_prev);
    }
}
