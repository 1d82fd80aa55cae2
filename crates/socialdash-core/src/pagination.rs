//! Offset/limit pagination for the post engagement table.
//!
//! The table endpoint takes a zero-based page index as `offset` and the page
//! size as `limit`:
//!
//! ```text
//! { "productType": "...", "offset": 2, "limit": 10 }   // page 3 of size 10
//! ```

use serde::{Deserialize, Serialize};

/// A 1-based page number plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub number: u32,
    pub size: u32,
}

impl PageRequest {
    /// Page 1 of the given size. A zero size is bumped to 1.
    #[must_use]
    pub fn first(size: u32) -> Self {
        Self {
            number: 1,
            size: size.max(1),
        }
    }

    #[must_use]
    pub fn with_number(self, number: u32) -> Self {
        Self { number, ..self }
    }

    /// Zero-based page index sent as `offset`.
    #[must_use]
    pub fn offset(&self) -> u32 {
        self.number.saturating_sub(1)
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.size
    }
}

/// Number of pages needed to show `total` rows at `size` rows per page.
#[must_use]
pub fn total_pages(total: u64, size: u32) -> u64 {
    if size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(size))
}

/// Navigation state for the table pager.
///
/// `total` is `None` until the first page has been loaded; in that state only
/// page 1 is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current: PageRequest,
    pub total: Option<u64>,
}

impl Pagination {
    #[must_use]
    pub fn new(current: PageRequest, total: Option<u64>) -> Self {
        Self { current, total }
    }

    /// Highest reachable page. An empty result set still has page 1.
    #[must_use]
    pub fn last_page(&self) -> u32 {
        let pages = self
            .total
            .map_or(1, |total| total_pages(total, self.current.size).max(1));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Returns the request for page `number`, or `None` when the page is out
    /// of range and the action should be a no-op.
    #[must_use]
    pub fn target(&self, number: u32) -> Option<PageRequest> {
        if number == 0 || number > self.last_page() {
            return None;
        }
        Some(self.current.with_number(number))
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.current.number > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current.number < self.last_page()
    }

    #[must_use]
    pub fn previous(&self) -> Option<PageRequest> {
        self.target(self.current.number.saturating_sub(1))
    }

    #[must_use]
    pub fn next(&self) -> Option<PageRequest> {
        self.target(self.current.number.saturating_add(1))
    }

    #[must_use]
    pub fn first(&self) -> PageRequest {
        self.current.with_number(1)
    }

    #[must_use]
    pub fn last(&self) -> PageRequest {
        self.current.with_number(self.last_page())
    }
}
