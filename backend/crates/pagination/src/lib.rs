//! Page-number pagination primitives shared by list endpoints.
//!
//! A [`PageRequest`] is the validated `(page, limit)` window a client asked
//! for. It knows how many rows to skip and take. [`PageInfo`] describes the
//! window relative to the total number of matching rows, and [`Paginated`]
//! is the response envelope rendered as
//! `{ "data": [...], "pagination": { "total", "page", "limit", "totalPages" } }`.
//!
//! # Examples
//! ```
//! use pagination::{PageRequest, Paginated};
//!
//! let request = PageRequest::new(2, 10).expect("valid window");
//! assert_eq!(request.offset(), 10);
//!
//! let page = Paginated::new(vec!["k", "l"], request, 12);
//! assert_eq!(page.pagination.total_pages, 2);
//! ```

use serde::{Deserialize, Serialize};

/// Page number used when a client does not supply one.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when a client does not supply one.
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 100;

/// Validation failures raised by [`PageRequest::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// Page numbers start at one.
    #[error("page must be a positive number")]
    InvalidPage,
    /// The page size falls outside `1..=max`.
    #[error("limit must be between 1 and {max}")]
    InvalidLimit {
        /// Upper bound the limit was checked against.
        max: u32,
    },
}

/// Validated one-based page window.
///
/// ## Invariants
/// - `page >= 1`.
/// - `1 <= limit <= MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Validate and construct a page window.
    ///
    /// # Errors
    /// Returns [`PageRequestError::InvalidPage`] when `page` is zero and
    /// [`PageRequestError::InvalidLimit`] when `limit` is zero or above
    /// [`MAX_LIMIT`].
    pub const fn new(page: u32, limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::InvalidPage);
        }
        if limit == 0 || limit > MAX_LIMIT {
            return Err(PageRequestError::InvalidLimit { max: MAX_LIMIT });
        }
        Ok(Self { page, limit })
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of rows in the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows preceding this page: `(page - 1) * limit`.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Position of a page within the full filtered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Number of rows matching the filters, counted before pagination.
    pub total: u64,
    /// One-based page number that was served.
    pub page: u32,
    /// Page size that was applied.
    pub limit: u32,
    /// `ceil(total / limit)`; zero when nothing matched.
    pub total_pages: u64,
}

impl PageInfo {
    /// Describe `request` against a total row count.
    #[must_use]
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            total,
            page: request.page(),
            limit: request.limit(),
            total_pages: total.div_ceil(u64::from(request.limit())),
        }
    }
}

/// Page of items paired with its [`PageInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items in the page, in the requested order.
    pub data: Vec<T>,
    /// Window metadata.
    pub pagination: PageInfo,
}

impl<T> Paginated<T> {
    /// Wrap a page of items.
    #[must_use]
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            data,
            pagination: PageInfo::new(request, total),
        }
    }
}
