//! Page-number pagination primitives shared by PostNest listing endpoints.
//!
//! The crate computes page windows over a collection whose total size is
//! known up front (a `count` query) and whose items are fetched with a
//! `skip`/`limit` query. It never talks to storage itself.
//!
//! `paginate` deliberately performs no clamping of the requested page:
//! callers are expected to clamp user input to `>= 1` at the boundary.
//! Passing `0` or a negative page produces a negative [`PageWindow::offset`],
//! which storage adapters must reject or treat as an empty window.
//!
//! # Examples
//! ```
//! use pagination::{PageSize, paginate};
//!
//! let size = PageSize::new(2).expect("non-zero page size");
//! let window = paginate(5, 1, size);
//! assert_eq!(window.total_pages, 3);
//! assert!(window.has_next);
//! assert!(!window.has_prev);
//! ```

use serde::{Deserialize, Serialize};

/// Errors raised when constructing pagination inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// Page size must be at least one item.
    #[error("page size must be greater than zero")]
    ZeroPageSize,
}

/// Number of items per page. Always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct PageSize(u64);

impl PageSize {
    /// Two items per page, the home feed default.
    pub const DEFAULT: Self = Self(2);

    /// Validate and construct a page size.
    ///
    /// # Errors
    /// Returns [`PaginationError::ZeroPageSize`] when `size` is zero.
    pub const fn new(size: u64) -> Result<Self, PaginationError> {
        if size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        Ok(Self(size))
    }

    /// Raw page size.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for PageSize {
    type Error = PaginationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageSize> for u64 {
    fn from(value: PageSize) -> Self {
        value.0
    }
}

/// Window over a collection computed by [`paginate`].
///
/// `offset`/`limit` describe the slice to fetch; the remaining fields are the
/// navigation metadata rendered alongside the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    /// Page number exactly as requested.
    pub current_page: i64,
    /// `ceil(all_count / page_size)`.
    pub total_pages: u64,
    /// Whether items exist beyond this page.
    pub has_next: bool,
    /// Whether items exist before this page.
    pub has_prev: bool,
    /// `current_page + 1`, reported even when `has_next` is false.
    pub next_page: i64,
    /// `current_page - 1`, reported even when `has_prev` is false.
    pub prev_page: i64,
    /// Number of items to skip. Negative when `current_page < 1`.
    pub offset: i64,
    /// Maximum number of items in the window.
    pub limit: u64,
}

impl PageWindow {
    /// Return the skip offset as `usize` when it is usable by a storage
    /// query, or `None` when it is negative or does not fit.
    #[must_use]
    pub fn usable_offset(&self) -> Option<usize> {
        usize::try_from(self.offset).ok()
    }
}

/// Compute the page window for `page` over a collection of `all_count` items.
///
/// No clamping is applied to `page`; see the crate documentation.
///
/// # Examples
/// ```
/// use pagination::{PageSize, paginate};
///
/// let size = PageSize::new(2).expect("non-zero page size");
/// let last = paginate(5, 3, size);
/// assert_eq!(last.total_pages, 3);
/// assert!(!last.has_next);
/// assert!(last.has_prev);
/// assert_eq!(last.offset, 4);
/// ```
#[must_use]
pub fn paginate(all_count: u64, page: i64, page_size: PageSize) -> PageWindow {
    let size = i128::from(page_size.get());
    let count = i128::from(all_count);
    let current = i128::from(page);

    let offset = (current - 1) * size;
    let end = current * size;

    PageWindow {
        current_page: page,
        total_pages: all_count.div_ceil(page_size.get()),
        has_next: end < count,
        has_prev: offset > 0,
        next_page: page.saturating_add(1),
        prev_page: page.saturating_sub(1),
        offset: saturate_i64(offset),
        limit: page_size.get(),
    }
}

fn saturate_i64(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value.is_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Page of items together with its navigation window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items inside the window, in collection order.
    pub items: Vec<T>,
    /// Navigation metadata.
    #[serde(flatten)]
    pub window: PageWindow,
}

impl<T> Page<T> {
    /// Pair items with the window they were fetched for.
    #[must_use]
    pub const fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self { items, window }
    }

    /// Transform every item while keeping the window.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            window: self.window,
        }
    }
}
