//! Offset pagination primitives for directory listings.
//!
//! Listings request fixed-size windows from a store by zero-based page index.
//! A store never reports a total count: a page shorter than the page size is
//! the only signal that the listing is exhausted. Results accumulated across
//! pages are deduplicated by identity so overlapping windows (rows inserted or
//! reordered between requests) never produce duplicate entries.
//!
//! # Examples
//! ```
//! use pagination::{PageCursor, PageSize, has_more};
//!
//! let size = PageSize::default();
//! let window = PageCursor::new(2).window(size);
//! assert_eq!(window.offset(), 40);
//! assert_eq!(window.limit(), 20);
//! assert!(!has_more(5, size));
//! ```

mod cursor;
mod window;

pub use cursor::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageCursor, PageSize, PageWindow};
pub use window::{append_unique, has_more};

/// Errors raised while constructing pagination values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// A page size of zero was requested.
    #[error("page size must be greater than zero")]
    ZeroPageSize,
    /// The requested page size exceeds [`MAX_PAGE_SIZE`].
    #[error("page size {requested} exceeds the maximum of {max}")]
    PageSizeTooLarge {
        /// Requested page size.
        requested: u32,
        /// Largest accepted page size.
        max: u32,
    },
}
