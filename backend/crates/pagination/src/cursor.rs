//! Page cursors, page sizes, and the offset windows they describe.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::PaginationError;

/// Number of rows requested per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

const DEFAULT_SIZE: NonZeroU32 = match NonZeroU32::new(DEFAULT_PAGE_SIZE) {
    Some(size) => size,
    None => NonZeroU32::MIN,
};

/// Fixed number of rows requested per page.
///
/// ## Invariants
/// - The size lies in `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageSize(NonZeroU32);

impl PageSize {
    /// Validate and construct a page size.
    ///
    /// # Errors
    /// Returns [`PaginationError::ZeroPageSize`] for zero and
    /// [`PaginationError::PageSizeTooLarge`] above [`MAX_PAGE_SIZE`].
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageSize, PaginationError};
    ///
    /// assert_eq!(PageSize::new(25).map(PageSize::get), Ok(25));
    /// assert_eq!(PageSize::new(0), Err(PaginationError::ZeroPageSize));
    /// ```
    pub const fn new(size: u32) -> Result<Self, PaginationError> {
        if size > MAX_PAGE_SIZE {
            return Err(PaginationError::PageSizeTooLarge {
                requested: size,
                max: MAX_PAGE_SIZE,
            });
        }
        match NonZeroU32::new(size) {
            Some(value) => Ok(Self(value)),
            None => Err(PaginationError::ZeroPageSize),
        }
    }

    /// Number of rows per page.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(DEFAULT_SIZE)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl From<PageSize> for u32 {
    fn from(value: PageSize) -> Self {
        value.get()
    }
}

impl TryFrom<u32> for PageSize {
    type Error = PaginationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Zero-based index of a page within a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(u32);

impl PageCursor {
    /// Cursor addressing the page at `index`.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Cursor addressing the first page.
    #[must_use]
    pub const fn first() -> Self {
        Self(0)
    }

    /// Zero-based page index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Whether this cursor addresses the first page.
    #[must_use]
    pub const fn is_first(self) -> bool {
        self.0 == 0
    }

    /// Cursor addressing the following page.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Offset window requested from a store for this cursor.
    #[must_use]
    pub const fn window(self, size: PageSize) -> PageWindow {
        PageWindow {
            offset: self.0 as u64 * size.get() as u64,
            limit: size,
        }
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {}", self.0)
    }
}

/// Offset and limit requested from a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageWindow {
    offset: u64,
    limit: PageSize,
}

impl PageWindow {
    /// Number of rows skipped before the window starts.
    #[must_use]
    pub const fn offset(self) -> u64 {
        self.offset
    }

    /// Maximum number of rows in the window.
    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit.get()
    }

    /// Page size the window was derived from.
    #[must_use]
    pub const fn page_size(self) -> PageSize {
        self.limit
    }

    /// Inclusive index of the last row in the window, for range-style stores.
    #[must_use]
    pub const fn last_row(self) -> u64 {
        self.offset + self.limit.get() as u64 - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, 19)]
    #[case(1, 20, 39)]
    #[case(2, 40, 59)]
    fn windows_follow_the_cursor(
        #[case] index: u32,
        #[case] offset: u64,
        #[case] last_row: u64,
    ) {
        let window = PageCursor::new(index).window(PageSize::default());
        assert_eq!(window.offset(), offset);
        assert_eq!(window.last_row(), last_row);
        assert_eq!(window.limit(), DEFAULT_PAGE_SIZE);
    }

    #[rstest]
    fn large_cursors_do_not_overflow_the_offset() {
        let size = PageSize::new(MAX_PAGE_SIZE).expect("valid page size");
        let window = PageCursor::new(u32::MAX).window(size);
        assert_eq!(window.offset(), u64::from(u32::MAX) * u64::from(MAX_PAGE_SIZE));
    }

    #[rstest]
    fn next_saturates_at_the_last_index() {
        assert_eq!(PageCursor::new(u32::MAX).next(), PageCursor::new(u32::MAX));
        assert_eq!(PageCursor::first().next().index(), 1);
    }

    #[rstest]
    #[case(0, Err(PaginationError::ZeroPageSize))]
    #[case(101, Err(PaginationError::PageSizeTooLarge { requested: 101, max: MAX_PAGE_SIZE }))]
    #[case(1, Ok(1))]
    #[case(100, Ok(100))]
    fn page_size_bounds(#[case] raw: u32, #[case] expected: Result<u32, PaginationError>) {
        assert_eq!(PageSize::new(raw).map(PageSize::get), expected);
    }

    #[rstest]
    fn page_size_deserialisation_validates() {
        let parsed: Result<PageSize, _> = serde_json::from_str("0");
        assert!(parsed.is_err());
        let parsed: PageSize = serde_json::from_str("20").expect("valid page size");
        assert_eq!(parsed, PageSize::default());
    }
}
