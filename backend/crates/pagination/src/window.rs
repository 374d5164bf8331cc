//! Result window accumulation across pages.

use std::collections::HashSet;
use std::hash::Hash;

use crate::PageSize;

/// Whether a listing may hold rows beyond a page that returned `received` rows.
///
/// Only a full page keeps the listing open; any short page (including an
/// empty one) terminates it.
///
/// # Examples
/// ```
/// use pagination::{PageSize, has_more};
///
/// let size = PageSize::default();
/// assert!(has_more(20, size));
/// assert!(!has_more(19, size));
/// assert!(!has_more(0, size));
/// ```
#[must_use]
pub fn has_more(received: usize, size: PageSize) -> bool {
    usize::try_from(size.get()).is_ok_and(|expected| received == expected)
}

/// Append `page` to `window`, skipping items whose key is already present.
///
/// Arrival order is preserved for the appended items. Returns the number of
/// items appended.
///
/// # Examples
/// ```
/// use pagination::append_unique;
///
/// let mut window = vec![1, 2, 3];
/// let appended = append_unique(&mut window, vec![3, 4, 2, 5], |value| *value);
/// assert_eq!(appended, 2);
/// assert_eq!(window, vec![1, 2, 3, 4, 5]);
/// ```
pub fn append_unique<T, K, I, F>(window: &mut Vec<T>, page: I, key: F) -> usize
where
    I: IntoIterator<Item = T>,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen: HashSet<K> = window.iter().map(&key).collect();
    let before = window.len();
    for item in page {
        if seen.insert(key(&item)) {
            window.push(item);
        }
    }
    window.len() - before
}
