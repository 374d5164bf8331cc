//! Port for the viewport-intersection signal driving incremental loading.
//!
//! The rendering layer owns element visibility. The domain only tells it which
//! listing entry to watch; visibility notifications flow back through
//! [`crate::domain::ScrollSentinel::notify_visible`].

use crate::domain::MemberId;

/// Observer registration for rendered directory entries.
#[cfg_attr(test, mockall::automock)]
pub trait ViewportSignal: Send + Sync {
    /// Start reporting when the entry for `element` becomes visible.
    fn observe(&self, element: &MemberId);

    /// Stop reporting visibility for `element`.
    fn unobserve(&self, element: &MemberId);
}
