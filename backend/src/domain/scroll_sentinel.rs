//! Binds the viewport signal to the last rendered directory entry.
//!
//! The sentinel watches exactly one element: the last member of the result
//! window while more pages may follow. When that element becomes visible the
//! sentinel asks the engine to advance, at most once per bound element and
//! loaded page. A failed fetch re-arms it so scrolling back into view retries
//! the page. A page that only repeats listed members also re-arms it, since
//! the last element stays put while more pages may follow.

use std::sync::Arc;

use pagination::PageCursor;
use tracing::debug;

use crate::domain::ports::{MemberDirectory, ViewportSignal};
use crate::domain::{
    DirectoryEngine, DirectoryPhase, DirectorySnapshot, Error, FetchOutcome, FilterEpoch, MemberId,
};

/// Viewport-driven trigger for [`DirectoryEngine::advance`].
pub struct ScrollSentinel {
    signal: Arc<dyn ViewportSignal>,
    bound: Option<MemberId>,
    armed: bool,
    settled_page: Option<(FilterEpoch, PageCursor)>,
}

impl ScrollSentinel {
    /// Create a sentinel that is not yet watching anything.
    pub fn new(signal: Arc<dyn ViewportSignal>) -> Self {
        Self {
            signal,
            bound: None,
            armed: false,
            settled_page: None,
        }
    }

    /// Element currently observed.
    pub fn bound(&self) -> Option<MemberId> {
        self.bound
    }

    /// Re-bind to the last rendered entry of `snapshot`.
    ///
    /// Nothing is observed once the listing is exhausted or before a filter
    /// is applied. Syncing the same loaded page twice does not re-arm.
    pub fn sync(&mut self, snapshot: &DirectorySnapshot) {
        let target = if snapshot.has_more && snapshot.phase != DirectoryPhase::Idle {
            snapshot.last_member_id()
        } else {
            None
        };
        let newly_loaded = snapshot.phase == DirectoryPhase::Ready
            && self.settled_page != Some((snapshot.epoch, snapshot.cursor));
        if snapshot.phase == DirectoryPhase::Ready {
            self.settled_page = Some((snapshot.epoch, snapshot.cursor));
        }

        if target != self.bound {
            if let Some(previous) = self.bound.take() {
                self.signal.unobserve(&previous);
            }
            if let Some(element) = target {
                self.signal.observe(&element);
            }
            self.bound = target;
            self.armed = target.is_some();
        } else if snapshot.phase == DirectoryPhase::Failed || newly_loaded {
            if newly_loaded {
                debug!(cursor = snapshot.cursor.index(), "page kept the last entry; re-arming");
            }
            self.armed = self.bound.is_some();
        }
    }

    /// Record that `element` became visible. Returns whether a fetch should
    /// be triggered.
    pub fn on_visible(&mut self, element: &MemberId) -> bool {
        if self.armed && self.bound.as_ref() == Some(element) {
            self.armed = false;
            true
        } else {
            false
        }
    }

    /// Handle a visibility notification by advancing `engine` when the bound
    /// element became visible, then re-bind to the updated window.
    ///
    /// Returns `Ok(None)` when the notification did not trigger a fetch.
    pub async fn notify_visible<D>(
        &mut self,
        engine: &DirectoryEngine<D>,
        element: &MemberId,
    ) -> Result<Option<FetchOutcome>, Error>
    where
        D: MemberDirectory,
    {
        if !self.on_visible(element) {
            debug!(%element, "ignoring visibility of unbound or spent element");
            return Ok(None);
        }

        let outcome = engine.advance().await;
        self.sync(&engine.snapshot().await);
        outcome.map(Some)
    }

    /// Stop observing the bound element.
    pub fn disconnect(&mut self) {
        if let Some(element) = self.bound.take() {
            self.signal.unobserve(&element);
        }
        self.armed = false;
        self.settled_page = None;
    }
}

impl Drop for ScrollSentinel {
    fn drop(&mut self) {
        self.disconnect();
    }
}
