//! Listing state guarded by the directory engine.
//!
//! All transitions happen here under the engine's lock; the engine itself only
//! sequences lock acquisition around store calls.

use pagination::{PageCursor, PageSize, append_unique, has_more};

use crate::domain::directory_filter::DirectoryFilter;
use crate::domain::member::{Member, MemberId};

/// Lifecycle phase of the listing for the current filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryPhase {
    /// No filter has been applied yet.
    Idle,
    /// A page request is in flight.
    Loading {
        /// Page being requested.
        page: PageCursor,
    },
    /// The last page was full; more may follow.
    Ready,
    /// A short page ended the listing for this filter.
    Exhausted,
    /// The last page request failed; the same page can be retried.
    Failed,
}

/// Monotonic marker distinguishing the current filter from superseded ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FilterEpoch(u64);

impl FilterEpoch {
    /// Raw epoch counter.
    pub const fn get(self) -> u64 {
        self.0
    }

    const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Identity of one page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct FetchTicket {
    pub(super) epoch: FilterEpoch,
    pub(super) cursor: PageCursor,
}

/// Why a fetch request was not issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No filter has been applied yet.
    Idle,
    /// A fetch for the current filter is already in flight.
    Busy,
    /// The listing ended with a short page.
    Exhausted,
    /// The last fetch succeeded; there is nothing to retry.
    NothingToRetry,
}

/// Result of applying one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageReport {
    /// Page that was applied.
    pub cursor: PageCursor,
    /// Rows returned by the store.
    pub received: usize,
    /// Rows added to the result window after deduplication.
    pub appended: usize,
    /// Whether the listing may continue.
    pub has_more: bool,
}

/// Outcome of a fetch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was fetched and applied.
    Loaded(PageReport),
    /// No request was issued.
    Skipped(SkipReason),
    /// A newer filter replaced the one the response belonged to; the response
    /// was discarded.
    Superseded,
}

/// Message differentiating the listing's empty, terminal, and failed states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingNotice {
    /// Nothing is listed and the user has not narrowed the filter.
    NoData,
    /// The user's search or cohort selection matched nothing.
    NoMatches,
    /// Every matching member has been loaded.
    AllLoaded,
    /// The last page could not be retrieved.
    RetrievalFailed,
}

impl ListingNotice {
    /// User-facing message.
    pub const fn message(self) -> &'static str {
        match self {
            Self::NoData => "No alumni are listed yet.",
            Self::NoMatches => "No alumni match this search.",
            Self::AllLoaded => "All alumni have been loaded.",
            Self::RetrievalFailed => "Alumni could not be loaded. Scroll again to retry.",
        }
    }
}

/// Immutable view of the listing for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySnapshot {
    /// Current phase.
    pub phase: DirectoryPhase,
    /// Active filter.
    pub filter: DirectoryFilter,
    /// Epoch of the active filter.
    pub epoch: FilterEpoch,
    /// Most recently requested page.
    pub cursor: PageCursor,
    /// Whether another page may be requested.
    pub has_more: bool,
    /// Result window in display order.
    pub members: Vec<Member>,
    /// Notice to render below the list, if any.
    pub notice: Option<ListingNotice>,
}

impl DirectorySnapshot {
    /// Identifier of the last rendered member.
    pub fn last_member_id(&self) -> Option<MemberId> {
        self.members.last().map(|member| *member.id())
    }
}

#[derive(Debug)]
pub(super) struct ListingState {
    filter: DirectoryFilter,
    epoch: FilterEpoch,
    cursor: PageCursor,
    members: Vec<Member>,
    has_more: bool,
    in_flight: Option<FetchTicket>,
    last_failed: bool,
    phase: DirectoryPhase,
}

impl ListingState {
    pub(super) fn new() -> Self {
        Self {
            filter: DirectoryFilter::default(),
            epoch: FilterEpoch::default(),
            cursor: PageCursor::first(),
            members: Vec::new(),
            has_more: true,
            in_flight: None,
            last_failed: false,
            phase: DirectoryPhase::Idle,
        }
    }

    pub(super) fn filter(&self) -> &DirectoryFilter {
        &self.filter
    }

    pub(super) fn members(&self) -> &[Member] {
        self.members.as_slice()
    }

    /// Replace the filter and start over at page 0 under a new epoch.
    pub(super) fn reset(&mut self, filter: DirectoryFilter) -> FetchTicket {
        self.filter = filter;
        self.epoch = self.epoch.next();
        self.members.clear();
        self.has_more = true;
        self.last_failed = false;
        self.begin(PageCursor::first())
    }

    pub(super) fn begin(&mut self, cursor: PageCursor) -> FetchTicket {
        let ticket = FetchTicket {
            epoch: self.epoch,
            cursor,
        };
        self.cursor = cursor;
        self.in_flight = Some(ticket);
        self.phase = DirectoryPhase::Loading { page: cursor };
        ticket
    }

    pub(super) fn ensure_idle_slot(&self) -> Result<(), SkipReason> {
        if self.in_flight.is_some() {
            Err(SkipReason::Busy)
        } else {
            Ok(())
        }
    }

    /// A filter is set and nothing is in flight.
    pub(super) fn ensure_fetchable(&self) -> Result<(), SkipReason> {
        if self.phase == DirectoryPhase::Idle {
            return Err(SkipReason::Idle);
        }
        self.ensure_idle_slot()
    }

    /// Cursor `advance` should request, or why it must not.
    pub(super) fn advance_cursor(&self) -> Result<PageCursor, SkipReason> {
        self.ensure_fetchable()?;
        if !self.has_more {
            return Err(SkipReason::Exhausted);
        }
        if self.last_failed {
            Ok(self.cursor)
        } else {
            Ok(self.cursor.next())
        }
    }

    /// Cursor `retry` should request, or why it must not.
    pub(super) fn retry_cursor(&self) -> Result<PageCursor, SkipReason> {
        self.ensure_idle_slot()?;
        if self.last_failed {
            Ok(self.cursor)
        } else {
            Err(SkipReason::NothingToRetry)
        }
    }

    /// Whether `ticket` is the request the state is waiting for.
    pub(super) fn is_current(&self, ticket: FetchTicket) -> bool {
        self.in_flight == Some(ticket)
    }

    pub(super) fn apply_page(
        &mut self,
        ticket: FetchTicket,
        page: Vec<Member>,
        page_size: PageSize,
    ) -> PageReport {
        let received = page.len();
        let appended = if ticket.cursor.is_first() {
            self.members = page;
            received
        } else {
            append_unique(&mut self.members, page, |member| *member.id())
        };

        self.has_more = has_more(received, page_size);
        self.in_flight = None;
        self.last_failed = false;
        self.phase = if self.has_more {
            DirectoryPhase::Ready
        } else {
            DirectoryPhase::Exhausted
        };

        PageReport {
            cursor: ticket.cursor,
            received,
            appended,
            has_more: self.has_more,
        }
    }

    /// Record a failed request without touching the window or `has_more`.
    pub(super) fn fail(&mut self) {
        self.in_flight = None;
        self.last_failed = true;
        self.phase = DirectoryPhase::Failed;
    }

    /// Replace a listed member in place. Returns whether it was listed.
    pub(super) fn replace_member(&mut self, member: &Member) -> bool {
        match self
            .members
            .iter_mut()
            .find(|listed| listed.id() == member.id())
        {
            Some(listed) => {
                *listed = member.clone();
                true
            }
            None => false,
        }
    }

    /// Remove a listed member. Returns whether it was listed.
    pub(super) fn remove_member(&mut self, id: &MemberId) -> bool {
        let before = self.members.len();
        self.members.retain(|member| member.id() != id);
        self.members.len() != before
    }

    fn notice(&self) -> Option<ListingNotice> {
        match self.phase {
            DirectoryPhase::Failed => Some(ListingNotice::RetrievalFailed),
            DirectoryPhase::Idle | DirectoryPhase::Loading { .. } => None,
            DirectoryPhase::Ready | DirectoryPhase::Exhausted if self.members.is_empty() => {
                if self.filter.is_narrowed() {
                    Some(ListingNotice::NoMatches)
                } else {
                    Some(ListingNotice::NoData)
                }
            }
            DirectoryPhase::Exhausted => Some(ListingNotice::AllLoaded),
            DirectoryPhase::Ready => None,
        }
    }

    pub(super) fn snapshot(&self) -> DirectorySnapshot {
        DirectorySnapshot {
            phase: self.phase,
            filter: self.filter.clone(),
            epoch: self.epoch,
            cursor: self.cursor,
            has_more: self.has_more,
            members: self.members.clone(),
            notice: self.notice(),
        }
    }
}
