//! Filtered, paginated member listing for infinite scroll.
//!
//! The engine owns the result window for one directory view. Each filter
//! change opens a new epoch and restarts at page 0; responses belonging to a
//! superseded epoch are discarded. At most one page request is in flight at a
//! time, and a short page is the only end-of-data signal.
//!
//! The state lock is never held across a store call: a fetch takes a ticket
//! under the lock, releases it for the query, and re-acquires it to apply the
//! page only if the ticket is still current.

mod state;


use std::sync::Arc;

use pagination::{PageCursor, PageSize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::ports::{MemberDirectory, MemberDirectoryError};
use crate::domain::{
    Cohort, DirectoryFilter, Error, MemberCard, MemberEvent, MemberId, MemberQuery, TabPolicy,
};

use state::{FetchTicket, ListingState};
pub use state::{
    DirectoryPhase, DirectorySnapshot, FetchOutcome, FilterEpoch, ListingNotice, PageReport,
    SkipReason,
};

const LOAD_FAILURE_MESSAGE: &str = "failed to load members";

/// Directory query engine over a [`MemberDirectory`] store.
pub struct DirectoryEngine<D> {
    directory: Arc<D>,
    policy: TabPolicy,
    page_size: PageSize,
    state: Mutex<ListingState>,
}

impl<D> DirectoryEngine<D> {
    /// Create an idle engine using the default page size of 20.
    pub fn new(directory: Arc<D>, policy: TabPolicy) -> Self {
        Self::with_page_size(directory, policy, PageSize::default())
    }

    /// Create an idle engine with an explicit page size.
    pub fn with_page_size(directory: Arc<D>, policy: TabPolicy, page_size: PageSize) -> Self {
        Self {
            directory,
            policy,
            page_size,
            state: Mutex::new(ListingState::new()),
        }
    }

    /// Page size used for every request.
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Current view of the listing.
    pub async fn snapshot(&self) -> DirectorySnapshot {
        self.state.lock().await.snapshot()
    }

    /// Reflect a member lifecycle event in the result window.
    ///
    /// Listed members are replaced in place or removed when they leave the
    /// active set. Members not yet listed are left for a later page. Returns
    /// whether the window changed.
    pub async fn apply_event(&self, event: &MemberEvent) -> bool {
        let mut state = self.state.lock().await;
        match event {
            MemberEvent::ProfileUpdated(member) | MemberEvent::StateChanged(member) => {
                if member.state().is_active() {
                    state.replace_member(member)
                } else {
                    state.remove_member(member.id())
                }
            }
            MemberEvent::Deleted(id) => state.remove_member(id),
        }
    }
}

impl<D> DirectoryEngine<D>
where
    D: MemberDirectory,
{
    fn map_directory_error(error: MemberDirectoryError) -> Error {
        match error {
            MemberDirectoryError::Connection { .. } => {
                Error::service_unavailable(LOAD_FAILURE_MESSAGE)
            }
            MemberDirectoryError::Query { .. } => Error::internal(LOAD_FAILURE_MESSAGE),
        }
    }

    fn query_for(&self, filter: &DirectoryFilter, cursor: PageCursor) -> MemberQuery {
        MemberQuery::new(
            self.policy.listing_predicate(filter),
            cursor.window(self.page_size),
        )
    }

    /// Replace the filter, clear the window, and load page 0 under a new epoch.
    ///
    /// Any request still in flight for the previous filter is superseded and
    /// its response will be discarded.
    pub async fn set_filter(&self, filter: DirectoryFilter) -> Result<FetchOutcome, Error> {
        let (ticket, query) = {
            let mut state = self.state.lock().await;
            let ticket = state.reset(filter);
            debug!(
                epoch = ticket.epoch.get(),
                search = ?state.filter().search(),
                tab = %state.filter().tab(),
                "directory filter replaced"
            );
            (ticket, self.query_for(state.filter(), ticket.cursor))
        };
        self.run(ticket, query).await
    }

    /// Load `cursor` for the current filter.
    ///
    /// Page 0 replaces the window; later pages are appended without
    /// duplicating listed members. Returns [`SkipReason::Idle`] before a
    /// filter is set and [`SkipReason::Busy`] while another request is in
    /// flight.
    pub async fn fetch_page(&self, cursor: PageCursor) -> Result<FetchOutcome, Error> {
        let (ticket, query) = {
            let mut state = self.state.lock().await;
            if let Err(reason) = state.ensure_fetchable() {
                debug!(?reason, page = cursor.index(), "directory fetch skipped");
                return Ok(FetchOutcome::Skipped(reason));
            }
            let ticket = state.begin(cursor);
            (ticket, self.query_for(state.filter(), cursor))
        };
        self.run(ticket, query).await
    }

    /// Load the page after the last loaded one.
    ///
    /// After a failure the failed page is requested again. No request is
    /// issued while busy, before a filter is set, or once the listing is
    /// exhausted.
    pub async fn advance(&self) -> Result<FetchOutcome, Error> {
        let (ticket, query) = {
            let mut state = self.state.lock().await;
            let cursor = match state.advance_cursor() {
                Ok(cursor) => cursor,
                Err(reason) => {
                    debug!(?reason, "directory advance skipped");
                    return Ok(FetchOutcome::Skipped(reason));
                }
            };
            let ticket = state.begin(cursor);
            (ticket, self.query_for(state.filter(), cursor))
        };
        self.run(ticket, query).await
    }

    /// Re-request the page whose retrieval failed.
    pub async fn retry(&self) -> Result<FetchOutcome, Error> {
        let (ticket, query) = {
            let mut state = self.state.lock().await;
            let cursor = match state.retry_cursor() {
                Ok(cursor) => cursor,
                Err(reason) => return Ok(FetchOutcome::Skipped(reason)),
            };
            let ticket = state.begin(cursor);
            (ticket, self.query_for(state.filter(), cursor))
        };
        self.run(ticket, query).await
    }

    async fn run(&self, ticket: FetchTicket, query: MemberQuery) -> Result<FetchOutcome, Error> {
        let result = self.directory.query_members(&query).await;

        let mut state = self.state.lock().await;
        if !state.is_current(ticket) {
            debug!(
                epoch = ticket.epoch.get(),
                page = ticket.cursor.index(),
                "discarding superseded directory page"
            );
            return Ok(FetchOutcome::Superseded);
        }

        match result {
            Ok(page) => {
                let report = state.apply_page(ticket, page, self.page_size);
                debug!(
                    page = report.cursor.index(),
                    received = report.received,
                    appended = report.appended,
                    has_more = report.has_more,
                    "directory page applied"
                );
                Ok(FetchOutcome::Loaded(report))
            }
            Err(error) => {
                warn!(
                    page = ticket.cursor.index(),
                    error = %error,
                    "directory page retrieval failed"
                );
                state.fail();
                Err(Self::map_directory_error(error))
            }
        }
    }

    /// Detail card for a listed or stored member.
    ///
    /// Pending and unknown members are reported as not found.
    pub async fn select_member(&self, id: &MemberId) -> Result<MemberCard, Error> {
        let listed = {
            let state = self.state.lock().await;
            state
                .members()
                .iter()
                .find(|member| member.id() == id)
                .map(MemberCard::from)
        };
        if let Some(card) = listed {
            return Ok(card);
        }

        let member = self
            .directory
            .find_member(id)
            .await
            .map_err(Self::map_directory_error)?;
        member
            .filter(|member| member.state().is_active())
            .map(|member| MemberCard::from(&member))
            .ok_or_else(|| Error::not_found(format!("member {id} not found")))
    }

    /// Cohorts offered by the cohort selector, ascending.
    pub async fn available_cohorts(&self) -> Result<Vec<Cohort>, Error> {
        self.directory
            .list_cohorts(&self.policy.cohort_selector_predicate())
            .await
            .map_err(Self::map_directory_error)
    }
}
