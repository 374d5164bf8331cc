//! Read-side port for the member directory store.
//!
//! The directory engine composes [`MemberQuery`] values and hands them to this
//! port. Adapters translate the predicate tree into their own query language
//! and must return rows ordered by cohort ascending, then identity ascending,
//! restricted to the query's offset window.

use async_trait::async_trait;

use crate::domain::{Cohort, Member, MemberId, MemberPredicate, MemberQuery};

use super::define_port_error;

define_port_error! {
    /// Errors raised by member directory adapters.
    pub enum MemberDirectoryError {
        /// The store could not be reached or the session was rejected.
        Connection { message: String } => "member directory connection failed: {message}",
        /// The query failed during execution or row conversion.
        Query { message: String } => "member directory query failed: {message}",
    }
}

/// Port for windowed member retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Return at most `query.window().limit()` members matching the predicate,
    /// skipping `query.window().offset()` rows of the ordered result.
    ///
    /// A short (or empty) result is the only end-of-data signal; adapters do
    /// not report totals.
    async fn query_members(&self, query: &MemberQuery) -> Result<Vec<Member>, MemberDirectoryError>;

    /// Fetch one member by identifier regardless of approval state.
    async fn find_member(&self, id: &MemberId) -> Result<Option<Member>, MemberDirectoryError>;

    /// Distinct cohorts of members matching `predicate`, ascending.
    async fn list_cohorts(
        &self,
        predicate: &MemberPredicate,
    ) -> Result<Vec<Cohort>, MemberDirectoryError>;
}
