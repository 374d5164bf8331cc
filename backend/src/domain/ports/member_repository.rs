//! Write-side port for member lifecycle persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Member, MemberId, MemberState, ProfileChanges};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by member repository adapters.
    pub enum MemberRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "member repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "member repository query failed: {message}",
        /// No member exists with the identifier.
        NotFound { id: String } => "member {id} not found",
        /// A member with the identifier already exists.
        Duplicate { id: String } => "member {id} already exists",
    }
}

/// Port for creating, editing, approving, and deleting members.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Insert a new member.
    async fn insert(&self, member: &Member) -> Result<(), MemberRepositoryError>;

    /// Fetch a member by identifier.
    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Member>, MemberRepositoryError>;

    /// Replace the member-editable profile fields and return the stored member.
    async fn update_profile(
        &self,
        id: &MemberId,
        changes: &ProfileChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Member, MemberRepositoryError>;

    /// Set the approval state and return the stored member.
    async fn set_state(
        &self,
        id: &MemberId,
        state: MemberState,
    ) -> Result<Member, MemberRepositoryError>;

    /// Delete a member row.
    async fn delete(&self, id: &MemberId) -> Result<(), MemberRepositoryError>;

    /// Members of role `user` in the given state, ordered by cohort then identity.
    async fn list_by_state(&self, state: MemberState) -> Result<Vec<Member>, MemberRepositoryError>;
}
