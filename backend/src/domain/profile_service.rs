//! Member-facing profile editing.
//!
//! Edits are validated in the domain, stamped with the injected clock, and
//! announced on the member event hub so open directory views can refresh the
//! affected entry.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{MemberRepository, MemberRepositoryError};
use crate::domain::{Error, Member, MemberEvent, MemberEventHub, MemberId, ProfileChanges, ProfileDraft};

/// Profile editing service.
#[derive(Clone)]
pub struct ProfileService<R> {
    repository: Arc<R>,
    events: MemberEventHub,
    clock: Arc<dyn Clock>,
}

impl<R> ProfileService<R> {
    /// Create a service publishing on `events`.
    pub fn new(repository: Arc<R>, events: MemberEventHub, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            events,
            clock,
        }
    }
}

impl<R> ProfileService<R>
where
    R: MemberRepository,
{
    fn map_repository_error(error: MemberRepositoryError) -> Error {
        match error {
            MemberRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("member repository unavailable: {message}"))
            }
            MemberRepositoryError::Query { message } => {
                Error::internal(format!("member repository error: {message}"))
            }
            MemberRepositoryError::NotFound { id } => Error::not_found(format!("member {id} not found")),
            MemberRepositoryError::Duplicate { id } => {
                Error::internal(format!("unexpected duplicate member {id}"))
            }
        }
    }

    /// Load the member's own profile.
    pub async fn profile(&self, id: &MemberId) -> Result<Member, Error> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("member {id} not found")))
    }

    /// Validate and store a profile edit, then publish
    /// [`MemberEvent::ProfileUpdated`].
    pub async fn update_profile(&self, id: &MemberId, draft: ProfileDraft) -> Result<Member, Error> {
        let changes = ProfileChanges::new(draft)?;
        let member = self
            .repository
            .update_profile(id, &changes, self.clock.utc())
            .await
            .map_err(Self::map_repository_error)?;

        info!(member_id = %id, "member profile updated");
        self.events.publish(MemberEvent::ProfileUpdated(member.clone()));
        Ok(member)
    }
}
