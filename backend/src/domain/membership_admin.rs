//! Administrative membership lifecycle: signup, approval, and deletion.
//!
//! New signups are stored as pending `user` members and stay out of the
//! directory until an administrator approves them. Deletion removes stored
//! avatars, the member row, then the sign-in identity.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::ports::{
    AvatarStorage, AvatarStorageError, IdentityDirectory, IdentityDirectoryError, MemberRepository,
    MemberRepositoryError,
};
use crate::domain::{
    ContactConsent, Error, Member, MemberDraft, MemberEvent, MemberEventHub, MemberId, MemberState,
    USER_ROLE,
};

/// Details collected by the signup form.
#[derive(Debug, Clone, Default)]
pub struct SignupDraft {
    /// Identifier issued by the identity provider.
    pub id: String,
    pub name: String,
    pub cohort: u32,
    pub organization: String,
    pub phone: String,
    pub email: Option<String>,
    pub consent: ContactConsent,
}

/// Outcome of deleting a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionReport {
    /// Avatar objects removed from storage.
    pub avatars_removed: usize,
}

/// Membership administration service.
#[derive(Clone)]
pub struct MembershipAdmin<R, A, I> {
    repository: Arc<R>,
    avatars: Arc<A>,
    identities: Arc<I>,
    events: MemberEventHub,
}

impl<R, A, I> MembershipAdmin<R, A, I> {
    /// Create a service publishing on `events`.
    pub fn new(repository: Arc<R>, avatars: Arc<A>, identities: Arc<I>, events: MemberEventHub) -> Self {
        Self {
            repository,
            avatars,
            identities,
            events,
        }
    }
}

impl<R, A, I> MembershipAdmin<R, A, I>
where
    R: MemberRepository,
    A: AvatarStorage,
    I: IdentityDirectory,
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
                Error::invalid_request(format!("member {id} is already registered"))
            }
        }
    }

    fn map_avatar_error(error: AvatarStorageError) -> Error {
        match error {
            AvatarStorageError::Connection { message } => {
                Error::service_unavailable(format!("avatar storage unavailable: {message}"))
            }
            AvatarStorageError::Operation { message } => {
                Error::internal(format!("avatar removal failed: {message}"))
            }
        }
    }

    fn map_identity_error(error: IdentityDirectoryError) -> Error {
        match error {
            IdentityDirectoryError::Connection { message } => {
                Error::service_unavailable(format!("identity provider unavailable: {message}"))
            }
            IdentityDirectoryError::Rejected { message } => {
                Error::internal(format!("identity removal failed: {message}"))
            }
        }
    }

    /// Register a new member awaiting approval.
    pub async fn sign_up(&self, draft: SignupDraft) -> Result<Member, Error> {
        let member = Member::new(MemberDraft {
            id: draft.id,
            name: draft.name,
            cohort: draft.cohort,
            organization: draft.organization,
            phone: draft.phone,
            email: draft.email,
            consent: draft.consent,
            role: USER_ROLE.to_owned(),
            active: false,
            ..MemberDraft::default()
        })?;

        self.repository
            .insert(&member)
            .await
            .map_err(Self::map_repository_error)?;
        info!(member_id = %member.id(), cohort = member.cohort().get(), "member signed up");
        Ok(member)
    }

    /// Approve (`true`) or suspend (`false`) a member and publish
    /// [`MemberEvent::StateChanged`].
    pub async fn set_active(&self, id: &MemberId, active: bool) -> Result<Member, Error> {
        let member = self
            .repository
            .set_state(id, MemberState::from_active(active))
            .await
            .map_err(Self::map_repository_error)?;
        info!(member_id = %id, active, "member approval state changed");
        self.events.publish(MemberEvent::StateChanged(member.clone()));
        Ok(member)
    }

    /// Pending `user` members ordered by cohort.
    pub async fn list_pending(&self) -> Result<Vec<Member>, Error> {
        self.repository
            .list_by_state(MemberState::Pending)
            .await
            .map_err(Self::map_repository_error)
    }

    /// Delete a member with their avatars and identity, then publish
    /// [`MemberEvent::Deleted`].
    pub async fn delete_member(&self, id: &MemberId) -> Result<DeletionReport, Error> {
        if self
            .repository
            .find_by_id(id)
            .await
            .map_err(Self::map_repository_error)?
            .is_none()
        {
            return Err(Error::not_found(format!("member {id} not found")));
        }

        let avatars_removed = self.avatars.remove_avatars(id).await.map_err(|err| {
            warn!(member_id = %id, error = %err, "avatar removal failed");
            Self::map_avatar_error(err)
        })?;
        self.repository.delete(id).await.map_err(|err| {
            warn!(member_id = %id, error = %err, "member row removal failed");
            Self::map_repository_error(err)
        })?;
        self.identities.delete_identity(id).await.map_err(|err| {
            warn!(member_id = %id, error = %err, "identity removal failed");
            Self::map_identity_error(err)
        })?;

        info!(member_id = %id, avatars_removed, "member deleted");
        self.events.publish(MemberEvent::Deleted(*id));
        Ok(DeletionReport { avatars_removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockAvatarStorage, MockIdentityDirectory, MockMemberRepository};
    use crate::test_support::{MemberFixture, member_id};
    use mockall::Sequence;
    use rstest::{fixture, rstest};

    type Admin = MembershipAdmin<MockMemberRepository, MockAvatarStorage, MockIdentityDirectory>;

    fn admin(
        repo: MockMemberRepository,
        avatars: MockAvatarStorage,
        identities: MockIdentityDirectory,
        events: MemberEventHub,
    ) -> Admin {
        MembershipAdmin::new(Arc::new(repo), Arc::new(avatars), Arc::new(identities), events)
    }

    #[fixture]
    fn signup() -> SignupDraft {
        SignupDraft {
            id: member_id(7).to_string(),
            name: "Park Jisoo".to_owned(),
            cohort: 31,
            organization: "Jisoo Textiles".to_owned(),
            phone: "010-7777-8888".to_owned(),
            ..SignupDraft::default()
        }
    }

    #[rstest]
    #[tokio::test]
    async fn signups_are_pending_users(signup: SignupDraft) {
        let mut repo = MockMemberRepository::new();
        repo.expect_insert()
            .withf(|member| member.state() == MemberState::Pending && member.role().as_str() == USER_ROLE)
            .times(1)
            .returning(|_| Ok(()));

        let member = admin(
            repo,
            MockAvatarStorage::new(),
            MockIdentityDirectory::new(),
            MemberEventHub::default(),
        )
        .sign_up(signup)
        .await
        .expect("signup");

        assert!(member.tags().is_empty());
        assert!(!member.state().is_active());
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_signups_are_invalid_requests(signup: SignupDraft) {
        let mut repo = MockMemberRepository::new();
        repo.expect_insert()
            .times(1)
            .returning(|member| Err(MemberRepositoryError::duplicate(member.id().to_string())));

        let err = admin(
            repo,
            MockAvatarStorage::new(),
            MockIdentityDirectory::new(),
            MemberEventHub::default(),
        )
        .sign_up(signup)
        .await
        .expect_err("duplicate");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn approval_publishes_state_change() {
        let mut repo = MockMemberRepository::new();
        repo.expect_set_state()
            .withf(|_, state| *state == MemberState::Active)
            .times(1)
            .returning(|_, _| Ok(MemberFixture::new(3).build()));
        let events = MemberEventHub::default();
        let mut receiver = events.subscribe();

        let member = admin(repo, MockAvatarStorage::new(), MockIdentityDirectory::new(), events)
            .set_active(&member_id(3), true)
            .await
            .expect("approve");

        assert_eq!(
            receiver.recv().await.expect("event"),
            MemberEvent::StateChanged(member)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn deletion_removes_avatars_row_then_identity() {
        let mut sequence = Sequence::new();
        let mut repo = MockMemberRepository::new();
        let mut avatars = MockAvatarStorage::new();
        let mut identities = MockIdentityDirectory::new();

        repo.expect_find_by_id()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(Some(MemberFixture::new(4).build())));
        avatars
            .expect_remove_avatars()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(2));
        repo.expect_delete()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(()));
        identities
            .expect_delete_identity()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(()));
        let events = MemberEventHub::default();
        let mut receiver = events.subscribe();

        let report = admin(repo, avatars, identities, events)
            .delete_member(&member_id(4))
            .await
            .expect("delete");

        assert_eq!(report.avatars_removed, 2);
        assert_eq!(
            receiver.recv().await.expect("event"),
            MemberEvent::Deleted(member_id(4))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_unknown_members_touches_nothing() {
        let mut repo = MockMemberRepository::new();
        repo.expect_find_by_id().times(1).returning(|_| Ok(None));
        repo.expect_delete().never();
        let mut avatars = MockAvatarStorage::new();
        avatars.expect_remove_avatars().never();

        let err = admin(repo, avatars, MockIdentityDirectory::new(), MemberEventHub::default())
            .delete_member(&member_id(5))
            .await
            .expect_err("missing");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn avatar_outage_stops_deletion() {
        let mut repo = MockMemberRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(MemberFixture::new(6).build())));
        repo.expect_delete().never();
        let mut avatars = MockAvatarStorage::new();
        avatars
            .expect_remove_avatars()
            .returning(|_| Err(AvatarStorageError::connection("timeout")));
        let mut identities = MockIdentityDirectory::new();
        identities.expect_delete_identity().never();

        let err = admin(repo, avatars, identities, MemberEventHub::default())
            .delete_member(&member_id(6))
            .await
            .expect_err("outage");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn pending_members_are_listed() {
        let mut repo = MockMemberRepository::new();
        repo.expect_list_by_state()
            .withf(|state| *state == MemberState::Pending)
            .returning(|_| Ok(vec![MemberFixture::new(8).pending().build()]));

        let pending = admin(
            repo,
            MockAvatarStorage::new(),
            MockIdentityDirectory::new(),
            MemberEventHub::default(),
        )
        .list_pending()
        .await
        .expect("pending");

        assert_eq!(pending.len(), 1);
    }
}
