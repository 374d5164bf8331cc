//! In-memory member store implementing both read and write member ports.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    MemberDirectory, MemberDirectoryError, MemberRepository, MemberRepositoryError,
};
use crate::domain::{
    Cohort, Member, MemberId, MemberPredicate, MemberQuery, MemberState, ProfileChanges,
    USER_ROLE,
};

const POISONED: &str = "member store lock poisoned";

/// Member store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryMemberStore {
    members: RwLock<BTreeMap<MemberId, Member>>,
}

impl InMemoryMemberStore {
    /// Create a store holding `members`. Later duplicates replace earlier ones.
    pub fn with_members<I>(members: I) -> Self
    where
        I: IntoIterator<Item = Member>,
    {
        let members = members
            .into_iter()
            .map(|member| (*member.id(), member))
            .collect();
        Self {
            members: RwLock::new(members),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<MemberId, Member>>, String> {
        self.members.read().map_err(|_| POISONED.to_owned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<MemberId, Member>>, String> {
        self.members.write().map_err(|_| POISONED.to_owned())
    }

    fn ordered<'a>(
        members: impl Iterator<Item = &'a Member>,
        predicate: &MemberPredicate,
    ) -> Vec<&'a Member> {
        let mut matching: Vec<&Member> = members.filter(|member| predicate.matches(member)).collect();
        matching.sort_by_key(|member| (member.cohort(), *member.id()));
        matching
    }

    fn update<F>(&self, id: &MemberId, change: F) -> Result<Member, MemberRepositoryError>
    where
        F: FnOnce(&Member) -> Member,
    {
        let mut members = self.write().map_err(MemberRepositoryError::query)?;
        let current = members
            .get(id)
            .ok_or_else(|| MemberRepositoryError::not_found(id.to_string()))?;
        let updated = change(current);
        members.insert(*id, updated.clone());
        Ok(updated)
    }
}

#[async_trait]
impl MemberDirectory for InMemoryMemberStore {
    async fn query_members(&self, query: &MemberQuery) -> Result<Vec<Member>, MemberDirectoryError> {
        let members = self.read().map_err(MemberDirectoryError::query)?;
        let window = query.window();
        let offset = usize::try_from(window.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(window.limit()).unwrap_or(usize::MAX);

        Ok(Self::ordered(members.values(), query.predicate())
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_member(&self, id: &MemberId) -> Result<Option<Member>, MemberDirectoryError> {
        let members = self.read().map_err(MemberDirectoryError::query)?;
        Ok(members.get(id).cloned())
    }

    async fn list_cohorts(
        &self,
        predicate: &MemberPredicate,
    ) -> Result<Vec<Cohort>, MemberDirectoryError> {
        let members = self.read().map_err(MemberDirectoryError::query)?;
        let mut cohorts: Vec<Cohort> = members
            .values()
            .filter(|member| predicate.matches(member))
            .map(Member::cohort)
            .collect();
        cohorts.sort_unstable();
        cohorts.dedup();
        Ok(cohorts)
    }
}

#[async_trait]
impl MemberRepository for InMemoryMemberStore {
    async fn insert(&self, member: &Member) -> Result<(), MemberRepositoryError> {
        let mut members = self.write().map_err(MemberRepositoryError::query)?;
        if members.contains_key(member.id()) {
            return Err(MemberRepositoryError::duplicate(member.id().to_string()));
        }
        members.insert(*member.id(), member.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Member>, MemberRepositoryError> {
        let members = self.read().map_err(MemberRepositoryError::query)?;
        Ok(members.get(id).cloned())
    }

    async fn update_profile(
        &self,
        id: &MemberId,
        changes: &ProfileChanges,
        _updated_at: DateTime<Utc>,
    ) -> Result<Member, MemberRepositoryError> {
        self.update(id, |member| member.with_profile(changes))
    }

    async fn set_state(
        &self,
        id: &MemberId,
        state: MemberState,
    ) -> Result<Member, MemberRepositoryError> {
        self.update(id, |member| member.with_state(state))
    }

    async fn delete(&self, id: &MemberId) -> Result<(), MemberRepositoryError> {
        let mut members = self.write().map_err(MemberRepositoryError::query)?;
        members
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| MemberRepositoryError::not_found(id.to_string()))
    }

    async fn list_by_state(&self, state: MemberState) -> Result<Vec<Member>, MemberRepositoryError> {
        let members = self.read().map_err(MemberRepositoryError::query)?;
        let predicate = MemberPredicate::role_in([USER_ROLE]);
        Ok(Self::ordered(members.values(), &predicate)
            .into_iter()
            .filter(|member| member.state() == state)
            .cloned()
            .collect())
    }
}
