//! Test-only builders for directory members.
//!
//! Compiled for unit tests and, through the `test-support` feature, for the
//! behavioural suites under `tests/`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::domain::ports::{
    MemberDirectory, MemberDirectoryError, MemberRepository, MemberRepositoryError, ViewportSignal,
};
use crate::domain::{
    Cohort, ContactConsent, Member, MemberDraft, MemberId, MemberPredicate, MemberQuery,
    MemberState, ProfileChanges,
};

/// Deterministic member identifier derived from `seed`.
///
/// Identifiers sort in seed order, matching the store's identity ordering.
pub fn member_id(seed: u128) -> MemberId {
    MemberId::from_uuid(Uuid::from_u128(seed))
}

/// Builder producing valid members with overridable fields.
#[derive(Debug, Clone)]
pub struct MemberFixture {
    draft: MemberDraft,
}

impl MemberFixture {
    /// Start an active `user` member in cohort 1 identified by `seed`.
    pub fn new(seed: u128) -> Self {
        Self {
            draft: MemberDraft {
                id: member_id(seed).to_string(),
                name: format!("Member {seed}"),
                cohort: 1,
                organization: format!("Organization {seed}"),
                phone: "010-0000-0000".to_owned(),
                role: "user".to_owned(),
                active: true,
                ..MemberDraft::default()
            },
        }
    }

    /// Override the display name.
    pub fn name(mut self, name: &str) -> Self {
        self.draft.name = name.to_owned();
        self
    }

    /// Override the cohort.
    pub fn cohort(mut self, cohort: u32) -> Self {
        self.draft.cohort = cohort;
        self
    }

    /// Override the organization name.
    pub fn organization(mut self, organization: &str) -> Self {
        self.draft.organization = organization.to_owned();
        self
    }

    /// Set the business-type classification.
    pub fn business_type(mut self, business_type: &str) -> Self {
        self.draft.business_type = Some(business_type.to_owned());
        self
    }

    /// Override the role name.
    pub fn role(mut self, role: &str) -> Self {
        self.draft.role = role.to_owned();
        self
    }

    /// Mark the member as awaiting approval.
    pub fn pending(mut self) -> Self {
        self.draft.active = false;
        self
    }

    /// Set the primary phone number; blank leaves it unset.
    pub fn phone(mut self, phone: &str) -> Self {
        self.draft.phone = phone.to_owned();
        self
    }

    /// Set the secondary phone number.
    pub fn secondary_phone(mut self, phone: &str) -> Self {
        self.draft.secondary_phone = Some(phone.to_owned());
        self
    }

    /// Set the avatar reference.
    pub fn avatar_url(mut self, url: &str) -> Self {
        self.draft.avatar_url = Some(url.to_owned());
        self
    }

    /// Set the email address.
    pub fn email(mut self, email: &str) -> Self {
        self.draft.email = Some(email.to_owned());
        self
    }

    /// Override the consent flags.
    pub fn consent(mut self, phone: bool, secondary_phone: bool) -> Self {
        self.draft.consent = ContactConsent {
            phone,
            secondary_phone,
        };
        self
    }

    /// Build the member, panicking on invalid overrides.
    pub fn build(self) -> Member {
        Member::new(self.draft).unwrap_or_else(|err| panic!("fixture member must be valid: {err}"))
    }
}

/// `count` active class members with seeds `1..=count`, spread over cohorts
/// 1 to 5.
pub fn class_members(count: u128) -> Vec<Member> {
    (1..=count)
        .map(|seed| {
            let cohort = u32::try_from(seed % 5).unwrap_or(0) + 1;
            MemberFixture::new(seed).cohort(cohort).build()
        })
        .collect()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("test support mutex poisoned"),
    }
}

/// Handle pausing one directory query until released.
#[derive(Debug, Clone, Default)]
pub struct QueryGate {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

impl QueryGate {
    /// Wait until the held query has reached the store.
    pub async fn started(&self) {
        self.started.notified().await;
    }

    /// Let the held query complete.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

/// Directory wrapper that injects failures and pauses queries on demand.
#[derive(Debug)]
pub struct ScriptedDirectory<D> {
    inner: D,
    failures: Mutex<VecDeque<MemberDirectoryError>>,
    gate: Mutex<Option<QueryGate>>,
    queries: AtomicUsize,
}

impl<D> ScriptedDirectory<D> {
    /// Wrap `inner` without scripted behaviour.
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            failures: Mutex::new(VecDeque::new()),
            gate: Mutex::new(None),
            queries: AtomicUsize::new(0),
        }
    }

    /// Fail the next listing query with `error`.
    pub fn fail_next(&self, error: MemberDirectoryError) {
        lock(&self.failures).push_back(error);
    }

    /// Pause the next listing query until the returned gate is released.
    pub fn hold_next(&self) -> QueryGate {
        let gate = QueryGate::default();
        *lock(&self.gate) = Some(gate.clone());
        gate
    }

    /// Listing queries received so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Wrapped store.
    pub fn inner(&self) -> &D {
        &self.inner
    }
}

#[async_trait]
impl<D> MemberDirectory for ScriptedDirectory<D>
where
    D: MemberDirectory,
{
    async fn query_members(&self, query: &MemberQuery) -> Result<Vec<Member>, MemberDirectoryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let failure = lock(&self.failures).pop_front();
        let gate = lock(&self.gate).take();
        if let Some(gate) = gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }
        match failure {
            Some(error) => Err(error),
            None => self.inner.query_members(query).await,
        }
    }

    async fn find_member(&self, id: &MemberId) -> Result<Option<Member>, MemberDirectoryError> {
        self.inner.find_member(id).await
    }

    async fn list_cohorts(
        &self,
        predicate: &MemberPredicate,
    ) -> Result<Vec<Cohort>, MemberDirectoryError> {
        self.inner.list_cohorts(predicate).await
    }
}

#[async_trait]
impl<D> MemberRepository for ScriptedDirectory<D>
where
    D: MemberRepository,
{
    async fn insert(&self, member: &Member) -> Result<(), MemberRepositoryError> {
        self.inner.insert(member).await
    }

    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Member>, MemberRepositoryError> {
        self.inner.find_by_id(id).await
    }

    async fn update_profile(
        &self,
        id: &MemberId,
        changes: &ProfileChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Member, MemberRepositoryError> {
        self.inner.update_profile(id, changes, updated_at).await
    }

    async fn set_state(
        &self,
        id: &MemberId,
        state: MemberState,
    ) -> Result<Member, MemberRepositoryError> {
        self.inner.set_state(id, state).await
    }

    async fn delete(&self, id: &MemberId) -> Result<(), MemberRepositoryError> {
        self.inner.delete(id).await
    }

    async fn list_by_state(&self, state: MemberState) -> Result<Vec<Member>, MemberRepositoryError> {
        self.inner.list_by_state(state).await
    }
}

/// Viewport signal recording which entry is observed.
#[derive(Debug, Default)]
pub struct RecordingViewport {
    observed: Mutex<Vec<MemberId>>,
    history: Mutex<Vec<(bool, MemberId)>>,
}

impl RecordingViewport {
    /// Entries currently observed.
    pub fn observed(&self) -> Vec<MemberId> {
        lock(&self.observed).clone()
    }

    /// `(observe, element)` calls in order.
    pub fn history(&self) -> Vec<(bool, MemberId)> {
        lock(&self.history).clone()
    }
}

impl ViewportSignal for RecordingViewport {
    fn observe(&self, element: &MemberId) {
        lock(&self.observed).push(*element);
        lock(&self.history).push((true, *element));
    }

    fn unobserve(&self, element: &MemberId) {
        lock(&self.observed).retain(|observed| observed != element);
        lock(&self.history).push((false, *element));
    }
}
