//! PostgreSQL-backed `MemberRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{MemberRepository, MemberRepositoryError};
use crate::domain::{Member, MemberId, MemberState, ProfileChanges, USER_ROLE};

use super::diesel_helpers::{StoreFailure, diesel_failure, pool_failure};
use super::models::{MemberRow, NewMemberRow, ProfileUpdate};
use super::pool::DbPool;
use super::schema::members;

/// Diesel-backed implementation of the `MemberRepository` port.
#[derive(Clone)]
pub struct DieselMemberRepository {
    pool: DbPool,
}

impl DieselMemberRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: StoreFailure, id: &MemberId) -> MemberRepositoryError {
    match failure {
        StoreFailure::Connection(message) => MemberRepositoryError::connection(message),
        StoreFailure::Duplicate => MemberRepositoryError::duplicate(id.to_string()),
        StoreFailure::Query(message) => MemberRepositoryError::query(message),
    }
}

fn found(row: Option<MemberRow>, id: &MemberId) -> Result<Member, MemberRepositoryError> {
    row.map(MemberRow::into_member)
        .ok_or_else(|| MemberRepositoryError::not_found(id.to_string()))
}

#[async_trait]
impl MemberRepository for DieselMemberRepository {
    async fn insert(&self, member: &Member) -> Result<(), MemberRepositoryError> {
        let id = member.id();
        let mut conn = self.pool.get().await.map_err(|err| map_failure(pool_failure(err), id))?;

        diesel::insert_into(members::table)
            .values(&NewMemberRow::from_member(member))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_failure(diesel_failure(err, "insert_member"), id))
    }

    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Member>, MemberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_failure(pool_failure(err), id))?;

        let row: Option<MemberRow> = members::table
            .find(id.as_uuid())
            .select(MemberRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(diesel_failure(err, "find_member"), id))?;

        Ok(row.map(MemberRow::into_member))
    }

    async fn update_profile(
        &self,
        id: &MemberId,
        changes: &ProfileChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Member, MemberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_failure(pool_failure(err), id))?;

        let row: Option<MemberRow> = diesel::update(members::table.find(id.as_uuid()))
            .set(&ProfileUpdate::new(changes, updated_at))
            .returning(MemberRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(diesel_failure(err, "update_profile"), id))?;

        found(row, id)
    }

    async fn set_state(
        &self,
        id: &MemberId,
        state: MemberState,
    ) -> Result<Member, MemberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_failure(pool_failure(err), id))?;

        let row: Option<MemberRow> = diesel::update(members::table.find(id.as_uuid()))
            .set(members::active.eq(state.is_active()))
            .returning(MemberRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(diesel_failure(err, "set_member_state"), id))?;

        found(row, id)
    }

    async fn delete(&self, id: &MemberId) -> Result<(), MemberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_failure(pool_failure(err), id))?;

        let deleted = diesel::delete(members::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_failure(diesel_failure(err, "delete_member"), id))?;

        if deleted == 0 {
            Err(MemberRepositoryError::not_found(id.to_string()))
        } else {
            Ok(())
        }
    }

    async fn list_by_state(&self, state: MemberState) -> Result<Vec<Member>, MemberRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| MemberRepositoryError::connection(err.to_string()))?;

        let rows: Vec<MemberRow> = members::table
            .filter(members::role.eq(USER_ROLE))
            .filter(members::active.eq(state.is_active()))
            .order_by((members::cohort.asc(), members::id.asc()))
            .select(MemberRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| match diesel_failure(err, "list_members_by_state") {
                StoreFailure::Connection(message) => MemberRepositoryError::connection(message),
                StoreFailure::Duplicate | StoreFailure::Query(_) => {
                    MemberRepositoryError::query("failed to list members")
                }
            })?;

        Ok(rows.into_iter().map(MemberRow::into_member).collect())
    }
}
