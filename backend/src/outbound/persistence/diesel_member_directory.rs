//! PostgreSQL-backed `MemberDirectory` implementation using Diesel ORM.
//!
//! Listing queries are built from the domain predicate tree at request time
//! and always return rows ordered by cohort, then identity.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{MemberDirectory, MemberDirectoryError};
use crate::domain::{Cohort, Member, MemberId, MemberPredicate, MemberQuery};

use super::diesel_helpers::{StoreFailure, diesel_failure, listing_query, pool_failure, predicate_filter};
use super::models::MemberRow;
use super::pool::DbPool;
use super::schema::members;

/// Diesel-backed implementation of the `MemberDirectory` port.
#[derive(Clone)]
pub struct DieselMemberDirectory {
    pool: DbPool,
}

impl DieselMemberDirectory {
    /// Create a new directory adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: StoreFailure) -> MemberDirectoryError {
    match failure {
        StoreFailure::Connection(message) => MemberDirectoryError::connection(message),
        StoreFailure::Duplicate => MemberDirectoryError::query("unexpected unique violation"),
        StoreFailure::Query(message) => MemberDirectoryError::query(message),
    }
}

/// Every row becomes a member, so a page keeps its full length and the
/// short-page rule still holds.
fn rows_to_members(rows: Vec<MemberRow>) -> Vec<Member> {
    rows.into_iter().map(MemberRow::into_member).collect()
}

#[async_trait]
impl MemberDirectory for DieselMemberDirectory {
    async fn query_members(&self, query: &MemberQuery) -> Result<Vec<Member>, MemberDirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(pool_failure(err)))?;

        let rows: Vec<MemberRow> = listing_query(query)
            .select(MemberRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_failure(diesel_failure(err, "query_members")))?;

        Ok(rows_to_members(rows))
    }

    async fn find_member(&self, id: &MemberId) -> Result<Option<Member>, MemberDirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(pool_failure(err)))?;

        let row: Option<MemberRow> = members::table
            .find(id.as_uuid())
            .select(MemberRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(diesel_failure(err, "find_member")))?;

        Ok(row.map(MemberRow::into_member))
    }

    async fn list_cohorts(
        &self,
        predicate: &MemberPredicate,
    ) -> Result<Vec<Cohort>, MemberDirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(pool_failure(err)))?;

        let values: Vec<i32> = members::table
            .filter(predicate_filter(predicate))
            .select(members::cohort)
            .distinct()
            .order_by(members::cohort.asc())
            .load(&mut conn)
            .await
            .map_err(|err| map_failure(diesel_failure(err, "list_cohorts")))?;

        Ok(values
            .into_iter()
            .filter_map(|value| {
                let cohort = u32::try_from(value).ok().and_then(|raw| Cohort::new(raw).ok());
                if cohort.is_none() {
                    warn!(cohort = value, "skipping out-of-range cohort");
                }
                cohort
            })
            .collect())
    }
}
