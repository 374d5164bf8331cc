//! Shared helpers for the Diesel member adapters.
//!
//! - Error classification from pool and Diesel errors
//! - Translation of domain predicate trees into boxed SQL expressions
//! - The ordered, windowed listing query

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Nullable};
use tracing::debug;

use crate::domain::{MemberPredicate, MemberQuery, SearchField};

use super::models::cohort_for_db;
use super::pool::PoolError;
use super::schema::members;

/// Dynamic filter over the members table.
pub(crate) type MemberFilter = Box<dyn BoxableExpression<members::table, Pg, SqlType = Nullable<Bool>>>;

/// Adapter-neutral classification of a persistence failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreFailure {
    /// Pool checkout failed or the connection dropped.
    Connection(String),
    /// A unique constraint rejected the write.
    Duplicate,
    /// Any other query failure.
    Query(String),
}

/// Classify a pool error.
pub(crate) fn pool_failure(error: PoolError) -> StoreFailure {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StoreFailure::Connection(message)
        }
    }
}

/// Classify a Diesel error and emit debug context.
pub(crate) fn diesel_failure(error: diesel::result::Error, operation: &str) -> StoreFailure {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            %operation,
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => StoreFailure::Duplicate,
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StoreFailure::Connection("database connection error".to_owned())
        }
        DieselError::QueryBuilderError(_) => StoreFailure::Query("database query error".to_owned()),
        DieselError::DeserializationError(_) => {
            StoreFailure::Query("database row could not be decoded".to_owned())
        }
        _ => StoreFailure::Query("database error".to_owned()),
    }
}

/// Escape `LIKE` metacharacters so user input matches literally.
pub(crate) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn contains_pattern(needle: &str) -> String {
    format!("%{}%", escape_like(needle))
}

fn constant(value: bool) -> MemberFilter {
    Box::new(value.into_sql::<Bool>().nullable())
}

/// Translate a predicate tree into a SQL filter.
///
/// Empty conjunctions are true and empty disjunctions are false, matching
/// [`MemberPredicate::matches`]. Text containment is case-insensitive.
pub(crate) fn predicate_filter(predicate: &MemberPredicate) -> MemberFilter {
    match predicate {
        MemberPredicate::Active => Box::new(members::active.nullable()),
        MemberPredicate::RoleIn(roles) => Box::new(members::role.eq_any(roles.clone()).nullable()),
        MemberPredicate::CohortBetween { min, max } => Box::new(
            members::cohort
                .between(cohort_for_db(*min), cohort_for_db(*max))
                .nullable(),
        ),
        MemberPredicate::CohortEquals(cohort) => {
            Box::new(members::cohort.eq(cohort_for_db(*cohort)).nullable())
        }
        MemberPredicate::Contains { field, needle } => {
            let pattern = contains_pattern(needle);
            match field {
                SearchField::Name => Box::new(members::name.ilike(pattern).nullable()),
                SearchField::Organization => {
                    Box::new(members::organization.ilike(pattern).nullable())
                }
                SearchField::BusinessType => Box::new(members::business_type.ilike(pattern)),
            }
        }
        MemberPredicate::All(clauses) => clauses
            .iter()
            .map(predicate_filter)
            .reduce(|acc, clause| -> MemberFilter { Box::new(acc.and(clause)) })
            .unwrap_or_else(|| constant(true)),
        MemberPredicate::Any(clauses) => clauses
            .iter()
            .map(predicate_filter)
            .reduce(|acc, clause| -> MemberFilter { Box::new(acc.or(clause)) })
            .unwrap_or_else(|| constant(false)),
    }
}

/// Ordered, windowed listing query for `query`.
pub(crate) fn listing_query(query: &MemberQuery) -> members::BoxedQuery<'static, Pg> {
    let window = query.window();
    members::table
        .into_boxed()
        .filter(predicate_filter(query.predicate()))
        .order_by((members::cohort.asc(), members::id.asc()))
        .offset(i64::try_from(window.offset()).unwrap_or(i64::MAX))
        .limit(i64::from(window.limit()))
}
