//! Per-test databases cloned from a migrated template.
//!
//! The template is named after a hash of `migrations/`, so it is rebuilt
//! whenever a migration changes and reused otherwise. Raw-row helpers use
//! `postgres` directly to seed data the domain constructors would reject.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use alumni_directory::domain::ports::MemberRepositoryError;
use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use postgres::{Client, NoTls};
use uuid::Uuid;

use super::format_postgres_error;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "alumni_template";
const PROVISION_RETRIES: usize = 5;
const PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

fn migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

fn template_database_name() -> Result<String, MemberRepositoryError> {
    let hash = hash_directory(migrations_dir())
        .map_err(|err| MemberRepositoryError::query(format!("hash migrations: {err}")))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, MemberRepositoryError> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| MemberRepositoryError::query(format!("template check: {err:?}")))?;

    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| MemberRepositoryError::query(format!("create template: {err:?}")))?;
        let url = cluster.connection().database_url(&template_name);
        migrate_schema(&url)?;
    }

    Ok(template_name)
}

fn provision_attempt(
    cluster: &ClusterHandle,
    attempt: usize,
) -> Result<TemporaryDatabase, MemberRepositoryError> {
    let template_name = ensure_template_database(cluster).map_err(|error| {
        MemberRepositoryError::query(format!(
            "template check: attempt {attempt}/{PROVISION_RETRIES}: {error}"
        ))
    })?;
    let db_name = format!("test_{}", Uuid::new_v4().simple());
    cluster
        .temporary_database_from_template(db_name.as_str(), template_name.as_str())
        .map_err(|error| {
            MemberRepositoryError::query(format!(
                "create database from template: attempt {attempt}/{PROVISION_RETRIES}: {error:?}"
            ))
        })
}

/// Provision a temporary database with the `members` table in place.
pub fn provision_template_database(
    cluster: &ClusterHandle,
) -> Result<TemporaryDatabase, MemberRepositoryError> {
    let mut last_error = None;
    for attempt in 1..=PROVISION_RETRIES {
        match provision_attempt(cluster, attempt) {
            Ok(database) => return Ok(database),
            Err(error) => last_error = Some(error),
        }
        if attempt < PROVISION_RETRIES {
            std::thread::sleep(PROVISION_RETRY_DELAY);
        }
    }

    Err(last_error.unwrap_or_else(|| {
        MemberRepositoryError::query("create database from template: exhausted retries")
    }))
}

/// Run every pending migration against `url`.
pub fn migrate_schema(url: &str) -> Result<(), MemberRepositoryError> {
    let mut conn = PgConnection::establish(url)
        .map_err(|err| MemberRepositoryError::connection(format!("{err:?}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| MemberRepositoryError::query(format!("migration: {err:?}")))?;
    Ok(())
}

/// Insert an active `user` row verbatim, bypassing signup validation.
pub fn insert_raw_member(
    url: &str,
    id: Uuid,
    cohort: i32,
    phone: &str,
    tags: &[&str],
) -> Result<(), String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let name = format!("Stored {id}");
    let tags: Vec<String> = tags.iter().map(|tag| (*tag).to_owned()).collect();
    client
        .execute(
            concat!(
                "INSERT INTO members (id, name, cohort, organization, phone, tags, role, active) ",
                "VALUES ($1, $2, $3, 'Stored Org', $4, $5, 'user', TRUE)"
            ),
            &[&id, &name, &cohort, &phone, &tags],
        )
        .map(|_| ())
        .map_err(|err| format_postgres_error(&err))
}
