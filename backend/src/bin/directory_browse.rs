//! Browse the alumni directory from the command line.
//!
//! Applies a filter, loads the requested number of pages the way an
//! infinite-scroll view would, and prints one JSON member card per line.
//! Without `DIRECTORY_DATABASE_URL` a generated fixture directory is used.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use alumni_directory::config::DirectorySettings;
use alumni_directory::domain::ports::MemberDirectory;
use alumni_directory::domain::{
    CohortSelection, DirectoryEngine, DirectoryFilter, DirectoryTab, FetchOutcome, Member,
    MemberCard, MemberDraft, TabPolicy,
};
use alumni_directory::outbound::memory::InMemoryMemberStore;
use alumni_directory::outbound::persistence::{DbPool, DieselMemberDirectory};
use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

/// `directory-browse` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "directory-browse",
    about = "List alumni directory members page by page",
    version
)]
struct CliArgs {
    /// Free-text search over name, organization, and business type.
    #[arg(long, default_value = "")]
    search: String,
    /// Restrict the listing to one cohort. Invalid values list every cohort.
    #[arg(long, allow_negative_numbers = true)]
    cohort: Option<i64>,
    /// Directory tab: `class` or `business`.
    #[arg(long, default_value = "class")]
    tab: DirectoryTab,
    /// Number of pages to load.
    #[arg(long, default_value_t = 1)]
    pages: u32,
    /// Print the cohort selector options instead of members.
    #[arg(long)]
    cohorts: bool,
    /// Members generated for the fixture directory.
    #[arg(long, value_name = "count", default_value_t = 45)]
    fixture_members: u32,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = DirectorySettings::load_from_iter([OsString::from("directory-browse")])
        .map_err(|error| eyre!("failed to load directory settings: {error}"))?;
    let policy = settings
        .tab_policy()
        .wrap_err("invalid directory tab configuration")?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(async_main(args, settings, policy))
}

async fn async_main(args: CliArgs, settings: DirectorySettings, policy: TabPolicy) -> Result<()> {
    match settings.pool_config() {
        Some(config) => {
            let pool = DbPool::new(config)
                .await
                .wrap_err("failed to create database pool")?;
            let engine = DirectoryEngine::new(Arc::new(DieselMemberDirectory::new(pool)), policy);
            browse(&engine, &args).await
        }
        None => {
            info!(count = args.fixture_members, "using fixture directory");
            let store = InMemoryMemberStore::with_members(fixture_members(args.fixture_members)?);
            let engine = DirectoryEngine::new(Arc::new(store), policy);
            browse(&engine, &args).await
        }
    }
}

async fn browse<D>(engine: &DirectoryEngine<D>, args: &CliArgs) -> Result<()>
where
    D: MemberDirectory,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.cohorts {
        for cohort in engine.available_cohorts().await? {
            writeln!(out, "{cohort}")?;
        }
        return Ok(());
    }

    let filter = DirectoryFilter::new(
        &args.search,
        CohortSelection::from_raw(args.cohort),
        args.tab,
    );
    engine.set_filter(filter).await?;
    for _ in 1..args.pages {
        if let FetchOutcome::Skipped(reason) = engine.advance().await? {
            info!(?reason, "stopped loading pages");
            break;
        }
    }

    let snapshot = engine.snapshot().await;
    for member in &snapshot.members {
        let line = serde_json::to_string(&MemberCard::from(member))
            .wrap_err("failed to serialise member card")?;
        writeln!(out, "{line}")?;
    }
    if let Some(notice) = snapshot.notice {
        writeln!(io::stderr(), "{}", notice.message())?;
    }
    Ok(())
}

fn fixture_members(count: u32) -> Result<Vec<Member>> {
    (1..=count)
        .map(|seed| {
            Member::new(MemberDraft {
                id: Uuid::from_u128(u128::from(seed)).to_string(),
                name: format!("Member {seed:03}"),
                cohort: seed % 12 + 1,
                organization: format!("Organization {seed:03}"),
                phone: format!("010-0000-{seed:04}"),
                role: "user".to_owned(),
                active: true,
                ..MemberDraft::default()
            })
            .map_err(|error| eyre!("invalid fixture member {seed}: {error}"))
        })
        .collect()
}
