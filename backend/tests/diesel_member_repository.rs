//! Integration tests for the Diesel member adapters against embedded
//! PostgreSQL.
//!
//! Each test provisions its own database cloned from a migrated template, so
//! rows never leak between cases. Tests are synchronous and drive the async
//! adapters through a runtime owned by the test context.

use std::sync::Arc;

use alumni_directory::domain::ports::{MemberDirectory, MemberRepository, MemberRepositoryError};
use alumni_directory::domain::{
    Cohort, CohortSelection, ContactConsent, DirectoryEngine, DirectoryFilter, DirectoryTab,
    FetchOutcome, Member, MemberDraft, MemberId, MemberQuery, MemberState, PageReport,
    ProfileChanges, ProfileDraft, TabPolicy,
};
use alumni_directory::outbound::persistence::{
    DbPool, DieselMemberDirectory, DieselMemberRepository, PoolConfig,
};
use alumni_directory::test_support::{MemberFixture, class_members, member_id};
use chrono::Utc;
use pagination::{PageCursor, PageSize};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

mod support;

use support::embedded_postgres::insert_raw_member;
use support::{handle_cluster_setup_failure, provision_template_database, shared_cluster};

struct TestContext {
    /// Runtime reused for every adapter call in one test.
    runtime: Runtime,
    repository: DieselMemberRepository,
    directory: DieselMemberDirectory,
    database_url: String,
    _database: TemporaryDatabase,
}

impl TestContext {
    fn insert_all(&self, members: &[Member]) {
        self.runtime.block_on(async {
            for member in members {
                self.repository.insert(member).await.expect("insert member");
            }
        });
    }

    fn engine(&self) -> DirectoryEngine<DieselMemberDirectory> {
        DirectoryEngine::new(Arc::new(self.directory.clone()), TabPolicy::default())
    }
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let temp_db = provision_template_database(cluster).map_err(|err| err.to_string())?;
    let database_url = temp_db.url().to_string();

    let config = PoolConfig::new(database_url.as_str()).with_max_size(2);
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        repository: DieselMemberRepository::new(pool.clone()),
        directory: DieselMemberDirectory::new(pool),
        database_url,
        _database: temp_db,
    })
}

#[fixture]
fn diesel_world() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn class_filter(search: &str) -> DirectoryFilter {
    DirectoryFilter::new(search, CohortSelection::All, DirectoryTab::Class)
}

fn loaded(outcome: FetchOutcome) -> PageReport {
    match outcome {
        FetchOutcome::Loaded(report) => report,
        other => panic!("expected a loaded page, got {other:?}"),
    }
}

fn full_member(seed: u128) -> Member {
    Member::new(MemberDraft {
        id: member_id(seed).to_string(),
        name: "Choi Yuna".to_owned(),
        cohort: 42,
        organization: "Yuna Trading".to_owned(),
        phone: "010-4242-4242".to_owned(),
        secondary_phone: Some("02-555-4242".to_owned()),
        title: Some("Director".to_owned()),
        business_type: Some("import".to_owned()),
        avatar_url: Some("avatars/yuna.png".to_owned()),
        tags: vec!["tea".to_owned(), "ceramics".to_owned()],
        email: Some("yuna@example.com".to_owned()),
        consent: ContactConsent {
            phone: true,
            secondary_phone: false,
        },
        role: "user".to_owned(),
        active: true,
    })
    .expect("valid member")
}

#[rstest]
fn inserted_members_read_back_unchanged(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: inserted_members_read_back_unchanged skipped");
        return;
    };
    let member = full_member(1);
    ctx.insert_all(std::slice::from_ref(&member));

    let (from_repository, from_directory) = ctx.runtime.block_on(async {
        (
            ctx.repository.find_by_id(member.id()).await.expect("find"),
            ctx.directory.find_member(member.id()).await.expect("find"),
        )
    });

    assert_eq!(from_repository.as_ref(), Some(&member));
    assert_eq!(from_directory, Some(member));
}

#[rstest]
fn unknown_members_are_absent(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: unknown_members_are_absent skipped");
        return;
    };

    let (from_repository, from_directory) = ctx.runtime.block_on(async {
        (
            ctx.repository.find_by_id(&member_id(404)).await.expect("find"),
            ctx.directory.find_member(&member_id(404)).await.expect("find"),
        )
    });

    assert!(from_repository.is_none());
    assert!(from_directory.is_none());
}

#[rstest]
fn inserting_an_existing_id_is_a_duplicate(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: inserting_an_existing_id_is_a_duplicate skipped");
        return;
    };
    let member = MemberFixture::new(7).build();
    ctx.insert_all(std::slice::from_ref(&member));

    let err = ctx
        .runtime
        .block_on(ctx.repository.insert(&member))
        .expect_err("second insert");

    assert_eq!(err, MemberRepositoryError::duplicate(member.id().to_string()));
}

#[rstest]
fn profile_updates_clear_omitted_fields(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: profile_updates_clear_omitted_fields skipped");
        return;
    };
    let member = full_member(2);
    ctx.insert_all(std::slice::from_ref(&member));
    let changes = ProfileChanges::new(ProfileDraft {
        organization: "Yuna Logistics".to_owned(),
        phone: String::new(),
        tags: vec!["freight".to_owned()],
        ..ProfileDraft::default()
    })
    .expect("valid changes");

    let (updated, stored) = ctx.runtime.block_on(async {
        let updated = ctx
            .repository
            .update_profile(member.id(), &changes, Utc::now())
            .await
            .expect("update");
        let stored = ctx.repository.find_by_id(member.id()).await.expect("find");
        (updated, stored)
    });

    assert_eq!(updated.organization(), "Yuna Logistics");
    assert!(updated.phone().is_none());
    assert!(updated.secondary_phone().is_none());
    assert!(updated.title().is_none());
    assert!(updated.avatar_url().is_none());
    assert_eq!(updated.tags().as_slice(), ["freight"]);
    assert_eq!(updated.name(), member.name());
    assert_eq!(updated.email(), member.email());
    assert_eq!(stored, Some(updated));
}

#[rstest]
fn approval_toggles_and_pending_listing(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: approval_toggles_and_pending_listing skipped");
        return;
    };
    ctx.insert_all(&[
        MemberFixture::new(1).cohort(9).pending().build(),
        MemberFixture::new(2).cohort(3).pending().build(),
        MemberFixture::new(3).cohort(3).pending().build(),
        MemberFixture::new(4).cohort(1).pending().role("admin").build(),
        MemberFixture::new(5).cohort(1).build(),
    ]);

    let (approved, pending) = ctx.runtime.block_on(async {
        let approved = ctx
            .repository
            .set_state(&member_id(1), MemberState::Active)
            .await
            .expect("approve");
        let pending = ctx
            .repository
            .list_by_state(MemberState::Pending)
            .await
            .expect("list pending");
        (approved, pending)
    });

    assert!(approved.state().is_active());
    let ids: Vec<MemberId> = pending.iter().map(|member| *member.id()).collect();
    assert_eq!(ids, vec![member_id(2), member_id(3)]);
}

#[rstest]
fn deleting_removes_the_row_once(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: deleting_removes_the_row_once skipped");
        return;
    };
    let member = MemberFixture::new(8).build();
    ctx.insert_all(std::slice::from_ref(&member));

    let (second, found) = ctx.runtime.block_on(async {
        ctx.repository.delete(member.id()).await.expect("delete");
        let second = ctx.repository.delete(member.id()).await;
        let found = ctx.repository.find_by_id(member.id()).await.expect("find");
        (second, found)
    });

    assert_eq!(
        second,
        Err(MemberRepositoryError::not_found(member.id().to_string()))
    );
    assert!(found.is_none());
}

#[rstest]
fn writes_to_missing_members_are_not_found(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: writes_to_missing_members_are_not_found skipped");
        return;
    };
    let missing = member_id(99);
    let changes = ProfileChanges::new(ProfileDraft {
        organization: "Nowhere".to_owned(),
        ..ProfileDraft::default()
    })
    .expect("valid changes");

    let (update, state) = ctx.runtime.block_on(async {
        (
            ctx.repository
                .update_profile(&missing, &changes, Utc::now())
                .await,
            ctx.repository.set_state(&missing, MemberState::Active).await,
        )
    });

    let expected = MemberRepositoryError::not_found(missing.to_string());
    assert_eq!(update, Err(expected.clone()));
    assert_eq!(state, Err(expected));
}

#[rstest]
fn listing_pages_follow_cohort_then_identity(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: listing_pages_follow_cohort_then_identity skipped");
        return;
    };
    let mut members = class_members(45);
    ctx.insert_all(&members);
    members.sort_by_key(|member| (member.cohort(), *member.id()));
    let engine = ctx.engine();

    let reports = ctx.runtime.block_on(async {
        vec![
            loaded(engine.set_filter(class_filter("")).await.expect("page 0")),
            loaded(engine.advance().await.expect("page 1")),
            loaded(engine.advance().await.expect("page 2")),
        ]
    });
    let snapshot = ctx.runtime.block_on(engine.snapshot());

    let sizes: Vec<(usize, bool)> = reports
        .iter()
        .map(|report| (report.received, report.has_more))
        .collect();
    assert_eq!(sizes, vec![(20, true), (20, true), (5, false)]);
    let listed: Vec<MemberId> = snapshot.members.iter().map(|member| *member.id()).collect();
    let expected: Vec<MemberId> = members.iter().map(|member| *member.id()).collect();
    assert_eq!(listed, expected);
}

#[rstest]
fn queries_honour_the_offset_window(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: queries_honour_the_offset_window skipped");
        return;
    };
    ctx.insert_all(
        &(1..=7)
            .map(|seed| MemberFixture::new(seed).cohort(4).build())
            .collect::<Vec<_>>(),
    );
    let size = PageSize::new(3).expect("page size");
    let predicate = TabPolicy::default().listing_predicate(&class_filter(""));

    let page = ctx
        .runtime
        .block_on(
            ctx.directory
                .query_members(&MemberQuery::new(predicate, PageCursor::new(1).window(size))),
        )
        .expect("query");

    let ids: Vec<MemberId> = page.iter().map(|member| *member.id()).collect();
    assert_eq!(ids, vec![member_id(4), member_id(5), member_id(6)]);
}

#[rstest]
#[case::percent("50%", 1)]
#[case::underscore("a_b", 3)]
#[case::backslash(r"c\d", 5)]
fn search_treats_like_metacharacters_literally(
    diesel_world: Option<TestContext>,
    #[case] search: &str,
    #[case] expected_seed: u128,
) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: search_treats_like_metacharacters_literally skipped");
        return;
    };
    ctx.insert_all(&[
        MemberFixture::new(1).organization("50% Club").build(),
        MemberFixture::new(2).organization("500 Club").build(),
        MemberFixture::new(3).organization("A_B Corp").build(),
        MemberFixture::new(4).organization("AxB Corp").build(),
        MemberFixture::new(5).organization(r"C\D Works").build(),
        MemberFixture::new(6).organization("CD Works").build(),
    ]);
    let engine = ctx.engine();

    ctx.runtime
        .block_on(engine.set_filter(class_filter(search)))
        .expect("search");
    let snapshot = ctx.runtime.block_on(engine.snapshot());

    let ids: Vec<MemberId> = snapshot.members.iter().map(|member| *member.id()).collect();
    assert_eq!(ids, vec![member_id(expected_seed)]);
}

#[rstest]
fn search_ignores_case_across_fields(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: search_ignores_case_across_fields skipped");
        return;
    };
    ctx.insert_all(&[
        MemberFixture::new(1).name("Bakery Han").build(),
        MemberFixture::new(2).organization("Han's BAKERY").build(),
        MemberFixture::new(3).business_type("bakery supply").build(),
        MemberFixture::new(4).organization("Han Steel").build(),
    ]);
    let engine = ctx.engine();

    ctx.runtime
        .block_on(engine.set_filter(class_filter("Bakery")))
        .expect("search");
    let snapshot = ctx.runtime.block_on(engine.snapshot());

    let ids: Vec<MemberId> = snapshot.members.iter().map(|member| *member.id()).collect();
    assert_eq!(ids, vec![member_id(1), member_id(2), member_id(3)]);
}

#[rstest]
fn cohort_selector_lists_distinct_class_cohorts(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: cohort_selector_lists_distinct_class_cohorts skipped");
        return;
    };
    ctx.insert_all(&[
        MemberFixture::new(1).cohort(3).build(),
        MemberFixture::new(2).cohort(1).build(),
        MemberFixture::new(3).cohort(3).build(),
        MemberFixture::new(4).cohort(150).build(),
        MemberFixture::new(5).cohort(2).role("admin").build(),
    ]);
    let engine = ctx.engine();

    let cohorts = ctx
        .runtime
        .block_on(engine.available_cohorts())
        .expect("cohorts");

    let expected: Vec<Cohort> = [1, 3]
        .into_iter()
        .map(|value| Cohort::new(value).expect("cohort"))
        .collect();
    assert_eq!(cohorts, expected);
}

#[rstest]
#[case::blank_phone("", &["retail"])]
#[case::long_tag("010-1234-5678", &["a tag of 21 chars!!!!"])]
fn rows_outside_signup_rules_still_list(
    diesel_world: Option<TestContext>,
    #[case] phone: &str,
    #[case] tags: &[&str],
) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: rows_outside_signup_rules_still_list skipped");
        return;
    };
    ctx.insert_all(
        &(1..=19)
            .map(|seed| MemberFixture::new(seed).build())
            .collect::<Vec<_>>(),
    );
    insert_raw_member(
        ctx.database_url.as_str(),
        *member_id(20).as_uuid(),
        1,
        phone,
        tags,
    )
    .expect("raw insert");
    let engine = ctx.engine();

    let report = loaded(
        ctx.runtime
            .block_on(engine.set_filter(class_filter("")))
            .expect("page 0"),
    );

    assert_eq!((report.received, report.has_more), (20, true));
    let snapshot = ctx.runtime.block_on(engine.snapshot());
    let stored = snapshot
        .members
        .iter()
        .find(|member| member.id() == &member_id(20))
        .expect("stored row is listed");
    assert_eq!(stored.tags().as_slice(), tags);
}
