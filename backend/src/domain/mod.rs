//! Domain primitives, aggregates, and services for the alumni directory.
//!
//! Purpose: Define strongly typed members and filters, the rules mapping
//! directory tabs to store predicates, and the services driving listing,
//! profile editing, and membership administration. Infrastructure is reached
//! only through the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic error payload.
//! - Member (alias to `member::Member`): validated directory member.
//! - DirectoryEngine: filtered, paginated listing with epochs and dedupe.
//! - ScrollSentinel: viewport-driven trigger for the next page.
//! - ProfileService, MembershipAdmin: write-side services publishing
//!   member events.

pub mod directory_engine;
pub mod directory_filter;
pub mod error;
pub mod member;
pub mod member_card;
pub mod member_events;
pub mod member_query;
pub mod membership_admin;
pub mod ports;
pub mod profile_service;
pub mod scroll_sentinel;
pub mod tab_policy;

pub use self::directory_engine::{
    DirectoryEngine, DirectoryPhase, DirectorySnapshot, FetchOutcome, FilterEpoch, ListingNotice,
    PageReport, SkipReason,
};
pub use self::directory_filter::{
    CohortSelection, DirectoryFilter, DirectoryTab, SearchTerm, UnknownTab,
};
pub use self::error::{BlankErrorMessage, Error, ErrorCode};
pub use self::member::{
    Cohort, ContactConsent, EmailAddress, Member, MemberDraft, MemberId, MemberName, MemberRole,
    MemberState, MemberValidationError, PhoneNumber, ProfileChanges, ProfileDraft, StoredMember,
    Tags,
};
pub use self::member_card::MemberCard;
pub use self::member_events::{DEFAULT_EVENT_CAPACITY, MemberEvent, MemberEventHub};
pub use self::member_query::{MemberPredicate, MemberQuery, SearchField};
pub use self::membership_admin::{DeletionReport, MembershipAdmin, SignupDraft};
pub use self::profile_service::ProfileService;
pub use self::scroll_sentinel::ScrollSentinel;
pub use self::tab_policy::{
    ADMIN_ROLE, CohortRange, DEFAULT_PARTNER_ROLES, TabPolicy, TabPolicyError, USER_ROLE,
};
