//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{ContactConsent, Member, MemberId, ProfileChanges, StoredMember};

use super::schema::members;

/// Row struct for reading from the members table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MemberRow {
    pub id: Uuid,
    pub name: String,
    pub cohort: i32,
    pub organization: String,
    pub phone: Option<String>,
    pub secondary_phone: Option<String>,
    pub title: Option<String>,
    pub business_type: Option<String>,
    pub avatar_url: Option<String>,
    pub tags: Vec<String>,
    pub email: Option<String>,
    pub phone_consent: bool,
    pub secondary_phone_consent: bool,
    pub role: String,
    pub active: bool,
}

impl MemberRow {
    /// Rebuild the domain member as stored; signup rules are not reapplied.
    pub(crate) fn into_member(self) -> Member {
        Member::from_stored(StoredMember {
            id: MemberId::from_uuid(self.id),
            name: self.name,
            cohort: self.cohort,
            organization: self.organization,
            phone: self.phone,
            secondary_phone: self.secondary_phone,
            title: self.title,
            business_type: self.business_type,
            avatar_url: self.avatar_url,
            tags: self.tags,
            email: self.email,
            consent: ContactConsent {
                phone: self.phone_consent,
                secondary_phone: self.secondary_phone_consent,
            },
            role: self.role,
            active: self.active,
        })
    }
}

/// Insertable struct for creating member records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = members)]
pub(crate) struct NewMemberRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub cohort: i32,
    pub organization: &'a str,
    pub phone: Option<&'a str>,
    pub secondary_phone: Option<&'a str>,
    pub title: Option<&'a str>,
    pub business_type: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub tags: &'a [String],
    pub email: Option<&'a str>,
    pub phone_consent: bool,
    pub secondary_phone_consent: bool,
    pub role: &'a str,
    pub active: bool,
}

impl<'a> NewMemberRow<'a> {
    pub(crate) fn from_member(member: &'a Member) -> Self {
        let consent = member.consent();
        Self {
            id: *member.id().as_uuid(),
            name: member.name().as_ref(),
            cohort: cohort_for_db(member.cohort().get()),
            organization: member.organization(),
            phone: member.phone().map(AsRef::as_ref),
            secondary_phone: member.secondary_phone().map(AsRef::as_ref),
            title: member.title(),
            business_type: member.business_type(),
            avatar_url: member.avatar_url(),
            tags: member.tags().as_slice(),
            email: member.email().map(AsRef::as_ref),
            phone_consent: consent.phone,
            secondary_phone_consent: consent.secondary_phone,
            role: member.role().as_str(),
            active: member.state().is_active(),
        }
    }
}

/// Changeset for member-editable profile fields.
///
/// `None` clears the column rather than leaving it untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = members)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProfileUpdate<'a> {
    pub organization: &'a str,
    pub phone: Option<&'a str>,
    pub secondary_phone: Option<&'a str>,
    pub title: Option<&'a str>,
    pub business_type: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub tags: &'a [String],
    pub phone_consent: bool,
    pub secondary_phone_consent: bool,
    pub updated_at: DateTime<Utc>,
}

impl<'a> ProfileUpdate<'a> {
    pub(crate) fn new(changes: &'a ProfileChanges, updated_at: DateTime<Utc>) -> Self {
        let consent = changes.consent();
        Self {
            organization: changes.organization(),
            phone: changes.phone().map(AsRef::as_ref),
            secondary_phone: changes.secondary_phone().map(AsRef::as_ref),
            title: changes.title(),
            business_type: changes.business_type(),
            avatar_url: changes.avatar_url(),
            tags: changes.tags().as_slice(),
            phone_consent: consent.phone,
            secondary_phone_consent: consent.secondary_phone,
            updated_at,
        }
    }
}

/// Cast a validated cohort (at most 999) to the `Int4` column type.
pub(crate) fn cohort_for_db(cohort: u32) -> i32 {
    i32::try_from(cohort).unwrap_or(i32::MAX)
}
