//! Read-only member card shown when a directory entry is selected.

use serde::Serialize;

use crate::domain::member::Member;

/// Detail projection of a member.
///
/// Phone numbers are present only when the member consented to showing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberCard {
    /// Member identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Admission cohort.
    pub cohort: u32,
    /// Organization name.
    pub organization: String,
    /// Job title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Business-type classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    /// Avatar reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Free-text tags.
    pub tags: Vec<String>,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Primary phone, when consented.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Secondary phone, when consented and present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_phone: Option<String>,
}

impl From<&Member> for MemberCard {
    fn from(member: &Member) -> Self {
        let consent = member.consent();
        Self {
            id: member.id().to_string(),
            name: member.name().to_string(),
            cohort: member.cohort().get(),
            organization: member.organization().to_owned(),
            title: member.title().map(str::to_owned),
            business_type: member.business_type().map(str::to_owned),
            avatar_url: member.avatar_url().map(str::to_owned),
            tags: member.tags().as_slice().to_vec(),
            email: member.email().map(|email| email.as_ref().to_owned()),
            phone: member
                .phone()
                .filter(|_| consent.phone)
                .map(|phone| phone.as_ref().to_owned()),
            secondary_phone: member
                .secondary_phone()
                .filter(|_| consent.secondary_phone)
                .map(|phone| phone.as_ref().to_owned()),
        }
    }
}
