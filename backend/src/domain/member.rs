//! Member data model.
//!
//! A member is one entrant of the alumni directory. Members are created at
//! signup in the pending state, become visible in the directory once an
//! administrator activates them, and edit their own profile afterwards.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of free-text tags a member may carry.
pub const TAGS_MAX: usize = 3;
/// Maximum length of a single tag accepted from signup or profile edits.
pub const TAG_MAX_CHARS: usize = 20;
/// Maximum length of a member name accepted at signup.
pub const NAME_MAX_CHARS: usize = 50;
/// Smallest valid cohort ordinal.
pub const COHORT_MIN: u32 = 1;
/// Largest valid cohort ordinal.
pub const COHORT_MAX: u32 = 999;

/// Validation errors returned by member constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    EmptyId,
    InvalidId,
    EmptyName,
    NameTooLong { max: usize },
    CohortOutOfRange { min: u32, max: u32 },
    EmptyOrganization,
    InvalidPhone,
    TooManyTags { max: usize },
    EmptyTag,
    TagTooLong { max: usize },
    InvalidEmail,
    EmptyRole,
}

impl fmt::Display for MemberValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "member id must not be empty"),
            Self::InvalidId => write!(f, "member id must be a valid UUID"),
            Self::EmptyName => write!(f, "member name must not be empty"),
            Self::NameTooLong { max } => write!(f, "member name must be at most {max} characters"),
            Self::CohortOutOfRange { min, max } => {
                write!(f, "cohort must be between {min} and {max}")
            }
            Self::EmptyOrganization => write!(f, "organization name must not be empty"),
            Self::InvalidPhone => write!(
                f,
                "phone numbers may only contain digits, spaces, hyphens, parentheses, or a leading plus",
            ),
            Self::TooManyTags { max } => write!(f, "a member may have at most {max} tags"),
            Self::EmptyTag => write!(f, "tags must not be empty"),
            Self::TagTooLong { max } => write!(f, "tags must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::EmptyRole => write!(f, "member role must not be empty"),
        }
    }
}

impl std::error::Error for MemberValidationError {}

impl MemberValidationError {
    /// Name of the member field that failed validation.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::InvalidId => "id",
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::CohortOutOfRange { .. } => "cohort",
            Self::EmptyOrganization => "organization",
            Self::InvalidPhone => "phone",
            Self::TooManyTags { .. } | Self::EmptyTag | Self::TagTooLong { .. } => "tags",
            Self::InvalidEmail => "email",
            Self::EmptyRole => "role",
        }
    }
}

/// Stable member identifier shared with the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberId(Uuid);

impl MemberId {
    /// Validate and construct a [`MemberId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, MemberValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(MemberValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(MemberValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| MemberValidationError::InvalidId)
    }

    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`MemberId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<MemberId> for String {
    fn from(value: MemberId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for MemberId {
    type Error = MemberValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Display name of a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberName(String);

impl MemberName {
    /// Validate and construct a name; surrounding whitespace is trimmed.
    pub fn new(name: impl AsRef<str>) -> Result<Self, MemberValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(MemberValidationError::EmptyName);
        }
        if trimmed.chars().count() > NAME_MAX_CHARS {
            return Err(MemberValidationError::NameTooLong {
                max: NAME_MAX_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    fn stored(name: &str) -> Self {
        Self(name.trim().to_owned())
    }
}

impl AsRef<str> for MemberName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for MemberName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Admission cohort (batch ordinal) of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Cohort(u32);

impl Cohort {
    /// Validate and construct a cohort in `COHORT_MIN..=COHORT_MAX`.
    pub fn new(value: u32) -> Result<Self, MemberValidationError> {
        if (COHORT_MIN..=COHORT_MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(MemberValidationError::CohortOutOfRange {
                min: COHORT_MIN,
                max: COHORT_MAX,
            })
        }
    }

    /// Cohort ordinal.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Cohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Cohort> for u32 {
    fn from(value: Cohort) -> Self {
        value.0
    }
}

impl TryFrom<u32> for Cohort {
    type Error = MemberValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static PHONE_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(r"^\+?[0-9][0-9 ()\-]{4,22}[0-9]$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Contact phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate and construct a phone number; surrounding whitespace is trimmed.
    pub fn new(phone: impl AsRef<str>) -> Result<Self, MemberValidationError> {
        let trimmed = phone.as_ref().trim();
        if !phone_regex().is_match(trimmed) {
            return Err(MemberValidationError::InvalidPhone);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Parse an optional phone number, treating blank input as absent.
    pub fn optional(phone: Option<&str>) -> Result<Option<Self>, MemberValidationError> {
        match phone.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => Self::new(value).map(Some),
        }
    }

    fn stored(phone: Option<String>) -> Option<Self> {
        non_blank(phone).map(Self)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Email address shown on the member card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an email address.
    pub fn new(email: impl AsRef<str>) -> Result<Self, MemberValidationError> {
        let trimmed = email.as_ref().trim();
        if !email_regex().is_match(trimmed) {
            return Err(MemberValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Free-text tags describing a member's business.
///
/// ## Invariants
/// - At most [`TAGS_MAX`] entries.
/// - Each entry is trimmed and non-empty.
/// - Entries accepted through [`Tags::new`] are at most [`TAG_MAX_CHARS`] long.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(Vec<String>);

impl Tags {
    /// Validate and construct a tag list.
    pub fn new<I, S>(tags: I) -> Result<Self, MemberValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut validated = Vec::new();
        for tag in tags {
            let trimmed = tag.as_ref().trim();
            if trimmed.is_empty() {
                return Err(MemberValidationError::EmptyTag);
            }
            if trimmed.chars().count() > TAG_MAX_CHARS {
                return Err(MemberValidationError::TagTooLong { max: TAG_MAX_CHARS });
            }
            validated.push(trimmed.to_owned());
        }
        if validated.len() > TAGS_MAX {
            return Err(MemberValidationError::TooManyTags { max: TAGS_MAX });
        }
        Ok(Self(validated))
    }

    fn stored(tags: Vec<String>) -> Self {
        Self(
            tags.into_iter()
                .filter_map(|tag| non_blank(Some(tag)))
                .take(TAGS_MAX)
                .collect(),
        )
    }

    /// Borrow the tags in insertion order.
    pub fn as_slice(&self) -> &[String] {
        self.0.as_slice()
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no tags are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Role of a member, used to partition the directory into tabs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberRole {
    /// Regular alumnus.
    User,
    /// Association administrator.
    Admin,
    /// Named partner organization role.
    Partner(String),
}

impl MemberRole {
    /// Parse a stored role name.
    pub fn parse(role: impl AsRef<str>) -> Result<Self, MemberValidationError> {
        match role.as_ref().trim() {
            "" => Err(MemberValidationError::EmptyRole),
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Ok(Self::Partner(other.to_owned())),
        }
    }

    /// Stored role name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Partner(name) => name.as_str(),
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approval state of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberState {
    /// Signed up and awaiting administrator approval.
    Pending,
    /// Approved and visible in the directory.
    Active,
}

impl MemberState {
    /// Map the stored boolean flag to a state.
    pub const fn from_active(active: bool) -> Self {
        if active { Self::Active } else { Self::Pending }
    }

    /// Whether the member is visible in the directory.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Consent flags gating phone number visibility on the member card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactConsent {
    /// The primary phone number may be shown.
    pub phone: bool,
    /// The secondary (company) phone number may be shown.
    pub secondary_phone: bool,
}

/// Unvalidated member fields, as supplied by signup forms.
///
/// A blank `phone` leaves the member without a primary number.
#[derive(Debug, Clone, Default)]
pub struct MemberDraft {
    pub id: String,
    pub name: String,
    pub cohort: u32,
    pub organization: String,
    pub phone: String,
    pub secondary_phone: Option<String>,
    pub title: Option<String>,
    pub business_type: Option<String>,
    pub avatar_url: Option<String>,
    pub tags: Vec<String>,
    pub email: Option<String>,
    pub consent: ContactConsent,
    pub role: String,
    pub active: bool,
}

/// Member fields read back from the store.
///
/// Rows are trusted as written. They may predate the current signup rules,
/// so [`Member::from_stored`] only normalizes them.
#[derive(Debug, Clone)]
pub struct StoredMember {
    pub id: MemberId,
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
    pub consent: ContactConsent,
    pub role: String,
    pub active: bool,
}

/// Directory member.
///
/// ## Invariants
/// - Members built by [`Member::new`] satisfy every newtype rule.
/// - Members built by [`Member::from_stored`] keep stored values after
///   trimming; the cohort is clamped to `COHORT_MIN..=COHORT_MAX` and extra
///   tags are dropped.
/// - Optional free-text fields are `None` rather than blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    id: MemberId,
    name: MemberName,
    cohort: Cohort,
    organization: String,
    phone: Option<PhoneNumber>,
    secondary_phone: Option<PhoneNumber>,
    title: Option<String>,
    business_type: Option<String>,
    avatar_url: Option<String>,
    tags: Tags,
    email: Option<EmailAddress>,
    consent: ContactConsent,
    role: MemberRole,
    state: MemberState,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

pub(crate) fn organization_name(raw: &str) -> Result<String, MemberValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MemberValidationError::EmptyOrganization);
    }
    Ok(trimmed.to_owned())
}

impl Member {
    /// Validate a draft and build a member.
    ///
    /// # Examples
    /// ```
    /// use alumni_directory::domain::{Member, MemberDraft};
    ///
    /// let member = Member::new(MemberDraft {
    ///     id: "3fa85f64-5717-4562-b3fc-2c963f66afa6".to_owned(),
    ///     name: "Kim Minji".to_owned(),
    ///     cohort: 12,
    ///     organization: "Hanbit Foods".to_owned(),
    ///     phone: "010-1234-5678".to_owned(),
    ///     role: "user".to_owned(),
    ///     active: true,
    ///     ..MemberDraft::default()
    /// })
    /// .expect("valid member");
    /// assert_eq!(member.cohort().get(), 12);
    /// ```
    pub fn new(draft: MemberDraft) -> Result<Self, MemberValidationError> {
        let MemberDraft {
            id,
            name,
            cohort,
            organization,
            phone,
            secondary_phone,
            title,
            business_type,
            avatar_url,
            tags,
            email,
            consent,
            role,
            active,
        } = draft;

        let email = match non_blank(email) {
            Some(raw) => Some(EmailAddress::new(raw)?),
            None => None,
        };

        Ok(Self {
            id: MemberId::new(id)?,
            name: MemberName::new(name)?,
            cohort: Cohort::new(cohort)?,
            organization: organization_name(&organization)?,
            phone: PhoneNumber::optional(Some(&phone))?,
            secondary_phone: PhoneNumber::optional(secondary_phone.as_deref())?,
            title: non_blank(title),
            business_type: non_blank(business_type),
            avatar_url: non_blank(avatar_url),
            tags: Tags::new(tags)?,
            email,
            consent,
            role: MemberRole::parse(role)?,
            state: MemberState::from_active(active),
        })
    }

    /// Rebuild a member from a stored row without the signup rules.
    ///
    /// Reading never fails: a row that was valid when written stays listable
    /// after the write rules tighten.
    pub fn from_stored(stored: StoredMember) -> Self {
        let StoredMember {
            id,
            name,
            cohort,
            organization,
            phone,
            secondary_phone,
            title,
            business_type,
            avatar_url,
            tags,
            email,
            consent,
            role,
            active,
        } = stored;

        let cohort = u32::try_from(cohort).unwrap_or(COHORT_MIN);
        Self {
            id,
            name: MemberName::stored(&name),
            cohort: Cohort(cohort.clamp(COHORT_MIN, COHORT_MAX)),
            organization: organization.trim().to_owned(),
            phone: PhoneNumber::stored(phone),
            secondary_phone: PhoneNumber::stored(secondary_phone),
            title: non_blank(title),
            business_type: non_blank(business_type),
            avatar_url: non_blank(avatar_url),
            tags: Tags::stored(tags),
            email: non_blank(email).map(EmailAddress),
            consent,
            role: MemberRole::parse(&role).unwrap_or(MemberRole::User),
            state: MemberState::from_active(active),
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &MemberId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &MemberName {
        &self.name
    }

    /// Admission cohort.
    pub fn cohort(&self) -> Cohort {
        self.cohort
    }

    /// Organization (company) name.
    pub fn organization(&self) -> &str {
        self.organization.as_str()
    }

    /// Primary phone number, regardless of consent.
    pub fn phone(&self) -> Option<&PhoneNumber> {
        self.phone.as_ref()
    }

    /// Secondary phone number, regardless of consent.
    pub fn secondary_phone(&self) -> Option<&PhoneNumber> {
        self.secondary_phone.as_ref()
    }

    /// Job title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Business-type classification.
    pub fn business_type(&self) -> Option<&str> {
        self.business_type.as_deref()
    }

    /// Stored avatar reference.
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    /// Free-text tags.
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Email address.
    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Phone visibility consent.
    pub fn consent(&self) -> ContactConsent {
        self.consent
    }

    /// Directory role.
    pub fn role(&self) -> &MemberRole {
        &self.role
    }

    /// Approval state.
    pub fn state(&self) -> MemberState {
        self.state
    }

    /// Return a copy in the given approval state.
    #[must_use]
    pub fn with_state(&self, state: MemberState) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }

    /// Return a copy with the member-editable profile fields replaced.
    #[must_use]
    pub fn with_profile(&self, changes: &ProfileChanges) -> Self {
        Self {
            organization: changes.organization.clone(),
            phone: changes.phone.clone(),
            secondary_phone: changes.secondary_phone.clone(),
            title: changes.title.clone(),
            business_type: changes.business_type.clone(),
            avatar_url: changes.avatar_url.clone(),
            tags: changes.tags.clone(),
            consent: changes.consent,
            ..self.clone()
        }
    }
}

/// Unvalidated profile edit submitted by a member.
///
/// A blank `phone` clears the primary number.
#[derive(Debug, Clone, Default)]
pub struct ProfileDraft {
    pub organization: String,
    pub phone: String,
    pub secondary_phone: Option<String>,
    pub title: Option<String>,
    pub business_type: Option<String>,
    pub avatar_url: Option<String>,
    pub tags: Vec<String>,
    pub consent: ContactConsent,
}

/// Validated profile edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileChanges {
    organization: String,
    phone: Option<PhoneNumber>,
    secondary_phone: Option<PhoneNumber>,
    title: Option<String>,
    business_type: Option<String>,
    avatar_url: Option<String>,
    tags: Tags,
    consent: ContactConsent,
}

impl ProfileChanges {
    /// Validate a profile draft.
    pub fn new(draft: ProfileDraft) -> Result<Self, MemberValidationError> {
        Ok(Self {
            organization: organization_name(&draft.organization)?,
            phone: PhoneNumber::optional(Some(&draft.phone))?,
            secondary_phone: PhoneNumber::optional(draft.secondary_phone.as_deref())?,
            title: non_blank(draft.title),
            business_type: non_blank(draft.business_type),
            avatar_url: non_blank(draft.avatar_url),
            tags: Tags::new(draft.tags)?,
            consent: draft.consent,
        })
    }

    /// New organization name.
    pub fn organization(&self) -> &str {
        self.organization.as_str()
    }

    /// New primary phone number; `None` clears it.
    pub fn phone(&self) -> Option<&PhoneNumber> {
        self.phone.as_ref()
    }

    /// New secondary phone number.
    pub fn secondary_phone(&self) -> Option<&PhoneNumber> {
        self.secondary_phone.as_ref()
    }

    /// New job title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// New business-type classification.
    pub fn business_type(&self) -> Option<&str> {
        self.business_type.as_deref()
    }

    /// New avatar reference.
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    /// New tags.
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// New consent flags.
    pub fn consent(&self) -> ContactConsent {
        self.consent
    }
}
