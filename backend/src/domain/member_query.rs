//! Store-neutral member query: a predicate tree, a fixed ordering, and an
//! offset window.
//!
//! Adapters translate [`MemberPredicate`] into their own query language; the
//! in-memory adapter evaluates it directly through [`MemberPredicate::matches`].

use pagination::PageWindow;

use crate::domain::member::Member;

/// Text field searched by [`MemberPredicate::Contains`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    /// Member display name.
    Name,
    /// Organization name.
    Organization,
    /// Business-type classification.
    BusinessType,
}

/// Boolean predicate over members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberPredicate {
    /// The member is approved (visible).
    Active,
    /// The member's role is one of the listed role names.
    RoleIn(Vec<String>),
    /// The member's cohort lies in `min..=max`.
    CohortBetween { min: u32, max: u32 },
    /// The member's cohort equals the value.
    CohortEquals(u32),
    /// Case-insensitive substring match; `needle` is stored lowercased.
    Contains { field: SearchField, needle: String },
    /// Every child matches; an empty list matches everything.
    All(Vec<MemberPredicate>),
    /// At least one child matches; an empty list matches nothing.
    Any(Vec<MemberPredicate>),
}

impl MemberPredicate {
    /// Case-insensitive substring predicate.
    pub fn contains(field: SearchField, needle: &str) -> Self {
        Self::Contains {
            field,
            needle: needle.to_lowercase(),
        }
    }

    /// Role membership predicate.
    pub fn role_in<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::RoleIn(roles.into_iter().map(Into::into).collect())
    }

    /// Evaluate the predicate against a member.
    pub fn matches(&self, member: &Member) -> bool {
        match self {
            Self::Active => member.state().is_active(),
            Self::RoleIn(roles) => roles.iter().any(|role| role == member.role().as_str()),
            Self::CohortBetween { min, max } => (*min..=*max).contains(&member.cohort().get()),
            Self::CohortEquals(cohort) => member.cohort().get() == *cohort,
            Self::Contains { field, needle } => field_value(member, *field)
                .is_some_and(|value| value.to_lowercase().contains(needle.as_str())),
            Self::All(children) => children.iter().all(|child| child.matches(member)),
            Self::Any(children) => children.iter().any(|child| child.matches(member)),
        }
    }
}

fn field_value(member: &Member, field: SearchField) -> Option<&str> {
    match field {
        SearchField::Name => Some(member.name().as_ref()),
        SearchField::Organization => Some(member.organization()),
        SearchField::BusinessType => member.business_type(),
    }
}

/// One windowed listing request.
///
/// Results are always ordered by cohort ascending, then identity ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberQuery {
    predicate: MemberPredicate,
    window: PageWindow,
}

impl MemberQuery {
    /// Build a query for `predicate` restricted to `window`.
    pub fn new(predicate: MemberPredicate, window: PageWindow) -> Self {
        Self { predicate, window }
    }

    /// Filtering predicate.
    pub fn predicate(&self) -> &MemberPredicate {
        &self.predicate
    }

    /// Offset window.
    pub fn window(&self) -> PageWindow {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemberFixture;
    use rstest::rstest;

    #[rstest]
    fn contains_is_case_insensitive_and_skips_missing_fields() {
        let member = MemberFixture::new(1)
            .name("Park Jisoo")
            .organization("Seoul Ceramics")
            .build();

        assert!(MemberPredicate::contains(SearchField::Name, "JISOO").matches(&member));
        assert!(MemberPredicate::contains(SearchField::Organization, "ceram").matches(&member));
        assert!(!MemberPredicate::contains(SearchField::BusinessType, "").matches(&member));
    }

    #[rstest]
    fn empty_combinators_follow_identity_elements() {
        let member = MemberFixture::new(1).build();
        assert!(MemberPredicate::All(Vec::new()).matches(&member));
        assert!(!MemberPredicate::Any(Vec::new()).matches(&member));
    }

    #[rstest]
    #[case(5, true)]
    #[case(10, true)]
    #[case(11, false)]
    fn cohort_ranges_are_inclusive(#[case] cohort: u32, #[case] expected: bool) {
        let member = MemberFixture::new(1).cohort(cohort).build();
        let predicate = MemberPredicate::CohortBetween { min: 5, max: 10 };
        assert_eq!(predicate.matches(&member), expected);
    }

    #[rstest]
    fn pending_members_fail_the_active_predicate() {
        let member = MemberFixture::new(1).pending().build();
        assert!(!MemberPredicate::Active.matches(&member));
        assert!(MemberPredicate::role_in(["user"]).matches(&member));
    }
}
