//! Business rules mapping directory tabs to member predicates.
//!
//! Cohort boundaries and role sets are association policy and change over
//! time, so they are configuration rather than constants baked into queries.

use crate::domain::directory_filter::{CohortSelection, DirectoryFilter, DirectoryTab};
use crate::domain::member_query::{MemberPredicate, SearchField};

/// Role name of regular alumni.
pub const USER_ROLE: &str = "user";
/// Role name of administrators.
pub const ADMIN_ROLE: &str = "admin";
/// Partner roles listed under the business tab by default.
pub const DEFAULT_PARTNER_ROLES: [&str; 2] = ["콜즈", "중진공"];

/// Errors raised when building a tab policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TabPolicyError {
    /// A range's lower bound exceeds its upper bound.
    #[error("cohort range {min}..={max} is empty")]
    EmptyRange { min: u32, max: u32 },
    /// A configured role name is blank.
    #[error("role names must not be blank")]
    BlankRole,
}

/// Inclusive cohort range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CohortRange {
    min: u32,
    max: u32,
}

impl CohortRange {
    /// Validate and construct `min..=max`.
    pub fn new(min: u32, max: u32) -> Result<Self, TabPolicyError> {
        if min > max {
            return Err(TabPolicyError::EmptyRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lower bound.
    pub const fn min(self) -> u32 {
        self.min
    }

    /// Upper bound.
    pub const fn max(self) -> u32 {
        self.max
    }

    fn predicate(self) -> MemberPredicate {
        MemberPredicate::CohortBetween {
            min: self.min,
            max: self.max,
        }
    }
}

/// Tab-to-predicate mapping.
///
/// - `Class`: role `user` within the class range.
/// - `Business`: any partner role, or `user`/`admin` within the business range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabPolicy {
    class_range: CohortRange,
    business_range: CohortRange,
    partner_roles: Vec<String>,
}

impl Default for TabPolicy {
    fn default() -> Self {
        Self {
            class_range: CohortRange { min: 1, max: 100 },
            business_range: CohortRange { min: 101, max: 200 },
            partner_roles: DEFAULT_PARTNER_ROLES.iter().map(|role| (*role).to_owned()).collect(),
        }
    }
}

impl TabPolicy {
    /// Build a policy from explicit boundaries and partner roles.
    pub fn new<I, S>(
        class_range: CohortRange,
        business_range: CohortRange,
        partner_roles: I,
    ) -> Result<Self, TabPolicyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let partner_roles = partner_roles
            .into_iter()
            .map(|role| {
                let trimmed = role.as_ref().trim();
                if trimmed.is_empty() {
                    Err(TabPolicyError::BlankRole)
                } else {
                    Ok(trimmed.to_owned())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            class_range,
            business_range,
            partner_roles,
        })
    }

    /// Cohorts listed under the class tab.
    pub fn class_range(&self) -> CohortRange {
        self.class_range
    }

    /// Cohorts of regular members listed under the business tab.
    pub fn business_range(&self) -> CohortRange {
        self.business_range
    }

    /// Partner roles listed under the business tab.
    pub fn partner_roles(&self) -> &[String] {
        self.partner_roles.as_slice()
    }

    /// Category predicate for a tab.
    pub fn tab_predicate(&self, tab: DirectoryTab) -> MemberPredicate {
        match tab {
            DirectoryTab::Class => MemberPredicate::All(vec![
                MemberPredicate::role_in([USER_ROLE]),
                self.class_range.predicate(),
            ]),
            DirectoryTab::Business => {
                let members_in_range = MemberPredicate::All(vec![
                    MemberPredicate::role_in([USER_ROLE, ADMIN_ROLE]),
                    self.business_range.predicate(),
                ]);
                let mut alternatives = Vec::with_capacity(2);
                if !self.partner_roles.is_empty() {
                    alternatives.push(MemberPredicate::RoleIn(self.partner_roles.clone()));
                }
                alternatives.push(members_in_range);
                MemberPredicate::Any(alternatives)
            }
        }
    }

    /// Full listing predicate for a filter.
    ///
    /// `Active AND tab AND [cohort = selected] AND [name OR organization OR
    /// business type contains term]`.
    pub fn listing_predicate(&self, filter: &DirectoryFilter) -> MemberPredicate {
        let mut clauses = vec![MemberPredicate::Active, self.tab_predicate(filter.tab())];

        if let CohortSelection::Only(cohort) = filter.cohort() {
            clauses.push(MemberPredicate::CohortEquals(cohort.get()));
        }

        if let Some(term) = filter.search() {
            let needle = term.as_ref();
            clauses.push(MemberPredicate::Any(vec![
                MemberPredicate::contains(SearchField::Name, needle),
                MemberPredicate::contains(SearchField::Organization, needle),
                MemberPredicate::contains(SearchField::BusinessType, needle),
            ]));
        }

        MemberPredicate::All(clauses)
    }

    /// Predicate selecting members whose cohorts populate the cohort selector.
    pub fn cohort_selector_predicate(&self) -> MemberPredicate {
        MemberPredicate::All(vec![
            MemberPredicate::role_in([USER_ROLE]),
            self.class_range.predicate(),
        ])
    }
}
