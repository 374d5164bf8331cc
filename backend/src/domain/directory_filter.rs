//! Client-held filter applied to the member directory listing.

use std::fmt;
use std::str::FromStr;

use crate::domain::member::Cohort;

/// Category tab partitioning the directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DirectoryTab {
    /// Regular alumni grouped by cohort.
    #[default]
    Class,
    /// Partner organizations and business-programme cohorts.
    Business,
}

impl DirectoryTab {
    /// Stable tab name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Business => "business",
        }
    }
}

impl fmt::Display for DirectoryTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a tab name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown directory tab: {0}")]
pub struct UnknownTab(pub String);

impl FromStr for DirectoryTab {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "class" => Ok(Self::Class),
            "business" => Ok(Self::Business),
            _ => Err(UnknownTab(s.to_owned())),
        }
    }
}

/// Cohort restriction of the listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CohortSelection {
    /// Every cohort admitted by the tab.
    #[default]
    All,
    /// A single cohort.
    Only(Cohort),
}

impl CohortSelection {
    /// Interpret a raw selector value. Missing or invalid values select all
    /// cohorts.
    ///
    /// # Examples
    /// ```
    /// use alumni_directory::domain::CohortSelection;
    ///
    /// assert_eq!(CohortSelection::from_raw(Some(0)), CohortSelection::All);
    /// assert_ne!(CohortSelection::from_raw(Some(7)), CohortSelection::All);
    /// ```
    pub fn from_raw(raw: Option<i64>) -> Self {
        raw.and_then(|value| u32::try_from(value).ok())
            .and_then(|value| Cohort::new(value).ok())
            .map_or(Self::All, Self::Only)
    }

    /// The selected cohort, if any.
    pub const fn cohort(self) -> Option<Cohort> {
        match self {
            Self::All => None,
            Self::Only(cohort) => Some(cohort),
        }
    }
}

/// Normalised free-text search term.
///
/// ## Invariants
/// - Non-empty, trimmed, and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Normalise raw input; blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_lowercase()))
        }
    }
}

impl AsRef<str> for SearchTerm {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Active query filter for the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DirectoryFilter {
    search: Option<SearchTerm>,
    cohort: CohortSelection,
    tab: DirectoryTab,
}

impl DirectoryFilter {
    /// Build a filter from raw search input, a cohort selection, and a tab.
    pub fn new(search: &str, cohort: CohortSelection, tab: DirectoryTab) -> Self {
        Self {
            search: SearchTerm::parse(search),
            cohort,
            tab,
        }
    }

    /// Normalised search term, if any.
    pub fn search(&self) -> Option<&SearchTerm> {
        self.search.as_ref()
    }

    /// Cohort selection.
    pub fn cohort(&self) -> CohortSelection {
        self.cohort
    }

    /// Selected tab.
    pub fn tab(&self) -> DirectoryTab {
        self.tab
    }

    /// Whether the user narrowed the listing beyond the tab itself.
    pub fn is_narrowed(&self) -> bool {
        self.search.is_some() || self.cohort != CohortSelection::All
    }
}
