//! Directory configuration loaded via OrthoConfig.
//!
//! Values come from `DIRECTORY_*` environment variables or configuration
//! files. Tab boundaries and partner roles are association policy, so they
//! live here rather than in queries.

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{CohortRange, DEFAULT_PARTNER_ROLES, TabPolicy, TabPolicyError};
use crate::outbound::persistence::PoolConfig;

const DEFAULT_CLASS_MIN_COHORT: u32 = 1;
const DEFAULT_CLASS_MAX_COHORT: u32 = 100;
const DEFAULT_BUSINESS_MIN_COHORT: u32 = 101;
const DEFAULT_BUSINESS_MAX_COHORT: u32 = 200;

/// Configuration values for the directory and its store.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DIRECTORY")]
pub struct DirectorySettings {
    /// PostgreSQL connection URL. Without one the fixture store is used.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    pub pool_max_size: Option<u32>,
    /// First cohort listed under the class tab.
    pub class_min_cohort: Option<u32>,
    /// Last cohort listed under the class tab.
    pub class_max_cohort: Option<u32>,
    /// First business-programme cohort.
    pub business_min_cohort: Option<u32>,
    /// Last business-programme cohort.
    pub business_max_cohort: Option<u32>,
    /// Comma-separated partner roles listed under the business tab.
    pub partner_roles: Option<String>,
}

impl DirectorySettings {
    /// Partner roles, falling back to the association defaults.
    ///
    /// An explicitly empty value disables partner listings.
    pub fn partner_roles(&self) -> Vec<String> {
        match self.partner_roles.as_deref() {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .map(str::to_owned)
                .collect(),
            None => DEFAULT_PARTNER_ROLES
                .iter()
                .map(|role| (*role).to_owned())
                .collect(),
        }
    }

    /// Build the tab policy from configured boundaries.
    pub fn tab_policy(&self) -> Result<TabPolicy, TabPolicyError> {
        let class = CohortRange::new(
            self.class_min_cohort.unwrap_or(DEFAULT_CLASS_MIN_COHORT),
            self.class_max_cohort.unwrap_or(DEFAULT_CLASS_MAX_COHORT),
        )?;
        let business = CohortRange::new(
            self.business_min_cohort
                .unwrap_or(DEFAULT_BUSINESS_MIN_COHORT),
            self.business_max_cohort
                .unwrap_or(DEFAULT_BUSINESS_MAX_COHORT),
        )?;
        TabPolicy::new(class, business, self.partner_roles())
    }

    /// Pool configuration, when a database URL is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let config = PoolConfig::new(self.database_url.as_deref()?);
        Some(match self.pool_max_size {
            Some(max_size) => config.with_max_size(max_size),
            None => config,
        })
    }
}
