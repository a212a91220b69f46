//! List filters and typed query builders.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::ResourceType;
use crate::client::SwcError;

/// Page size used by the typed queries when none is given.
pub const DEFAULT_LIMIT: u32 = 100;

const INTEGER_FILTERS: &[&str] = &["skip", "limit", "league_id"];
const DATE_FILTERS: &[&str] = &["min_last_changed_date"];

/// Query-string filters for a list call.
///
/// Keys are checked against the target resource by [`Filters::validate`]
/// before any request is sent.
///
/// # Example
/// ```
/// use swc_client::schemas::{Filters, ResourceType};
///
/// let filters = Filters::new()
///     .with("limit", 10)
///     .with_opt("league_name", None::<&str>);
/// assert_eq!(filters.len(), 1);
/// assert!(filters.validate(ResourceType::Leagues).is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    params: BTreeMap<String, String>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Add a filter only when `value` is present.
    pub fn with_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Check every key is recognized by `resource` and every value is well formed.
    pub fn validate(&self, resource: ResourceType) -> Result<(), SwcError> {
        for (key, value) in self.iter() {
            if !resource.accepts_filter(key) {
                return Err(SwcError::Validation(format!(
                    "unrecognized filter '{}' for {} (expected one of: {})",
                    key,
                    resource,
                    resource.recognized_filters().join(", ")
                )));
            }
            if value.trim().is_empty() {
                return Err(SwcError::Validation(format!(
                    "filter '{}' for {} must not be empty",
                    key, resource
                )));
            }
            if INTEGER_FILTERS.contains(&key) && value.parse::<u64>().is_err() {
                return Err(SwcError::Validation(format!(
                    "filter '{}' must be a non-negative integer, got {:?}",
                    key, value
                )));
            }
            if DATE_FILTERS.contains(&key) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err()
            {
                return Err(SwcError::Validation(format!(
                    "filter '{}' must be a YYYY-MM-DD date, got {:?}",
                    key, value
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn as_query(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

fn paging(skip: u32, limit: u32, min_last_changed_date: Option<NaiveDate>) -> Filters {
    Filters::new()
        .with("skip", skip)
        .with("limit", limit)
        .with_opt(
            "min_last_changed_date",
            min_last_changed_date.map(|d| d.format("%Y-%m-%d")),
        )
}

/// Filters for `/v0/leagues/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueQuery {
    pub skip: u32,
    pub limit: u32,
    pub min_last_changed_date: Option<NaiveDate>,
    pub league_name: Option<String>,
}

impl Default for LeagueQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
            min_last_changed_date: None,
            league_name: None,
        }
    }
}

impl From<&LeagueQuery> for Filters {
    fn from(q: &LeagueQuery) -> Self {
        paging(q.skip, q.limit, q.min_last_changed_date)
            .with_opt("league_name", q.league_name.as_deref())
    }
}

/// Filters for `/v0/teams/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamQuery {
    pub skip: u32,
    pub limit: u32,
    pub min_last_changed_date: Option<NaiveDate>,
    pub team_name: Option<String>,
    pub league_id: Option<i64>,
}

impl Default for TeamQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
            min_last_changed_date: None,
            team_name: None,
            league_id: None,
        }
    }
}

impl From<&TeamQuery> for Filters {
    fn from(q: &TeamQuery) -> Self {
        paging(q.skip, q.limit, q.min_last_changed_date)
            .with_opt("team_name", q.team_name.as_deref())
            .with_opt("league_id", q.league_id)
    }
}

/// Filters for `/v0/players/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerQuery {
    pub skip: u32,
    pub limit: u32,
    pub min_last_changed_date: Option<NaiveDate>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Default for PlayerQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
            min_last_changed_date: None,
            first_name: None,
            last_name: None,
        }
    }
}

impl From<&PlayerQuery> for Filters {
    fn from(q: &PlayerQuery) -> Self {
        paging(q.skip, q.limit, q.min_last_changed_date)
            .with_opt("first_name", q.first_name.as_deref())
            .with_opt("last_name", q.last_name.as_deref())
    }
}

/// Filters for `/v0/performances/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceQuery {
    pub skip: u32,
    pub limit: u32,
    pub min_last_changed_date: Option<NaiveDate>,
}

impl Default for PerformanceQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
            min_last_changed_date: None,
        }
    }
}

impl From<&PerformanceQuery> for Filters {
    fn from(q: &PerformanceQuery) -> Self {
        paging(q.skip, q.limit, q.min_last_changed_date)
    }
}
