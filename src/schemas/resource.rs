//! Resource kinds exposed by the SWC API and its bulk file store.

use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;

use crate::config::BulkFileFormat;

/// Filters every list endpoint accepts.
const COMMON_FILTERS: &[&str] = &["skip", "limit", "min_last_changed_date"];

/// Listable resource collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Leagues,
    Teams,
    Players,
    Performances,
}

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Leagues,
        ResourceType::Teams,
        ResourceType::Players,
        ResourceType::Performances,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Leagues => "leagues",
            ResourceType::Teams => "teams",
            ResourceType::Players => "players",
            ResourceType::Performances => "performances",
        }
    }

    /// Collection endpoint, e.g. `/v0/leagues/`.
    pub fn endpoint(self) -> String {
        format!("/v0/{}/", self.as_str())
    }

    /// Single item endpoint, e.g. `/v0/leagues/7`.
    pub fn item_endpoint(self, id: &str) -> String {
        format!("/v0/{}/{}", self.as_str(), id)
    }

    /// Filter names specific to this resource, in addition to the common ones.
    fn specific_filters(self) -> &'static [&'static str] {
        match self {
            ResourceType::Leagues => &["league_name"],
            ResourceType::Teams => &["team_name", "league_id"],
            ResourceType::Players => &["first_name", "last_name"],
            ResourceType::Performances => &[],
        }
    }

    /// Whether `key` is a filter the list endpoint recognizes.
    pub fn accepts_filter(self, key: &str) -> bool {
        COMMON_FILTERS.contains(&key) || self.specific_filters().contains(&key)
    }

    /// All recognized filter names, common ones first.
    pub fn recognized_filters(self) -> Vec<&'static str> {
        COMMON_FILTERS
            .iter()
            .chain(self.specific_filters())
            .copied()
            .collect()
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown resource type: {}", s))
    }
}

/// A record type served by one of the list/get endpoints.
pub trait Resource: DeserializeOwned {
    const TYPE: ResourceType;
}

/// Bulk data files published alongside the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkFile {
    Players,
    Leagues,
    Performances,
    Teams,
    TeamPlayers,
}

impl BulkFile {
    pub const ALL: [BulkFile; 5] = [
        BulkFile::Players,
        BulkFile::Leagues,
        BulkFile::Performances,
        BulkFile::Teams,
        BulkFile::TeamPlayers,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BulkFile::Players => "players",
            BulkFile::Leagues => "leagues",
            BulkFile::Performances => "performances",
            BulkFile::Teams => "teams",
            BulkFile::TeamPlayers => "team_players",
        }
    }

    fn stem(self) -> &'static str {
        match self {
            BulkFile::Players => "player_data",
            BulkFile::Leagues => "league_data",
            BulkFile::Performances => "performance_data",
            BulkFile::Teams => "team_data",
            BulkFile::TeamPlayers => "team_player_data",
        }
    }

    /// Remote file name, e.g. `player_data.csv`.
    pub fn file_name(self, format: BulkFileFormat) -> String {
        format!("{}{}", self.stem(), format.extension())
    }
}

impl fmt::Display for BulkFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BulkFile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        BulkFile::ALL
            .into_iter()
            .find(|b| b.as_str() == wanted)
            .ok_or_else(|| format!("unknown bulk file: {}", s))
    }
}
