//! Records returned by the SWC API.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Resource, ResourceType};

/// One SportsWorldCentral fantasy league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub league_id: i64,
    pub league_name: String,
    pub scoring_type: String,
    pub last_changed_date: NaiveDateTime,
    #[serde(default)]
    pub teams: Vec<Team>,
}

/// One team in a fantasy league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub league_id: i64,
    pub team_id: i64,
    pub team_name: String,
    pub last_changed_date: NaiveDateTime,
    #[serde(default)]
    pub players: Vec<Player>,
}

/// One NFL player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: i64,
    pub gsis_id: String,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub last_changed_date: NaiveDateTime,
    #[serde(default)]
    pub performances: Vec<Performance>,
}

/// A player's scoring for one NFL week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub performance_id: i64,
    pub player_id: i64,
    pub week_number: String,
    pub fantasy_points: f64,
    pub last_changed_date: NaiveDateTime,
}

/// Element counts reported by `/v0/counts/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub league_count: u64,
    pub team_count: u64,
    pub player_count: u64,
}

/// Outcome of a health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub status: u16,
    /// `message` field of the response body, when present.
    pub message: Option<String>,
}

impl Resource for League {
    const TYPE: ResourceType = ResourceType::Leagues;
}

impl Resource for Team {
    const TYPE: ResourceType = ResourceType::Teams;
}

impl Resource for Player {
    const TYPE: ResourceType = ResourceType::Players;
}

impl Resource for Performance {
    const TYPE: ResourceType = ResourceType::Performances;
}
