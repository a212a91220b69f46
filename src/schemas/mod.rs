//! Typed records, resource kinds and list filters for the SWC API.

mod filters;
mod records;
mod resource;

pub use filters::{Filters, LeagueQuery, PerformanceQuery, PlayerQuery, TeamQuery, DEFAULT_LIMIT};
pub use records::{Counts, HealthStatus, League, Performance, Player, Team};
pub use resource::{BulkFile, Resource, ResourceType};
