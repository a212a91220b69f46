// Copyright 2025 SWC Client contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # SWC Client
//!
//! Client SDK for the SportsWorldCentral (SWC) fantasy football API.
//!
//! The client wraps the API's health check, list, get-by-ID and counts
//! endpoints, returning validated record types, and downloads the bulk data
//! files published alongside it. Transient failures (timeouts, connection
//! errors, 5xx responses) can be retried with a linear backoff.
//!
//! ## Example
//!
//! ```rust,no_run
//! use swc_client::{SwcClient, SwcConfig};
//! use swc_client::schemas::{BulkFile, TeamQuery};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Explicit base URL, falling back to SWC_API_BASE_URL and the settings file
//!     let config = SwcConfig::load(Some("http://localhost:8000"))?;
//!     let client = SwcClient::new(config)?;
//!
//!     let counts = client.get_counts().await?;
//!     println!("{} leagues", counts.league_count);
//!
//!     let teams = client
//!         .list_teams(&TeamQuery {
//!             league_id: Some(5001),
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("{} teams", teams.len());
//!
//!     client
//!         .bulk_download(BulkFile::Players, Path::new("player_data.csv"))
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod schemas;

pub use client::{DownloadSummary, RetryPolicy, SwcClient, SwcError};
pub use config::{BulkFileFormat, ConfigError, StoredSettings, SwcConfig};
pub use schemas::{Counts, Filters, HealthStatus, League, Performance, Player, Team};
