//! Client for the SportsWorldCentral fantasy football API.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::{RetryPolicy, SwcError};
use crate::config::SwcConfig;
use crate::schemas::{
    BulkFile, Counts, Filters, HealthStatus, League, LeagueQuery, Performance, PerformanceQuery,
    Player, PlayerQuery, Resource, ResourceType, Team, TeamQuery,
};

/// Endpoint polled by [`SwcClient::health_check`].
pub const HEALTH_CHECK_ENDPOINT: &str = "/";
/// Endpoint returning record totals.
pub const GET_COUNTS_ENDPOINT: &str = "/v0/counts/";

/// Result of a completed bulk download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub url: String,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Client for the SWC API.
///
/// Holds only its immutable configuration and a connection pool; every call
/// is independent of the ones before it.
///
/// # Example
/// ```rust,no_run
/// use swc_client::{SwcClient, SwcConfig};
/// use swc_client::schemas::LeagueQuery;
///
/// # async fn example() -> Result<(), swc_client::SwcError> {
/// let client = SwcClient::new(SwcConfig::new("http://localhost:8000"))?;
/// let health = client.health_check().await?;
/// println!("healthy: {}", health.healthy);
///
/// let leagues = client.list_leagues(&LeagueQuery::default()).await?;
/// println!("{} leagues", leagues.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SwcClient {
    config: SwcConfig,
    retry: RetryPolicy,
    client: Client,
}

impl SwcClient {
    /// Create a new client with the given configuration.
    pub fn new(config: SwcConfig) -> Result<Self, SwcError> {
        config.validate()?;
        tracing::debug!("Bulk file base URL: {}", config.bulk_base_url);
        tracing::debug!("SWC client configuration: {}", config);

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            retry: RetryPolicy::from_config(&config),
            config,
            client,
        })
    }

    /// Create a client from the environment and stored settings.
    pub fn from_env() -> Result<Self, SwcError> {
        Self::new(SwcConfig::load(None)?)
    }

    pub fn config(&self) -> &SwcConfig {
        &self.config
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Full URL of a bulk file for the configured format.
    pub fn bulk_file_url(&self, file: BulkFile) -> String {
        format!(
            "{}/{}",
            self.config.bulk_base_url.trim_end_matches('/'),
            file.file_name(self.config.bulk_file_format)
        )
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// Checks if the API is running and healthy.
    ///
    /// A response with a non-success status reports `healthy: false`; only
    /// failures to reach the API at all are returned as errors.
    pub async fn health_check(&self) -> Result<HealthStatus, SwcError> {
        tracing::debug!("Getting health check endpoint...");
        let url = self.api_url(HEALTH_CHECK_ENDPOINT);
        let operation = "health check";

        match self
            .retry
            .run(operation, || self.fetch(operation, &url, None))
            .await
        {
            Ok((status, body)) => {
                let message = serde_json::from_slice::<Value>(&body).ok().and_then(|v| {
                    v.get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                });
                Ok(HealthStatus {
                    healthy: true,
                    status,
                    message,
                })
            }
            Err(e) => match e.status() {
                Some(status) => {
                    tracing::warn!("Health check reported unhealthy: {}", e);
                    Ok(HealthStatus {
                        healthy: false,
                        status,
                        message: None,
                    })
                }
                None => Err(e),
            },
        }
    }

    /// Returns counts of leagues, teams and players.
    pub async fn get_counts(&self) -> Result<Counts, SwcError> {
        tracing::debug!("Entered get counts");
        self.get_json("get counts", GET_COUNTS_ENDPOINT, None).await
    }

    /// Lists records of type `R` matching `filters`.
    ///
    /// Unrecognized or malformed filters fail with [`SwcError::Validation`]
    /// before any request is made.
    pub async fn list<R: Resource>(&self, filters: &Filters) -> Result<Vec<R>, SwcError> {
        self.list_as(R::TYPE, filters).await
    }

    /// Lists `resource` as untyped JSON records, in the order the API returns them.
    pub async fn list_raw(
        &self,
        resource: ResourceType,
        filters: &Filters,
    ) -> Result<Vec<Value>, SwcError> {
        self.list_as(resource, filters).await
    }

    async fn list_as<T: DeserializeOwned>(
        &self,
        resource: ResourceType,
        filters: &Filters,
    ) -> Result<Vec<T>, SwcError> {
        tracing::debug!("Listing {}...", resource);
        filters.validate(resource)?;
        let operation = format!("list {}", resource);
        self.get_json(&operation, &resource.endpoint(), Some(filters))
            .await
    }

    /// Fetches one record of type `R` by id.
    ///
    /// Returns [`SwcError::NotFound`] when the API answers 404.
    pub async fn get_by_id<R: Resource>(&self, id: impl Display) -> Result<R, SwcError> {
        self.get_as(R::TYPE, &id.to_string()).await
    }

    /// Fetches one record of `resource` by id as untyped JSON.
    pub async fn get_raw(&self, resource: ResourceType, id: &str) -> Result<Value, SwcError> {
        self.get_as(resource, id).await
    }

    async fn get_as<T: DeserializeOwned>(
        &self,
        resource: ResourceType,
        id: &str,
    ) -> Result<T, SwcError> {
        tracing::debug!("Entered get {} by ID {}", resource, id);
        let id = validate_id(resource, id)?;

        let operation = format!("get {} {}", resource, id);
        self.get_json(&operation, &resource.item_endpoint(id), None)
            .await
            .map_err(|e| match e {
                SwcError::Status { status: 404, .. } => SwcError::NotFound {
                    resource: resource.to_string(),
                    id: id.to_string(),
                },
                other => other,
            })
    }

    pub async fn list_leagues(&self, query: &LeagueQuery) -> Result<Vec<League>, SwcError> {
        self.list(&Filters::from(query)).await
    }

    pub async fn get_league_by_id(&self, league_id: i64) -> Result<League, SwcError> {
        self.get_by_id(league_id).await
    }

    pub async fn list_teams(&self, query: &TeamQuery) -> Result<Vec<Team>, SwcError> {
        self.list(&Filters::from(query)).await
    }

    pub async fn list_players(&self, query: &PlayerQuery) -> Result<Vec<Player>, SwcError> {
        self.list(&Filters::from(query)).await
    }

    pub async fn get_player_by_id(&self, player_id: i64) -> Result<Player, SwcError> {
        self.get_by_id(player_id).await
    }

    pub async fn list_performances(
        &self,
        query: &PerformanceQuery,
    ) -> Result<Vec<Performance>, SwcError> {
        self.list(&Filters::from(query)).await
    }

    /// Returns a whole bulk file in memory.
    pub async fn bulk_bytes(&self, file: BulkFile) -> Result<Vec<u8>, SwcError> {
        tracing::debug!("Entered get bulk {} file", file);
        let url = self.bulk_file_url(file);
        let operation = format!("bulk {} file", file);

        let (_, body) = self
            .retry
            .run(&operation, || self.fetch(&operation, &url, None))
            .await
            .map_err(|e| bulk_not_found(e, file, &url))?;

        tracing::debug!("File downloaded successfully ({} bytes)", body.len());
        Ok(body)
    }

    /// Streams a bulk file to `destination`.
    ///
    /// Fails with [`SwcError::DestinationExists`] if `destination` or its
    /// sibling `.part` file is already present. Data is written to the `.part`
    /// file, which is renamed into place only once the transfer is complete.
    pub async fn bulk_download(
        &self,
        file: BulkFile,
        destination: &Path,
    ) -> Result<DownloadSummary, SwcError> {
        tracing::debug!("Downloading bulk {} file to {}", file, destination.display());

        let file_name = destination.file_name().ok_or_else(|| {
            SwcError::Validation(format!(
                "destination {} has no file name",
                destination.display()
            ))
        })?;
        if exists(destination).await? {
            return Err(SwcError::DestinationExists(destination.to_path_buf()));
        }

        let mut part_name = file_name.to_os_string();
        part_name.push(".part");
        let part = destination.with_file_name(part_name);

        let url = self.bulk_file_url(file);
        let operation = format!("bulk {} download", file);

        let bytes = self
            .retry
            .run(&operation, || {
                let (operation, url, part) = (operation.as_str(), url.as_str(), part.as_path());
                async move {
                    let mut out = create_part(part).await?;
                    let result = self
                        .stream_to_file(operation, url, destination, part, &mut out)
                        .await;
                    drop(out);
                    if result.is_err() {
                        remove_part(part).await;
                    }
                    result
                }
            })
            .await
            .map_err(|e| bulk_not_found(e, file, &url))?;

        if exists(destination).await? {
            remove_part(&part).await;
            return Err(SwcError::DestinationExists(destination.to_path_buf()));
        }
        fs::rename(&part, destination)
            .await
            .map_err(|source| SwcError::Io {
                path: destination.to_path_buf(),
                source,
            })?;

        tracing::info!(
            "Downloaded {} ({} bytes) to {}",
            url,
            bytes,
            destination.display()
        );
        Ok(DownloadSummary {
            url,
            path: destination.to_path_buf(),
            bytes,
        })
    }

    async fn stream_to_file(
        &self,
        operation: &str,
        url: &str,
        destination: &Path,
        part: &Path,
        out: &mut File,
    ) -> Result<u64, SwcError> {
        let mut response = self.send(operation, url, None).await?;
        let expected = response.content_length();

        let io_err = |source: std::io::Error| SwcError::Io {
            path: part.to_path_buf(),
            source,
        };
        let mut written: u64 = 0;

        loop {
            let chunk = match response.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    return Err(SwcError::Transfer {
                        path: destination.to_path_buf(),
                        reason: format!("stream interrupted after {} bytes: {}", written, e),
                    })
                }
            };
            out.write_all(&chunk).await.map_err(io_err)?;
            written += chunk.len() as u64;
        }
        out.flush().await.map_err(io_err)?;
        out.sync_all().await.map_err(io_err)?;

        if let Some(expected) = expected {
            if written != expected {
                return Err(SwcError::Transfer {
                    path: destination.to_path_buf(),
                    reason: format!("received {} of {} bytes", written, expected),
                });
            }
        }

        Ok(written)
    }

    /// GET `endpoint` with retry and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        endpoint: &str,
        filters: Option<&Filters>,
    ) -> Result<T, SwcError> {
        let url = self.api_url(endpoint);
        let (_, body) = self
            .retry
            .run(operation, || self.fetch(operation, &url, filters))
            .await?;

        serde_json::from_slice(&body).map_err(|e| SwcError::Decode {
            operation: operation.to_string(),
            reason: e.to_string(),
        })
    }

    /// One GET attempt returning the status and full body.
    async fn fetch(
        &self,
        operation: &str,
        url: &str,
        filters: Option<&Filters>,
    ) -> Result<(u16, Vec<u8>), SwcError> {
        let response = self.send(operation, url, filters).await?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| SwcError::from_transport(operation, e))?;

        tracing::debug!(
            "response from {}: {}",
            url,
            String::from_utf8_lossy(&body[..body.len().min(512)])
        );
        Ok((status, body.to_vec()))
    }

    /// One GET attempt; non-success statuses become errors.
    async fn send(
        &self,
        operation: &str,
        url: &str,
        filters: Option<&Filters>,
    ) -> Result<reqwest::Response, SwcError> {
        tracing::debug!("{}: GET {} params: {:?}", operation, url, filters);

        let mut request = self.client.get(url);
        if let Some(filters) = filters.filter(|f| !f.is_empty()) {
            request = request.query(filters.as_query());
        }

        let response = request
            .send()
            .await
            .map_err(|e| SwcError::from_transport(operation, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to read error body from {}: {}", url, e);
                String::new()
            }
        };
        tracing::error!("HTTP status error occurred: {} {}", status.as_u16(), body);
        Err(status_error(operation, status, body))
    }
}

fn status_error(operation: &str, status: StatusCode, body: String) -> SwcError {
    if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
        SwcError::Transient {
            operation: operation.to_string(),
            status: Some(status.as_u16()),
            reason: format!("HTTP {}: {}", status.as_u16(), body),
        }
    } else {
        SwcError::Status {
            operation: operation.to_string(),
            status: status.as_u16(),
            body,
        }
    }
}

fn bulk_not_found(err: SwcError, file: BulkFile, url: &str) -> SwcError {
    match err {
        SwcError::Status { status: 404, .. } => SwcError::NotFound {
            resource: format!("bulk {} file", file),
            id: url.to_string(),
        },
        other => other,
    }
}

/// Ids are pasted into the URL path, so only `[A-Za-z0-9_-]` is accepted.
fn validate_id(resource: ResourceType, id: &str) -> Result<&str, SwcError> {
    let id = id.trim();
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(id)
    } else {
        Err(SwcError::Validation(format!(
            "invalid {} id: {:?}",
            resource, id
        )))
    }
}

/// Creates the part file, failing if something already occupies the path.
async fn create_part(part: &Path) -> Result<File, SwcError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(part)
        .await
        .map_err(|source| match source.kind() {
            ErrorKind::AlreadyExists => SwcError::DestinationExists(part.to_path_buf()),
            _ => SwcError::Io {
                path: part.to_path_buf(),
                source,
            },
        })
}

async fn remove_part(part: &Path) {
    match fs::remove_file(part).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove partial download {}: {}", part.display(), e),
    }
}

async fn exists(path: &Path) -> Result<bool, SwcError> {
    fs::try_exists(path).await.map_err(|source| SwcError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BulkFileFormat;

    #[test]
    fn test_new_rejects_empty_base_url() {
        let err = SwcClient::new(SwcConfig::new("  ")).unwrap_err();
        assert!(matches!(err, SwcError::Config(_)));
    }

    #[test]
    fn test_new_with_backoff_disabled() {
        let client = SwcClient::new(SwcConfig::new("https://api.test.com").with_retry(false)).unwrap();
        assert_eq!(client.config().base_url, "https://api.test.com");
        assert_eq!(client.retry_policy().max_attempts(), 1);
    }

    #[test]
    fn test_api_url_joins_without_double_slash() {
        let client = SwcClient::new(SwcConfig::new("https://api.test.com/")).unwrap();
        assert_eq!(client.api_url("/v0/leagues/"), "https://api.test.com/v0/leagues/");
    }

    #[test]
    fn test_bulk_file_url_follows_format() {
        let csv = SwcClient::new(SwcConfig::new("https://api.test.com")).unwrap();
        assert_eq!(
            csv.bulk_file_url(BulkFile::Players),
            "https://raw.githubusercontent.com/evrins/hands-on-api-data/main/bulk/player_data.csv"
        );

        let parquet = SwcClient::new(
            SwcConfig::new("https://api.test.com")
                .with_bulk_file_format(BulkFileFormat::Parquet)
                .with_bulk_base_url("http://files.test/bulk"),
        )
        .unwrap();
        assert_eq!(
            parquet.bulk_file_url(BulkFile::TeamPlayers),
            "http://files.test/bulk/team_player_data.parquet"
        );
    }

    #[test]
    fn test_endpoints() {
        let client = SwcClient::new(SwcConfig::new("https://api.test.com")).unwrap();
        assert_eq!(client.api_url(HEALTH_CHECK_ENDPOINT), "https://api.test.com/");
        assert_eq!(
            client.api_url(GET_COUNTS_ENDPOINT),
            "https://api.test.com/v0/counts/"
        );
    }

    #[test]
    fn test_validate_id() {
        assert_eq!(validate_id(ResourceType::Leagues, " 42 ").unwrap(), "42");
        assert_eq!(validate_id(ResourceType::Teams, "team_7-b").unwrap(), "team_7-b");
        for bad in ["", "  ", "a/b", "..", "?limit=1", "1#x", "1%2F2", "é"] {
            let err = validate_id(ResourceType::Players, bad).unwrap_err();
            assert!(err.is_validation(), "{:?} accepted", bad);
        }
    }

    #[test]
    fn test_status_error_classification() {
        let server = status_error("list leagues", StatusCode::BAD_GATEWAY, "down".to_string());
        assert!(server.is_retryable());
        assert_eq!(server.status(), Some(502));

        let client = status_error("list leagues", StatusCode::BAD_REQUEST, "bad".to_string());
        assert!(!client.is_retryable());
        assert_eq!(client.status(), Some(400));
    }
}
