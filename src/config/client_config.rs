//! Client configuration: base URL, retry/backoff policy and bulk file options.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use super::StoredSettings;

/// Default number of retries after the first failed attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default linear backoff step in milliseconds.
pub const DEFAULT_BACKOFF_FACTOR_MS: u64 = 500;

/// Default cap on a single backoff wait in seconds.
pub const DEFAULT_BACKOFF_MAX_TIME_SECS: u64 = 30;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the SWC bulk data files are published.
pub const DEFAULT_BULK_FILE_BASE_URL: &str =
    "https://raw.githubusercontent.com/evrins/hands-on-api-data/main/bulk/";

pub const ENV_BASE_URL: &str = "SWC_API_BASE_URL";
pub const ENV_BACKOFF: &str = "SWC_BACKOFF";
pub const ENV_BACKOFF_MAX_TIME: &str = "SWC_BACKOFF_MAX_TIME";
pub const ENV_MAX_RETRIES: &str = "SWC_MAX_RETRIES";
pub const ENV_BULK_FILE_FORMAT: &str = "SWC_BULK_FILE_FORMAT";

/// Key reported when the settings file holds an unknown bulk format.
pub const SETTINGS_BULK_FILE_FORMAT: &str = "settings.bulk_file_format";

/// Configuration errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Base URL is required: pass one explicitly or set SWC_API_BASE_URL")]
    MissingBaseUrl,
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// File format of the bulk data downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulkFileFormat {
    #[default]
    Csv,
    Parquet,
}

impl BulkFileFormat {
    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            BulkFileFormat::Csv => ".csv",
            BulkFileFormat::Parquet => ".parquet",
        }
    }
}

impl fmt::Display for BulkFileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BulkFileFormat::Csv => write!(f, "csv"),
            BulkFileFormat::Parquet => write!(f, "parquet"),
        }
    }
}

impl FromStr for BulkFileFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(BulkFileFormat::Csv),
            "parquet" => Ok(BulkFileFormat::Parquet),
            _ => Err(ConfigError::InvalidValue {
                key: ENV_BULK_FILE_FORMAT,
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration for the SWC API client.
///
/// Built once and handed to [`crate::SwcClient::new`]; the client never
/// mutates it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SwcConfig {
    pub base_url: String,
    /// Apply the backoff policy on transient failures.
    pub retry_enabled: bool,
    /// Retries after the first attempt; ignored when retry is disabled.
    pub max_retries: u32,
    /// Linear backoff step, multiplied by the failed attempt number.
    pub backoff_factor: Duration,
    /// Constant added to every backoff wait.
    pub initial_delay: Duration,
    /// Upper bound for any single backoff wait.
    pub backoff_max_time: Duration,
    pub timeout: Duration,
    pub bulk_file_format: BulkFileFormat,
    pub bulk_base_url: String,
}

impl SwcConfig {
    /// Create a config for `base_url` with default retry settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            retry_enabled: true,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_factor: Duration::from_millis(DEFAULT_BACKOFF_FACTOR_MS),
            initial_delay: Duration::ZERO,
            backoff_max_time: Duration::from_secs(DEFAULT_BACKOFF_MAX_TIME_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            bulk_file_format: BulkFileFormat::Csv,
            bulk_base_url: DEFAULT_BULK_FILE_BASE_URL.to_string(),
        }
    }

    /// Resolve a config from the process environment and the stored settings file.
    ///
    /// Precedence: `explicit_base_url` > environment > settings file > defaults.
    pub fn load(explicit_base_url: Option<&str>) -> Result<Self, ConfigError> {
        let settings = StoredSettings::load();
        Self::resolve(explicit_base_url, &settings, |key| std::env::var(key).ok())
    }

    /// Same as [`SwcConfig::load`] with the environment supplied by `lookup`.
    pub fn resolve<F>(
        explicit_base_url: Option<&str>,
        settings: &StoredSettings,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = explicit_base_url
            .map(str::to_string)
            .or_else(|| env(ENV_BASE_URL))
            .or_else(|| settings.base_url.clone())
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;

        let mut config = Self::new(base_url);

        if let Some(backoff) = settings.backoff {
            config.retry_enabled = backoff;
        }
        if let Some(value) = env(ENV_BACKOFF) {
            config.retry_enabled = parse_bool(ENV_BACKOFF, &value)?;
        }

        if let Some(secs) = settings.backoff_max_time_secs {
            config.backoff_max_time = Duration::from_secs(secs);
        }
        if let Some(value) = env(ENV_BACKOFF_MAX_TIME) {
            config.backoff_max_time = Duration::from_secs(parse_number(ENV_BACKOFF_MAX_TIME, &value)?);
        }

        if let Some(retries) = settings.max_retries {
            config.max_retries = retries;
        }
        if let Some(value) = env(ENV_MAX_RETRIES) {
            config.max_retries = parse_number(ENV_MAX_RETRIES, &value)?;
        }

        if let Some(format) = &settings.bulk_file_format {
            config.bulk_file_format = format.parse().map_err(|_| ConfigError::InvalidValue {
                key: SETTINGS_BULK_FILE_FORMAT,
                value: format.clone(),
            })?;
        }
        if let Some(value) = env(ENV_BULK_FILE_FORMAT) {
            config.bulk_file_format = value.parse()?;
        }

        if let Some(url) = &settings.bulk_base_url {
            config.bulk_base_url = url.clone();
        }

        Ok(config)
    }

    /// Check the invariants the client relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        Ok(())
    }

    /// Set the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Enable or disable retry with backoff.
    pub fn with_retry(mut self, enabled: bool) -> Self {
        self.retry_enabled = enabled;
        self
    }

    /// Set the maximum number of retries after the first attempt.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the linear backoff step.
    pub fn with_backoff_factor(mut self, factor: Duration) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Set the constant part of every backoff wait.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the cap on a single backoff wait.
    pub fn with_backoff_max_time(mut self, max_time: Duration) -> Self {
        self.backoff_max_time = max_time;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the bulk file format.
    pub fn with_bulk_file_format(mut self, format: BulkFileFormat) -> Self {
        self.bulk_file_format = format;
        self
    }

    /// Set where bulk files are downloaded from.
    pub fn with_bulk_base_url(mut self, url: impl Into<String>) -> Self {
        self.bulk_base_url = url.into();
        self
    }
}

impl fmt::Display for SwcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.base_url,
            self.retry_enabled,
            self.backoff_max_time.as_secs(),
            self.bulk_file_format
        )
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_number<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_new_uses_defaults() {
        let config = SwcConfig::new("https://api.example.com");
        assert_eq!(config.base_url, "https://api.example.com");
        assert!(config.retry_enabled);
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.backoff_max_time, Duration::from_secs(30));
        assert_eq!(config.bulk_file_format, BulkFileFormat::Csv);
    }

    #[test]
    fn test_builder_setters() {
        let config = SwcConfig::new("https://api.example.com")
            .with_retry(false)
            .with_backoff_max_time(Duration::from_secs(60))
            .with_bulk_file_format(BulkFileFormat::Parquet);
        assert!(!config.retry_enabled);
        assert_eq!(config.backoff_max_time.as_secs(), 60);
        assert_eq!(config.bulk_file_format, BulkFileFormat::Parquet);
    }

    #[test]
    fn test_base_url_from_environment() {
        let config = SwcConfig::resolve(
            None,
            &StoredSettings::default(),
            env_of(&[(ENV_BASE_URL, "https://env.example.com")]),
        )
        .unwrap();
        assert_eq!(config.base_url, "https://env.example.com");
        assert!(config.retry_enabled);
    }

    #[test]
    fn test_explicit_base_url_beats_environment() {
        let config = SwcConfig::resolve(
            Some("https://param.example.com"),
            &StoredSettings::default(),
            env_of(&[(ENV_BASE_URL, "https://env.example.com")]),
        )
        .unwrap();
        assert_eq!(config.base_url, "https://param.example.com");
    }

    #[test]
    fn test_missing_base_url_fails() {
        let err = SwcConfig::resolve(None, &StoredSettings::default(), env_of(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingBaseUrl);
        assert!(err.to_string().contains("Base URL is required"));
    }

    #[test]
    fn test_environment_beats_settings_file() {
        let settings = StoredSettings {
            base_url: Some("https://file.example.com".to_string()),
            backoff: Some(true),
            max_retries: Some(7),
            bulk_file_format: Some("csv".to_string()),
            ..Default::default()
        };
        let config = SwcConfig::resolve(
            None,
            &settings,
            env_of(&[(ENV_BACKOFF, "false"), (ENV_BULK_FILE_FORMAT, "PARQUET")]),
        )
        .unwrap();
        assert_eq!(config.base_url, "https://file.example.com");
        assert!(!config.retry_enabled);
        assert_eq!(config.max_retries, 7);
        assert_eq!(config.bulk_file_format, BulkFileFormat::Parquet);
    }

    #[test]
    fn test_invalid_env_value_rejected() {
        let err = SwcConfig::resolve(
            Some("https://api.example.com"),
            &StoredSettings::default(),
            env_of(&[(ENV_MAX_RETRIES, "lots")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_MAX_RETRIES, .. }));
    }

    #[test]
    fn test_invalid_settings_format_names_settings_key() {
        let settings = StoredSettings {
            bulk_file_format: Some("xlsx".to_string()),
            ..Default::default()
        };
        let err = SwcConfig::resolve(Some("https://api.example.com"), &settings, env_of(&[]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: SETTINGS_BULK_FILE_FORMAT,
                value: "xlsx".to_string(),
            }
        );
        assert!(err.to_string().contains("settings.bulk_file_format"));
    }

    #[test]
    fn test_display() {
        let config = SwcConfig::new("https://api.example.com")
            .with_backoff_max_time(Duration::from_secs(45))
            .with_bulk_file_format(BulkFileFormat::Parquet);
        assert_eq!(config.to_string(), "https://api.example.com true 45 parquet");
    }

    #[test]
    fn test_bulk_file_format_case_insensitive() {
        assert_eq!("CSV".parse::<BulkFileFormat>().unwrap(), BulkFileFormat::Csv);
        assert_eq!("Parquet".parse::<BulkFileFormat>().unwrap(), BulkFileFormat::Parquet);
        assert!("xlsx".parse::<BulkFileFormat>().is_err());
    }
}
