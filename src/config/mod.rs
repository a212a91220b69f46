//! Configuration module for the SWC client.

mod client_config;
mod settings;

pub use client_config::{
    BulkFileFormat, ConfigError, SwcConfig, DEFAULT_BACKOFF_FACTOR_MS, DEFAULT_BACKOFF_MAX_TIME_SECS,
    DEFAULT_BULK_FILE_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS, ENV_BACKOFF,
    ENV_BACKOFF_MAX_TIME, ENV_BASE_URL, ENV_BULK_FILE_FORMAT, ENV_MAX_RETRIES,
    SETTINGS_BULK_FILE_FORMAT,
};
pub use settings::StoredSettings;
