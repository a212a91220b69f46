//! HTTP client for the SportsWorldCentral API.

mod error;
mod retry;
mod swc_client;

pub use error::SwcError;
pub use retry::RetryPolicy;
pub use swc_client::{DownloadSummary, SwcClient, HEALTH_CHECK_ENDPOINT, GET_COUNTS_ENDPOINT};
