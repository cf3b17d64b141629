//! Upstream data clients
//!
//! One client per source: SODIR FactMaps for wellbores, BarentsWatch live
//! AIS for rig positions, plus the last-known-position merge that keeps
//! stale rigs on the map between AIS sightings.

pub mod barentswatch;
pub mod last_known;
pub mod sodir;

use thiserror::Error;

pub use barentswatch::{latest_by_rig, BwClient, BwCredentials};
pub use last_known::merge_last_known;
pub use sodir::SodirClient;

/// Transport-level fetch failure.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request construction, connection, or body decode failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("server returned status {0}")]
    Status(reqwest::StatusCode),

    /// Required credentials missing from the environment.
    #[error("missing credentials: set {0}")]
    Credentials(&'static str),
}

/// Shared request timeout for upstream calls.
pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Build the crate's standard HTTP client.
pub(crate) fn http_client() -> Result<reqwest::Client, FetchError> {
    Ok(reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?)
}
