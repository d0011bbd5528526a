//! Outbound HTTP integrations.
//!
//! Each integration is a trait with a live `reqwest` implementation, so the
//! services that orchestrate them can be exercised with stubs.

use std::time::Duration;

pub mod catalog_feed;
pub mod distance_matrix;
pub mod postal_lookup;

pub use catalog_feed::{CatalogFeed, CsvCatalogFeed};
pub use distance_matrix::{DistanceMatrix, GoogleDistanceMatrix, RouteMetrics};
pub use postal_lookup::{PostalAddress, PostalLookup, ViaCepClient};

/// Failure of a single outbound call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExternalError {
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("resource not found")]
    NotFound,

    /// The service answered but refused the request (error flag, non-OK status).
    #[error("rejected: {0}")]
    Rejected(String),

    /// The answer lacked a field the caller needs.
    #[error("incomplete response: {0}")]
    Incomplete(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl ExternalError {
    pub(crate) fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            ExternalError::Timeout(timeout)
        } else {
            ExternalError::Unavailable(error.to_string())
        }
    }
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(concat!("storefront-backend/", env!("CARGO_PKG_VERSION")))
        .build()
}
