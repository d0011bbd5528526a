use std::time::Duration;
use storefront_shared::CATALOG_FEED_TIMEOUT;
use tracing::debug;

use super::{http_client, ExternalError};

/// Source of the raw product spreadsheet export.
pub trait CatalogFeed {
    async fn fetch_csv(&self) -> Result<String, ExternalError>;
}

/// Fetches the catalog CSV from a fixed URL.
#[derive(Clone)]
pub struct CsvCatalogFeed {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl CsvCatalogFeed {
    pub fn new(url: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client(CATALOG_FEED_TIMEOUT)?,
            url: url.to_string(),
            timeout: CATALOG_FEED_TIMEOUT,
        })
    }
}

impl CatalogFeed for CsvCatalogFeed {
    async fn fetch_csv(&self) -> Result<String, ExternalError> {
        debug!("Fetching catalog feed from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ExternalError::from_reqwest(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(ExternalError::Unavailable(format!("HTTP {}", response.status())));
        }

        response
            .text()
            .await
            .map_err(|e| ExternalError::from_reqwest(e, self.timeout))
    }
}

/// An unconfigured feed has nothing to offer.
impl<F: CatalogFeed> CatalogFeed for Option<F> {
    async fn fetch_csv(&self) -> Result<String, ExternalError> {
        match self {
            Some(feed) => feed.fetch_csv().await,
            None => Err(ExternalError::NotFound),
        }
    }
}
