use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use storefront_shared::DISTANCE_MATRIX_TIMEOUT;
use tracing::debug;

use super::{http_client, ExternalError};

/// Driving route metrics as reported by the mapping service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMetrics {
    pub meters: Decimal,
    pub seconds: Decimal,
}

pub trait DistanceMatrix {
    async fn route(&self, origin: &str, destination: &str) -> Result<RouteMetrics, ExternalError>;
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    #[serde(default)]
    status: String,
    distance: Option<MatrixValue>,
    duration: Option<MatrixValue>,
}

#[derive(Debug, Deserialize)]
struct MatrixValue {
    value: Option<Decimal>,
}

impl MatrixResponse {
    fn into_metrics(self) -> Result<RouteMetrics, ExternalError> {
        if self.status != "OK" {
            return Err(ExternalError::Rejected(match self.error_message {
                Some(message) => format!("status {}: {}", self.status, message),
                None => format!("status {}", self.status),
            }));
        }

        let element = self
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.elements.into_iter().next())
            .ok_or_else(|| ExternalError::Incomplete("no route element".to_string()))?;

        if element.status != "OK" {
            return Err(ExternalError::Rejected(format!("element status {}", element.status)));
        }

        let meters = element
            .distance
            .and_then(|distance| distance.value)
            .ok_or_else(|| ExternalError::Incomplete("distance".to_string()))?;
        let seconds = element
            .duration
            .and_then(|duration| duration.value)
            .ok_or_else(|| ExternalError::Incomplete("duration".to_string()))?;

        Ok(RouteMetrics { meters, seconds })
    }
}

/// Google Distance Matrix client (driving, pt-BR).
#[derive(Clone)]
pub struct GoogleDistanceMatrix {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl GoogleDistanceMatrix {
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoint, api_key, DISTANCE_MATRIX_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client(timeout)?,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            timeout,
        })
    }
}

impl DistanceMatrix for GoogleDistanceMatrix {
    async fn route(&self, origin: &str, destination: &str) -> Result<RouteMetrics, ExternalError> {
        debug!("Distance matrix: {} -> {}", origin, destination);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("origins", origin),
                ("destinations", destination),
                ("key", self.api_key.as_str()),
                ("mode", "driving"),
                ("language", "pt-BR"),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ExternalError::from_reqwest(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(ExternalError::Unavailable(format!("HTTP {}", response.status())));
        }

        let body: MatrixResponse = response
            .json()
            .await
            .map_err(|e| ExternalError::from_reqwest(e, self.timeout))?;

        body.into_metrics()
    }
}
