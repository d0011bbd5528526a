use rust_decimal::{Decimal, RoundingStrategy};
use storefront_shared::{
    format_brl, format_distance, format_duration, EstimateSource, ShippingEstimate,
    ERROR_INVALID_POSTAL_CODE, ERROR_POSTAL_CODE_NOT_FOUND, ERROR_POSTAL_LOOKUP_TIMEOUT,
    ERROR_POSTAL_LOOKUP_UNAVAILABLE, FALLBACK_OTHER_CITY_DISTANCE_KM,
    FALLBACK_OTHER_CITY_DURATION_MIN, FALLBACK_SAME_CITY_DISTANCE_KM,
    FALLBACK_SAME_CITY_DURATION_MIN, POSTAL_CODE_DIGITS, SHIPPING_BASE_RATE, SHIPPING_RATE_PER_KM,
};
use tracing::{debug, info, warn};

use crate::clients::{
    DistanceMatrix, ExternalError, GoogleDistanceMatrix, PostalLookup, RouteMetrics, ViaCepClient,
};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::utils::{contains_folded, digits_only};

#[cfg(test)]
mod tests;

/// Failures surfaced to callers of the estimator. Mapping-service problems
/// never appear here; they degrade to the fallback estimate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShippingError {
    #[error("invalid postal code: {0}")]
    InvalidInput(String),

    #[error("postal code not found")]
    NotFound,

    #[error("postal lookup unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("postal lookup timed out")]
    Timeout,

    #[error("malformed request body: {0}")]
    MalformedRequestBody(String),
}

impl From<ShippingError> for AppError {
    fn from(error: ShippingError) -> Self {
        match error {
            ShippingError::InvalidInput(_) => AppError::Validation(ERROR_INVALID_POSTAL_CODE.to_string()),
            ShippingError::NotFound => AppError::NotFound(ERROR_POSTAL_CODE_NOT_FOUND.to_string()),
            ShippingError::UpstreamUnavailable(_) => {
                AppError::UpstreamUnavailable(ERROR_POSTAL_LOOKUP_UNAVAILABLE.to_string())
            }
            ShippingError::Timeout => AppError::UpstreamTimeout(ERROR_POSTAL_LOOKUP_TIMEOUT.to_string()),
            ShippingError::MalformedRequestBody(detail) => AppError::MalformedBody(detail),
        }
    }
}

impl From<ExternalError> for ShippingError {
    fn from(error: ExternalError) -> Self {
        match error {
            ExternalError::NotFound => ShippingError::NotFound,
            ExternalError::Timeout(_) => ShippingError::Timeout,
            ExternalError::Rejected(reason) => ShippingError::InvalidInput(reason),
            ExternalError::Incomplete(detail) | ExternalError::Unavailable(detail) => {
                ShippingError::UpstreamUnavailable(detail)
            }
        }
    }
}

/// Strips formatting and requires exactly eight digits.
pub fn normalize_postal_code(raw: &str) -> Result<String, ShippingError> {
    let digits = digits_only(raw);
    if digits.len() != POSTAL_CODE_DIGITS {
        return Err(ShippingError::InvalidInput(format!(
            "expected {} digits, got {}",
            POSTAL_CODE_DIGITS,
            digits.len()
        )));
    }
    Ok(digits)
}

/// `base rate + distance * rate per km`, rounded to cents.
pub fn shipping_cost(distance_km: Decimal) -> Decimal {
    (SHIPPING_BASE_RATE + distance_km * SHIPPING_RATE_PER_KM)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Same-city heuristic used whenever the mapping service cannot answer.
pub fn fallback_estimate(city: &str, home_city: &str, address: String) -> ShippingEstimate {
    let (distance, duration) = if contains_folded(city, home_city) {
        (FALLBACK_SAME_CITY_DISTANCE_KM, FALLBACK_SAME_CITY_DURATION_MIN)
    } else {
        (FALLBACK_OTHER_CITY_DISTANCE_KM, FALLBACK_OTHER_CITY_DURATION_MIN)
    };

    ShippingEstimate {
        distance,
        duration,
        cost: shipping_cost(distance),
        address,
    }
}

/// Converts raw route metrics; `None` when they cannot be represented.
pub fn estimate_from_route(metrics: RouteMetrics, address: String) -> Option<ShippingEstimate> {
    if metrics.meters.is_sign_negative() || metrics.seconds.is_sign_negative() {
        return None;
    }

    let distance = (metrics.meters / Decimal::ONE_THOUSAND)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    let duration = i64::try_from((metrics.seconds / Decimal::from(60)).ceil()).ok()?;

    Some(ShippingEstimate {
        distance,
        duration,
        cost: shipping_cost(distance),
        address,
    })
}

/// Postal code -> address -> route -> cost.
pub struct ShippingService<P = ViaCepClient, D = GoogleDistanceMatrix> {
    postal: P,
    matrix: Option<D>,
    store_address: String,
    home_city: String,
}

impl ShippingService<ViaCepClient, GoogleDistanceMatrix> {
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let postal = ViaCepClient::new(&config.postal_lookup_url)
            .map_err(|e| AppError::Internal(format!("Failed to build postal client: {}", e)))?;

        let matrix = match config.maps_api_key() {
            Some(key) => Some(
                GoogleDistanceMatrix::new(&config.distance_matrix_url, key).map_err(|e| {
                    AppError::Internal(format!("Failed to build distance matrix client: {}", e))
                })?,
            ),
            None => {
                warn!("GOOGLE_MAPS_API_KEY not set; shipping estimates will use the fallback heuristic");
                None
            }
        };

        Ok(Self::new(postal, matrix, &config.store_address, &config.home_city))
    }
}

impl<P: PostalLookup, D: DistanceMatrix> ShippingService<P, D> {
    pub fn new(postal: P, matrix: Option<D>, store_address: &str, home_city: &str) -> Self {
        Self {
            postal,
            matrix,
            store_address: store_address.to_string(),
            home_city: home_city.to_string(),
        }
    }

    /// Estimate delivery for a postal code. Only the postal lookup can fail
    /// the request; any mapping problem falls back to the heuristic.
    pub async fn estimate(&self, raw_postal_code: &str) -> Result<ShippingEstimate, ShippingError> {
        let postal_code = normalize_postal_code(raw_postal_code)?;

        let resolved = self.postal.lookup(&postal_code).await.map_err(|e| {
            warn!("Postal lookup failed for {}: {}", postal_code, e);
            ShippingError::from(e)
        })?;
        let address = resolved.display_line(&postal_code);
        debug!("Postal code {} resolved to {}", postal_code, address);

        let (estimate, source) = match self.route(&address).await {
            Some(estimate) => (estimate, EstimateSource::DistanceMatrix),
            None => (
                fallback_estimate(&resolved.city, &self.home_city, address),
                EstimateSource::Fallback,
            ),
        };

        info!(
            "Shipping to {}: {} / {} / {} ({})",
            postal_code,
            format_distance(estimate.distance),
            format_duration(estimate.duration),
            format_brl(estimate.cost),
            source
        );

        Ok(estimate)
    }

    async fn route(&self, address: &str) -> Option<ShippingEstimate> {
        let matrix = self.matrix.as_ref()?;

        match matrix.route(&self.store_address, address).await {
            Ok(metrics) => {
                let estimate = estimate_from_route(metrics, address.to_string());
                if estimate.is_none() {
                    warn!("Distance matrix returned unusable metrics {:?}; using fallback", metrics);
                }
                estimate
            }
            Err(e) => {
                warn!("Distance matrix failed for {}: {}; using fallback", address, e);
                None
            }
        }
    }
}
