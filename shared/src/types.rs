use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Coupon-related enums
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl Default for DiscountType {
    fn default() -> Self {
        DiscountType::Percentage
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountType::Percentage => write!(f, "percentage"),
            DiscountType::Fixed => write!(f, "fixed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown discount type: {0}")]
pub struct ParseDiscountTypeError(pub String);

impl FromStr for DiscountType {
    type Err = ParseDiscountTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percentage" => Ok(DiscountType::Percentage),
            "fixed" => Ok(DiscountType::Fixed),
            other => Err(ParseDiscountTypeError(other.to_string())),
        }
    }
}

/// Result of a shipping calculation. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingEstimate {
    /// Kilometers, one decimal place.
    pub distance: Decimal,
    /// Minutes, rounded up from seconds.
    pub duration: i64,
    /// BRL, two decimal places.
    pub cost: Decimal,
    pub address: String,
}

/// Where a shipping estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateSource {
    DistanceMatrix,
    Fallback,
}

impl fmt::Display for EstimateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimateSource::DistanceMatrix => write!(f, "distance_matrix"),
            EstimateSource::Fallback => write!(f, "fallback"),
        }
    }
}
