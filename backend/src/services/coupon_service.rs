use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use sqlx::SqlitePool;
use storefront_shared::{
    format_brl, DiscountType, ERROR_COUPON_CODE_REQUIRED, ERROR_COUPON_EXPIRED,
    ERROR_COUPON_INACTIVE, ERROR_COUPON_MIN_PURCHASE, ERROR_COUPON_NOT_FOUND,
    ERROR_COUPON_RECORD_NOT_FOUND, ERROR_COUPON_USAGE_LIMIT, SUCCESS_COUPON_APPLIED,
};
use tracing::{debug, info, warn};
use validator::{Validate, ValidationErrors};

use crate::error::AppError;
use crate::models::{Coupon, UsageIncrement};
use crate::utils::{validate_percentage, validation_errors_to_app_error};


/// Outcome of checking a code against an order total.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidation {
    pub valid: bool,
    pub message: Option<String>,
    pub coupon: Option<Coupon>,
}

impl CouponValidation {
    fn rejected(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
            coupon: None,
        }
    }

    fn accepted(coupon: Coupon) -> Self {
        Self {
            valid: true,
            message: Some(SUCCESS_COUPON_APPLIED.to_string()),
            coupon: Some(coupon),
        }
    }
}

/// Parses the stored expiry: RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (UTC) or a
/// bare date meaning midnight UTC.
pub fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// Discount for `order_total`, never negative and never above the total.
pub fn calculate_discount(coupon: &Coupon, order_total: Decimal) -> Decimal {
    if order_total <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let raw = match coupon.discount_type {
        DiscountType::Fixed => coupon.discount,
        DiscountType::Percentage => (order_total * coupon.discount / Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
    };

    raw.min(order_total).max(Decimal::ZERO)
}

/// Coupon rules plus the admin operations on the coupon store.
#[derive(Clone)]
pub struct CouponService {
    db_pool: SqlitePool,
}

impl CouponService {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }

    pub async fn validate(&self, code: &str, order_total: Decimal) -> Result<CouponValidation, AppError> {
        self.validate_at(code, order_total, Utc::now()).await
    }

    /// Checks run in a fixed order and stop at the first failure.
    pub async fn validate_at(
        &self,
        code: &str,
        order_total: Decimal,
        now: DateTime<Utc>,
    ) -> Result<CouponValidation, AppError> {
        if code.trim().is_empty() {
            return Ok(CouponValidation::rejected(ERROR_COUPON_CODE_REQUIRED));
        }

        let coupon = match Coupon::find_by_code(&self.db_pool, code).await? {
            Some(coupon) => coupon,
            None => {
                debug!("Coupon code {:?} not found", code.trim());
                return Ok(CouponValidation::rejected(ERROR_COUPON_NOT_FOUND));
            }
        };

        if !coupon.is_active {
            return Ok(CouponValidation::rejected(ERROR_COUPON_INACTIVE));
        }

        if let Some(raw_expiry) = coupon.expiry_date.as_deref() {
            match parse_expiry(raw_expiry) {
                Some(expiry) if expiry < now => {
                    return Ok(CouponValidation::rejected(ERROR_COUPON_EXPIRED));
                }
                Some(_) => {}
                None => warn!(
                    "Coupon {} has unparsable expiry {:?}; treating it as open-ended",
                    coupon.code, raw_expiry
                ),
            }
        }

        if let Some(minimum) = coupon.min_purchase {
            if order_total < minimum {
                return Ok(CouponValidation::rejected(format!(
                    "{} {}.",
                    ERROR_COUPON_MIN_PURCHASE,
                    format_brl(minimum)
                )));
            }
        }

        if let Some(limit) = coupon.usage_limit {
            if coupon.used_count >= limit {
                return Ok(CouponValidation::rejected(ERROR_COUPON_USAGE_LIMIT));
            }
        }

        Ok(CouponValidation::accepted(coupon))
    }

    /// Records one redemption. Unknown ids are ignored; a coupon that hit its
    /// usage limit since it was validated is refused.
    pub async fn increment_usage(&self, coupon_id: &str) -> Result<(), AppError> {
        match Coupon::increment_usage(&self.db_pool, coupon_id).await? {
            UsageIncrement::Counted => info!("Coupon {} redeemed", coupon_id),
            UsageIncrement::Unknown => {
                debug!("Ignoring usage increment for unknown coupon {}", coupon_id)
            }
            UsageIncrement::LimitReached => {
                warn!("Coupon {} reached its usage limit before redemption", coupon_id);
                return Err(AppError::Validation(ERROR_COUPON_USAGE_LIMIT.to_string()));
            }
        }
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Coupon>, AppError> {
        Coupon::find_all(&self.db_pool).await
    }

    pub async fn get(&self, coupon_id: &str) -> Result<Coupon, AppError> {
        Coupon::find_by_id(&self.db_pool, coupon_id)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_COUPON_RECORD_NOT_FOUND.to_string()))
    }

    pub fn create_new(&self) -> Coupon {
        Coupon::new_template()
    }

    /// Normalizes, validates and upserts by id.
    pub async fn save(&self, coupon: Coupon) -> Result<Coupon, AppError> {
        let coupon = coupon.normalized();
        check_coupon(&coupon).map_err(validation_errors_to_app_error)?;

        Coupon::upsert(&self.db_pool, &coupon).await?;
        info!("Saved coupon {} ({})", coupon.code, coupon.id);

        self.get(&coupon.id).await
    }

    pub async fn delete(&self, coupon_id: &str) -> Result<(), AppError> {
        if !Coupon::delete(&self.db_pool, coupon_id).await? {
            return Err(AppError::NotFound(ERROR_COUPON_RECORD_NOT_FOUND.to_string()));
        }
        info!("Deleted coupon {}", coupon_id);
        Ok(())
    }
}

fn check_coupon(coupon: &Coupon) -> Result<(), ValidationErrors> {
    let mut result = coupon.validate();

    if coupon.discount_type == DiscountType::Percentage {
        if let Err(error) = validate_percentage(&coupon.discount) {
            let mut errors = result.err().unwrap_or_else(ValidationErrors::new);
            errors.add("discount", error);
            result = Err(errors);
        }
    }

    result
}
