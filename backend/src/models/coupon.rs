use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use storefront_shared::DiscountType;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::utils::{validate_coupon_code, validate_non_negative};

/// A discount rule redeemable at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[validate(length(min = 1, max = 128))]
    pub id: String,
    #[validate(custom = "validate_coupon_code")]
    pub code: String,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[validate(custom = "validate_non_negative")]
    pub discount: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub min_purchase: Option<Decimal>,
    /// Kept as entered; parsed leniently at validation time.
    pub expiry_date: Option<String>,
    #[validate(range(min = 0))]
    pub usage_limit: Option<i64>,
    #[serde(default)]
    pub used_count: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Storage shape of a coupon; money columns are TEXT to keep decimals exact.
#[derive(Debug, FromRow)]
struct CouponRow {
    id: String,
    code: String,
    discount_type: String,
    discount: String,
    min_purchase: Option<String>,
    expiry_date: Option<String>,
    usage_limit: Option<i64>,
    used_count: i64,
    is_active: bool,
}

impl From<CouponRow> for Coupon {
    fn from(row: CouponRow) -> Self {
        let discount = Decimal::from_str(row.discount.trim()).unwrap_or_else(|_| {
            warn!("Coupon {} has unreadable discount {:?}, using 0", row.id, row.discount);
            Decimal::ZERO
        });
        let min_purchase = row
            .min_purchase
            .as_deref()
            .and_then(|raw| Decimal::from_str(raw.trim()).ok());

        Coupon {
            code: row.code.to_uppercase(),
            discount_type: row.discount_type.parse().unwrap_or(DiscountType::Percentage),
            discount,
            min_purchase,
            expiry_date: row.expiry_date.filter(|raw| !raw.trim().is_empty()),
            usage_limit: row.usage_limit,
            used_count: row.used_count,
            is_active: row.is_active,
            id: row.id,
        }
    }
}

const COUPON_COLUMNS: &str = "id, code, discount_type, discount, min_purchase, expiry_date, \
                              usage_limit, used_count, is_active";

impl Coupon {
    /// Blank template for the admin form: fresh id, unused, active.
    pub fn new_template() -> Self {
        Coupon {
            id: format!("coupon-{}", Uuid::new_v4()),
            code: String::new(),
            discount_type: DiscountType::Percentage,
            discount: Decimal::ZERO,
            min_purchase: None,
            expiry_date: None,
            usage_limit: None,
            used_count: 0,
            is_active: true,
        }
    }

    /// Canonical form written to storage.
    pub fn normalized(mut self) -> Self {
        self.code = self.code.trim().to_uppercase();
        self.expiry_date = self
            .expiry_date
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty());
        self.used_count = self.used_count.max(0);
        self
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, AppError> {
        let rows = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {} FROM coupons ORDER BY created_at ASC, code ASC",
            COUPON_COLUMNS
        ))
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Coupon::from).collect())
    }

    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Self>, AppError> {
        let row = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {} FROM coupons WHERE id = ?",
            COUPON_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Coupon::from))
    }

    /// Case-insensitive lookup; codes are stored uppercased.
    pub async fn find_by_code(pool: &SqlitePool, code: &str) -> Result<Option<Self>, AppError> {
        let row = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {} FROM coupons WHERE code = ?",
            COUPON_COLUMNS
        ))
        .bind(code.trim().to_uppercase())
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Coupon::from))
    }

    /// Insert or replace the record with the same id.
    pub async fn upsert(pool: &SqlitePool, coupon: &Coupon) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO coupons (id, code, discount_type, discount, min_purchase, expiry_date,
                                 usage_limit, used_count, is_active)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                code = excluded.code,
                discount_type = excluded.discount_type,
                discount = excluded.discount,
                min_purchase = excluded.min_purchase,
                expiry_date = excluded.expiry_date,
                usage_limit = excluded.usage_limit,
                used_count = excluded.used_count,
                is_active = excluded.is_active,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(coupon.discount_type.to_string())
        .bind(coupon.discount.to_string())
        .bind(coupon.min_purchase.map(|value| value.to_string()))
        .bind(&coupon.expiry_date)
        .bind(coupon.usage_limit)
        .bind(coupon.used_count)
        .bind(coupon.is_active)
        .execute(pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                AppError::Conflict(format!("Coupon code {} already exists", coupon.code)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM coupons WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts one redemption unless the usage limit is already reached. The
    /// limit check and the increment are one statement, so concurrent
    /// redemptions can never push `used_count` past `usage_limit`.
    pub async fn increment_usage(pool: &SqlitePool, id: &str) -> Result<UsageIncrement, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE coupons
            SET used_count = used_count + 1, updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND (usage_limit IS NULL OR used_count < usage_limit)
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(UsageIncrement::Counted);
        }

        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM coupons WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(match exists {
            Some(_) => UsageIncrement::LimitReached,
            None => UsageIncrement::Unknown,
        })
    }
}

/// Outcome of [`Coupon::increment_usage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageIncrement {
    Counted,
    LimitReached,
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    fn sample(id: &str, code: &str) -> Coupon {
        Coupon {
            id: id.to_string(),
            code: code.to_string(),
            discount: Decimal::from(10),
            ..Coupon::new_template()
        }
        .normalized()
    }

    #[tokio::test]
    async fn test_upsert_stores_uppercase_code() {
        let db = Database::in_memory().await.unwrap();
        Coupon::upsert(db.pool(), &sample("c1", "bemvindo10")).await.unwrap();

        let all = Coupon::find_all(db.pool()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].code, "BEMVINDO10");
        assert_eq!(all[0].discount, Decimal::from(10));
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_record() {
        let db = Database::in_memory().await.unwrap();
        let mut coupon = sample("c1", "save10");
        Coupon::upsert(db.pool(), &coupon).await.unwrap();

        coupon.discount_type = DiscountType::Fixed;
        coupon.min_purchase = Some(Decimal::from(50));
        Coupon::upsert(db.pool(), &coupon).await.unwrap();

        let stored = Coupon::find_by_id(db.pool(), "c1").await.unwrap().unwrap();
        assert_eq!(stored.discount_type, DiscountType::Fixed);
        assert_eq!(stored.min_purchase, Some(Decimal::from(50)));
        assert_eq!(Coupon::find_all(db.pool()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_code_is_a_conflict() {
        let db = Database::in_memory().await.unwrap();
        Coupon::upsert(db.pool(), &sample("c1", "SAVE10")).await.unwrap();

        let err = Coupon::upsert(db.pool(), &sample("c2", "save10")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_find_by_code_ignores_case() {
        let db = Database::in_memory().await.unwrap();
        Coupon::upsert(db.pool(), &sample("c1", "FLAT50")).await.unwrap();

        assert!(Coupon::find_by_code(db.pool(), "flat50").await.unwrap().is_some());
        assert!(Coupon::find_by_code(db.pool(), "FLAT5").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_increment_and_delete() {
        let db = Database::in_memory().await.unwrap();
        Coupon::upsert(db.pool(), &sample("c1", "ONCE")).await.unwrap();

        assert_eq!(Coupon::increment_usage(db.pool(), "c1").await.unwrap(), UsageIncrement::Counted);
        assert_eq!(Coupon::increment_usage(db.pool(), "c1").await.unwrap(), UsageIncrement::Counted);
        assert_eq!(
            Coupon::increment_usage(db.pool(), "missing").await.unwrap(),
            UsageIncrement::Unknown
        );

        let stored = Coupon::find_by_id(db.pool(), "c1").await.unwrap().unwrap();
        assert_eq!(stored.used_count, 2);

        assert!(Coupon::delete(db.pool(), "c1").await.unwrap());
        assert!(!Coupon::delete(db.pool(), "c1").await.unwrap());
    }

    #[tokio::test]
    async fn test_increment_stops_at_usage_limit() {
        let db = Database::in_memory().await.unwrap();
        let coupon = Coupon {
            usage_limit: Some(2),
            ..sample("c1", "TWICE")
        };
        Coupon::upsert(db.pool(), &coupon).await.unwrap();

        assert_eq!(Coupon::increment_usage(db.pool(), "c1").await.unwrap(), UsageIncrement::Counted);
        assert_eq!(Coupon::increment_usage(db.pool(), "c1").await.unwrap(), UsageIncrement::Counted);
        assert_eq!(
            Coupon::increment_usage(db.pool(), "c1").await.unwrap(),
            UsageIncrement::LimitReached
        );

        let stored = Coupon::find_by_id(db.pool(), "c1").await.unwrap().unwrap();
        assert_eq!(stored.used_count, 2);
    }

    #[test]
    fn test_normalized_drops_blank_expiry() {
        let coupon = Coupon {
            code: "  promo ".to_string(),
            expiry_date: Some("   ".to_string()),
            ..Coupon::new_template()
        }
        .normalized();

        assert_eq!(coupon.code, "PROMO");
        assert_eq!(coupon.expiry_date, None);
        assert!(coupon.is_active);
        assert_eq!(coupon.used_count, 0);
    }
}
