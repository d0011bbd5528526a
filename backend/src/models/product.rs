use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use storefront_shared::{DEFAULT_CATEGORY, DEFAULT_STOCK_STATUS};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::utils::validate_non_negative;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[validate(length(min = 1, max = 128))]
    pub id: String,
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    /// Free-form package size, e.g. "500g" or "granel".
    pub weight_label: String,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(custom = "validate_non_negative")]
    pub unit_price: Decimal,
    pub total_value: Decimal,
    pub minimum_stock: Decimal,
    pub stock_status: String,
    pub category: String,
    /// Sold by weight; cart lines carry a selected weight in grams.
    pub is_bulk: bool,
    pub image: Option<String>,
    pub best_before: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    name: String,
    weight_label: String,
    quantity: i32,
    unit_price: String,
    total_value: String,
    minimum_stock: String,
    stock_status: String,
    category: String,
    is_bulk: bool,
    image: Option<String>,
    best_before: Option<String>,
    is_featured: bool,
}

fn decimal_column(raw: &str) -> Decimal {
    Decimal::from_str(raw.trim()).unwrap_or(Decimal::ZERO)
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            unit_price: decimal_column(&row.unit_price),
            total_value: decimal_column(&row.total_value),
            minimum_stock: decimal_column(&row.minimum_stock),
            id: row.id,
            name: row.name,
            weight_label: row.weight_label,
            quantity: row.quantity,
            stock_status: row.stock_status,
            category: row.category,
            is_bulk: row.is_bulk,
            image: row.image,
            best_before: row.best_before,
            is_featured: row.is_featured,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, weight_label, quantity, unit_price, total_value, \
                               minimum_stock, stock_status, category, is_bulk, image, \
                               best_before, is_featured";

impl Product {
    /// Blank template for the admin form.
    pub fn new_template() -> Self {
        Product {
            id: format!("new-{}", Uuid::new_v4()),
            name: String::new(),
            weight_label: String::new(),
            quantity: 0,
            unit_price: Decimal::ZERO,
            total_value: Decimal::ZERO,
            minimum_stock: Decimal::ZERO,
            stock_status: DEFAULT_STOCK_STATUS.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            is_bulk: false,
            image: None,
            best_before: None,
            is_featured: false,
        }
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// All products in catalog order.
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, AppError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products ORDER BY position ASC, name ASC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Self>, AppError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = ?",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Insert or replace; new products go to the end of the catalog.
    pub async fn upsert(pool: &SqlitePool, product: &Product) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, weight_label, quantity, unit_price, total_value,
                                  minimum_stock, stock_status, category, is_bulk, image,
                                  best_before, is_featured, position)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                    (SELECT COALESCE(MAX(position), 0) + 1 FROM products))
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                weight_label = excluded.weight_label,
                quantity = excluded.quantity,
                unit_price = excluded.unit_price,
                total_value = excluded.total_value,
                minimum_stock = excluded.minimum_stock,
                stock_status = excluded.stock_status,
                category = excluded.category,
                is_bulk = excluded.is_bulk,
                image = excluded.image,
                best_before = excluded.best_before,
                is_featured = excluded.is_featured
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.weight_label)
        .bind(product.quantity)
        .bind(product.unit_price.to_string())
        .bind(product.total_value.to_string())
        .bind(product.minimum_stock.to_string())
        .bind(&product.stock_status)
        .bind(&product.category)
        .bind(product.is_bulk)
        .bind(&product.image)
        .bind(&product.best_before)
        .bind(product.is_featured)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Seeds the store with an imported catalog inside one transaction.
    pub async fn insert_many(pool: &SqlitePool, products: &[Product]) -> Result<(), AppError> {
        let mut tx = pool.begin().await?;

        for (position, product) in products.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO products (id, name, weight_label, quantity, unit_price,
                                                total_value, minimum_stock, stock_status, category,
                                                is_bulk, image, best_before, is_featured, position)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&product.id)
            .bind(&product.name)
            .bind(&product.weight_label)
            .bind(product.quantity)
            .bind(product.unit_price.to_string())
            .bind(product.total_value.to_string())
            .bind(product.minimum_stock.to_string())
            .bind(&product.stock_status)
            .bind(&product.category)
            .bind(product.is_bulk)
            .bind(&product.image)
            .bind(&product.best_before)
            .bind(product.is_featured)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            unit_price: Decimal::from_str("12.90").unwrap(),
            ..Product::new_template()
        }
    }

    #[tokio::test]
    async fn test_insert_many_keeps_catalog_order() {
        let db = Database::in_memory().await.unwrap();
        let products = vec![product("prod-1", "Zimbro"), product("prod-2", "Aveia")];
        Product::insert_many(db.pool(), &products).await.unwrap();

        let stored = Product::find_all(db.pool()).await.unwrap();
        let names: Vec<_> = stored.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Zimbro", "Aveia"]);
        assert_eq!(stored[0].unit_price, Decimal::from_str("12.90").unwrap());
        assert_eq!(Product::count(db.pool()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_upsert_updates_and_appends() {
        let db = Database::in_memory().await.unwrap();
        Product::insert_many(db.pool(), &[product("prod-1", "Chia")]).await.unwrap();

        let mut edited = product("prod-1", "Chia Orgânica");
        edited.is_featured = true;
        Product::upsert(db.pool(), &edited).await.unwrap();
        Product::upsert(db.pool(), &product("new-1", "Linhaça")).await.unwrap();

        let stored = Product::find_all(db.pool()).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].name, "Chia Orgânica");
        assert!(stored[0].is_featured);
        assert_eq!(stored[1].id, "new-1");
    }

    #[tokio::test]
    async fn test_delete_product() {
        let db = Database::in_memory().await.unwrap();
        Product::upsert(db.pool(), &product("prod-1", "Chia")).await.unwrap();

        assert!(Product::delete(db.pool(), "prod-1").await.unwrap());
        assert!(Product::find_by_id(db.pool(), "prod-1").await.unwrap().is_none());
    }
}
