use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use std::str::FromStr;
use storefront_shared::{
    ProductQuery, CATALOG_TOTAL_ROW_MARKER, DEFAULT_CATEGORY, DEFAULT_STOCK_STATUS,
    ERROR_PRODUCT_NOT_FOUND,
};
use tracing::{debug, error, info, warn};
use validator::Validate;

use crate::clients::{CatalogFeed, CsvCatalogFeed, ExternalError};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::Product;
use crate::utils::{contains_folded, validation_errors_to_app_error};


/// Leading number of a spreadsheet cell: `"R$ 12,90"` -> 12.90, junk -> 0.
pub fn parse_price(raw: &str) -> Decimal {
    let cleaned = raw.replace("R$", "").replacen(',', ".", 1);
    let cleaned = cleaned.trim();

    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (index, ch) in cleaned.char_indices() {
        match ch {
            '-' | '+' if index == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = index + ch.len_utf8();
    }

    if !seen_digit {
        return Decimal::ZERO;
    }
    Decimal::from_str(cleaned[..end].trim_end_matches('.')).unwrap_or(Decimal::ZERO)
}

/// Leading integer of a cell, 0 when there is none.
pub fn parse_quantity(raw: &str) -> i32 {
    let trimmed = raw.trim();
    let digits_end = trimmed
        .char_indices()
        .find(|&(index, ch)| !(ch.is_ascii_digit() || (index == 0 && (ch == '-' || ch == '+'))))
        .map(|(index, _)| index)
        .unwrap_or(trimmed.len());

    trimmed[..digits_end].parse().unwrap_or(0)
}

/// Sold by weight when either label mentions bulk or kilograms.
pub fn is_bulk_product(name: &str, weight_label: &str) -> bool {
    let weight = weight_label.to_lowercase();
    weight.contains("granel") || weight.contains("kg") || name.to_lowercase().contains("granel")
}

/// Parses the stock spreadsheet export. Columns: name, weight, quantity,
/// (unused), unit price, total value, minimum stock, status, category.
pub fn parse_catalog_csv(csv: &str) -> Vec<Product> {
    let mut products = Vec::new();

    for (index, line) in csv.split('\n').enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let values: Vec<&str> = line.split(',').collect();
        let cell = |column: usize| values.get(column).map(|value| value.trim()).unwrap_or("");

        let name = cell(0);
        if name == CATALOG_TOTAL_ROW_MARKER {
            continue;
        }
        let weight_label = cell(1);

        products.push(Product {
            id: format!("prod-{}", index),
            name: name.to_string(),
            weight_label: weight_label.to_string(),
            quantity: parse_quantity(cell(2)),
            unit_price: parse_price(cell(4)),
            total_value: parse_price(cell(5)),
            minimum_stock: parse_price(cell(6)),
            stock_status: non_empty_or(cell(7), DEFAULT_STOCK_STATUS),
            category: non_empty_or(cell(8), DEFAULT_CATEGORY),
            is_bulk: is_bulk_product(name, weight_label),
            image: None,
            best_before: None,
            is_featured: false,
        });
    }

    products
}

fn non_empty_or(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

pub fn categories(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .map(|product| product.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn by_category<'a>(products: &'a [Product], category: &str) -> Vec<&'a Product> {
    products.iter().filter(|product| product.category == category).collect()
}

/// Case- and accent-insensitive match on name or category.
pub fn search<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|product| contains_folded(&product.name, query) || contains_folded(&product.category, query))
        .collect()
}

/// Product catalog backed by the products table, seeded from the CSV feed.
#[derive(Clone)]
pub struct CatalogService<F = Option<CsvCatalogFeed>> {
    db_pool: SqlitePool,
    feed: F,
}

impl CatalogService<Option<CsvCatalogFeed>> {
    pub fn from_config(db_pool: SqlitePool, config: &AppConfig) -> Result<Self, AppError> {
        let feed = match config.catalog_csv_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Some(
                CsvCatalogFeed::new(url)
                    .map_err(|e| AppError::Internal(format!("Failed to build catalog feed: {}", e)))?,
            ),
            _ => {
                warn!("CATALOG_CSV_URL not set; the catalog starts empty");
                None
            }
        };

        Ok(Self::new(db_pool, feed))
    }
}

impl<F: CatalogFeed> CatalogService<F> {
    pub fn new(db_pool: SqlitePool, feed: F) -> Self {
        Self { db_pool, feed }
    }

    /// All products. An empty store is seeded from the feed first; a
    /// failing feed leaves it empty.
    pub async fn list(&self) -> Result<Vec<Product>, AppError> {
        if Product::count(&self.db_pool).await? == 0 {
            self.import().await?;
        }
        Product::find_all(&self.db_pool).await
    }

    /// Fetches the feed and stores whatever it yields. Returns the number of
    /// parsed products.
    pub async fn import(&self) -> Result<usize, AppError> {
        let csv = match self.feed.fetch_csv().await {
            Ok(csv) => csv,
            Err(ExternalError::NotFound) => {
                debug!("No catalog feed configured; nothing to import");
                return Ok(0);
            }
            Err(e) => {
                error!("Catalog feed unavailable: {}", e);
                return Ok(0);
            }
        };

        let products = parse_catalog_csv(&csv);
        Product::insert_many(&self.db_pool, &products).await?;
        info!("Imported {} products from the catalog feed", products.len());

        Ok(products.len())
    }

    /// Listing with the storefront filters applied: category, then search,
    /// then featured.
    pub async fn query(&self, query: &ProductQuery) -> Result<Vec<Product>, AppError> {
        let mut products = self.list().await?;

        if let Some(category) = query.category.as_deref().filter(|c| !c.trim().is_empty()) {
            products = by_category(&products, category).into_iter().cloned().collect();
        }
        if let Some(term) = query.q.as_deref().filter(|q| !q.trim().is_empty()) {
            products = search(&products, term).into_iter().cloned().collect();
        }
        if query.featured == Some(true) {
            products.retain(|product| product.is_featured);
        }

        Ok(products)
    }

    pub async fn categories(&self) -> Result<Vec<String>, AppError> {
        Ok(categories(&self.list().await?))
    }

    pub async fn featured(&self) -> Result<Vec<Product>, AppError> {
        let mut products = self.list().await?;
        products.retain(|product| product.is_featured);
        Ok(products)
    }

    pub async fn get(&self, product_id: &str) -> Result<Product, AppError> {
        Product::find_by_id(&self.db_pool, product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_PRODUCT_NOT_FOUND.to_string()))
    }

    pub fn create_new(&self) -> Product {
        Product::new_template()
    }

    pub async fn save(&self, mut product: Product) -> Result<Product, AppError> {
        product.name = product.name.trim().to_string();
        product.category = non_empty_or(product.category.trim(), DEFAULT_CATEGORY);
        product.stock_status = non_empty_or(product.stock_status.trim(), DEFAULT_STOCK_STATUS);
        product.validate().map_err(validation_errors_to_app_error)?;

        Product::upsert(&self.db_pool, &product).await?;
        info!("Saved product {} ({})", product.name, product.id);

        self.get(&product.id).await
    }

    pub async fn delete(&self, product_id: &str) -> Result<(), AppError> {
        if !Product::delete(&self.db_pool, product_id).await? {
            return Err(AppError::NotFound(ERROR_PRODUCT_NOT_FOUND.to_string()));
        }
        info!("Deleted product {}", product_id);
        Ok(())
    }
}
