use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// Shipping DTOs
#[derive(Debug, Serialize, Deserialize)]
pub struct ShippingRequest {
    pub cep: String,
}

// Coupon DTOs
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponRequest {
    pub code: String,
    pub order_total: Decimal,
}

// Admin DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct AdminLoginRequest {
    #[validate(length(min = 1, max = 256))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminLoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub message: String,
}

// Catalog DTOs
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    pub featured: Option<bool>,
}

// Checkout DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRequest {
    #[validate(length(min = 1, max = 128))]
    pub product_id: String,

    #[validate(range(min = 1, max = 10000))]
    pub quantity: i32,

    /// Grams, only meaningful for bulk products.
    #[validate(range(min = 1, max = 100000))]
    pub selected_weight: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[validate]
    pub items: Vec<CartLineRequest>,
    pub coupon_code: Option<String>,
    pub shipping_cost: Option<Decimal>,
    pub shipping_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineTotal {
    pub product_id: String,
    pub name: String,
    pub quantity: i32,
    pub selected_weight: Option<i32>,
    pub unit_price: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub lines: Vec<LineTotal>,
    pub item_count: i32,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Option<Decimal>,
    pub total: Decimal,
    pub coupon_code: Option<String>,
    pub coupon_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: Uuid,
    pub placed_at: DateTime<Utc>,
    pub summary: OrderSummary,
    pub shipping_address: Option<String>,
    pub message: String,
}
