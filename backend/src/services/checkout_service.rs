use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::SqlitePool;
use storefront_shared::{
    CartLineRequest, CheckoutRequest, LineTotal, OrderConfirmation, OrderSummary,
    ERROR_EMPTY_CART, ERROR_PRODUCT_NOT_FOUND, ERROR_SHIPPING_REQUIRED, SUCCESS_ORDER_PLACED,
};
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::Product;
use crate::services::coupon_service::{calculate_discount, CouponService};
use crate::utils::{validate_non_negative, validation_errors_to_app_error};


fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Price of one cart line. Bulk products with a selected weight are priced
/// per gram from the per-kilo unit price.
pub fn line_price(product: &Product, quantity: i32, selected_weight: Option<i32>) -> Decimal {
    match selected_weight {
        Some(grams) if product.is_bulk => {
            round_money(product.unit_price * Decimal::from(grams) / Decimal::ONE_THOUSAND)
        }
        _ => round_money(product.unit_price * Decimal::from(quantity)),
    }
}

/// A priced cart, before coupon and shipping.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedCart {
    pub lines: Vec<LineTotal>,
    pub item_count: i32,
    pub subtotal: Decimal,
}

/// Cart pricing, order summary and simulated order placement.
#[derive(Clone)]
pub struct CheckoutService {
    db_pool: SqlitePool,
    coupons: CouponService,
}

impl CheckoutService {
    pub fn new(db_pool: SqlitePool, coupons: CouponService) -> Self {
        Self { db_pool, coupons }
    }

    pub async fn price_cart(&self, items: &[CartLineRequest]) -> Result<PricedCart, AppError> {
        if items.is_empty() {
            return Err(AppError::Validation(ERROR_EMPTY_CART.to_string()));
        }

        let mut lines = Vec::with_capacity(items.len());
        let mut item_count = 0;
        let mut subtotal = Decimal::ZERO;

        for item in items {
            item.validate().map_err(validation_errors_to_app_error)?;

            let product = Product::find_by_id(&self.db_pool, &item.product_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("{}: {}", ERROR_PRODUCT_NOT_FOUND, item.product_id))
                })?;

            let total = line_price(&product, item.quantity, item.selected_weight);
            subtotal += total;
            item_count += item.quantity;

            lines.push(LineTotal {
                product_id: product.id,
                name: product.name,
                quantity: item.quantity,
                selected_weight: item.selected_weight.filter(|_| product.is_bulk),
                unit_price: product.unit_price,
                total,
            });
        }

        Ok(PricedCart {
            lines,
            item_count,
            subtotal,
        })
    }

    /// Order summary for the checkout page. An invalid coupon is reported in
    /// `coupon_message` and contributes no discount.
    pub async fn quote(&self, request: &CheckoutRequest) -> Result<OrderSummary, AppError> {
        let (summary, _) = self.summarize(request).await?;
        Ok(summary)
    }

    /// Places a simulated order. Requires a computed shipping cost and a
    /// coupon that is still valid; the coupon is redeemed once per call, and
    /// the redemption itself refuses a coupon that ran out in the meantime.
    pub async fn place_order(&self, request: &CheckoutRequest) -> Result<OrderConfirmation, AppError> {
        if request.shipping_cost.is_none() {
            return Err(AppError::Validation(ERROR_SHIPPING_REQUIRED.to_string()));
        }

        let (summary, redeemed_coupon) = self.summarize(request).await?;

        let has_code = request
            .coupon_code
            .as_deref()
            .is_some_and(|code| !code.trim().is_empty());
        if has_code && redeemed_coupon.is_none() {
            return Err(AppError::Validation(
                summary.coupon_message.clone().unwrap_or_default(),
            ));
        }

        if let Some(coupon_id) = redeemed_coupon {
            self.coupons.increment_usage(&coupon_id).await?;
        }

        let confirmation = OrderConfirmation {
            order_id: Uuid::new_v4(),
            placed_at: Utc::now(),
            shipping_address: request.shipping_address.clone(),
            message: SUCCESS_ORDER_PLACED.to_string(),
            summary,
        };

        info!(
            "Order {} placed: {} items, total {}",
            confirmation.order_id, confirmation.summary.item_count, confirmation.summary.total
        );

        Ok(confirmation)
    }

    async fn summarize(&self, request: &CheckoutRequest) -> Result<(OrderSummary, Option<String>), AppError> {
        request.validate().map_err(validation_errors_to_app_error)?;
        if let Some(shipping) = request.shipping_cost.as_ref() {
            validate_non_negative(shipping).map_err(|_| {
                AppError::Validation("shippingCost: Amount cannot be negative".to_string())
            })?;
        }

        let cart = self.price_cart(&request.items).await?;

        let mut discount = Decimal::ZERO;
        let mut coupon_code = None;
        let mut coupon_message = None;
        let mut redeemed_coupon = None;

        if let Some(code) = request.coupon_code.as_deref().filter(|code| !code.trim().is_empty()) {
            let validation = self.coupons.validate(code, cart.subtotal).await?;
            coupon_message = validation.message;

            match validation.coupon.filter(|_| validation.valid) {
                Some(coupon) => {
                    discount = calculate_discount(&coupon, cart.subtotal);
                    coupon_code = Some(coupon.code);
                    redeemed_coupon = Some(coupon.id);
                }
                None => debug!("Coupon {:?} not applied: {:?}", code, coupon_message),
            }
        }

        let total = cart.subtotal - discount + request.shipping_cost.unwrap_or(Decimal::ZERO);

        let summary = OrderSummary {
            lines: cart.lines,
            item_count: cart.item_count,
            subtotal: cart.subtotal,
            discount,
            shipping: request.shipping_cost,
            total,
            coupon_code,
            coupon_message,
        };

        Ok((summary, redeemed_coupon))
    }
}
