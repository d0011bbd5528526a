use rust_decimal::Decimal;
use std::time::Duration;

// Shipping rates (BRL)
pub const SHIPPING_BASE_RATE: Decimal = Decimal::from_parts(80, 0, 0, false, 1); // 8.0
pub const SHIPPING_RATE_PER_KM: Decimal = Decimal::from_parts(15, 0, 0, false, 1); // 1.5

// Fallback heuristic
pub const FALLBACK_SAME_CITY_DISTANCE_KM: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
pub const FALLBACK_SAME_CITY_DURATION_MIN: i64 = 20;
pub const FALLBACK_OTHER_CITY_DISTANCE_KM: Decimal = Decimal::from_parts(15, 0, 0, false, 0);
pub const FALLBACK_OTHER_CITY_DURATION_MIN: i64 = 45;

// Outbound call deadlines
pub const POSTAL_LOOKUP_TIMEOUT: Duration = Duration::from_secs(8);
pub const DISTANCE_MATRIX_TIMEOUT: Duration = Duration::from_secs(8);
pub const CATALOG_FEED_TIMEOUT: Duration = Duration::from_secs(15);

pub const POSTAL_CODE_DIGITS: usize = 8;

// Admin session
pub const ADMIN_TOKEN_EXPIRY: Duration = Duration::from_secs(8 * 60 * 60); // 8 hours
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

// Catalog defaults
pub const DEFAULT_STOCK_STATUS: &str = "OK";
pub const DEFAULT_CATEGORY: &str = "Diversos";
pub const CATALOG_TOTAL_ROW_MARKER: &str = "Total Geral";

// Validation patterns
pub const COUPON_CODE_PATTERN: &str = r"^[A-Za-z0-9_-]{1,32}$";

// Success messages
pub const SUCCESS_LOGIN: &str = "Login successful";
pub const SUCCESS_COUPON_APPLIED: &str = "Coupon applied";
pub const SUCCESS_ORDER_PLACED: &str = "Order placed. We will contact you to confirm the payment.";

// Error messages
pub const ERROR_COUPON_CODE_REQUIRED: &str = "Please enter a coupon code.";
pub const ERROR_COUPON_NOT_FOUND: &str = "Coupon not found.";
pub const ERROR_COUPON_INACTIVE: &str = "This coupon is inactive.";
pub const ERROR_COUPON_EXPIRED: &str = "This coupon has expired.";
pub const ERROR_COUPON_MIN_PURCHASE: &str = "Minimum purchase for this coupon is";
pub const ERROR_COUPON_USAGE_LIMIT: &str = "This coupon has reached its usage limit.";
pub const ERROR_INVALID_POSTAL_CODE: &str = "Invalid postal code";
pub const ERROR_POSTAL_CODE_NOT_FOUND: &str = "Postal code not found";
pub const ERROR_POSTAL_LOOKUP_UNAVAILABLE: &str = "Postal code lookup is unavailable. Please try again later.";
pub const ERROR_POSTAL_LOOKUP_TIMEOUT: &str = "Postal code lookup timed out. Please try again later.";
pub const ERROR_MALFORMED_BODY: &str = "Malformed request body";
pub const ERROR_SHIPPING_REQUIRED: &str = "Please calculate shipping before finishing the order.";
pub const ERROR_EMPTY_CART: &str = "The cart is empty.";
pub const ERROR_PRODUCT_NOT_FOUND: &str = "Product not found";
pub const ERROR_COUPON_RECORD_NOT_FOUND: &str = "Coupon not found";
pub const ERROR_ADMIN_LOGIN_DISABLED: &str = "Admin login is not configured";
pub const ERROR_INVALID_CREDENTIALS: &str = "Invalid password";
pub const ERROR_UNEXPECTED: &str = "An unexpected error occurred. Please try again later.";
