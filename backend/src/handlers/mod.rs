pub mod admin;
pub mod checkout;
pub mod coupons;
pub mod health;
pub mod products;
pub mod shipping;

use actix_web::{error::JsonPayloadError, web, HttpRequest};
use storefront_shared::ERROR_MALFORMED_BODY;
use tracing::debug;

use crate::error::AppError;

/// JSON extractor settings shared by every endpoint: unreadable bodies are
/// reported as `malformed_request_body` instead of actix's plain-text 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err: JsonPayloadError, req: &HttpRequest| {
            debug!("Malformed JSON body on {}: {}", req.path(), err);
            AppError::MalformedBody(ERROR_MALFORMED_BODY.to_string()).into()
        })
}
