use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use storefront_shared::{ShippingRequest, ERROR_MALFORMED_BODY};
use tracing::debug;

use crate::error::AppError;
use crate::services::{ShippingError, ShippingService};

/// Body errors on the estimator surface as its own `MalformedRequestBody`.
pub fn json_config() -> web::JsonConfig {
    super::json_config().error_handler(|err: JsonPayloadError, req: &HttpRequest| {
        debug!("Malformed shipping request on {}: {}", req.path(), err);
        AppError::from(ShippingError::MalformedRequestBody(ERROR_MALFORMED_BODY.to_string())).into()
    })
}

/// POST /api/calculate-shipping
pub async fn calculate_shipping(
    shipping_service: web::Data<ShippingService>,
    request: web::Json<ShippingRequest>,
) -> Result<HttpResponse, AppError> {
    debug!("Shipping estimate requested for {:?}", request.cep);

    let estimate = shipping_service.estimate(&request.cep).await?;
    Ok(HttpResponse::Ok().json(estimate))
}
