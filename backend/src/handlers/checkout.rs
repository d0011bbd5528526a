use actix_web::{web, HttpResponse};
use storefront_shared::CheckoutRequest;

use crate::error::AppError;
use crate::services::CheckoutService;

/// POST /api/checkout/quote
pub async fn quote(
    checkout_service: web::Data<CheckoutService>,
    request: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let summary = checkout_service.quote(&request).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// POST /api/checkout/orders
pub async fn place_order(
    checkout_service: web::Data<CheckoutService>,
    request: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let confirmation = checkout_service.place_order(&request).await?;
    Ok(HttpResponse::Created().json(confirmation))
}
