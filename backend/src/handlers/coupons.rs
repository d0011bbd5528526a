use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use storefront_shared::ValidateCouponRequest;

use crate::error::AppError;
use crate::middleware::AuthenticatedAdmin;
use crate::models::Coupon;
use crate::services::coupon_service::calculate_discount;
use crate::services::CouponService;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponResponse {
    pub valid: bool,
    pub message: Option<String>,
    pub coupon: Option<Coupon>,
    pub discount: Decimal,
}

/// POST /api/coupons/validate
///
/// Rejections are a normal answer (200 with `valid: false`), not an error.
pub async fn validate_coupon(
    coupon_service: web::Data<CouponService>,
    request: web::Json<ValidateCouponRequest>,
) -> Result<HttpResponse, AppError> {
    let validation = coupon_service
        .validate(&request.code, request.order_total)
        .await?;

    let discount = match (&validation.coupon, validation.valid) {
        (Some(coupon), true) => calculate_discount(coupon, request.order_total),
        _ => Decimal::ZERO,
    };

    Ok(HttpResponse::Ok().json(ValidateCouponResponse {
        valid: validation.valid,
        message: validation.message,
        coupon: validation.coupon,
        discount,
    }))
}

/// GET /api/admin/coupons
pub async fn list_coupons(
    coupon_service: web::Data<CouponService>,
    _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    let coupons = coupon_service.list().await?;
    Ok(HttpResponse::Ok().json(coupons))
}

/// GET /api/admin/coupons/new
pub async fn new_coupon(
    coupon_service: web::Data<CouponService>,
    _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(coupon_service.create_new()))
}

/// GET /api/admin/coupons/{coupon_id}
pub async fn get_coupon(
    coupon_service: web::Data<CouponService>,
    path: web::Path<String>,
    _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    let coupon = coupon_service.get(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(coupon))
}

/// POST /api/admin/coupons
pub async fn create_coupon(
    coupon_service: web::Data<CouponService>,
    request: web::Json<Coupon>,
    _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    let coupon = coupon_service.save(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(coupon))
}

/// PUT /api/admin/coupons/{coupon_id}
pub async fn update_coupon(
    coupon_service: web::Data<CouponService>,
    path: web::Path<String>,
    request: web::Json<Coupon>,
    _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    let coupon_id = path.into_inner();
    coupon_service.get(&coupon_id).await?;

    let mut coupon = request.into_inner();
    coupon.id = coupon_id;

    let coupon = coupon_service.save(coupon).await?;
    Ok(HttpResponse::Ok().json(coupon))
}

/// DELETE /api/admin/coupons/{coupon_id}
pub async fn delete_coupon(
    coupon_service: web::Data<CouponService>,
    path: web::Path<String>,
    _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    let coupon_id = path.into_inner();
    coupon_service.delete(&coupon_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Coupon deleted",
        "id": coupon_id
    })))
}
