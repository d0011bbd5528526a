use actix_web::{web, HttpResponse};
use serde_json::json;
use storefront_shared::AdminLoginRequest;

use crate::error::AppError;
use crate::middleware::AuthenticatedAdmin;
use crate::services::AuthService;

/// POST /api/admin/login
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<AdminLoginRequest>,
) -> Result<HttpResponse, AppError> {
    let response = auth_service.login(&request).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/admin/logout
pub async fn logout(
    auth_service: web::Data<AuthService>,
    admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    auth_service.logout(&admin.claims)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Logged out" })))
}
