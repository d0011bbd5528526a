use actix_web::{web, HttpResponse};
use serde_json::json;
use storefront_shared::ProductQuery;

use crate::error::AppError;
use crate::middleware::AuthenticatedAdmin;
use crate::models::Product;
use crate::services::CatalogService;

/// GET /api/products?category=&q=&featured=
pub async fn list_products(
    catalog_service: web::Data<CatalogService>,
    query: web::Query<ProductQuery>,
) -> Result<HttpResponse, AppError> {
    let products = catalog_service.query(&query).await?;
    Ok(HttpResponse::Ok().json(products))
}

/// GET /api/products/categories
pub async fn list_categories(
    catalog_service: web::Data<CatalogService>,
) -> Result<HttpResponse, AppError> {
    let categories = catalog_service.categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

/// GET /api/products/{product_id}
pub async fn get_product(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let product = catalog_service.get(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

/// GET /api/admin/products
pub async fn list_admin_products(
    catalog_service: web::Data<CatalogService>,
    _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    let products = catalog_service.list().await?;
    Ok(HttpResponse::Ok().json(products))
}

/// GET /api/admin/products/new
pub async fn new_product(
    catalog_service: web::Data<CatalogService>,
    _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(catalog_service.create_new()))
}

/// POST /api/admin/products
pub async fn create_product(
    catalog_service: web::Data<CatalogService>,
    request: web::Json<Product>,
    _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    let product = catalog_service.save(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(product))
}

/// PUT /api/admin/products/{product_id}
pub async fn update_product(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<String>,
    request: web::Json<Product>,
    _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    catalog_service.get(&product_id).await?;

    let mut product = request.into_inner();
    product.id = product_id;

    let product = catalog_service.save(product).await?;
    Ok(HttpResponse::Ok().json(product))
}

/// DELETE /api/admin/products/{product_id}
pub async fn delete_product(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<String>,
    _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    catalog_service.delete(&product_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Product deleted",
        "id": product_id
    })))
}
