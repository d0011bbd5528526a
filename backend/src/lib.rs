//! Storefront backend: shipping estimates, coupons, catalog and checkout
//! for the natural-products shop.

pub mod clients;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use actix_web::web;

use crate::config::AppConfig;
use crate::database::Database;
use crate::error::AppError;
use crate::middleware::AdminAuth;
use crate::services::{AuthService, CatalogService, CheckoutService, CouponService, ShippingService};
use crate::utils::JwtService;

/// Everything the HTTP layer needs, built once and shared by all workers.
#[derive(Clone)]
pub struct AppServices {
    pub database: web::Data<Database>,
    pub shipping: web::Data<ShippingService>,
    pub coupons: web::Data<CouponService>,
    pub catalog: web::Data<CatalogService>,
    pub checkout: web::Data<CheckoutService>,
    pub auth: web::Data<AuthService>,
}

impl AppServices {
    pub fn from_config(config: &AppConfig, database: &Database) -> Result<Self, AppError> {
        let jwt_service = JwtService::new(&config.jwt_secret)?;
        let pool = database.pool().clone();

        let coupons = CouponService::new(pool.clone());
        let checkout = CheckoutService::new(pool.clone(), coupons.clone());

        Ok(Self {
            database: web::Data::new(database.clone()),
            shipping: web::Data::new(ShippingService::from_config(config)?),
            catalog: web::Data::new(CatalogService::from_config(pool, config)?),
            checkout: web::Data::new(checkout),
            coupons: web::Data::new(coupons),
            auth: web::Data::new(AuthService::new(
                jwt_service,
                config.admin_password_hash.clone(),
            )),
        })
    }

    /// Registers shared state and every route under `/api`.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(handlers::json_config())
            .app_data(self.database.clone())
            .app_data(self.shipping.clone())
            .app_data(self.coupons.clone())
            .app_data(self.catalog.clone())
            .app_data(self.checkout.clone())
            .app_data(self.auth.clone())
            .service(
                web::scope("/api")
                    .service(handlers::health::health_check)
                    .service(
                        web::resource("/calculate-shipping")
                            .app_data(handlers::shipping::json_config())
                            .route(web::post().to(handlers::shipping::calculate_shipping)),
                    )
                    .route("/coupons/validate", web::post().to(handlers::coupons::validate_coupon))
                    .service(
                        web::scope("/products")
                            .route("", web::get().to(handlers::products::list_products))
                            .route("/categories", web::get().to(handlers::products::list_categories))
                            .route("/{product_id}", web::get().to(handlers::products::get_product)),
                    )
                    .service(
                        web::scope("/checkout")
                            .route("/quote", web::post().to(handlers::checkout::quote))
                            .route("/orders", web::post().to(handlers::checkout::place_order)),
                    )
                    .service(
                        web::scope("/admin")
                            .route("/login", web::post().to(handlers::admin::login))
                            // Protected admin endpoints
                            .service(
                                web::scope("")
                                    .wrap(AdminAuth::new(self.auth.jwt_service().clone()))
                                    .route("/logout", web::post().to(handlers::admin::logout))
                                    .route("/coupons", web::get().to(handlers::coupons::list_coupons))
                                    .route("/coupons", web::post().to(handlers::coupons::create_coupon))
                                    .route("/coupons/new", web::get().to(handlers::coupons::new_coupon))
                                    .route("/coupons/{coupon_id}", web::get().to(handlers::coupons::get_coupon))
                                    .route("/coupons/{coupon_id}", web::put().to(handlers::coupons::update_coupon))
                                    .route("/coupons/{coupon_id}", web::delete().to(handlers::coupons::delete_coupon))
                                    .route("/products", web::get().to(handlers::products::list_admin_products))
                                    .route("/products", web::post().to(handlers::products::create_product))
                                    .route("/products/new", web::get().to(handlers::products::new_product))
                                    .route("/products/{product_id}", web::put().to(handlers::products::update_product))
                                    .route("/products/{product_id}", web::delete().to(handlers::products::delete_product)),
                            ),
                    ),
            );
    }
}
