pub mod auth_service;
pub mod catalog_service;
pub mod checkout_service;
pub mod coupon_service;
pub mod shipping_service;

pub use auth_service::AuthService;
pub use catalog_service::CatalogService;
pub use checkout_service::CheckoutService;
pub use coupon_service::{CouponService, CouponValidation};
pub use shipping_service::{ShippingError, ShippingService};
