//! Database models for the storefront.
//!
//! Each model maps to one SQLite table and carries its own queries.

pub mod coupon;
pub mod product;

pub use coupon::{Coupon, UsageIncrement};
pub use product::Product;
