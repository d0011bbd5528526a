pub mod auth;

pub use auth::{AdminAuth, AuthenticatedAdmin};
