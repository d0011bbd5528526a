pub mod jwt;
pub mod text;
pub mod validation;

pub use jwt::{Claims, JwtService};
pub use text::*;
pub use validation::*;
