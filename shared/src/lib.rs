pub mod constants;
pub mod dto;
pub mod format;
pub mod types;

pub use constants::*;
pub use dto::*;
pub use format::*;
pub use types::*;
