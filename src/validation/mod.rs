pub mod amount;
pub mod request;

pub use amount::validate_amount_asset;
pub use request::{require_non_empty, RequestValidationError};
