//! Request validator: structural validation of RPC request payloads. Runs
//! to completion before any domain validation.
use crate::error::DispatchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestValidationError(pub String);

impl From<RequestValidationError> for DispatchError {
    fn from(e: RequestValidationError) -> Self {
        DispatchError::InvalidParams(e.0)
    }
}

/// Fails with a single human-readable summary if `value` is empty/whitespace.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), RequestValidationError> {
    if value.trim().is_empty() {
        Err(RequestValidationError(format!("{field} is required")))
    } else {
        Ok(())
    }
}
