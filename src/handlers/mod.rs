// handlers/mod.rs - three security tiers
//
// Public (no auth) -> Protected (JWT) -> Elevated (JWT + ADMIN role)

pub mod elevated;
pub mod protected;
pub mod public;

use crate::error::ApiError;

/// Required field taken from an optional request field
pub(crate) fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::field_error(field, format!("{} is required", field)))
}

/// Ids must be positive integers
pub(crate) fn positive_id(value: Option<i64>, field: &str) -> Result<i64, ApiError> {
    match required(value, field)? {
        id if id > 0 => Ok(id),
        _ => Err(ApiError::field_error(field, "must be a positive integer")),
    }
}
