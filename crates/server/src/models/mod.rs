//! Row and request types for the REST API.
//!
//! Row types derive `sqlx::FromRow` and serialize with the camelCase field
//! names the mobile and web clients already use (`productName`, `cartItemId`,
//! ...). Input types validate themselves before any query runs.

pub mod address;
pub mod appointment;
pub mod cart;
pub mod dashboard;
pub mod order;
pub mod product;
pub mod review;
pub mod user;

use thiserror::Error;

/// A request body failed validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{0} is required")]
    Required(&'static str),

    /// A field has a value outside its allowed range or format.
    #[error("{field} {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl ValidationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Trim `value` and reject it if nothing is left.
pub(crate) fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(trimmed.to_owned())
}

/// Trim an optional value, mapping blank strings to `None`.
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("city", "  Cebu ").as_deref(), Ok("Cebu"));
        assert_eq!(required("city", "   "), Err(ValidationError::Required("city")));
    }

    #[test]
    fn test_optional_blank_is_none() {
        assert_eq!(optional(Some("  ")), None);
        assert_eq!(optional(Some(" Unit 4 ")).as_deref(), Some("Unit 4"));
        assert_eq!(optional(None), None);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ValidationError::Required("region").to_string(),
            "region is required"
        );
        assert_eq!(
            ValidationError::invalid("ratings", "must be between 1 and 5").to_string(),
            "ratings must be between 1 and 5"
        );
    }
}
