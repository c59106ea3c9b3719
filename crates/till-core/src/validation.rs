//! # Validation Module
//!
//! Input validation rules shared by the catalog loader and the cart.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: till-ffi                                                      │
//! │  ├── Null pointers, UTF-8, handle liveness                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: JSON parser                                                   │
//! │  ├── Grammar, nesting depth                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE                                                   │
//! │  ├── Field rules (non-empty ids, positive qty, non-negative cents)     │
//! │  └── Runs before any state is touched                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::json::JsonValue;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item id passed to a cart operation.
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_item_id;
///
/// assert!(validate_item_id("COFFEE").is_ok());
/// assert!(validate_item_id("").is_err());
/// ```
pub fn validate_item_id(item_id: &str) -> ValidationResult<()> {
    if item_id.is_empty() {
        return Err(ValidationError::Required {
            field: "item_id".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity to add to the cart.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "qty".to_string(),
        });
    }
    Ok(())
}

/// Validates the amount tendered by the customer.
///
/// Zero is allowed (nothing tendered yet).
pub fn validate_given_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "given_cents".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// JSON Field Validators
// =============================================================================

/// Reads a required, non-empty string field.
pub fn required_string<'a>(value: Option<&'a JsonValue>, field: &str) -> ValidationResult<&'a str> {
    let Some(value) = value else {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    };
    let text = value.as_str().ok_or_else(|| ValidationError::InvalidType {
        field: field.to_string(),
        expected: "a string",
    })?;
    if text.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(text)
}

/// Reads an optional string field, defaulting to empty.
pub fn optional_string(value: Option<&JsonValue>, field: &str) -> ValidationResult<String> {
    match value {
        None => Ok(String::new()),
        Some(JsonValue::String(text)) => Ok(text.clone()),
        Some(_) => Err(ValidationError::InvalidType {
            field: field.to_string(),
            expected: "a string",
        }),
    }
}

/// Reads a required cents amount.
///
/// ## Rules
/// ```text
/// absent / not a number ──► InvalidType
/// 500.0, 5e2           ──► NotInteger   (shape matters, not value)
/// -1                   ──► MustBeNonNegative
/// 1e30 written out     ──► OutOfRange
/// 0, 500               ──► Ok
/// ```
pub fn required_cents(value: Option<&JsonValue>, field: &str) -> ValidationResult<i64> {
    let Some(number) = value.and_then(JsonValue::as_number) else {
        return Err(ValidationError::InvalidType {
            field: field.to_string(),
            expected: "an integer",
        });
    };
    if !number.is_integer_shaped() {
        return Err(ValidationError::NotInteger {
            field: field.to_string(),
        });
    }
    match number.as_i64() {
        Some(cents) if cents < 0 => Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        }),
        Some(cents) => Ok(cents),
        None if number.is_sign_negative() => Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        }),
        None => Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::parse;

    fn cents(text: &str) -> ValidationResult<i64> {
        let value = parse(text).unwrap();
        required_cents(Some(&value), "unit_cents")
    }

    #[test]
    fn test_validate_item_id() {
        assert!(validate_item_id("COFFEE").is_ok());
        assert!(validate_item_id(" ").is_ok());
        assert!(validate_item_id("").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(10_000).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_given_cents() {
        assert!(validate_given_cents(0).is_ok());
        assert!(validate_given_cents(2000).is_ok());
        assert!(validate_given_cents(-1).is_err());
    }

    #[test]
    fn test_required_cents() {
        assert_eq!(cents("0"), Ok(0));
        assert_eq!(cents("500"), Ok(500));
        assert_eq!(cents("-0"), Ok(0));
        assert_eq!(cents("9223372036854775807"), Ok(i64::MAX));

        assert!(matches!(cents("500.0"), Err(ValidationError::NotInteger { .. })));
        assert!(matches!(cents("5e2"), Err(ValidationError::NotInteger { .. })));
        assert!(matches!(cents("-1"), Err(ValidationError::MustBeNonNegative { .. })));
        assert!(matches!(
            cents("-99999999999999999999"),
            Err(ValidationError::MustBeNonNegative { .. })
        ));
        assert!(matches!(
            cents("9223372036854775808"),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(cents("\"500\""), Err(ValidationError::InvalidType { .. })));
        assert!(matches!(
            required_cents(None, "unit_cents"),
            Err(ValidationError::InvalidType { .. })
        ));
    }

    #[test]
    fn test_string_fields() {
        let id = JsonValue::from("TEA");
        assert_eq!(required_string(Some(&id), "id"), Ok("TEA"));

        let empty = JsonValue::from("");
        assert!(matches!(
            required_string(Some(&empty), "id"),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            required_string(Some(&JsonValue::from(5)), "id"),
            Err(ValidationError::InvalidType { .. })
        ));
        assert!(matches!(
            required_string(None, "id"),
            Err(ValidationError::Required { .. })
        ));

        assert_eq!(optional_string(None, "name"), Ok(String::new()));
        assert_eq!(optional_string(Some(&id), "name"), Ok("TEA".to_string()));
        assert!(optional_string(Some(&JsonValue::Null), "name").is_err());
    }
}
