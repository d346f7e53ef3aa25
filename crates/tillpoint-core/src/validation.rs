//! # Validation Module
//!
//! Input validation for caller-supplied request fields.
//!
//! Validation here runs before any storage is touched (the engine calls
//! these on every posting request); the database constraints behind it are
//! the second line of defense.

use crate::error::{ValidationError, ValidationResult};
use crate::quantity::Quantity;
use crate::MAX_PAYMENT_METHOD_LEN;

/// Validates a requested quantity.
///
/// ## Rules
/// - Must be strictly positive. Callers request positive quantities even
///   for refunds; negation is applied by the engine when it writes lines.
///
/// ## Example
/// ```rust
/// use tillpoint_core::quantity::Quantity;
/// use tillpoint_core::validation::validate_quantity;
///
/// assert!(validate_quantity(Quantity::from_millis(1500)).is_ok());
/// assert!(validate_quantity(Quantity::zero()).is_err());
/// assert!(validate_quantity(Quantity::from_millis(-500)).is_err());
/// ```
pub fn validate_quantity(qty: Quantity) -> ValidationResult<()> {
    if !qty.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a payment method label.
///
/// ## Rules
/// - Must not be empty (a transaction always records how it was tendered)
/// - Must be at most 40 characters
///
/// The label is opaque: "cash", "card", "voucher" are all equally fine.
/// No authorization happens anywhere in this system.
pub fn validate_payment_method(method: &str) -> ValidationResult<()> {
    let method = method.trim();

    if method.is_empty() {
        return Err(ValidationError::Required {
            field: "payment_method".to_string(),
        });
    }

    if method.len() > MAX_PAYMENT_METHOD_LEN {
        return Err(ValidationError::TooLong {
            field: "payment_method".to_string(),
            max: MAX_PAYMENT_METHOD_LEN,
        });
    }

    Ok(())
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(Quantity::from_units(1)).is_ok());
        assert!(validate_quantity(Quantity::from_millis(1)).is_ok());

        assert!(validate_quantity(Quantity::zero()).is_err());
        assert!(validate_quantity(Quantity::from_millis(-1000)).is_err());
    }

    #[test]
    fn test_validate_payment_method() {
        assert!(validate_payment_method("cash").is_ok());
        assert!(validate_payment_method("store-credit").is_ok());

        assert!(validate_payment_method("").is_err());
        assert!(validate_payment_method("   ").is_err());
        assert!(validate_payment_method(&"x".repeat(41)).is_err());
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("APL-GALA").is_ok());
        assert!(validate_sku("milk_2l").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(51)).is_err());
    }
}
