use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

use crate::error::AppError;
use storefront_shared::COUPON_CODE_PATTERN;

static COUPON_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(COUPON_CODE_PATTERN).expect("COUPON_CODE_PATTERN is a valid regex")
});

/// Validate coupon code format (letters, digits, `-` and `_`)
pub fn validate_coupon_code(code: &str) -> Result<(), ValidationError> {
    if !COUPON_CODE_RE.is_match(code.trim()) {
        return Err(ValidationError::new("invalid_coupon_code"));
    }
    Ok(())
}

/// Validate a money amount is not negative
pub fn validate_non_negative(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::new("negative_amount"));
    }
    Ok(())
}

/// Validate a percentage discount stays within 0..=100
pub fn validate_percentage(amount: &Decimal) -> Result<(), ValidationError> {
    validate_non_negative(amount)?;
    if *amount > Decimal::ONE_HUNDRED {
        return Err(ValidationError::new("percentage_out_of_range"));
    }
    Ok(())
}

/// Convert validation errors to AppError
pub fn validation_errors_to_app_error(errors: ValidationErrors) -> AppError {
    let mut error_messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match error.code.as_ref() {
                "length" => "Invalid length",
                "range" => "Value out of range",
                "required" => "Field is required",
                "invalid_coupon_code" => "Coupon codes may only contain letters, numbers, '-' and '_'",
                "negative_amount" => "Amount cannot be negative",
                "percentage_out_of_range" => "Percentage must be between 0 and 100",
                _ => "Invalid value",
            };
            error_messages.push(format!("{}: {}", field, message));
        }
    }

    for (field, kind) in errors.errors() {
        if let validator::ValidationErrorsKind::List(items) = kind {
            for (index, nested) in items {
                for (nested_field, nested_errors) in nested.field_errors() {
                    for error in nested_errors {
                        error_messages.push(format!("{}[{}].{}: {}", field, index, nested_field, error.code));
                    }
                }
            }
        }
    }

    error_messages.sort();
    AppError::Validation(error_messages.join(", "))
}
