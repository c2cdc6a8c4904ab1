//! # Validation Module
//!
//! Form checks run before a write request leaves the console.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Console (THIS MODULE)                                        │
//! │  ├── Required fields, lengths, non-negative counts                     │
//! │  └── Immediate feedback, no round trip                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Backend (authoritative)                                      │
//! │  ├── 422 with field errors  → ApiError::Validation                     │
//! │  └── 400 on business rules (e.g. negative stock after adjust)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CustomerDraft, SaleDraft, StockAdjustment, VehicleStockDraft, VehicleStockPatch};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest name the backend's string columns accept.
pub const MAX_NAME_LENGTH: usize = 255;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a required display name (customer, model).
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates a stock count.
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a decimal amount entered by an operator.
///
/// ## Rules
/// - Must parse as a plain decimal
/// - At most 2 fraction digits
/// - Not negative
pub fn validate_amount(field: &str, raw: &str) -> ValidationResult<Money> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let fraction_digits = trimmed.split_once('.').map_or(0, |(_, f)| f.len());
    if fraction_digits > 2 {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "at most 2 decimal places".to_string(),
        });
    }

    let amount = Money::parse_decimal(trimmed).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a decimal number".to_string(),
    })?;

    if amount.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }

    Ok(amount)
}

// =============================================================================
// Form Validators
// =============================================================================

pub fn validate_customer_draft(draft: &CustomerDraft) -> ValidationResult<()> {
    validate_name("name", &draft.name)
}

pub fn validate_stock_draft(draft: &VehicleStockDraft) -> ValidationResult<()> {
    validate_name("model_name", &draft.model_name)?;
    validate_non_negative("quantity", draft.quantity)?;
    validate_non_negative("reserved", draft.reserved)?;
    Ok(())
}

pub fn validate_stock_patch(patch: &VehicleStockPatch) -> ValidationResult<()> {
    if let Some(quantity) = patch.quantity {
        validate_non_negative("quantity", quantity)?;
    }
    if let Some(reserved) = patch.reserved {
        validate_non_negative("reserved", reserved)?;
    }
    Ok(())
}

pub fn validate_adjustment(adjustment: &StockAdjustment) -> ValidationResult<()> {
    if adjustment.adjustment == 0 {
        return Err(ValidationError::MustBeNonZero {
            field: "adjustment".to_string(),
        });
    }
    Ok(())
}

/// A sale needs an existing customer or an inline customer name, plus a
/// valid amount.
pub fn validate_sale_draft(draft: &SaleDraft) -> ValidationResult<()> {
    if draft.customer_id.is_none() {
        let name = draft.customer_name.as_deref().unwrap_or("");
        validate_name("customer_name", name)?;
    }
    validate_amount("amount_received", &draft.amount_received)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMode;

    fn sale_draft() -> SaleDraft {
        SaleDraft {
            customer_id: Some(4),
            customer_name: None,
            customer_phone: None,
            customer_location: None,
            vehicle_stock_id: 9,
            payment_mode: PaymentMode::Cash,
            bank: None,
            payment_date: None,
            amount_received: "85000.00".to_string(),
            is_payment_received: true,
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Ravi Kumar").is_ok());
        assert!(matches!(
            validate_name("name", "   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_name("name", &"x".repeat(256)),
            Err(ValidationError::TooLong { max: 255, .. })
        ));
    }

    #[test]
    fn test_validate_amount() {
        assert_eq!(validate_amount("amount", "1000.5").unwrap().paise(), 100_050);
        assert!(validate_amount("amount", "").is_err());
        assert!(validate_amount("amount", "12.345").is_err());
        assert!(validate_amount("amount", "12a").is_err());
        assert!(matches!(
            validate_amount("amount", "-1"),
            Err(ValidationError::MustBeNonNegative { .. })
        ));
    }

    #[test]
    fn test_validate_stock_forms() {
        let mut draft = VehicleStockDraft {
            model_name: "City".to_string(),
            quantity: 3,
            ..Default::default()
        };
        assert!(validate_stock_draft(&draft).is_ok());
        draft.reserved = -1;
        assert!(validate_stock_draft(&draft).is_err());

        let patch = VehicleStockPatch {
            quantity: Some(-2),
            ..Default::default()
        };
        assert!(validate_stock_patch(&patch).is_err());

        assert!(validate_adjustment(&StockAdjustment { adjustment: 0 }).is_err());
        assert!(validate_adjustment(&StockAdjustment { adjustment: -3 }).is_ok());
    }

    #[test]
    fn test_validate_sale_draft_customer_rules() {
        let mut draft = sale_draft();
        assert!(validate_sale_draft(&draft).is_ok());

        draft.customer_id = None;
        assert!(matches!(
            validate_sale_draft(&draft),
            Err(ValidationError::Required { ref field }) if field == "customer_name"
        ));

        draft.customer_name = Some("Meera".to_string());
        assert!(validate_sale_draft(&draft).is_ok());
    }
}
