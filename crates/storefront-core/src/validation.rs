//! # Validation Module
//!
//! Input validation for admin calls and purchase requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE - shape checks                                    │
//! │  ├── non-zero addresses and currencies                                  │
//! │  └── positive quantities and supplies                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Catalog - cross-field rules                                   │
//! │  ├── reference-currency invariant                                       │
//! │  └── capacity ceilings                                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Validation stage - live state                                 │
//! │  ├── pause flag, SKU existence                                          │
//! │  └── per-purchase ceiling, remaining supply                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{StoreError, StoreResult, ValidationError};
use crate::types::{Address, Currency, ItemId, PriceEntry};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identity Validators
// =============================================================================

/// Rejects the null identity.
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_address;
/// use storefront_core::Address;
///
/// assert!(validate_address("payout", Address::new([1; 20])).is_ok());
/// assert!(validate_address("payout", Address::ZERO).is_err());
/// ```
pub fn validate_address(field: &'static str, address: Address) -> StoreResult<()> {
    if address.is_zero() {
        return Err(StoreError::ZeroAddress { field });
    }
    Ok(())
}

/// Rejects the null currency.
pub fn validate_currency(currency: Currency) -> ValidationResult<()> {
    if currency.is_zero() {
        return Err(ValidationError::Required {
            field: "currency".to_string(),
        });
    }
    Ok(())
}

/// Rejects a null recipient.
pub fn validate_recipient(recipient: Address) -> ValidationResult<()> {
    if recipient.is_zero() {
        return Err(ValidationError::Required {
            field: "recipient".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a requested quantity against the SKU's per-purchase ceiling.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed `max_per_purchase`
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_quantity;
///
/// assert!(validate_quantity(2, 2).is_ok());
/// assert!(validate_quantity(0, 2).is_err());
/// assert!(validate_quantity(3, 2).is_err());
/// ```
pub fn validate_quantity(quantity: u64, max_per_purchase: u64) -> StoreResult<()> {
    if quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into());
    }

    if quantity > max_per_purchase {
        return Err(StoreError::QuantityTooLarge {
            requested: quantity,
            max: max_per_purchase,
        });
    }

    Ok(())
}

/// Validates SKU creation arguments.
///
/// ## Rules
/// - `total_supply` must be positive
/// - `max_per_purchase` must be positive
pub fn validate_supply(total_supply: u64, max_per_purchase: u64) -> ValidationResult<()> {
    if total_supply == 0 {
        return Err(ValidationError::MustBePositive {
            field: "total_supply".to_string(),
        });
    }

    if max_per_purchase == 0 {
        return Err(ValidationError::MustBePositive {
            field: "max_per_purchase".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the shape of a price update list.
///
/// Every currency must be non-null. Content rules (reference invariant,
/// capacity) are enforced by the catalog once the update is applied.
pub fn validate_price_updates(updates: &[(Currency, PriceEntry)]) -> ValidationResult<()> {
    for (currency, _) in updates {
        validate_currency(*currency)?;
    }
    Ok(())
}

/// Rejects zero allocator item identifiers.
pub fn validate_item_ids(items: &[ItemId]) -> StoreResult<()> {
    if let Some(index) = items.iter().position(ItemId::is_zero) {
        return Err(StoreError::ZeroItemId { index });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Amount;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1, 2).is_ok());
        assert!(validate_quantity(2, 2).is_ok());

        assert!(matches!(
            validate_quantity(0, 2),
            Err(StoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
        assert!(matches!(
            validate_quantity(3, 2),
            Err(StoreError::QuantityTooLarge { requested: 3, max: 2 })
        ));
    }

    #[test]
    fn test_validate_supply() {
        assert!(validate_supply(3, 2).is_ok());
        assert!(validate_supply(0, 2).is_err());
        assert!(validate_supply(3, 0).is_err());
    }

    #[test]
    fn test_validate_currency_and_recipient() {
        assert!(validate_currency(Currency::NATIVE).is_ok());
        assert!(validate_currency(Currency::token(Address::ZERO)).is_err());
        assert!(validate_recipient(Address::new([7; 20])).is_ok());
        assert!(validate_recipient(Address::ZERO).is_err());
    }

    #[test]
    fn test_validate_price_updates_rejects_null_currency() {
        let updates = vec![
            (Currency::NATIVE, PriceEntry::Fixed(Amount::new(5))),
            (Currency::token(Address::ZERO), PriceEntry::OracleConverted),
        ];
        assert!(validate_price_updates(&updates).is_err());
    }

    #[test]
    fn test_validate_item_ids() {
        let items = vec![ItemId::from(1u64), ItemId::from(2u64)];
        assert!(validate_item_ids(&items).is_ok());

        let items = vec![ItemId::from(1u64), ItemId::from(0u64)];
        assert!(matches!(
            validate_item_ids(&items),
            Err(StoreError::ZeroItemId { index: 1 })
        ));
    }
}
