//! # Storefront Configuration
//!
//! Catalog-wide settings fixed at construction.
//!
//! Loading from files and the environment lives in `storefront-runtime`;
//! this module only defines the shape and its validation.
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! owner = "0x1111111111111111111111111111111111111111"
//! payout = "0x2222222222222222222222222222222222222222"
//! account = "0x3333333333333333333333333333333333333333"
//! reference_currency = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"
//! start_paused = false
//!
//! [limits]
//! max_skus = 64
//! max_currencies_per_sku = 8
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult, ValidationError};
use crate::types::{Address, Currency};
use crate::validation::validate_address;

// =============================================================================
// Store Settings
// =============================================================================

/// Identities and the reference currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Account allowed to perform admin calls.
    pub owner: Address,

    /// Destination of settled payments.
    pub payout: Address,

    /// The storefront's own holding account (used while swapping).
    pub account: Address,

    /// Currency every non-empty price list must quote.
    #[serde(default = "default_reference_currency")]
    pub reference_currency: Currency,

    /// Launch with purchases blocked.
    #[serde(default)]
    pub start_paused: bool,
}

fn default_reference_currency() -> Currency {
    Currency::NATIVE
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            owner: Address::ZERO,
            payout: Address::ZERO,
            account: Address::ZERO,
            reference_currency: default_reference_currency(),
            start_paused: false,
        }
    }
}

// =============================================================================
// Limits
// =============================================================================

/// Capacity ceilings that bound container sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default = "default_max_skus")]
    pub max_skus: usize,

    #[serde(default = "default_max_currencies")]
    pub max_currencies_per_sku: usize,
}

fn default_max_skus() -> usize {
    64
}

fn default_max_currencies() -> usize {
    8
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_skus: default_max_skus(),
            max_currencies_per_sku: default_max_currencies(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete storefront configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub limits: Limits,
}

impl StorefrontConfig {
    /// Builds a config with default limits.
    pub fn new(owner: Address, payout: Address, account: Address, reference: Currency) -> Self {
        StorefrontConfig {
            store: StoreSettings {
                owner,
                payout,
                account,
                reference_currency: reference,
                start_paused: false,
            },
            limits: Limits::default(),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        validate_address("owner", self.store.owner)?;
        validate_address("payout", self.store.payout)?;
        validate_address("account", self.store.account)?;

        if self.store.reference_currency.is_zero() {
            return Err(StoreError::ZeroAddress {
                field: "reference_currency",
            });
        }

        if self.limits.max_skus == 0 {
            return Err(ValidationError::MustBePositive {
                field: "max_skus".to_string(),
            }
            .into());
        }

        if self.limits.max_currencies_per_sku == 0 {
            return Err(ValidationError::MustBePositive {
                field: "max_currencies_per_sku".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    #[test]
    fn test_default_config_is_incomplete() {
        let config = StorefrontConfig::default();
        assert_eq!(config.limits.max_skus, 64);
        assert_eq!(config.store.reference_currency, Currency::NATIVE);
        assert!(matches!(
            config.validate(),
            Err(StoreError::ZeroAddress { field: "owner" })
        ));
    }

    #[test]
    fn test_config_validation() {
        let mut config = StorefrontConfig::new(addr(1), addr(2), addr(3), Currency::NATIVE);
        assert!(config.validate().is_ok());

        config.limits.max_currencies_per_sku = 0;
        assert!(config.validate().is_err());

        config.limits.max_currencies_per_sku = 4;
        config.store.payout = Address::ZERO;
        assert!(matches!(
            config.validate(),
            Err(StoreError::ZeroAddress { field: "payout" })
        ));
    }
}
