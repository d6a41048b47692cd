//! # Amount Module
//!
//! Provides the `Amount` type for token quantities and the 18-decimal
//! fixed-point helpers the oracle extensions rely on.
//!
//! ## Why a 256-bit Intermediate?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE OVERFLOW PROBLEM                                                   │
//! │                                                                         │
//! │  Token amounts carry 18 decimals: 1,000 tokens = 10^21 base units.      │
//! │  Oracle conversion multiplies by the scale before dividing:             │
//! │                                                                         │
//! │    10^21 × 10^18 = 10^39   > u128::MAX (≈ 3.4 × 10^38)  ❌ OVERFLOW      │
//! │                                                                         │
//! │  OUR SOLUTION: multiply in U256, divide, then narrow back with a check │
//! │    (a × b) / d  computed in 256 bits, result must fit 128 bits          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Amount;
//!
//! let unit = Amount::new(1_000);
//! let total = unit.checked_mul_qty(3).unwrap();
//! assert_eq!(total.get(), 3_000);
//!
//! // reference total × 10^18 / rate
//! let priced = total.checked_mul_div(Amount::SCALE, 2 * Amount::SCALE).unwrap();
//! assert_eq!(priced.get(), 1_500);
//! ```

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Amount Type
// =============================================================================

/// A token amount in the currency's smallest unit.
///
/// ## Design Decisions
/// - **u128 (unsigned)**: balances and prices are never negative
/// - **Checked arithmetic only**: no `Add`/`Mul` operator impls, every
///   operation that can overflow returns `Option`
/// - **Single field tuple struct**: zero-cost abstraction over u128
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);
    pub const MAX: Amount = Amount(u128::MAX);

    /// Fixed-point scale shared with the price oracle (18 decimals).
    pub const SCALE: u128 = 1_000_000_000_000_000_000;

    #[inline]
    pub const fn new(value: u128) -> Self {
        Amount(value)
    }

    /// Whole units with 18 decimals, e.g. `from_units(5)` = 5 × 10^18.
    pub fn from_units(units: u128) -> Option<Self> {
        units.checked_mul(Self::SCALE).map(Amount)
    }

    #[inline]
    pub const fn get(&self) -> u128 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Difference clamped at zero.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Amount(self.0.saturating_sub(rhs.0))
    }

    /// Multiplies a unit price by a purchase quantity.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Amount;
    ///
    /// let unit_price = Amount::new(299);
    /// assert_eq!(unit_price.checked_mul_qty(3), Some(Amount::new(897)));
    /// assert_eq!(Amount::MAX.checked_mul_qty(2), None);
    /// ```
    pub fn checked_mul_qty(self, quantity: u64) -> Option<Self> {
        self.0.checked_mul(quantity as u128).map(Amount)
    }

    /// Computes `self × numerator / denominator`, rounding down.
    ///
    /// The product is formed in 256 bits so the only failure modes are a
    /// zero denominator and a quotient that no longer fits in 128 bits.
    pub fn checked_mul_div(self, numerator: u128, denominator: u128) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        let product = U256::from(self.0).checked_mul(U256::from(numerator))?;
        narrow(product / U256::from(denominator))
    }

    /// Computes `self × numerator / denominator`, rounding up.
    ///
    /// Used when quoting how much of a currency is *needed*: the quote must
    /// never come out short.
    pub fn checked_mul_div_ceil(self, numerator: u128, denominator: u128) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        let product = U256::from(self.0).checked_mul(U256::from(numerator))?;
        let denominator = U256::from(denominator);
        let mut quotient = product / denominator;
        if !(product % denominator).is_zero() {
            quotient += U256::from(1u8);
        }
        narrow(quotient)
    }
}

/// Narrows a 256-bit value back to an `Amount`, failing when it does not fit.
fn narrow(value: U256) -> Option<Amount> {
    if value > U256::from(u128::MAX) {
        return None;
    }
    Some(Amount(value.to::<u128>()))
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Amount(value)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
