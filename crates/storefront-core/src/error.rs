//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                     │
//! │  ├── StoreError       - Every failure a caller of the catalog sees      │
//! │  ├── ValidationError  - Field-level input failures                      │
//! │  ├── TransferError    - Vault collaborator failures                     │
//! │  └── OracleError      - Price oracle collaborator failures              │
//! │                                                                         │
//! │  storefront-runtime errors (separate crate)                             │
//! │  └── RuntimeError     - Config file / environment failures              │
//! │                                                                         │
//! │  Flow: TransferError / OracleError / ValidationError → StoreError       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, currency, counts)
//! 3. Errors are enum variants, never String
//! 4. Nothing is retried here; the caller resubmits with fresh state

use thiserror::Error;

use crate::money::Amount;
use crate::types::{Address, Currency, SkuId};

// =============================================================================
// Store Error
// =============================================================================

/// Broad category of a [`StoreError`].
///
/// Every category aborts the request it occurs in with no partial effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected admin call: duplicate SKU, capacity, missing reference price.
    Configuration,
    /// Paused catalog, bad quantity, unknown SKU, short supply.
    Validation,
    /// Undefined price or rate, arithmetic overflow.
    Pricing,
    /// Value could not be moved or swapped.
    Payment,
    /// Allocator ran out of items or rejected an edit.
    Delivery,
    /// The registered receiver failed.
    Notification,
    /// An entry point was re-entered while executing.
    Reentrancy,
}

/// Errors surfaced by the catalog and the purchase pipeline.
#[derive(Debug, Error)]
pub enum StoreError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Caller is not the catalog owner.
    #[error("Unauthorized: {caller} is not the catalog owner")]
    Unauthorized { caller: Address },

    /// SKU key already used.
    #[error("SKU already exists: {0}")]
    DuplicateSku(SkuId),

    /// Catalog holds the maximum number of SKUs.
    #[error("SKU capacity exceeded: at most {max} SKUs")]
    SkuCapacityExceeded { max: usize },

    /// Price list would hold too many currencies.
    #[error("Currency capacity exceeded for {sku}: at most {max} currencies")]
    CurrencyCapacityExceeded { sku: SkuId, max: usize },

    /// Non-empty price list without the reference currency.
    ///
    /// ## When This Occurs
    /// ```text
    /// prices = { USDC: 1000 }           reference = WETH
    ///      │
    ///      ▼
    /// NoReferenceCurrency  ("no reference token")
    ///
    /// prices = { WETH: 10, USDC: 1000 }  set WETH → 0
    ///      │
    ///      ▼
    /// NoReferenceCurrency  (USDC would remain alone)
    /// ```
    #[error("No reference token: price list for {sku} must quote {reference}")]
    NoReferenceCurrency { sku: SkuId, reference: Currency },

    /// Address that must be set is the null identity.
    #[error("{field} must not be the zero address")]
    ZeroAddress { field: &'static str },

    /// Allocator item identifiers must be non-zero.
    #[error("Item identifier at position {index} is zero")]
    ZeroItemId { index: usize },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    /// Catalog is paused; every purchase and estimate is rejected.
    #[error("Paused")]
    Paused,

    /// Operation requires the catalog to be paused.
    #[error("Catalog must be paused")]
    NotPaused,

    /// SKU key has never been created.
    #[error("SKU not found: {0}")]
    SkuNotFound(SkuId),

    /// Quantity exceeds the per-purchase ceiling.
    #[error("Quantity {requested} exceeds maximum per purchase ({max})")]
    QuantityTooLarge { requested: u64, max: u64 },

    /// Not enough remaining supply.
    #[error("Insufficient supply for {sku}: available {available}, requested {requested}")]
    InsufficientSupply {
        sku: SkuId,
        available: u64,
        requested: u64,
    },

    /// Field-level validation failure.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Pricing / Oracle Errors
    // =========================================================================
    /// The SKU has no usable price entry for the currency.
    #[error("Undefined price for {sku} in {currency}")]
    UndefinedPrice { sku: SkuId, currency: Currency },

    /// The oracle has no rate for the currency.
    #[error("Undefined rate for {0}")]
    UndefinedRate(Currency),

    /// The oracle cannot quote a swap between the pair.
    #[error("Cannot estimate swap from {from} to {to}")]
    CannotEstimate { from: Currency, to: Currency },

    /// Fixed-point arithmetic overflowed.
    #[error("Arithmetic overflow while computing {context}")]
    Overflow { context: &'static str },

    // =========================================================================
    // Payment Errors
    // =========================================================================
    /// Holder cannot cover the amount.
    #[error("Insufficient funds in {currency}: required {required}, available {available}")]
    InsufficientFunds {
        currency: Currency,
        required: Amount,
        available: Amount,
    },

    /// Vault refused the transfer.
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    /// Oracle swap failed or consumed more than was collected.
    #[error("Swap failed: {0}")]
    SwapFailed(String),

    // =========================================================================
    // Delivery Errors
    // =========================================================================
    /// Allocator has fewer unassigned items than requested.
    #[error("Out of allocator supply: available {available}, requested {requested}")]
    OutOfAllocatorSupply { available: usize, requested: u64 },

    /// Allocator's own SKU must be launched together with its items.
    #[error("SKU {0} is allocator-managed; launch it with its items")]
    AllocatedSkuReserved(SkuId),

    /// Allocator serves a different SKU.
    #[error("Allocator bound to another SKU: expected {expected}, got {actual}")]
    AllocatorSkuMismatch { expected: SkuId, actual: SkuId },

    /// Position already delivered; it can never change.
    #[error("Item {index} already delivered (cursor at {cursor})")]
    DeliveredItemImmutable { index: usize, cursor: usize },

    /// Position past the end of the allocator list.
    #[error("Item index {index} out of range (len {len})")]
    ItemIndexOutOfRange { index: usize, len: usize },

    // =========================================================================
    // Notification Errors
    // =========================================================================
    /// Receiver address has no registered implementation.
    #[error("Receiver unavailable: {0}")]
    ReceiverUnavailable(Address),

    /// Receiver rejected the purchase.
    #[error("Receiver rejected purchase: {0}")]
    ReceiverRejected(String),

    // =========================================================================
    // Reentrancy
    // =========================================================================
    /// An entry point was called from inside a running request.
    #[error("Reentrant call rejected")]
    ReentrantCall,

    /// A previous request panicked while holding the storefront lock.
    #[error("Storefront lock poisoned")]
    Poisoned,
}

impl StoreError {
    /// Categorizes the error per the failure taxonomy.
    pub fn kind(&self) -> ErrorKind {
        use StoreError::*;
        match self {
            Unauthorized { .. }
            | DuplicateSku(_)
            | SkuCapacityExceeded { .. }
            | CurrencyCapacityExceeded { .. }
            | NoReferenceCurrency { .. }
            | ZeroAddress { .. }
            | ZeroItemId { .. }
            | AllocatedSkuReserved(_) => ErrorKind::Configuration,
            Paused
            | NotPaused
            | SkuNotFound(_)
            | QuantityTooLarge { .. }
            | InsufficientSupply { .. }
            | Validation(_) => ErrorKind::Validation,
            UndefinedPrice { .. } | UndefinedRate(_) | CannotEstimate { .. } | Overflow { .. } => {
                ErrorKind::Pricing
            }
            InsufficientFunds { .. } | TransferFailed(_) | SwapFailed(_) => ErrorKind::Payment,
            OutOfAllocatorSupply { .. }
            | AllocatorSkuMismatch { .. }
            | DeliveredItemImmutable { .. }
            | ItemIndexOutOfRange { .. } => ErrorKind::Delivery,
            ReceiverUnavailable(_) | ReceiverRejected(_) => ErrorKind::Notification,
            ReentrantCall | Poisoned => ErrorKind::Reentrancy,
        }
    }

    pub(crate) fn overflow(context: &'static str) -> Self {
        StoreError::Overflow { context }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required value is missing or the null identity.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },
}

// =============================================================================
// Collaborator Errors
// =============================================================================

/// Failures reported by a [`Vault`](crate::collab::Vault).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Amount, available: Amount },

    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Failures reported by a [`PriceOracle`](crate::collab::PriceOracle).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("undefined rate for {0}")]
    UndefinedRate(Currency),

    #[error("cannot estimate swap from {from} to {to}")]
    CannotEstimate { from: Currency, to: Currency },

    #[error("swap failed: {0}")]
    SwapFailed(String),

    #[error("oracle transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

impl From<OracleError> for StoreError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::UndefinedRate(currency) => StoreError::UndefinedRate(currency),
            OracleError::CannotEstimate { from, to } => StoreError::CannotEstimate { from, to },
            OracleError::SwapFailed(reason) => StoreError::SwapFailed(reason),
            OracleError::Transfer(inner) => StoreError::SwapFailed(inner.to_string()),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let sku = SkuId::from_name("sku");
        let err = StoreError::InsufficientSupply {
            sku,
            available: 2,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            format!("Insufficient supply for {sku}: available 2, requested 3")
        );
        assert_eq!(StoreError::Paused.to_string(), "Paused");
    }

    #[test]
    fn test_reference_error_mentions_reference_token() {
        let err = StoreError::NoReferenceCurrency {
            sku: SkuId::from_name("sku"),
            reference: Currency::NATIVE,
        };
        assert!(err.to_string().starts_with("No reference token"));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_validation_converts_to_store_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let store_err: StoreError = validation_err.into();
        assert!(matches!(store_err, StoreError::Validation(_)));
        assert_eq!(store_err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_oracle_errors_map_to_pricing_and_payment() {
        let currency = Currency::NATIVE;
        let err: StoreError = OracleError::UndefinedRate(currency).into();
        assert_eq!(err.kind(), ErrorKind::Pricing);

        let err: StoreError = OracleError::Transfer(TransferError::Rejected("x".into())).into();
        assert_eq!(err.kind(), ErrorKind::Payment);
    }
}
