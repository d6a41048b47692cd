//! # Collaborator Traits
//!
//! The external systems the pipeline talks to, specified only by the
//! interface the core needs.
//!
//! ```text
//! ┌──────────────────┐   transfer / balance_of    ┌──────────────────────┐
//! │                  │ ─────────────────────────► │ Vault                │
//! │                  │   begin / commit / rollback│ (plain + native)     │
//! │    Pipeline      │                            └──────────────────────┘
//! │                  │   rates / estimate_swap    ┌──────────────────────┐
//! │                  │ ─────────────────────────► │ PriceOracle          │
//! │                  │   swap (through the vault) └──────────────────────┘
//! │                  │                            ┌──────────────────────┐
//! │                  │ ─────────────────────────► │ PurchaseReceiver     │
//! └──────────────────┘   on_purchase              └──────────────────────┘
//! ```
//!
//! Implementations are untrusted: any of them may try to call back into the
//! storefront. See [`crate::guard`].

use crate::error::{OracleError, TransferError};
use crate::money::Amount;
use crate::types::{Address, Currency, Purchase};

// =============================================================================
// Vault
// =============================================================================

/// Currency transfer primitives with a transaction bracket.
///
/// ## Transaction Contract
/// Every `transfer` performed after `begin` is undone by `rollback` and
/// kept by `commit`. The pipeline opens exactly one transaction per
/// `purchase_for` call and never nests them.
pub trait Vault: Send + Sync {
    /// Balance of `holder` in `currency`.
    fn balance_of(&self, currency: Currency, holder: Address) -> Amount;

    /// Moves `amount` from `from` to `to`.
    fn transfer(
        &mut self,
        currency: Currency,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TransferError>;

    fn begin(&mut self);

    fn commit(&mut self);

    fn rollback(&mut self);
}

// =============================================================================
// Price Oracle
// =============================================================================

/// Live conversion rates and swap execution.
///
/// Rates are 18-decimal fixed point: a rate `R` for currency `X` means
/// `10^18` base units of `X` are worth `R` base units of the reference.
pub trait PriceOracle: Send + Sync {
    /// One rate per currency, quoted for `reference_amount` of `reference`.
    ///
    /// Fails with [`OracleError::UndefinedRate`] if any currency is unquoted.
    fn rates(
        &self,
        currencies: &[Currency],
        reference: Currency,
        reference_amount: Amount,
        data: &[u8],
    ) -> Result<Vec<Amount>, OracleError>;

    /// How much `from` is needed to obtain `to_amount` of `to`.
    fn estimate_swap(
        &self,
        from: Currency,
        to: Currency,
        to_amount: Amount,
        data: &[u8],
    ) -> Result<Amount, OracleError>;

    /// Swaps `holder`'s `from` into exactly `to_amount` of `to`, moving both
    /// legs through `vault`. Returns the amount of `from` consumed.
    fn swap(
        &self,
        vault: &mut dyn Vault,
        holder: Address,
        from: Currency,
        to: Currency,
        to_amount: Amount,
        data: &[u8],
    ) -> Result<Amount, OracleError>;
}

// =============================================================================
// Purchase Receiver
// =============================================================================

/// Notification hook invoked with the complete purchase record.
///
/// A returned error fails the whole purchase.
pub trait PurchaseReceiver: Send + Sync {
    fn on_purchase(&self, purchase: &Purchase) -> Result<(), String>;
}
