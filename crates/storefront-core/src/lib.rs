//! # storefront-core: Purchase Lifecycle Engine
//!
//! A catalog of SKUs sold through a five-stage pipeline, with swappable
//! stages and untrusted external collaborators. No I/O lives here; config
//! files and the logging subscriber belong to `storefront-runtime`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storefront Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              storefront-runtime (config, tracing, seed)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ storefront-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  catalog  │  │ pipeline  │  │  oracle   │  │ allocator │  │   │
//! │  │   │   SKUs    │  │  stages   │  │   swap    │  │  items +  │  │   │
//! │  │   │  prices   │  │ Storefront│  │  pricing  │  │  cursor   │  │   │
//! │  │   └───────────┘  └─────┬─────┘  └───────────┘  └───────────┘  │   │
//! │  │                        │ collab traits                          │   │
//! │  └────────────────────────┼────────────────────────────────────────┘   │
//! │                           ▼                                             │
//! │        Vault  ·  PriceOracle  ·  PurchaseReceiver  (untrusted)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - SKUs, price entries, purchase records
//! - [`money`] - 18-decimal fixed-point amounts
//! - [`catalog`] - SKU ledger and admin operations
//! - [`pipeline`] - stage traits, base stages, the [`Storefront`] engine
//! - [`oracle`] / [`swap`] - oracle pricing and swap settlement
//! - [`allocator`] - sequential item delivery
//! - [`guard`] - reentrancy-safe shared handle
//! - [`memory`] - in-memory collaborators
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::memory::MemoryVault;
//! use storefront_core::{
//!     Address, Amount, Currency, PriceEntry, PurchaseRequest, SkuId, SkuParams, Storefront,
//!     StorefrontConfig, Vault,
//! };
//!
//! let owner = Address::new([1; 20]);
//! let buyer = Address::new([9; 20]);
//! let (payout, account) = (Address::new([2; 20]), Address::new([3; 20]));
//! let config = StorefrontConfig::new(owner, payout, account, Currency::NATIVE);
//!
//! let mut vault = MemoryVault::new();
//! vault.mint(Currency::NATIVE, buyer, Amount::new(5_000));
//!
//! let mut store = Storefront::new(&config, vault).unwrap();
//! store
//!     .create_sku(owner, SkuParams {
//!         id: SkuId::from_name("ticket"),
//!         total_supply: 3,
//!         max_per_purchase: 2,
//!         receiver: None,
//!         prices: vec![(Currency::NATIVE, PriceEntry::Fixed(Amount::new(1000)))],
//!     })
//!     .unwrap();
//!
//! let receipt = store
//!     .purchase_for(PurchaseRequest {
//!         purchaser: buyer,
//!         recipient: buyer,
//!         currency: Currency::NATIVE,
//!         sku: SkuId::from_name("ticket"),
//!         quantity: 2,
//!         attached_value: Amount::new(2000),
//!         data: Default::default(),
//!     })
//!     .unwrap();
//!
//! assert_eq!(receipt.purchase.total_price, Amount::new(2000));
//! assert_eq!(store.vault().balance_of(Currency::NATIVE, buyer), Amount::new(3000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocator;
pub mod catalog;
pub mod collab;
pub mod config;
pub mod error;
pub mod guard;
pub mod memory;
pub mod money;
pub mod oracle;
pub mod pipeline;
pub mod swap;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use allocator::SequentialAllocator;
pub use catalog::Catalog;
pub use collab::{PriceOracle, PurchaseReceiver, Vault};
pub use config::{Limits, StoreSettings, StorefrontConfig};
pub use error::{ErrorKind, OracleError, StoreError, StoreResult, TransferError, ValidationError};
pub use guard::SharedStorefront;
pub use money::Amount;
pub use oracle::{swap_rates, OraclePricing};
pub use pipeline::{
    DeliveryStage, DirectPayment, FixedPricing, NotificationStage, PaymentContext, PaymentStage,
    PricingContext, PricingStage, ReceiverNotification, Receivers, Stages, StandardValidation,
    Storefront, SupplyDelivery, ValidationStage,
};
pub use swap::OracleSwapPayment;
pub use types::*;
