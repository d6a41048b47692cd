//! # Purchase Pipeline
//!
//! The storefront engine and the five stage interfaces it runs.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       purchase_for(request)                             │
//! │                                                                         │
//! │   request ──► Purchase record                                           │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │   1. validate ──► 2. price          (shared with estimate)              │
//! │                   │                                                     │
//! │                   ▼            ── vault.begin() ──                      │
//! │   3. pay ──► 4. deliver ──► 5. notify                                   │
//! │                   │                                                     │
//! │         ┌─────────┴──────────┐                                          │
//! │         ▼                    ▼                                          │
//! │      Ok: commit          Err: revert delivery, restore SKU,             │
//! │      → Receipt                rollback vault → error                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every stage reads and writes the same [`Purchase`] record, so later
//! stages see what earlier ones recorded (`total_price`, `pricing_data`,
//! `payment_data`, `delivery_data`). A request either completes every
//! stage or leaves no trace.
//!
//! ## Extension
//! Stages are swapped through [`Stages`]. Overrides usually handle the
//! case they care about and delegate the rest to the base stage they wrap
//! ([`crate::oracle::OraclePricing`] over [`FixedPricing`],
//! [`crate::swap::OracleSwapPayment`] over [`DirectPayment`],
//! [`crate::allocator::SequentialAllocator`] over [`SupplyDelivery`]).

mod base;

pub use base::{
    DirectPayment, FixedPricing, ReceiverNotification, StandardValidation, SupplyDelivery,
};
pub(crate) use base::{collect, transfer_error};

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::collab::{PurchaseReceiver, Vault};
use crate::config::StorefrontConfig;
use crate::error::StoreResult;
use crate::types::{
    Address, Currency, PriceEntry, Purchase, PurchaseRequest, Quote, Receipt, Sku, SkuId,
    SkuParams,
};
use crate::validation::validate_address;

/// Receiver implementations keyed by the address a SKU refers to.
pub type Receivers = HashMap<Address, Arc<dyn PurchaseReceiver>>;

// =============================================================================
// Stage Contexts
// =============================================================================

/// What pricing may read.
#[derive(Debug, Clone, Copy)]
pub struct PricingContext<'a> {
    pub catalog: &'a Catalog,
    pub sku: &'a Sku,
}

/// Identities payment settles between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentContext {
    /// The storefront's own holding account.
    pub account: Address,
    pub payout: Address,
    pub reference_currency: Currency,
}

// =============================================================================
// Stage Interfaces
// =============================================================================

/// Stage 1: reject malformed or unserviceable requests. Reads only.
pub trait ValidationStage: Send + Sync {
    fn validate(&self, catalog: &Catalog, purchase: &Purchase) -> StoreResult<()>;
}

/// Stage 2: set `total_price` and `pricing_data`. Reads only.
pub trait PricingStage: Send + Sync {
    fn price(&self, cx: &PricingContext<'_>, purchase: &mut Purchase) -> StoreResult<()>;
}

/// Stage 3: move funds, set `payment_data`.
pub trait PaymentStage: Send + Sync {
    fn pay(
        &self,
        cx: &PaymentContext,
        vault: &mut dyn Vault,
        purchase: &mut Purchase,
    ) -> StoreResult<()>;
}

/// Stage 4: commit supply, set `delivery_data`.
///
/// Delivery may hold its own state (an allocation cursor). It must not
/// mutate anything when it fails, and `revert` must undo a successful
/// `deliver` whose request later failed.
pub trait DeliveryStage: Send + Sync {
    fn deliver(&mut self, sku: &mut Sku, purchase: &mut Purchase) -> StoreResult<()>;

    fn revert(&mut self, _purchase: &Purchase) {}

    /// Vetoes SKUs created through the plain `create_sku` admin call.
    fn admit_sku(&self, _id: &SkuId) -> StoreResult<()> {
        Ok(())
    }
}

/// Stage 5: tell the SKU's receiver. Runs after all state is committed.
pub trait NotificationStage: Send + Sync {
    fn notify(&self, sku: &Sku, receivers: &Receivers, purchase: &Purchase) -> StoreResult<()>;
}

/// The four stateless stages. Delivery is the engine's type parameter.
pub struct Stages {
    validation: Box<dyn ValidationStage>,
    pricing: Box<dyn PricingStage>,
    payment: Box<dyn PaymentStage>,
    notification: Box<dyn NotificationStage>,
}

impl Default for Stages {
    fn default() -> Self {
        Stages {
            validation: Box::new(StandardValidation),
            pricing: Box::new(FixedPricing),
            payment: Box::new(DirectPayment),
            notification: Box::new(ReceiverNotification),
        }
    }
}

impl Stages {
    pub fn with_validation(mut self, stage: impl ValidationStage + 'static) -> Self {
        self.validation = Box::new(stage);
        self
    }

    pub fn with_pricing(mut self, stage: impl PricingStage + 'static) -> Self {
        self.pricing = Box::new(stage);
        self
    }

    pub fn with_payment(mut self, stage: impl PaymentStage + 'static) -> Self {
        self.payment = Box::new(stage);
        self
    }

    pub fn with_notification(mut self, stage: impl NotificationStage + 'static) -> Self {
        self.notification = Box::new(stage);
        self
    }
}

// =============================================================================
// Storefront
// =============================================================================

/// A configured storefront: catalog, vault, stages.
///
/// `D` is the delivery stage. Storefronts built over
/// [`crate::allocator::SequentialAllocator`] gain the allocator admin calls.
pub struct Storefront<V, D = SupplyDelivery> {
    catalog: Catalog,
    vault: V,
    stages: Stages,
    delivery: D,
    receivers: Receivers,
}

impl<V: Vault> Storefront<V, SupplyDelivery> {
    /// Base storefront: fixed prices, direct payment, plain supply counting.
    pub fn new(config: &StorefrontConfig, vault: V) -> StoreResult<Self> {
        Self::with_stages(config, vault, Stages::default(), SupplyDelivery)
    }
}

impl<V: Vault, D: DeliveryStage> Storefront<V, D> {
    pub fn with_stages(
        config: &StorefrontConfig,
        vault: V,
        stages: Stages,
        delivery: D,
    ) -> StoreResult<Self> {
        let catalog = Catalog::from_config(config)?;
        info!(
            owner = %catalog.owner(),
            reference = %catalog.reference_currency(),
            paused = catalog.is_paused(),
            "Storefront initialized"
        );
        Ok(Storefront {
            catalog,
            vault,
            stages,
            delivery,
            receivers: HashMap::new(),
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn sku(&self, id: &SkuId) -> StoreResult<&Sku> {
        self.catalog.sku(id)
    }

    pub fn price_list(&self, id: &SkuId) -> StoreResult<&[(Currency, PriceEntry)]> {
        self.catalog.price_list(id)
    }

    pub fn is_paused(&self) -> bool {
        self.catalog.is_paused()
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }

    /// Mutable vault access, for funding accounts outside a purchase.
    pub fn vault_mut(&mut self) -> &mut V {
        &mut self.vault
    }

    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    pub(crate) fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    pub(crate) fn delivery_mut(&mut self) -> &mut D {
        &mut self.delivery
    }

    // =========================================================================
    // Admin
    // =========================================================================

    pub fn create_sku(&mut self, caller: Address, params: SkuParams) -> StoreResult<&Sku> {
        self.catalog.ensure_owner(caller)?;
        self.delivery.admit_sku(&params.id)?;
        self.catalog.create_sku(caller, params)
    }

    pub fn set_prices(
        &mut self,
        caller: Address,
        id: &SkuId,
        updates: &[(Currency, PriceEntry)],
    ) -> StoreResult<()> {
        self.catalog.set_prices(caller, id, updates)
    }

    pub fn set_receiver(
        &mut self,
        caller: Address,
        id: &SkuId,
        receiver: Option<Address>,
    ) -> StoreResult<()> {
        self.catalog.set_receiver(caller, id, receiver)
    }

    /// Binds a receiver implementation to the address SKUs refer to.
    pub fn register_receiver(
        &mut self,
        caller: Address,
        address: Address,
        receiver: Arc<dyn PurchaseReceiver>,
    ) -> StoreResult<()> {
        self.catalog.ensure_owner(caller)?;
        validate_address("receiver", address)?;
        self.receivers.insert(address, receiver);
        Ok(())
    }

    pub fn set_paused(&mut self, caller: Address, paused: bool) -> StoreResult<()> {
        self.catalog.set_paused(caller, paused)
    }

    pub fn set_payout(&mut self, caller: Address, payout: Address) -> StoreResult<()> {
        self.catalog.set_payout(caller, payout)
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> StoreResult<()> {
        self.catalog.transfer_ownership(caller, new_owner)
    }

    // =========================================================================
    // Purchasing
    // =========================================================================

    /// Runs validation and pricing only. Never mutates anything.
    pub fn estimate(&self, request: &PurchaseRequest) -> StoreResult<Quote> {
        let mut purchase = Purchase::from(request.clone());
        self.quote(&mut purchase)?;
        Ok(Quote {
            total_price: purchase.total_price,
            pricing_data: purchase.pricing_data,
        })
    }

    /// Runs all five stages atomically.
    pub fn purchase_for(&mut self, request: PurchaseRequest) -> StoreResult<Receipt> {
        let mut purchase = Purchase::from(request);
        self.quote(&mut purchase)?;

        let snapshot = self.catalog.sku(&purchase.sku)?.clone();
        let mut delivered = false;
        self.vault.begin();

        match self.settle(&mut purchase, &mut delivered) {
            Ok(()) => {
                self.vault.commit();
                info!(
                    sku = %purchase.sku,
                    purchaser = %purchase.purchaser,
                    recipient = %purchase.recipient,
                    currency = %purchase.currency,
                    quantity = purchase.quantity,
                    total_price = %purchase.total_price,
                    "Purchase completed"
                );
                Ok(Receipt::new(purchase))
            }
            Err(err) => {
                if delivered {
                    self.delivery.revert(&purchase);
                }
                self.catalog.restore(snapshot);
                self.vault.rollback();
                warn!(
                    sku = %purchase.sku,
                    purchaser = %purchase.purchaser,
                    kind = ?err.kind(),
                    error = %err,
                    "Purchase rolled back"
                );
                Err(err)
            }
        }
    }

    fn quote(&self, purchase: &mut Purchase) -> StoreResult<()> {
        self.stages.validation.validate(&self.catalog, purchase)?;
        let cx = PricingContext {
            catalog: &self.catalog,
            sku: self.catalog.sku(&purchase.sku)?,
        };
        self.stages.pricing.price(&cx, purchase)
    }

    fn settle(&mut self, purchase: &mut Purchase, delivered: &mut bool) -> StoreResult<()> {
        let cx = PaymentContext {
            account: self.catalog.account(),
            payout: self.catalog.payout(),
            reference_currency: self.catalog.reference_currency(),
        };
        self.stages.payment.pay(&cx, &mut self.vault, purchase)?;

        let sku = self.catalog.sku_mut(&purchase.sku)?;
        self.delivery.deliver(sku, purchase)?;
        *delivered = true;

        let sku = self.catalog.sku(&purchase.sku)?;
        self.stages.notification.notify(sku, &self.receivers, purchase)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
