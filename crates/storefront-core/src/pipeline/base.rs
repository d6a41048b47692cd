//! Default stage implementations.
//!
//! Every override either delegates to one of these or replaces it outright.

use tracing::debug;

use crate::catalog::Catalog;
use crate::collab::Vault;
use crate::error::{StoreError, StoreResult, TransferError};
use crate::money::Amount;
use crate::types::{Address, Currency, PaymentData, PriceEntry, PricingData, Purchase, Sku};
use crate::validation::{validate_currency, validate_quantity, validate_recipient};

use super::{
    DeliveryStage, NotificationStage, PaymentContext, PaymentStage, PricingContext, PricingStage,
    Receivers, ValidationStage,
};

// =============================================================================
// 1. Validation
// =============================================================================

/// Pause flag, null identities, SKU existence, supply, quantity bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardValidation;

impl ValidationStage for StandardValidation {
    fn validate(&self, catalog: &Catalog, purchase: &Purchase) -> StoreResult<()> {
        if catalog.is_paused() {
            return Err(StoreError::Paused);
        }
        validate_recipient(purchase.recipient)?;
        validate_currency(purchase.currency)?;

        let sku = catalog.sku(&purchase.sku)?;

        // Shortage is reported ahead of the per-purchase ceiling
        if !sku.can_supply(purchase.quantity) {
            return Err(StoreError::InsufficientSupply {
                sku: sku.id,
                available: sku.remaining_supply,
                requested: purchase.quantity,
            });
        }

        validate_quantity(purchase.quantity, sku.max_per_purchase)
    }
}

// =============================================================================
// 2. Pricing
// =============================================================================

/// `total = quantity × stored unit price`, exact.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPricing;

impl PricingStage for FixedPricing {
    fn price(&self, cx: &PricingContext<'_>, purchase: &mut Purchase) -> StoreResult<()> {
        let unit_price = match cx.sku.price(&purchase.currency) {
            Some(PriceEntry::Fixed(amount)) => amount,
            _ => {
                return Err(StoreError::UndefinedPrice {
                    sku: cx.sku.id,
                    currency: purchase.currency,
                })
            }
        };

        purchase.total_price = unit_price
            .checked_mul_qty(purchase.quantity)
            .ok_or(StoreError::overflow("total price"))?;
        purchase.pricing_data = PricingData::Fixed { unit_price };

        debug!(
            sku = %purchase.sku,
            currency = %purchase.currency,
            quantity = purchase.quantity,
            total_price = %purchase.total_price,
            "Priced at fixed rate"
        );
        Ok(())
    }
}

// =============================================================================
// 3. Payment
// =============================================================================

/// Moves `total_price` straight from the purchaser to the payout.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectPayment;

impl PaymentStage for DirectPayment {
    fn pay(
        &self,
        cx: &PaymentContext,
        vault: &mut dyn Vault,
        purchase: &mut Purchase,
    ) -> StoreResult<()> {
        collect(
            vault,
            purchase.currency,
            purchase.purchaser,
            cx.payout,
            purchase.total_price,
            purchase.attached_value,
        )?;
        purchase.payment_data = PaymentData::Direct {
            amount: purchase.total_price,
        };

        debug!(
            sku = %purchase.sku,
            purchaser = %purchase.purchaser,
            amount = %purchase.total_price,
            "Payment collected"
        );
        Ok(())
    }
}

/// Collects `amount` from a purchaser.
///
/// Native payments are capped by the value attached to the request.
pub(crate) fn collect(
    vault: &mut dyn Vault,
    currency: Currency,
    from: Address,
    to: Address,
    amount: Amount,
    attached_value: Amount,
) -> StoreResult<()> {
    if currency.is_native() && attached_value < amount {
        return Err(StoreError::InsufficientFunds {
            currency,
            required: amount,
            available: attached_value,
        });
    }
    vault
        .transfer(currency, from, to, amount)
        .map_err(|err| transfer_error(currency, err))
}

/// Translates a vault failure into the payment taxonomy.
pub(crate) fn transfer_error(currency: Currency, err: TransferError) -> StoreError {
    match err {
        TransferError::InsufficientFunds {
            required,
            available,
        } => StoreError::InsufficientFunds {
            currency,
            required,
            available,
        },
        TransferError::Rejected(reason) => StoreError::TransferFailed(reason),
    }
}

// =============================================================================
// 4. Delivery
// =============================================================================

/// Decrements remaining supply; leaves `delivery_data` empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct SupplyDelivery;

impl DeliveryStage for SupplyDelivery {
    fn deliver(&mut self, sku: &mut Sku, purchase: &mut Purchase) -> StoreResult<()> {
        if !sku.can_supply(purchase.quantity) {
            return Err(StoreError::InsufficientSupply {
                sku: sku.id,
                available: sku.remaining_supply,
                requested: purchase.quantity,
            });
        }
        if !sku.is_unbounded() {
            sku.remaining_supply -= purchase.quantity;
        }

        debug!(sku = %sku.id, remaining = sku.remaining_supply, "Supply committed");
        Ok(())
    }
}

// =============================================================================
// 5. Notification
// =============================================================================

/// Invokes the SKU's registered receiver, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReceiverNotification;

impl NotificationStage for ReceiverNotification {
    fn notify(&self, sku: &Sku, receivers: &Receivers, purchase: &Purchase) -> StoreResult<()> {
        let Some(address) = sku.receiver else {
            return Ok(());
        };
        let receiver = receivers
            .get(&address)
            .ok_or(StoreError::ReceiverUnavailable(address))?;

        debug!(sku = %sku.id, receiver = %address, "Notifying receiver");
        receiver
            .on_purchase(purchase)
            .map_err(StoreError::ReceiverRejected)
    }
}
