//! # Swap Settlement
//!
//! Payment stage for `OracleSwapped` entries: the purchaser pays in their
//! currency, the payout receives the reference currency.
//!
//! ## Settlement Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. collect    purchaser ──total──► storefront account                  │
//! │  2. convert    refAmount = total × rate / 10^18                         │
//! │  3. estimate   oracle says how much is needed; must be ≤ total          │
//! │  4. swap       account: currency ──consumed──► refAmount of reference   │
//! │  5. refund     account ──(total − consumed)──► purchaser   (if > 0)     │
//! │  6. forward    account ──refAmount──► payout                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every leg goes through the vault handed to the stage, so a failure at
//! any step is undone by the pipeline's rollback.

use std::sync::Arc;

use tracing::debug;

use crate::collab::{PriceOracle, Vault};
use crate::error::{StoreError, StoreResult};
use crate::money::Amount;
use crate::pipeline::{collect, transfer_error, DirectPayment, PaymentContext, PaymentStage};
use crate::types::{PaymentData, PricingData, Purchase};

/// Payment stage that settles swap-priced purchases through an oracle.
///
/// Anything not priced with [`PricingData::SwapRate`] is paid directly.
#[derive(Clone)]
pub struct OracleSwapPayment {
    oracle: Arc<dyn PriceOracle>,
    base: DirectPayment,
}

impl OracleSwapPayment {
    pub fn new(oracle: Arc<dyn PriceOracle>) -> Self {
        OracleSwapPayment {
            oracle,
            base: DirectPayment,
        }
    }

    fn settle(
        &self,
        cx: &PaymentContext,
        vault: &mut dyn Vault,
        purchase: &mut Purchase,
        rate: Amount,
    ) -> StoreResult<()> {
        let currency = purchase.currency;
        let reference = cx.reference_currency;
        let total = purchase.total_price;

        collect(
            vault,
            currency,
            purchase.purchaser,
            cx.account,
            total,
            purchase.attached_value,
        )?;

        let reference_amount = total
            .checked_mul_div(rate.get(), Amount::SCALE)
            .ok_or(StoreError::overflow("reference amount"))?;

        let needed = self
            .oracle
            .estimate_swap(currency, reference, reference_amount, &purchase.data)?;
        if needed > total {
            return Err(StoreError::InsufficientFunds {
                currency,
                required: needed,
                available: total,
            });
        }

        let consumed = self.oracle.swap(
            vault,
            cx.account,
            currency,
            reference,
            reference_amount,
            &purchase.data,
        )?;
        let refunded = total.checked_sub(consumed).ok_or_else(|| {
            StoreError::SwapFailed(format!(
                "swap consumed {consumed}, more than the {total} collected"
            ))
        })?;

        if !refunded.is_zero() {
            vault
                .transfer(currency, cx.account, purchase.purchaser, refunded)
                .map_err(|err| transfer_error(currency, err))?;
        }
        vault
            .transfer(reference, cx.account, cx.payout, reference_amount)
            .map_err(|err| transfer_error(reference, err))?;

        purchase.payment_data = PaymentData::Swapped {
            collected: total,
            consumed,
            refunded,
            reference_amount,
        };

        debug!(
            sku = %purchase.sku,
            %currency,
            collected = %total,
            %consumed,
            %refunded,
            %reference_amount,
            "Swap settled"
        );
        Ok(())
    }
}

impl PaymentStage for OracleSwapPayment {
    fn pay(
        &self,
        cx: &PaymentContext,
        vault: &mut dyn Vault,
        purchase: &mut Purchase,
    ) -> StoreResult<()> {
        match purchase.pricing_data {
            PricingData::SwapRate { rate } => self.settle(cx, vault, purchase, rate),
            _ => self.base.pay(cx, vault, purchase),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::memory::{MemoryVault, TableOracle};
    use crate::oracle::OraclePricing;
    use crate::pipeline::{Stages, Storefront, SupplyDelivery};
    use crate::testing::*;
    use crate::types::{Currency, PriceEntry, SkuId};

    const HALF: u128 = Amount::SCALE / 2;
    const LIQUIDITY: u8 = 0x0a;

    /// Swap storefront quoting `paid` against `reference`.
    ///
    /// The buyer holds 10_000 of `paid`; the oracle's liquidity account
    /// holds 1_000_000 of `reference`.
    fn swap_storefront(
        oracle: TableOracle,
        reference: Currency,
        paid: Currency,
    ) -> Storefront<MemoryVault> {
        let liquidity = oracle.account();
        let oracle: Arc<dyn PriceOracle> = Arc::new(oracle);
        let stages = Stages::default()
            .with_pricing(OraclePricing::new(oracle.clone()))
            .with_payment(OracleSwapPayment::new(oracle));

        let mut vault = MemoryVault::new();
        vault.mint(paid, BUYER, Amount::new(10_000));
        vault.mint(reference, liquidity, Amount::new(1_000_000));

        let mut config = config();
        config.store.reference_currency = reference;
        let mut store = Storefront::with_stages(&config, vault, stages, SupplyDelivery).unwrap();
        store
            .create_sku(
                OWNER,
                sku_params(
                    "sku",
                    10,
                    5,
                    vec![
                        (reference, PriceEntry::Fixed(Amount::new(1000))),
                        (paid, PriceEntry::OracleSwapped),
                    ],
                ),
            )
            .unwrap();
        store
    }

    fn storefront(oracle: TableOracle) -> Storefront<MemoryVault> {
        swap_storefront(oracle, Currency::NATIVE, usdc())
    }

    fn quoted_oracle() -> TableOracle {
        TableOracle::new(Currency::NATIVE, addr(LIQUIDITY)).with_rate(usdc(), Amount::new(HALF))
    }

    #[test]
    fn test_swap_at_quoted_rate_forwards_reference() {
        let mut store = storefront(quoted_oracle());

        let receipt = store.purchase_for(request("sku", usdc(), 2)).unwrap();
        assert_eq!(receipt.purchase.total_price, Amount::new(4000));
        assert_eq!(
            receipt.purchase.payment_data,
            PaymentData::Swapped {
                collected: Amount::new(4000),
                consumed: Amount::new(4000),
                refunded: Amount::ZERO,
                reference_amount: Amount::new(2000),
            }
        );

        let vault = store.vault();
        assert_eq!(vault.balance_of(Currency::NATIVE, PAYOUT), Amount::new(2000));
        assert_eq!(vault.balance_of(usdc(), BUYER), Amount::new(6000));
        assert_eq!(vault.balance_of(usdc(), ACCOUNT), Amount::ZERO);
        assert_eq!(vault.balance_of(Currency::NATIVE, ACCOUNT), Amount::ZERO);
    }

    #[test]
    fn test_better_execution_refunds_surplus() {
        // Swaps execute at 0.8 native per USDC against a 0.5 quote
        let oracle =
            quoted_oracle().with_execution_rate(usdc(), Amount::new(Amount::SCALE / 10 * 8));
        let mut store = storefront(oracle);

        let receipt = store.purchase_for(request("sku", usdc(), 2)).unwrap();
        assert_eq!(
            receipt.purchase.payment_data,
            PaymentData::Swapped {
                collected: Amount::new(4000),
                consumed: Amount::new(2500),
                refunded: Amount::new(1500),
                reference_amount: Amount::new(2000),
            }
        );
        assert_eq!(store.vault().balance_of(usdc(), BUYER), Amount::new(7500));
        assert_eq!(store.vault().balance_of(Currency::NATIVE, PAYOUT), Amount::new(2000));
    }

    #[test]
    fn test_worse_execution_is_insufficient() {
        let oracle = quoted_oracle().with_execution_rate(usdc(), Amount::new(Amount::SCALE / 4));
        let mut store = storefront(oracle);

        let err = store.purchase_for(request("sku", usdc(), 2)).unwrap_err();
        assert!(matches!(err, StoreError::InsufficientFunds { .. }));
        assert_eq!(store.vault().balance_of(usdc(), BUYER), Amount::new(10_000));
        assert_eq!(store.sku(&SkuId::from_name("sku")).unwrap().remaining_supply, 10);
    }

    #[test]
    fn test_missing_liquidity_rolls_back_collection() {
        let mut store = storefront(quoted_oracle());
        // Drain the oracle's reference liquidity
        store
            .vault_mut()
            .transfer(Currency::NATIVE, addr(LIQUIDITY), addr(0x0f), Amount::new(1_000_000))
            .unwrap();

        let err = store.purchase_for(request("sku", usdc(), 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Payment);
        assert_eq!(store.vault().balance_of(usdc(), BUYER), Amount::new(10_000));
        assert_eq!(store.vault().balance_of(usdc(), ACCOUNT), Amount::ZERO);
    }

    #[test]
    fn test_unestimable_swap_rolls_back_collection() {
        // Quoted for pricing, but no executable rate
        let oracle = quoted_oracle().with_execution_rate(usdc(), Amount::ZERO);
        let mut store = storefront(oracle);

        let err = store.purchase_for(request("sku", usdc(), 2)).unwrap_err();
        assert!(matches!(
            err,
            StoreError::CannotEstimate { from, to } if from == usdc() && to == Currency::NATIVE
        ));
        assert_eq!(err.kind(), ErrorKind::Pricing);
        assert_eq!(store.vault().balance_of(usdc(), BUYER), Amount::new(10_000));
        assert_eq!(store.vault().balance_of(usdc(), ACCOUNT), Amount::ZERO);
        assert_eq!(store.sku(&SkuId::from_name("sku")).unwrap().remaining_supply, 10);
    }

    #[test]
    fn test_native_swap_is_capped_by_attached_value() {
        // 1 native unit (scaled) is worth 0.5 USDC
        let oracle = TableOracle::new(usdc(), addr(LIQUIDITY))
            .with_rate(Currency::NATIVE, Amount::new(HALF));
        let mut store = swap_storefront(oracle, usdc(), Currency::NATIVE);

        let err = store.purchase_for(native_request("sku", 2, 3999)).unwrap_err();
        assert!(matches!(
            err,
            StoreError::InsufficientFunds { currency, required, available }
                if currency == Currency::NATIVE
                    && required == Amount::new(4000)
                    && available == Amount::new(3999)
        ));
        assert_eq!(store.vault().balance_of(Currency::NATIVE, BUYER), Amount::new(10_000));

        let receipt = store.purchase_for(native_request("sku", 2, 4000)).unwrap();
        assert_eq!(
            receipt.purchase.payment_data,
            PaymentData::Swapped {
                collected: Amount::new(4000),
                consumed: Amount::new(4000),
                refunded: Amount::ZERO,
                reference_amount: Amount::new(2000),
            }
        );
        assert_eq!(store.vault().balance_of(Currency::NATIVE, BUYER), Amount::new(6000));
        assert_eq!(store.vault().balance_of(usdc(), PAYOUT), Amount::new(2000));
    }

    #[test]
    fn test_non_swap_entries_pay_directly() {
        let mut store = storefront(quoted_oracle());
        store.vault_mut().mint(Currency::NATIVE, BUYER, Amount::new(5000));

        let receipt = store.purchase_for(native_request("sku", 1, 1000)).unwrap();
        assert_eq!(
            receipt.purchase.payment_data,
            PaymentData::Direct { amount: Amount::new(1000) }
        );
    }
}
