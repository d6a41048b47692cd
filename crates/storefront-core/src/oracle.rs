//! # Oracle Pricing
//!
//! Prices non-reference currencies through a live [`PriceOracle`].
//!
//! ## Conversion
//! ```text
//! refTotal = quantity × reference unit price          (reference entry: Fixed)
//! rate     = oracle.rates([currency], reference, refTotal)[0]
//! total    = refTotal × 10^18 / rate                  (rounded down)
//! ```
//!
//! `OracleConverted` records the rate as [`PricingData::OracleRate`];
//! `OracleSwapped` records it as [`PricingData::SwapRate`] so that
//! [`crate::swap::OracleSwapPayment`] settles it by swapping. Fixed entries
//! fall through to [`FixedPricing`].

use std::sync::Arc;

use tracing::debug;

use crate::collab::PriceOracle;
use crate::error::{StoreError, StoreResult};
use crate::money::Amount;
use crate::pipeline::{FixedPricing, PricingContext, PricingStage};
use crate::types::{Currency, PriceEntry, PricingData, Purchase};

/// Pricing stage for oracle-backed price entries.
#[derive(Clone)]
pub struct OraclePricing {
    oracle: Arc<dyn PriceOracle>,
    base: FixedPricing,
}

impl OraclePricing {
    pub fn new(oracle: Arc<dyn PriceOracle>) -> Self {
        OraclePricing {
            oracle,
            base: FixedPricing,
        }
    }

    fn price_via_oracle(
        &self,
        cx: &PricingContext<'_>,
        purchase: &mut Purchase,
        swapped: bool,
    ) -> StoreResult<()> {
        let reference = cx.catalog.reference_currency();
        let unit_price = cx
            .sku
            .price(&reference)
            .and_then(|entry| entry.fixed())
            .ok_or(StoreError::UndefinedPrice {
                sku: cx.sku.id,
                currency: reference,
            })?;
        let reference_total = unit_price
            .checked_mul_qty(purchase.quantity)
            .ok_or(StoreError::overflow("reference total"))?;

        let rate = swap_rates(
            self.oracle.as_ref(),
            &[purchase.currency],
            reference,
            reference_total,
            &purchase.data,
        )?
        .into_iter()
        .next()
        .ok_or(StoreError::UndefinedRate(purchase.currency))?;

        purchase.total_price = reference_total
            .checked_mul_div(Amount::SCALE, rate.get())
            .ok_or(StoreError::overflow("converted total"))?;
        purchase.pricing_data = if swapped {
            PricingData::SwapRate { rate }
        } else {
            PricingData::OracleRate { rate }
        };

        debug!(
            sku = %purchase.sku,
            currency = %purchase.currency,
            reference_total = %reference_total,
            %rate,
            total_price = %purchase.total_price,
            "Priced via oracle"
        );
        Ok(())
    }
}

impl PricingStage for OraclePricing {
    fn price(&self, cx: &PricingContext<'_>, purchase: &mut Purchase) -> StoreResult<()> {
        match cx.sku.price(&purchase.currency) {
            Some(PriceEntry::OracleConverted) => self.price_via_oracle(cx, purchase, false),
            Some(PriceEntry::OracleSwapped) => self.price_via_oracle(cx, purchase, true),
            _ => self.base.price(cx, purchase),
        }
    }
}

/// Fetches one non-zero rate per currency for `reference_amount` of the
/// reference.
///
/// Fails with [`StoreError::UndefinedRate`] naming the first currency the
/// oracle cannot quote.
pub fn swap_rates(
    oracle: &dyn PriceOracle,
    currencies: &[Currency],
    reference: Currency,
    reference_amount: Amount,
    data: &[u8],
) -> StoreResult<Vec<Amount>> {
    let rates = oracle.rates(currencies, reference, reference_amount, data)?;
    if rates.len() != currencies.len() {
        let missing = currencies.get(rates.len()).copied().unwrap_or(reference);
        return Err(StoreError::UndefinedRate(missing));
    }
    if let Some(index) = rates.iter().position(Amount::is_zero) {
        return Err(StoreError::UndefinedRate(currencies[index]));
    }
    Ok(rates)
}
