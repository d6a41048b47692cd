//! # Inventory Ledger
//!
//! SKU catalog plus supply and price bookkeeping.
//!
//! ## SKU Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SKU Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── create_sku() → Sku { remaining = total }   (key now immutable)  │
//! │                                                                         │
//! │  2. PRICE                                                               │
//! │     └── set_prices() → ordered list, reference currency enforced        │
//! │                                                                         │
//! │  3. SELL                                                                │
//! │     └── delivery stage → remaining -= quantity                          │
//! │                                                                         │
//! │  (never deleted)                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ledger stores oracle price entries verbatim and never interprets them;
//! deciding what they cost is the pricing stage's job.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::{Limits, StorefrontConfig};
use crate::error::{StoreError, StoreResult};
use crate::types::{Address, Currency, PriceEntry, Sku, SkuId, SkuParams};
use crate::validation::{validate_address, validate_price_updates, validate_supply};

/// Catalog-wide state: SKUs, identities, pause flag, capacity ceilings.
#[derive(Debug, Clone)]
pub struct Catalog {
    owner: Address,
    payout: Address,
    account: Address,
    reference_currency: Currency,
    limits: Limits,
    paused: bool,
    skus: HashMap<SkuId, Sku>,
    /// Creation order, for enumeration.
    order: Vec<SkuId>,
}

impl Catalog {
    /// Creates an empty catalog from a validated config.
    pub fn from_config(config: &StorefrontConfig) -> StoreResult<Self> {
        config.validate()?;
        Ok(Catalog {
            owner: config.store.owner,
            payout: config.store.payout,
            account: config.store.account,
            reference_currency: config.store.reference_currency,
            limits: config.limits,
            paused: config.store.start_paused,
            skus: HashMap::new(),
            order: Vec::new(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn payout(&self) -> Address {
        self.payout
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn reference_currency(&self) -> Currency {
        self.reference_currency
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Reads a SKU; the existence check used by every stage.
    pub fn sku(&self, id: &SkuId) -> StoreResult<&Sku> {
        self.skus.get(id).ok_or(StoreError::SkuNotFound(*id))
    }

    /// Price list in insertion order.
    pub fn price_list(&self, id: &SkuId) -> StoreResult<&[(Currency, PriceEntry)]> {
        Ok(&self.sku(id)?.prices)
    }

    /// SKUs in creation order.
    pub fn skus(&self) -> impl Iterator<Item = &Sku> {
        self.order.iter().filter_map(|id| self.skus.get(id))
    }

    // =========================================================================
    // Admin Operations
    // =========================================================================

    /// Fails unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: Address) -> StoreResult<()> {
        if caller != self.owner {
            return Err(StoreError::Unauthorized { caller });
        }
        Ok(())
    }

    /// Creates a SKU with `remaining_supply = total_supply`.
    ///
    /// ## Fails When
    /// - the key is already used
    /// - the catalog holds `max_skus` SKUs
    /// - supply or per-purchase ceiling is zero
    /// - the initial price list breaks the reference rule or capacity
    pub fn create_sku(&mut self, caller: Address, params: SkuParams) -> StoreResult<&Sku> {
        self.ensure_owner(caller)?;

        if self.skus.contains_key(&params.id) {
            return Err(StoreError::DuplicateSku(params.id));
        }
        if self.order.len() >= self.limits.max_skus {
            return Err(StoreError::SkuCapacityExceeded {
                max: self.limits.max_skus,
            });
        }
        validate_supply(params.total_supply, params.max_per_purchase)?;
        if let Some(receiver) = params.receiver {
            validate_address("receiver", receiver)?;
        }

        let prices = self.apply_price_updates(params.id, &[], &params.prices)?;

        let sku = Sku {
            id: params.id,
            total_supply: params.total_supply,
            remaining_supply: params.total_supply,
            max_per_purchase: params.max_per_purchase,
            receiver: params.receiver,
            prices,
        };

        info!(
            sku = %sku.id,
            total_supply = sku.total_supply,
            max_per_purchase = sku.max_per_purchase,
            "SKU created"
        );

        self.order.push(sku.id);
        Ok(self.skus.entry(sku.id).or_insert(sku))
    }

    /// Applies per-currency price updates.
    ///
    /// `Fixed(0)` removes the currency's entry; any other entry replaces it
    /// in place or appends it. The update is all-or-nothing.
    pub fn set_prices(
        &mut self,
        caller: Address,
        id: &SkuId,
        updates: &[(Currency, PriceEntry)],
    ) -> StoreResult<()> {
        self.ensure_owner(caller)?;
        let current = self.sku(id)?.prices.clone();
        let prices = self.apply_price_updates(*id, &current, updates)?;

        debug!(sku = %id, currencies = prices.len(), "Prices updated");
        self.sku_mut(id)?.prices = prices;
        Ok(())
    }

    /// Sets or clears a SKU's notification receiver.
    pub fn set_receiver(
        &mut self,
        caller: Address,
        id: &SkuId,
        receiver: Option<Address>,
    ) -> StoreResult<()> {
        self.ensure_owner(caller)?;
        if let Some(address) = receiver {
            validate_address("receiver", address)?;
        }
        self.sku_mut(id)?.receiver = receiver;
        Ok(())
    }

    pub fn set_paused(&mut self, caller: Address, paused: bool) -> StoreResult<()> {
        self.ensure_owner(caller)?;
        if self.paused != paused {
            info!(paused, "Pause state changed");
        }
        self.paused = paused;
        Ok(())
    }

    pub fn set_payout(&mut self, caller: Address, payout: Address) -> StoreResult<()> {
        self.ensure_owner(caller)?;
        validate_address("payout", payout)?;
        info!(%payout, "Payout destination changed");
        self.payout = payout;
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> StoreResult<()> {
        self.ensure_owner(caller)?;
        validate_address("owner", new_owner)?;
        info!(from = %self.owner, to = %new_owner, "Ownership transferred");
        self.owner = new_owner;
        Ok(())
    }

    // =========================================================================
    // Pipeline Hooks
    // =========================================================================

    pub(crate) fn sku_mut(&mut self, id: &SkuId) -> StoreResult<&mut Sku> {
        self.skus.get_mut(id).ok_or(StoreError::SkuNotFound(*id))
    }

    /// Puts back a SKU snapshot taken before a request that failed.
    pub(crate) fn restore(&mut self, sku: Sku) {
        if let Some(slot) = self.skus.get_mut(&sku.id) {
            *slot = sku;
        }
    }

    /// Raises both supply counters (allocator append).
    pub(crate) fn add_supply(&mut self, id: &SkuId, added: u64) -> StoreResult<()> {
        let sku = self.sku_mut(id)?;
        if sku.is_unbounded() {
            return Ok(());
        }
        let total = sku
            .total_supply
            .checked_add(added)
            .filter(|total| *total != crate::types::UNBOUNDED_SUPPLY)
            .ok_or(StoreError::overflow("total supply"))?;
        sku.total_supply = total;
        sku.remaining_supply += added;
        Ok(())
    }

    // =========================================================================
    // Price List Rules
    // =========================================================================

    fn apply_price_updates(
        &self,
        sku: SkuId,
        current: &[(Currency, PriceEntry)],
        updates: &[(Currency, PriceEntry)],
    ) -> StoreResult<Vec<(Currency, PriceEntry)>> {
        validate_price_updates(updates)?;

        let mut prices = current.to_vec();
        for (currency, entry) in updates {
            let position = prices.iter().position(|(c, _)| c == currency);
            match (position, entry.is_removal()) {
                (Some(index), true) => {
                    prices.remove(index);
                }
                (Some(index), false) => prices[index].1 = *entry,
                (None, true) => {}
                (None, false) => prices.push((*currency, *entry)),
            }
        }

        if prices.len() > self.limits.max_currencies_per_sku {
            return Err(StoreError::CurrencyCapacityExceeded {
                sku,
                max: self.limits.max_currencies_per_sku,
            });
        }

        let has_reference = prices
            .iter()
            .any(|(currency, _)| *currency == self.reference_currency);
        if !prices.is_empty() && !has_reference {
            return Err(StoreError::NoReferenceCurrency {
                sku,
                reference: self.reference_currency,
            });
        }

        Ok(prices)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Amount;
    use crate::types::UNBOUNDED_SUPPLY;

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    const OWNER: u8 = 1;

    fn usdc() -> Currency {
        Currency::token(addr(0xc0))
    }

    fn catalog() -> Catalog {
        let mut config = StorefrontConfig::new(addr(OWNER), addr(2), addr(3), Currency::NATIVE);
        config.limits.max_skus = 2;
        config.limits.max_currencies_per_sku = 2;
        Catalog::from_config(&config).unwrap()
    }

    fn params(name: &str) -> SkuParams {
        SkuParams {
            id: SkuId::from_name(name),
            total_supply: 3,
            max_per_purchase: 2,
            receiver: None,
            prices: vec![(Currency::NATIVE, PriceEntry::Fixed(Amount::new(1000)))],
        }
    }

    #[test]
    fn test_create_sku() {
        let mut catalog = catalog();
        let sku = catalog.create_sku(addr(OWNER), params("sku")).unwrap();
        assert_eq!(sku.remaining_supply, 3);
        assert_eq!(sku.total_supply, 3);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_create_sku_rejects_duplicates_and_capacity() {
        let mut catalog = catalog();
        catalog.create_sku(addr(OWNER), params("a")).unwrap();
        assert!(matches!(
            catalog.create_sku(addr(OWNER), params("a")),
            Err(StoreError::DuplicateSku(_))
        ));
        catalog.create_sku(addr(OWNER), params("b")).unwrap();
        assert!(matches!(
            catalog.create_sku(addr(OWNER), params("c")),
            Err(StoreError::SkuCapacityExceeded { max: 2 })
        ));
    }

    #[test]
    fn test_create_sku_rejects_invalid_arguments() {
        let mut catalog = catalog();
        let mut bad = params("zero-max");
        bad.max_per_purchase = 0;
        assert!(catalog.create_sku(addr(OWNER), bad).is_err());

        let mut bad = params("zero-supply");
        bad.total_supply = 0;
        assert!(catalog.create_sku(addr(OWNER), bad).is_err());

        let mut bad = params("no-ref");
        bad.prices = vec![(usdc(), PriceEntry::Fixed(Amount::new(5)))];
        assert!(matches!(
            catalog.create_sku(addr(OWNER), bad),
            Err(StoreError::NoReferenceCurrency { .. })
        ));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_admin_calls_require_owner() {
        let mut catalog = catalog();
        assert!(matches!(
            catalog.create_sku(addr(9), params("sku")),
            Err(StoreError::Unauthorized { .. })
        ));
        assert!(catalog.set_paused(addr(9), true).is_err());
        assert!(!catalog.is_paused());
    }

    #[test]
    fn test_set_prices_requires_reference_currency() {
        let mut catalog = catalog();
        let mut p = params("sku");
        p.prices.clear();
        catalog.create_sku(addr(OWNER), p).unwrap();
        let id = SkuId::from_name("sku");

        let err = catalog
            .set_prices(addr(OWNER), &id, &[(usdc(), PriceEntry::Fixed(Amount::new(5)))])
            .unwrap_err();
        assert!(err.to_string().contains("No reference token"));
        assert!(catalog.price_list(&id).unwrap().is_empty());
    }

    #[test]
    fn test_removing_reference_while_others_remain_fails() {
        let mut catalog = catalog();
        catalog.create_sku(addr(OWNER), params("sku")).unwrap();
        let id = SkuId::from_name("sku");
        catalog
            .set_prices(addr(OWNER), &id, &[(usdc(), PriceEntry::OracleConverted)])
            .unwrap();

        let err = catalog
            .set_prices(addr(OWNER), &id, &[(Currency::NATIVE, PriceEntry::Fixed(Amount::ZERO))])
            .unwrap_err();
        assert!(matches!(err, StoreError::NoReferenceCurrency { .. }));
        assert_eq!(catalog.price_list(&id).unwrap().len(), 2);
    }

    #[test]
    fn test_price_list_keeps_insertion_order_and_allows_clearing() {
        let mut catalog = catalog();
        catalog.create_sku(addr(OWNER), params("sku")).unwrap();
        let id = SkuId::from_name("sku");

        catalog
            .set_prices(addr(OWNER), &id, &[(usdc(), PriceEntry::OracleSwapped)])
            .unwrap();
        catalog
            .set_prices(addr(OWNER), &id, &[(Currency::NATIVE, PriceEntry::Fixed(Amount::new(7)))])
            .unwrap();
        let list = catalog.price_list(&id).unwrap();
        assert_eq!(list[0], (Currency::NATIVE, PriceEntry::Fixed(Amount::new(7))));
        assert_eq!(list[1], (usdc(), PriceEntry::OracleSwapped));

        // Removing everything (non-reference first) leaves an empty list
        catalog
            .set_prices(
                addr(OWNER),
                &id,
                &[
                    (usdc(), PriceEntry::Fixed(Amount::ZERO)),
                    (Currency::NATIVE, PriceEntry::Fixed(Amount::ZERO)),
                ],
            )
            .unwrap();
        assert!(catalog.price_list(&id).unwrap().is_empty());
    }

    #[test]
    fn test_currency_capacity() {
        let mut catalog = catalog();
        catalog.create_sku(addr(OWNER), params("sku")).unwrap();
        let id = SkuId::from_name("sku");
        catalog
            .set_prices(addr(OWNER), &id, &[(usdc(), PriceEntry::OracleConverted)])
            .unwrap();
        let third = Currency::token(addr(0xd0));
        assert!(matches!(
            catalog.set_prices(addr(OWNER), &id, &[(third, PriceEntry::OracleConverted)]),
            Err(StoreError::CurrencyCapacityExceeded { max: 2, .. })
        ));
    }

    #[test]
    fn test_add_supply_raises_both_counters() {
        let mut catalog = catalog();
        catalog.create_sku(addr(OWNER), params("sku")).unwrap();
        let id = SkuId::from_name("sku");
        catalog.sku_mut(&id).unwrap().remaining_supply = 1;

        catalog.add_supply(&id, 2).unwrap();
        let sku = catalog.sku(&id).unwrap();
        assert_eq!(sku.total_supply, 5);
        assert_eq!(sku.remaining_supply, 3);
    }

    #[test]
    fn test_unbounded_supply_is_left_alone() {
        let mut catalog = catalog();
        let mut p = params("open");
        p.total_supply = UNBOUNDED_SUPPLY;
        catalog.create_sku(addr(OWNER), p).unwrap();
        let id = SkuId::from_name("open");
        catalog.add_supply(&id, 5).unwrap();
        assert_eq!(catalog.sku(&id).unwrap().remaining_supply, UNBOUNDED_SUPPLY);
    }
}
