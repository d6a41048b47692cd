//! # Sequential Allocator
//!
//! Delivery stage that hands out concrete items from a per-SKU list.
//!
//! ## Item List
//! ```text
//!             cursor
//!               │
//!   ┌────┬────┬─▼──┬────┬────┐
//!   │ i0 │ i1 │ i2 │ i3 │ i4 │      delivered: [0, cursor)   immutable
//!   └────┴────┴────┴────┴────┘      pending:   [cursor, len) editable while paused
//! ```
//!
//! A purchase of `q` takes `items[cursor..cursor + q]` into
//! `delivery_data` and advances the cursor. Appends raise the SKU's total
//! and remaining supply by the same count, so remaining supply always equals
//! `len - cursor`.

use tracing::{debug, info};

use crate::collab::Vault;
use crate::error::{StoreError, StoreResult};
use crate::pipeline::{DeliveryStage, Storefront, SupplyDelivery};
use crate::types::{Address, Currency, ItemId, PriceEntry, Purchase, Sku, SkuId, SkuParams};
use crate::validation::validate_item_ids;

/// Ordered item list plus a delivery cursor, bound to one SKU.
#[derive(Debug, Clone)]
pub struct SequentialAllocator {
    sku: SkuId,
    items: Vec<ItemId>,
    cursor: usize,
    base: SupplyDelivery,
}

impl SequentialAllocator {
    pub fn new(sku: SkuId) -> Self {
        SequentialAllocator {
            sku,
            items: Vec::new(),
            cursor: 0,
            base: SupplyDelivery,
        }
    }

    pub fn sku(&self) -> SkuId {
        self.sku
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Index of the next item to hand out.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.items.len() - self.cursor
    }

    fn append(&mut self, items: &[ItemId]) -> StoreResult<()> {
        validate_item_ids(items)?;
        self.items.extend_from_slice(items);
        Ok(())
    }

    /// Applies `(index, item)` edits all-or-nothing.
    fn overwrite(&mut self, edits: &[(usize, ItemId)]) -> StoreResult<()> {
        for (index, item) in edits {
            if *index < self.cursor {
                return Err(StoreError::DeliveredItemImmutable {
                    index: *index,
                    cursor: self.cursor,
                });
            }
            if *index >= self.items.len() {
                return Err(StoreError::ItemIndexOutOfRange {
                    index: *index,
                    len: self.items.len(),
                });
            }
            if item.is_zero() {
                return Err(StoreError::ZeroItemId { index: *index });
            }
        }
        for (index, item) in edits {
            self.items[*index] = *item;
        }
        Ok(())
    }
}

impl DeliveryStage for SequentialAllocator {
    fn deliver(&mut self, sku: &mut Sku, purchase: &mut Purchase) -> StoreResult<()> {
        if sku.id != self.sku {
            return Err(StoreError::AllocatorSkuMismatch {
                expected: self.sku,
                actual: sku.id,
            });
        }

        let available = self.remaining();
        let end = usize::try_from(purchase.quantity)
            .ok()
            .filter(|quantity| *quantity <= available)
            .map(|quantity| self.cursor + quantity)
            .ok_or(StoreError::OutOfAllocatorSupply {
                available,
                requested: purchase.quantity,
            })?;

        self.base.deliver(sku, purchase)?;

        purchase
            .delivery_data
            .extend_from_slice(&self.items[self.cursor..end]);
        self.cursor = end;

        debug!(sku = %self.sku, cursor = self.cursor, "Items allocated");
        Ok(())
    }

    fn revert(&mut self, purchase: &Purchase) {
        self.cursor = self.cursor.saturating_sub(purchase.delivery_data.len());
    }

    /// The bound SKU's supply tracks the item list; it is only created by
    /// `launch_allocated_sku`.
    fn admit_sku(&self, id: &SkuId) -> StoreResult<()> {
        if *id == self.sku {
            return Err(StoreError::AllocatedSkuReserved(*id));
        }
        Ok(())
    }
}

// =============================================================================
// Allocator Admin
// =============================================================================

impl<V: Vault> Storefront<V, SequentialAllocator> {
    /// Creates the allocator's SKU with `items` as its initial supply.
    pub fn launch_allocated_sku(
        &mut self,
        caller: Address,
        max_per_purchase: u64,
        receiver: Option<Address>,
        prices: Vec<(Currency, PriceEntry)>,
        items: Vec<ItemId>,
    ) -> StoreResult<&Sku> {
        self.catalog().ensure_owner(caller)?;
        validate_item_ids(&items)?;

        let id = self.delivery().sku();
        let params = SkuParams {
            id,
            total_supply: items.len() as u64,
            max_per_purchase,
            receiver,
            prices,
        };
        self.catalog_mut().create_sku(caller, params)?;
        self.delivery_mut().append(&items)?;

        info!(sku = %id, items = items.len(), "Allocated SKU launched");
        self.sku(&id)
    }

    /// Adds items to the end of the list and to the SKU's supply.
    pub fn append_items(&mut self, caller: Address, items: &[ItemId]) -> StoreResult<()> {
        self.catalog().ensure_owner(caller)?;
        validate_item_ids(items)?;

        let id = self.delivery().sku();
        self.catalog_mut().add_supply(&id, items.len() as u64)?;
        self.delivery_mut().append(items)?;

        info!(sku = %id, added = items.len(), "Items appended");
        Ok(())
    }

    /// Replaces undelivered items. Only allowed while paused.
    pub fn overwrite_items(
        &mut self,
        caller: Address,
        edits: &[(usize, ItemId)],
    ) -> StoreResult<()> {
        self.catalog().ensure_owner(caller)?;
        if !self.is_paused() {
            return Err(StoreError::NotPaused);
        }
        self.delivery_mut().overwrite(edits)?;

        info!(sku = %self.delivery().sku(), edited = edits.len(), "Items overwritten");
        Ok(())
    }
}
