//! # Reentrancy Guard
//!
//! Shared handle that serializes access to a [`Storefront`].
//!
//! Collaborators are untrusted and may call back into the storefront while
//! a purchase is in flight (a receiver buying from its own notification).
//! Such nested calls are rejected with [`StoreError::ReentrantCall`];
//! calls from other threads wait their turn.
//!
//! ```text
//! thread A: purchase_for ──lock──► stages … receiver ──► purchase_for
//!                                                        └─► ReentrantCall
//! thread B: purchase_for ──wait──────────────────────────────► runs after A
//! ```

use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use tracing::warn;

use crate::collab::Vault;
use crate::error::{StoreError, StoreResult};
use crate::pipeline::{DeliveryStage, Storefront, SupplyDelivery};
use crate::types::{PurchaseRequest, Quote, Receipt};

struct Shared<V, D> {
    store: Mutex<Storefront<V, D>>,
    /// Thread currently inside the storefront, if any.
    active: Mutex<Option<ThreadId>>,
}

/// Cloneable, thread-safe storefront handle.
pub struct SharedStorefront<V, D = SupplyDelivery> {
    inner: Arc<Shared<V, D>>,
}

impl<V, D> Clone for SharedStorefront<V, D> {
    fn clone(&self) -> Self {
        SharedStorefront {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Vault, D: DeliveryStage> SharedStorefront<V, D> {
    pub fn new(store: Storefront<V, D>) -> Self {
        SharedStorefront {
            inner: Arc::new(Shared {
                store: Mutex::new(store),
                active: Mutex::new(None),
            }),
        }
    }

    pub fn estimate(&self, request: &PurchaseRequest) -> StoreResult<Quote> {
        self.with(|store| store.estimate(request))
    }

    pub fn purchase_for(&self, request: PurchaseRequest) -> StoreResult<Receipt> {
        self.with(|store| store.purchase_for(request))
    }

    /// Runs `f` with exclusive access; admin calls and reads go through here.
    pub fn with<R>(
        &self,
        f: impl FnOnce(&mut Storefront<V, D>) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let me = thread::current().id();
        if self.active()? == Some(me) {
            warn!("Reentrant storefront call rejected");
            return Err(StoreError::ReentrantCall);
        }

        let mut store = self.inner.store.lock().map_err(|_| StoreError::Poisoned)?;
        let _entered = Entered::mark(&self.inner.active, me)?;
        f(&mut store)
    }

    fn active(&self) -> StoreResult<Option<ThreadId>> {
        self.inner
            .active
            .lock()
            .map(|active| *active)
            .map_err(|_| StoreError::Poisoned)
    }
}

/// Clears the active marker on drop, including on unwind.
struct Entered<'a> {
    slot: &'a Mutex<Option<ThreadId>>,
}

impl<'a> Entered<'a> {
    fn mark(slot: &'a Mutex<Option<ThreadId>>, id: ThreadId) -> StoreResult<Self> {
        *slot.lock().map_err(|_| StoreError::Poisoned)? = Some(id);
        Ok(Entered { slot })
    }
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        if let Ok(mut active) = self.slot.lock() {
            *active = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::PurchaseReceiver;
    use crate::memory::MemoryVault;
    use crate::money::Amount;
    use crate::testing::*;
    use crate::types::{Currency, PriceEntry, Purchase, SkuId};
    use std::sync::{OnceLock, Weak};

    /// Tries to buy again from inside its own notification.
    ///
    /// Holds the storefront weakly; the storefront owns the receiver.
    struct ReenteringReceiver {
        store: OnceLock<Weak<Shared<MemoryVault, SupplyDelivery>>>,
        nested: Mutex<Vec<StoreResult<()>>>,
    }

    impl PurchaseReceiver for ReenteringReceiver {
        fn on_purchase(&self, _purchase: &Purchase) -> Result<(), String> {
            let inner = self.store.get().and_then(Weak::upgrade).ok_or("not wired")?;
            let store = SharedStorefront { inner };
            let outcome = store.purchase_for(native_request("sku", 1, 1000)).map(|_| ());
            self.nested.lock().map_err(|e| e.to_string())?.push(outcome);
            Ok(())
        }
    }

    fn storefront() -> Storefront<MemoryVault> {
        let mut vault = MemoryVault::new();
        vault.mint(Currency::NATIVE, BUYER, Amount::new(1_000_000));
        let mut store = Storefront::new(&config(), vault).unwrap();
        store
            .create_sku(
                OWNER,
                sku_params(
                    "sku",
                    10,
                    2,
                    vec![(Currency::NATIVE, PriceEntry::Fixed(Amount::new(1000)))],
                ),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_nested_purchase_is_rejected() {
        let receiver = Arc::new(ReenteringReceiver {
            store: OnceLock::new(),
            nested: Mutex::new(Vec::new()),
        });
        let mut store = storefront();
        store.register_receiver(OWNER, addr(0x40), receiver.clone()).unwrap();
        store
            .set_receiver(OWNER, &SkuId::from_name("sku"), Some(addr(0x40)))
            .unwrap();

        let shared = SharedStorefront::new(store);
        assert!(receiver.store.set(Arc::downgrade(&shared.inner)).is_ok());

        shared.purchase_for(native_request("sku", 1, 1000)).unwrap();

        let nested = receiver.nested.lock().unwrap();
        assert_eq!(nested.len(), 1);
        assert!(matches!(nested[0], Err(StoreError::ReentrantCall)));

        let remaining = shared
            .with(|store| Ok(store.sku(&SkuId::from_name("sku"))?.remaining_supply))
            .unwrap();
        assert_eq!(remaining, 9);
        assert_eq!(Arc::strong_count(&shared.inner), 1);
    }

    #[test]
    fn test_threads_are_serialized() {
        let shared = SharedStorefront::new(storefront());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || shared.purchase_for(native_request("sku", 2, 2000)).is_ok())
            })
            .collect();
        let succeeded = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|ok| *ok)
            .count();

        // 10 units at 2 per purchase
        assert_eq!(succeeded, 5);
        let payout = shared
            .with(|store| Ok(store.vault().balance_of(Currency::NATIVE, PAYOUT)))
            .unwrap();
        assert_eq!(payout, Amount::new(10_000));
    }

    #[test]
    fn test_marker_cleared_after_error() {
        let shared = SharedStorefront::new(storefront());
        assert!(shared.purchase_for(native_request("missing", 1, 1000)).is_err());
        assert!(shared.estimate(&native_request("sku", 1, 1000)).is_ok());
    }
}
