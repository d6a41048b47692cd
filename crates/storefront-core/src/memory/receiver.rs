use std::sync::Mutex;

use tracing::debug;

use crate::collab::PurchaseReceiver;
use crate::types::Purchase;

/// Records every purchase it is notified of.
#[derive(Debug, Default)]
pub struct RecordingReceiver {
    seen: Mutex<Vec<Purchase>>,
}

impl RecordingReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Purchases seen so far, in notification order.
    pub fn purchases(&self) -> Vec<Purchase> {
        match self.seen.lock() {
            Ok(seen) => seen.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl PurchaseReceiver for RecordingReceiver {
    fn on_purchase(&self, purchase: &Purchase) -> Result<(), String> {
        debug!(sku = %purchase.sku, quantity = purchase.quantity, "Receiver notified");
        self.seen
            .lock()
            .map_err(|_| "receiver log poisoned".to_string())?
            .push(purchase.clone());
        Ok(())
    }
}

/// Fails every notification with a fixed reason.
#[derive(Debug, Clone)]
pub struct RejectingReceiver {
    reason: String,
}

impl RejectingReceiver {
    pub fn new(reason: impl Into<String>) -> Self {
        RejectingReceiver {
            reason: reason.into(),
        }
    }
}

impl PurchaseReceiver for RejectingReceiver {
    fn on_purchase(&self, _purchase: &Purchase) -> Result<(), String> {
        Err(self.reason.clone())
    }
}
