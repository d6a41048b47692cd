//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Sku        │   │    Purchase     │   │    Receipt      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (B256)      │   │  purchaser      │   │  request_id     │       │
//! │  │  total_supply   │   │  recipient      │   │  completed_at   │       │
//! │  │  remaining      │   │  currency       │   │  purchase       │       │
//! │  │  max_per_purch. │   │  quantity       │   └─────────────────┘       │
//! │  │  receiver       │   │  total_price    │                             │
//! │  │  prices ────────┼─┐ │  pricing_data   │   ┌─────────────────┐       │
//! │  └─────────────────┘ │ │  payment_data   │   │     Quote       │       │
//! │                      │ │  delivery_data  │   │  total_price    │       │
//! │  ┌─────────────────┐ │ └─────────────────┘   │  pricing_data   │       │
//! │  │   PriceEntry    │◄┘                       └─────────────────┘       │
//! │  │  Fixed(amount)  │                                                    │
//! │  │  OracleConverted│                                                    │
//! │  │  OracleSwapped  │                                                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use alloy_primitives::{keccak256, Bytes, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::money::Amount;

pub use alloy_primitives::Address;

/// Total supply value meaning "never runs out".
pub const UNBOUNDED_SUPPLY: u64 = u64::MAX;

// =============================================================================
// Identifiers
// =============================================================================

/// A currency a SKU can be priced and paid in.
///
/// Tokens are identified by their contract address. The chain's native unit
/// uses the conventional `0xeeee…ee` placeholder; the zero address is the
/// null currency and is rejected everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(Address);

impl Currency {
    pub const NATIVE: Currency = Currency(Address::new([0xee; 20]));

    #[inline]
    pub const fn token(address: Address) -> Self {
        Currency(address)
    }

    #[inline]
    pub const fn address(&self) -> Address {
        self.0
    }

    #[inline]
    pub fn is_native(&self) -> bool {
        *self == Currency::NATIVE
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            write!(f, "native")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Opaque fixed-size SKU key. Immutable once the SKU is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkuId(B256);

impl SkuId {
    #[inline]
    pub const fn new(key: B256) -> Self {
        SkuId(key)
    }

    /// Derives a key from a human-readable name (keccak-256).
    pub fn from_name(name: &str) -> Self {
        SkuId(keccak256(name.as_bytes()))
    }

    #[inline]
    pub const fn key(&self) -> B256 {
        self.0
    }
}

impl fmt::Display for SkuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque inventory item identifier handed out by the sequential allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(U256);

impl ItemId {
    #[inline]
    pub const fn new(value: U256) -> Self {
        ItemId(value)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub const fn value(&self) -> U256 {
        self.0
    }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        ItemId(U256::from(value))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Price Entry
// =============================================================================

/// A stored unit price for one currency.
///
/// ## Dispatch
/// ```text
/// Fixed(p)         ──► total = quantity × p                (base pricing)
/// OracleConverted  ──► total = refTotal × 10^18 / rate     (oracle pricing)
/// OracleSwapped    ──► same price, settled by swapping into the reference
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceEntry {
    Fixed(Amount),
    OracleConverted,
    OracleSwapped,
}

impl PriceEntry {
    /// `Fixed(0)` is the removal marker in price updates.
    pub fn is_removal(&self) -> bool {
        matches!(self, PriceEntry::Fixed(amount) if amount.is_zero())
    }

    pub fn fixed(&self) -> Option<Amount> {
        match self {
            PriceEntry::Fixed(amount) => Some(*amount),
            _ => None,
        }
    }
}

// =============================================================================
// SKU
// =============================================================================

/// A catalog entry: one purchasable product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub id: SkuId,

    /// Total supply, or [`UNBOUNDED_SUPPLY`].
    pub total_supply: u64,

    /// Remaining supply (≤ total supply), decremented only by delivery.
    pub remaining_supply: u64,

    /// Maximum quantity purchasable in one request.
    pub max_per_purchase: u64,

    /// Optional notification receiver.
    pub receiver: Option<Address>,

    /// Ordered `(currency, entry)` list, at most one entry per currency.
    pub prices: Vec<(Currency, PriceEntry)>,
}

impl Sku {
    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.total_supply == UNBOUNDED_SUPPLY
    }

    /// Looks up the stored entry for a currency.
    pub fn price(&self, currency: &Currency) -> Option<PriceEntry> {
        self.prices
            .iter()
            .find(|(c, _)| c == currency)
            .map(|(_, entry)| *entry)
    }

    /// Checks whether `quantity` more units can be delivered.
    pub fn can_supply(&self, quantity: u64) -> bool {
        self.is_unbounded() || self.remaining_supply >= quantity
    }
}

/// Arguments for creating a SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuParams {
    pub id: SkuId,
    pub total_supply: u64,
    pub max_per_purchase: u64,
    #[serde(default)]
    pub receiver: Option<Address>,
    #[serde(default)]
    pub prices: Vec<(Currency, PriceEntry)>,
}

// =============================================================================
// Purchase
// =============================================================================

/// What a caller submits to `estimate` or `purchase_for`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub purchaser: Address,
    pub recipient: Address,
    pub currency: Currency,
    pub sku: SkuId,
    pub quantity: u64,

    /// Native value attached to the request; only read for native payments.
    #[serde(default)]
    pub attached_value: Amount,

    /// Opaque caller-supplied data, forwarded to the oracle and receiver.
    #[serde(default)]
    pub data: Bytes,
}

/// Auxiliary facts recorded by the pricing stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PricingData {
    #[default]
    None,
    /// Fixed price read straight from the price list.
    Fixed { unit_price: Amount },
    /// Oracle-converted price; `rate` is reference units per 10^18 currency units.
    OracleRate { rate: Amount },
    /// Oracle-converted price to be settled by swapping into the reference.
    SwapRate { rate: Amount },
}

/// Auxiliary facts recorded by the payment stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PaymentData {
    #[default]
    None,
    Direct {
        amount: Amount,
    },
    Swapped {
        collected: Amount,
        consumed: Amount,
        refunded: Amount,
        reference_amount: Amount,
    },
}

/// The transient record threaded through all five stages.
///
/// Owned exclusively by the request that created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub purchaser: Address,
    pub recipient: Address,
    pub currency: Currency,
    pub sku: SkuId,
    pub quantity: u64,
    pub attached_value: Amount,
    pub data: Bytes,
    pub total_price: Amount,
    pub pricing_data: PricingData,
    pub payment_data: PaymentData,
    /// Concrete item assignment, in allocation order.
    pub delivery_data: Vec<ItemId>,
}

impl From<PurchaseRequest> for Purchase {
    fn from(request: PurchaseRequest) -> Self {
        Purchase {
            purchaser: request.purchaser,
            recipient: request.recipient,
            currency: request.currency,
            sku: request.sku,
            quantity: request.quantity,
            attached_value: request.attached_value,
            data: request.data,
            total_price: Amount::ZERO,
            pricing_data: PricingData::None,
            payment_data: PaymentData::None,
            delivery_data: Vec::new(),
        }
    }
}

/// Result of `estimate`: validation + pricing only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub total_price: Amount,
    pub pricing_data: PricingData,
}

/// Result of a successful `purchase_for`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub request_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub purchase: Purchase,
}

impl Receipt {
    pub fn new(purchase: Purchase) -> Self {
        Receipt {
            request_id: Uuid::new_v4(),
            completed_at: Utc::now(),
            purchase,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sku_id_from_name_is_stable() {
        assert_eq!(SkuId::from_name("sku"), SkuId::from_name("sku"));
        assert_ne!(SkuId::from_name("sku"), SkuId::from_name("other"));
    }

    #[test]
    fn test_native_currency() {
        assert!(Currency::NATIVE.is_native());
        assert!(!Currency::NATIVE.is_zero());
        assert!(Currency::token(Address::ZERO).is_zero());
        assert_eq!(Currency::NATIVE.to_string(), "native");
    }

    #[test]
    fn test_price_entry_removal_marker() {
        assert!(PriceEntry::Fixed(Amount::ZERO).is_removal());
        assert!(!PriceEntry::Fixed(Amount::new(1)).is_removal());
        assert!(!PriceEntry::OracleConverted.is_removal());
        assert_eq!(PriceEntry::OracleSwapped.fixed(), None);
    }

    #[test]
    fn test_unbounded_sku_always_supplies() {
        let sku = Sku {
            id: SkuId::from_name("open"),
            total_supply: UNBOUNDED_SUPPLY,
            remaining_supply: UNBOUNDED_SUPPLY,
            max_per_purchase: 10,
            receiver: None,
            prices: vec![],
        };
        assert!(sku.can_supply(u64::MAX));
    }

    #[test]
    fn test_purchase_record_serializes_for_observability() {
        let purchase = Purchase::from(PurchaseRequest {
            purchaser: Address::new([1; 20]),
            recipient: Address::new([2; 20]),
            currency: Currency::NATIVE,
            sku: SkuId::from_name("sku"),
            quantity: 1,
            attached_value: Amount::ZERO,
            data: Bytes::new(),
        });
        let json = serde_json::to_value(&purchase).unwrap();
        assert_eq!(json["pricing_data"]["kind"], "none");
        assert_eq!(json["quantity"], 1);
    }
}
