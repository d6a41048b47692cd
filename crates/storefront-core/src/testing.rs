//! Shared fixtures for unit tests.

use alloy_primitives::Bytes;

use crate::config::StorefrontConfig;
use crate::money::Amount;
use crate::types::{Address, Currency, PriceEntry, PurchaseRequest, SkuId, SkuParams};

pub(crate) const OWNER: Address = Address::new([0x01; 20]);
pub(crate) const PAYOUT: Address = Address::new([0x02; 20]);
pub(crate) const ACCOUNT: Address = Address::new([0x03; 20]);
pub(crate) const BUYER: Address = Address::new([0x0b; 20]);
pub(crate) const RECIPIENT: Address = Address::new([0x0c; 20]);

pub(crate) fn addr(n: u8) -> Address {
    Address::new([n; 20])
}

pub(crate) fn usdc() -> Currency {
    Currency::token(addr(0xc0))
}

/// Native-reference config with default limits.
pub(crate) fn config() -> StorefrontConfig {
    StorefrontConfig::new(OWNER, PAYOUT, ACCOUNT, Currency::NATIVE)
}

pub(crate) fn sku_params(
    name: &str,
    total_supply: u64,
    max_per_purchase: u64,
    prices: Vec<(Currency, PriceEntry)>,
) -> SkuParams {
    SkuParams {
        id: SkuId::from_name(name),
        total_supply,
        max_per_purchase,
        receiver: None,
        prices,
    }
}

pub(crate) fn request(sku: &str, currency: Currency, quantity: u64) -> PurchaseRequest {
    PurchaseRequest {
        purchaser: BUYER,
        recipient: RECIPIENT,
        currency,
        sku: SkuId::from_name(sku),
        quantity,
        attached_value: Amount::ZERO,
        data: Bytes::new(),
    }
}

pub(crate) fn native_request(sku: &str, quantity: u64, attached: u128) -> PurchaseRequest {
    PurchaseRequest {
        attached_value: Amount::new(attached),
        ..request(sku, Currency::NATIVE, quantity)
    }
}
