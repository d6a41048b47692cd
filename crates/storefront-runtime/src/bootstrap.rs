//! # Bootstrap
//!
//! Wires a configured storefront over a vault and an optional oracle.
//!
//! ```text
//! load(path) ──► StorefrontConfig ──► build_storefront(config, vault, oracle)
//!                                         │
//!                      oracle: None ──────┼──► Fixed pricing, direct payment
//!                      oracle: Some ──────┴──► OraclePricing + OracleSwapPayment
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use storefront_core::{
    DeliveryStage, OraclePricing, OracleSwapPayment, PriceOracle, SequentialAllocator, SkuId,
    Stages, Storefront, StorefrontConfig, SupplyDelivery, Vault,
};
use tracing::info;

use crate::config;
use crate::error::RuntimeResult;

/// Stage set for the given oracle.
pub fn stages(oracle: Option<Arc<dyn PriceOracle>>) -> Stages {
    match oracle {
        Some(oracle) => Stages::default()
            .with_pricing(OraclePricing::new(oracle.clone()))
            .with_payment(OracleSwapPayment::new(oracle)),
        None => Stages::default(),
    }
}

/// Storefront with supply-counting delivery.
pub fn build_storefront<V: Vault>(
    config: &StorefrontConfig,
    vault: V,
    oracle: Option<Arc<dyn PriceOracle>>,
) -> RuntimeResult<Storefront<V>> {
    build_with_delivery(config, vault, oracle, SupplyDelivery)
}

/// Storefront that allocates concrete items for one SKU.
pub fn build_allocated_storefront<V: Vault>(
    config: &StorefrontConfig,
    vault: V,
    oracle: Option<Arc<dyn PriceOracle>>,
    sku: SkuId,
) -> RuntimeResult<Storefront<V, SequentialAllocator>> {
    build_with_delivery(config, vault, oracle, SequentialAllocator::new(sku))
}

fn build_with_delivery<V: Vault, D: DeliveryStage>(
    config: &StorefrontConfig,
    vault: V,
    oracle: Option<Arc<dyn PriceOracle>>,
    delivery: D,
) -> RuntimeResult<Storefront<V, D>> {
    let with_oracle = oracle.is_some();
    let store = Storefront::with_stages(config, vault, stages(oracle), delivery)?;
    info!(with_oracle, "Storefront assembled");
    Ok(store)
}

/// Loads configuration and builds a storefront over `vault`.
pub fn bootstrap<V: Vault>(
    config_path: Option<PathBuf>,
    vault: V,
    oracle: Option<Arc<dyn PriceOracle>>,
) -> RuntimeResult<Storefront<V>> {
    let config = config::load(config_path)?;
    build_storefront(&config, vault, oracle)
}
