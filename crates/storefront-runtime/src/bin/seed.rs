//! # Seed Scenario Runner
//!
//! Runs the reference purchase scenarios against in-memory collaborators
//! and prints every receipt as JSON.
//!
//! ## Usage
//! ```bash
//! # Built-in demo identities
//! cargo run -p storefront-runtime --bin seed
//!
//! # Identities from a config file (STOREFRONT_* overrides apply)
//! cargo run -p storefront-runtime --bin seed -- --config ./storefront.toml
//! ```
//!
//! ## Scenarios
//! - Fixed price: supply 3, max 2 per purchase, 1000 native each
//! - Oracle: one USDC entry converted, one settled by swap
//! - Allocator: three numbered items handed out in order

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use storefront_core::memory::{MemoryVault, RecordingReceiver, TableOracle};
use storefront_core::{
    Address, Amount, Currency, ItemId, PriceEntry, PriceOracle, PurchaseRequest, Receipt, SkuId,
    SkuParams, StoreResult, StorefrontConfig, Vault,
};
use storefront_runtime::{build_allocated_storefront, build_storefront, config, init_tracing};
use tracing::info;

const BUYER: Address = Address::new([0x0b; 20]);
const LIQUIDITY: Address = Address::new([0x0a; 20]);
const RECEIVER: Address = Address::new([0x40; 20]);
const USDC: Currency = Currency::token(Address::new([0xc0; 20]));

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Storefront Seed Scenario Runner");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Config file (default: built-in demo identities)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    init_tracing();

    let config = match config_path {
        Some(path) => config::load(Some(path))?,
        None => demo_config(),
    };
    if config.store.reference_currency != Currency::NATIVE {
        return Err("seed scenarios quote prices in the native currency".into());
    }

    println!("Storefront Seed Scenarios");
    println!("=========================");
    println!("Owner:  {}", config.store.owner);
    println!("Payout: {}", config.store.payout);
    println!();

    fixed_price_scenario(&config)?;
    oracle_scenario(&config)?;
    allocator_scenario(&config)?;

    println!();
    println!("✓ Seed complete!");
    Ok(())
}

fn demo_config() -> StorefrontConfig {
    StorefrontConfig::new(
        Address::new([0x01; 20]),
        Address::new([0x02; 20]),
        Address::new([0x03; 20]),
        Currency::NATIVE,
    )
}

fn request(sku: &str, currency: Currency, quantity: u64, attached: u128) -> PurchaseRequest {
    PurchaseRequest {
        purchaser: BUYER,
        recipient: BUYER,
        currency,
        sku: SkuId::from_name(sku),
        quantity,
        attached_value: Amount::new(attached),
        data: Default::default(),
    }
}

fn report(label: &str, outcome: StoreResult<Receipt>) -> Result<(), Box<dyn std::error::Error>> {
    match outcome {
        Ok(receipt) => {
            println!("✓ {label}");
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        Err(err) => println!("✗ {label}: {err} ({:?})", err.kind()),
    }
    Ok(())
}

fn fixed_price_scenario(config: &StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("-- Fixed price --");
    let owner = config.store.owner;
    let mut vault = MemoryVault::new();
    vault.mint(Currency::NATIVE, BUYER, Amount::new(1_000_000));

    let mut store = build_storefront(config, vault, None)?;
    let receiver = Arc::new(RecordingReceiver::new());
    store.register_receiver(owner, RECEIVER, receiver.clone())?;
    store.create_sku(
        owner,
        SkuParams {
            id: SkuId::from_name("ticket"),
            total_supply: 3,
            max_per_purchase: 2,
            receiver: Some(RECEIVER),
            prices: vec![(Currency::NATIVE, PriceEntry::Fixed(Amount::new(1000)))],
        },
    )?;

    report("buy 2", store.purchase_for(request("ticket", Currency::NATIVE, 2, 2000)))?;
    report("buy 2 more", store.purchase_for(request("ticket", Currency::NATIVE, 2, 2000)))?;
    report("buy 1", store.purchase_for(request("ticket", Currency::NATIVE, 1, 1000)))?;
    report("buy 1 more", store.purchase_for(request("ticket", Currency::NATIVE, 1, 1000)))?;

    info!(notified = receiver.purchases().len(), "Fixed price scenario done");
    Ok(())
}

fn oracle_scenario(config: &StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("-- Oracle --");
    let owner = config.store.owner;
    // 1 USDC (scaled) quoted at 0.5 native, executed at 0.8
    let oracle: Arc<dyn PriceOracle> = Arc::new(
        TableOracle::new(Currency::NATIVE, LIQUIDITY)
            .with_rate(USDC, Amount::new(Amount::SCALE / 2))
            .with_execution_rate(USDC, Amount::new(Amount::SCALE / 10 * 8)),
    );

    let mut vault = MemoryVault::new();
    vault.mint(USDC, BUYER, Amount::new(100_000));
    vault.mint(Currency::NATIVE, LIQUIDITY, Amount::new(1_000_000));

    let mut store = build_storefront(config, vault, Some(oracle))?;
    for (name, entry) in [
        ("converted", PriceEntry::OracleConverted),
        ("swapped", PriceEntry::OracleSwapped),
    ] {
        store.create_sku(
            owner,
            SkuParams {
                id: SkuId::from_name(name),
                total_supply: 10,
                max_per_purchase: 5,
                receiver: None,
                prices: vec![
                    (Currency::NATIVE, PriceEntry::Fixed(Amount::new(1000))),
                    (USDC, entry),
                ],
            },
        )?;
    }

    let quote = store.estimate(&request("converted", USDC, 2, 0))?;
    println!("Quote for 2 converted: {} USDC", quote.total_price);

    report("buy 2 converted", store.purchase_for(request("converted", USDC, 2, 0)))?;
    report("buy 2 swapped", store.purchase_for(request("swapped", USDC, 2, 0)))?;
    println!(
        "Payout balance: {} native, {} USDC",
        store.vault().balance_of(Currency::NATIVE, config.store.payout),
        store.vault().balance_of(USDC, config.store.payout),
    );
    Ok(())
}

fn allocator_scenario(config: &StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("-- Allocator --");
    let owner = config.store.owner;
    let mut vault = MemoryVault::new();
    vault.mint(Currency::NATIVE, BUYER, Amount::new(1_000));

    let mut store = build_allocated_storefront(config, vault, None, SkuId::from_name("drop"))?;
    store.launch_allocated_sku(
        owner,
        2,
        None,
        vec![(Currency::NATIVE, PriceEntry::Fixed(Amount::new(10)))],
        (101u64..=103).map(ItemId::from).collect(),
    )?;

    report("claim 2", store.purchase_for(request("drop", Currency::NATIVE, 2, 20)))?;
    store.append_items(owner, &[ItemId::from(104u64)])?;
    report("claim 2 after append", store.purchase_for(request("drop", Currency::NATIVE, 2, 20)))?;
    Ok(())
}
