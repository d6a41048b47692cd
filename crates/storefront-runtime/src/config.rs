//! # Configuration Loading
//!
//! File and environment loading for [`StorefrontConfig`].
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     STOREFRONT_OWNER=0x11…11                                            │
//! │     STOREFRONT_PAUSED=true                                              │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     ~/.config/storefront/storefront.toml (Linux)                        │
//! │     ~/Library/Application Support/com.storefront.storefront/… (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     native reference currency, 64 SKUs, 8 currencies per SKU            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The defaults carry null identities, so a config that sets none of
//! owner / payout / account fails validation.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use storefront_core::{Address, Currency, StorefrontConfig};
use tracing::{debug, info, warn};

use crate::error::{RuntimeError, RuntimeResult};

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "storefront.toml";

pub const ENV_OWNER: &str = "STOREFRONT_OWNER";
pub const ENV_PAYOUT: &str = "STOREFRONT_PAYOUT";
pub const ENV_ACCOUNT: &str = "STOREFRONT_ACCOUNT";
pub const ENV_REFERENCE_CURRENCY: &str = "STOREFRONT_REFERENCE_CURRENCY";
pub const ENV_PAUSED: &str = "STOREFRONT_PAUSED";
pub const ENV_MAX_SKUS: &str = "STOREFRONT_MAX_SKUS";
pub const ENV_MAX_CURRENCIES: &str = "STOREFRONT_MAX_CURRENCIES";

// =============================================================================
// Load / Save
// =============================================================================

/// Loads configuration from file and environment, then validates it.
pub fn load(config_path: Option<PathBuf>) -> RuntimeResult<StorefrontConfig> {
    load_with(config_path, |key| std::env::var(key).ok())
}

/// [`load`] with an explicit environment lookup.
pub fn load_with(
    config_path: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> RuntimeResult<StorefrontConfig> {
    let mut config = StorefrontConfig::default();

    if let Some(path) = config_path.or_else(default_config_path) {
        if path.exists() {
            info!(?path, "Loading storefront config from file");
            config = read_file(&path)?;
        } else {
            debug!(?path, "Config file not found, using defaults");
        }
    }

    apply_env_overrides(&mut config, env);
    config.validate()?;

    Ok(config)
}

/// Saves configuration as pretty TOML.
pub fn save(config: &StorefrontConfig, config_path: Option<PathBuf>) -> RuntimeResult<PathBuf> {
    let path = config_path
        .or_else(default_config_path)
        .ok_or_else(|| RuntimeError::ConfigSaveFailed("No config path available".into()))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;

    info!(?path, "Storefront config saved");
    Ok(path)
}

/// Returns the platform-specific config file path.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "storefront", "storefront")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn read_file(path: &Path) -> RuntimeResult<StorefrontConfig> {
    let contents = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

// =============================================================================
// Environment Overrides
// =============================================================================

/// Applies `STOREFRONT_*` overrides. Unparseable values are skipped.
pub fn apply_env_overrides(config: &mut StorefrontConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(owner) = parsed(&env, ENV_OWNER, Address::from_str) {
        debug!(%owner, "Overriding owner from environment");
        config.store.owner = owner;
    }

    if let Some(payout) = parsed(&env, ENV_PAYOUT, Address::from_str) {
        debug!(%payout, "Overriding payout from environment");
        config.store.payout = payout;
    }

    if let Some(account) = parsed(&env, ENV_ACCOUNT, Address::from_str) {
        config.store.account = account;
    }

    if let Some(reference) = parsed(&env, ENV_REFERENCE_CURRENCY, parse_currency) {
        debug!(%reference, "Overriding reference currency from environment");
        config.store.reference_currency = reference;
    }

    if let Some(paused) = parsed(&env, ENV_PAUSED, bool::from_str) {
        config.store.start_paused = paused;
    }

    if let Some(max) = parsed(&env, ENV_MAX_SKUS, usize::from_str) {
        config.limits.max_skus = max;
    }

    if let Some(max) = parsed(&env, ENV_MAX_CURRENCIES, usize::from_str) {
        config.limits.max_currencies_per_sku = max;
    }
}

/// Accepts `native` or a token address.
pub fn parse_currency(value: &str) -> Result<Currency, String> {
    if value.eq_ignore_ascii_case("native") {
        return Ok(Currency::NATIVE);
    }
    Address::from_str(value)
        .map(Currency::token)
        .map_err(|e| e.to_string())
}

fn parsed<T, E: std::fmt::Display>(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
    parse: impl Fn(&str) -> Result<T, E>,
) -> Option<T> {
    let raw = env(key)?;
    match parse(raw.trim()) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "Ignoring invalid environment override");
            None
        }
    }
}
