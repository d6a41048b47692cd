//! # storefront-runtime: I/O Layer for the Storefront
//!
//! Loads [`StorefrontConfig`](storefront_core::StorefrontConfig) from TOML
//! and the environment, installs the tracing subscriber and assembles
//! storefronts over concrete collaborators.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()          RUST_LOG or "info,storefront=debug"         │
//! │  2. config::load(path)      defaults → storefront.toml → STOREFRONT_*   │
//! │  3. build_storefront(...)   stages chosen by oracle availability        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod telemetry;

pub use bootstrap::{bootstrap, build_allocated_storefront, build_storefront};
pub use error::{RuntimeError, RuntimeResult};
pub use telemetry::init_tracing;
