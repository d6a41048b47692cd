//! # In-Memory Collaborators
//!
//! Self-contained [`Vault`](crate::collab::Vault),
//! [`PriceOracle`](crate::collab::PriceOracle) and
//! [`PurchaseReceiver`](crate::collab::PurchaseReceiver) implementations.
//! The seed binary and the test suites run the whole pipeline on them.

mod oracle;
mod receiver;
mod vault;

pub use oracle::TableOracle;
pub use receiver::{RecordingReceiver, RejectingReceiver};
pub use vault::MemoryVault;
