//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the masternode manager (registry binding,
//! chain state, gas-price oracle, transaction pool, drift monitor) is
//! abstracted behind a trait. This crate provides implementations that:
//! - Return programmed values
//! - Record the calls made to them for assertions
//! - Never touch the network
//!
//! All of them are `Send + Sync` so they can be shared with spawned tasks.

pub mod chain;
pub mod drift;
pub mod registry;

pub use chain::{NullChainState, NullGasOracle, NullTxPool};
pub use drift::NullDriftMonitor;
pub use registry::NullRegistry;
