//! Abstract chain-side collaborators of the masternode layer.
//!
//! The node's state database, gas-price oracle and transaction pool each
//! implement one of these traits. The masternode manager depends only on the
//! traits; tests swap in the in-memory versions from `vigil-nullables`.

pub mod error;
pub mod gas;
pub mod state;
pub mod txpool;

pub use error::ChainError;
pub use gas::GasPriceOracle;
pub use state::ChainState;
pub use txpool::TxPool;
