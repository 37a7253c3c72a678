//! Fundamental types for the vigil masternode layer.
//!
//! This crate defines the value types shared across every other crate in the
//! workspace: addresses, node identifiers, keys and signatures, transactions,
//! network parameters and the protocol constants.

pub mod address;
pub mod error;
pub mod hash;
pub mod keys;
pub mod params;
pub mod time;
pub mod transaction;

pub use address::Address;
pub use error::VigilError;
pub use hash::TxHash;
pub use keys::{NodeId, PrivateKey, ShortId, Signature};
pub use params::NetworkParams;
pub use time::Timestamp;
pub use transaction::{CallRequest, SignedTransaction, Transaction};
