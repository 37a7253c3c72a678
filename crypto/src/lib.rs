//! Cryptographic primitives for the vigil masternode layer.
//!
//! - **secp256k1** recoverable ECDSA for hash signing and transaction signing
//! - **Keccak-256** for hashing and address derivation
//! - Validation of 64-byte packed public keys against the curve
//! - Chain-id-bound (EIP-155) transaction encoding via RLP

pub use secp256k1;

pub mod address;
pub mod error;
pub mod hash;
pub mod keys;
pub mod sign;
pub mod transaction;

pub use address::{address_from_node_id, address_from_private};
pub use error::CryptoError;
pub use hash::{hash_transaction, keccak256, keccak256_multi};
pub use keys::{is_on_curve, node_id_from_private, node_id_from_public, public_key_from_node_id, secret_key};
pub use sign::{recover_public_key, sign_hash, verify_hash_signature};
pub use transaction::{encode_signed, sign_transaction, signing_hash};
