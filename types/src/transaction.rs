//! Transactions submitted to the pool and read-only call requests.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::hash::TxHash;

/// An unsigned legacy transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas: u64,
    /// `None` would be a contract creation; pings always carry a recipient.
    pub to: Option<Address>,
    pub value: u128,
    pub data: Vec<u8>,
}

impl Transaction {
    /// A zero-value transaction with no payload, the shape of a liveness ping.
    pub fn ping(nonce: u64, to: Address, gas: u64, gas_price: u128) -> Self {
        Self {
            nonce,
            gas_price,
            gas,
            to: Some(to),
            value: 0,
            data: Vec::new(),
        }
    }
}

/// A transaction with a chain-id-bound signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub tx: Transaction,
    /// `recovery_id + chain_id * 2 + 35`.
    pub v: u64,
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// Keccak-256 of the RLP-encoded signed transaction.
    pub hash: TxHash,
    /// Sender recovered at signing time.
    pub from: Address,
}

/// A message call evaluated against state without being mined, used for gas
/// estimation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub from: Address,
    pub to: Option<Address>,
    pub data: Vec<u8>,
}
