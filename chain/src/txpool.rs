//! Local transaction submission.

use async_trait::async_trait;
use vigil_types::{Address, SignedTransaction};

use crate::ChainError;

#[async_trait]
pub trait TxPool: Send + Sync {
    /// Next nonce for `address`, counting transactions already pooled.
    async fn nonce_of(&self, address: Address) -> Result<u64, ChainError>;

    /// Add a locally signed transaction to the pool.
    async fn submit(&self, tx: SignedTransaction) -> Result<(), ChainError>;
}
