//! Account state reads: balance, power and chain height.

use async_trait::async_trait;
use vigil_types::Address;

use crate::ChainError;

/// Read access to balances and power at the current chain head.
#[async_trait]
pub trait ChainState: Send + Sync {
    /// Balance of `address` in base units.
    async fn balance_of(&self, address: Address) -> Result<u128, ChainError>;

    /// Power of `address` evaluated at `block`.
    async fn power_of(&self, address: Address, block: u64) -> Result<u128, ChainError>;

    /// Number of the current head block.
    async fn current_block_number(&self) -> Result<u64, ChainError>;
}
