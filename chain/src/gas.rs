//! Gas price suggestions.

use async_trait::async_trait;

use crate::ChainError;

#[async_trait]
pub trait GasPriceOracle: Send + Sync {
    /// A gas price likely to get a transaction included soon.
    async fn suggest_price(&self) -> Result<u128, ChainError>;
}
