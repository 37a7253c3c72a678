use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("state unavailable: {0}")]
    StateUnavailable(String),

    #[error("gas price oracle error: {0}")]
    GasPrice(String),

    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("transaction pool error: {0}")]
    Pool(String),
}
