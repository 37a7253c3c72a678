use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("unknown masternode {0}")]
    UnknownMasternode(String),

    #[error("masternode manager already started")]
    AlreadyStarted,

    #[error("registry error: {0}")]
    Registry(#[from] vigil_registry::RegistryError),

    #[error("{0}")]
    Traversal(#[from] vigil_registry::TraversalError),

    #[error("crypto error: {0}")]
    Crypto(#[from] vigil_crypto::CryptoError),

    #[error("chain error: {0}")]
    Chain(#[from] vigil_chain::ChainError),

    #[error("network error: {0}")]
    Network(#[from] vigil_network::NetworkError),

    #[error("config error: {0}")]
    Config(String),

    #[error("shutdown timeout")]
    ShutdownTimeout,
}
