use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("public key is not a point on secp256k1")]
    NotOnCurve,

    #[error("hash must be 32 bytes, got {0}")]
    InvalidHashLength(usize),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("public key recovery failed: {0}")]
    RecoveryFailed(String),
}
