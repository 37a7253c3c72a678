//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for parsing and validating the basic value types.
#[derive(Debug, Error)]
pub enum VigilError {
    #[error("invalid length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("{0}")]
    Other(String),
}
