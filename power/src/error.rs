//! Power-specific errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PowerError {
    #[error("insufficient power: need {needed}, available {available}")]
    InsufficientPower { needed: u128, available: u128 },

    #[error("block {block} precedes reference block {reference}")]
    BlockRegression { block: u64, reference: u64 },
}
