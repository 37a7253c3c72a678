//! Power: the stake-weighted budget that gates liveness pings.
//!
//! Power is a deterministic function of balance and elapsed blocks, not a
//! token. Both the per-block growth rate and the ceiling rise with stake, but
//! along saturating exponential curves, so the advantage of a large stake
//! flattens out.
//!
//! This crate handles:
//! - The accrual step between two block heights ([`calculate_power`])
//! - The balance-only ceiling ([`max_power`])
//! - Per-account state that advances accrual and spends power ([`PowerState`])

pub mod error;
pub mod model;
pub mod state;

pub use error::PowerError;
pub use model::{calculate_power, growth_rate, max_power, stake_tier};
pub use state::PowerState;
