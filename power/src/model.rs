//! The power accrual curve.
//!
//! For a balance `b`, the stake tier is `t = floor(b / 10^16) / 100` and
//!
//! ```text
//! ceiling(t) = trunc(exp(-1 / (t * 50) * 10000) * 10^7 + 2 * 10^5) * M
//! rate(t)    = exp(-1 / (t * 2) * 1000) * 2 * 10^5 + 1000
//! delta      = trunc(blocks * rate(t)) * M
//! ```
//!
//! with `M = 1.8 * 10^10`. Peers may recompute these values from chain
//! history, so the double-precision operations below are evaluated in exactly
//! this order and truncated toward zero before each integer multiplication.

use vigil_types::params::{MIN_STAKE, POWER_SCALE};

/// The real-valued stake tier of a balance.
///
/// The whole number of minimum stakes is reduced modulo 2^64 before the
/// conversion to `f64`.
pub fn stake_tier(balance: u128) -> f64 {
    let units = (balance / MIN_STAKE) as u64;
    units as f64 / 100.0
}

/// Unscaled ceiling for a tier, before truncation.
fn ceiling_factor(tier: f64) -> f64 {
    (-1.0 / (tier * 50.0) * 10_000.0).exp() * 10_000_000.0 + 200_000.0
}

fn ceiling(tier: f64) -> u128 {
    (ceiling_factor(tier) as i64 as u128) * POWER_SCALE
}

/// Power gained per block at a tier, before scaling.
pub fn growth_rate(tier: f64) -> f64 {
    (-1.0 / (tier * 2.0) * 1000.0).exp() * 200_000.0 + 1000.0
}

/// The maximum power an account holding `balance` can reach.
pub fn max_power(balance: u128) -> u128 {
    ceiling(stake_tier(balance))
}

/// Advance `prev_power` from `prev_block` to `new_block` for an account
/// holding `balance`.
///
/// - A non-advancing block returns `prev_power` unchanged.
/// - A balance below [`MIN_STAKE`] returns zero.
/// - Otherwise the accrued delta is added and the result is clamped to the
///   ceiling; a sum that overflows also yields the ceiling.
pub fn calculate_power(prev_block: u64, new_block: u64, prev_power: u128, balance: u128) -> u128 {
    if new_block <= prev_block {
        return prev_power;
    }
    if balance < MIN_STAKE {
        return 0;
    }

    let tier = stake_tier(balance);
    let max = ceiling(tier);

    let blocks = (new_block - prev_block) as f64;
    let delta = ((blocks * growth_rate(tier)) as i64 as u128) * POWER_SCALE;

    match prev_power.checked_add(delta) {
        Some(power) if power <= max => power,
        _ => max,
    }
}
