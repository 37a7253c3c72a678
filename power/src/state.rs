//! Per-account power state as kept by the chain-state oracle.

use serde::{Deserialize, Serialize};

use crate::error::PowerError;
use crate::model::{calculate_power, max_power};

/// Power bookkeeping for a single account.
///
/// Power is accrued lazily: the stored value is exact at `reference_block`
/// and every later height is derived with [`calculate_power`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerState {
    /// Balance the accrual since `reference_block` is computed from.
    pub balance: u128,
    /// Power as of `reference_block`.
    pub power: u128,
    /// Block at which `power` was last settled.
    pub reference_block: u64,
}

impl PowerState {
    pub fn new(balance: u128, reference_block: u64) -> Self {
        Self {
            balance,
            power: 0,
            reference_block,
        }
    }

    /// Power at `block` without modifying the state.
    pub fn power_at(&self, block: u64) -> u128 {
        calculate_power(self.reference_block, block, self.power, self.balance)
    }

    /// Ceiling for the current balance.
    pub fn max_power(&self) -> u128 {
        max_power(self.balance)
    }

    /// Accrue up to `block` at the old balance, then adopt `new_balance`.
    ///
    /// Balance changes only affect accrual from `block` onward.
    pub fn settle(&mut self, block: u64, new_balance: u128) -> Result<(), PowerError> {
        if block < self.reference_block {
            return Err(PowerError::BlockRegression {
                block,
                reference: self.reference_block,
            });
        }
        self.power = self.power_at(block);
        self.reference_block = block;
        self.balance = new_balance;
        Ok(())
    }

    /// Spend `amount` of power at `block`, e.g. the fee budget of a ping.
    pub fn consume(&mut self, block: u64, amount: u128) -> Result<(), PowerError> {
        self.settle(block, self.balance)?;
        if self.power < amount {
            return Err(PowerError::InsufficientPower {
                needed: amount,
                available: self.power,
            });
        }
        self.power -= amount;
        Ok(())
    }
}
