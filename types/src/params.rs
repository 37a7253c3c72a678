//! Network parameters and the fixed protocol constants of the masternode layer.

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Minimum balance (in base units) for an account to accrue power or ping.
pub const MIN_STAKE: u128 = 10_000_000_000_000_000;

/// Fixed scale applied to every power quantity.
pub const POWER_SCALE: u128 = 18_000_000_000;

/// Seconds between liveness pings.
pub const PING_INTERVAL_SECS: u64 = 1200;

/// A masternode whose last ping is older than this many blocks is not active.
pub const STALE_PING_WINDOW: u64 = 1800;

/// Minimum accumulated online credit for inclusion in the active list.
pub const MIN_ONLINE_CREDIT: u64 = 900;

/// Blocks after genesis during which the bootstrap id list is authoritative.
pub const BOOTSTRAP_WINDOW: u64 = 1800;

/// Gas price used when the oracle cannot suggest one.
pub const DEFAULT_GAS_PRICE: u128 = 20_000_000_000;

/// Per-network values the masternode layer needs from chain configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkParams {
    /// Chain id bound into every ping signature.
    pub chain_id: u64,
    /// Address of the masternode registry contract.
    pub registry_address: Address,
    /// Block number of the genesis block.
    pub genesis_block: u64,
    /// Masternode ids treated as active until the bootstrap window ends.
    pub bootstrap_ids: Vec<String>,
}

impl NetworkParams {
    /// First block at which registry membership replaces the bootstrap list.
    pub fn bootstrap_cutoff(&self) -> u64 {
        self.genesis_block.saturating_add(BOOTSTRAP_WINDOW)
    }
}

impl Default for NetworkParams {
    fn default() -> Self {
        let mut registry = [0u8; 20];
        registry[18] = 0x10;
        Self {
            chain_id: 1337,
            registry_address: Address::new(registry),
            genesis_block: 0,
            bootstrap_ids: Vec::new(),
        }
    }
}
