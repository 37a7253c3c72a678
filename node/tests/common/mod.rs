//! Shared wiring for the manager tests: a manager over nullable
//! collaborators with a funded, registered-ready local account.

#![allow(dead_code)]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use vigil_nullables::{NullChainState, NullDriftMonitor, NullGasOracle, NullRegistry, NullTxPool};
use vigil_node::{Collaborators, MasternodeConfig, MasternodeManager, ServerIdentity, SyncEventBus};
use vigil_types::params::MIN_STAKE;
use vigil_types::{Address, NetworkParams, NodeId, PrivateKey, ShortId};

pub const KEY: [u8; 32] = [0x42; 32];
pub const HEAD: u64 = 90_000;
pub const GAS_PRICE: u128 = 30_000_000_000;
pub const GAS: u64 = 25_000;
pub const CHAIN_ID: u64 = 1337;

pub struct Harness {
    pub registry: Arc<NullRegistry>,
    pub chain: Arc<NullChainState>,
    pub gas_oracle: Arc<NullGasOracle>,
    pub tx_pool: Arc<NullTxPool>,
    pub drift: Arc<NullDriftMonitor>,
    pub sync_events: SyncEventBus,
    pub manager: MasternodeManager,
    pub node_id: NodeId,
    pub short_id: ShortId,
    pub account: Address,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(MasternodeConfig::default())
    }

    pub fn with_config(config: MasternodeConfig) -> Self {
        let registry = Arc::new(NullRegistry::new());
        let chain = Arc::new(NullChainState::new(HEAD));
        let gas_oracle = Arc::new(NullGasOracle::new(GAS_PRICE));
        let tx_pool = Arc::new(NullTxPool::new());
        let drift = Arc::new(NullDriftMonitor::default());
        registry.set_gas_estimate(Ok(GAS));

        let config = config.with_network(NetworkParams {
            chain_id: CHAIN_ID,
            ..NetworkParams::default()
        });
        let manager = MasternodeManager::new(
            config,
            Collaborators {
                registry: registry.clone(),
                chain: chain.clone(),
                gas_oracle: gas_oracle.clone(),
                tx_pool: tx_pool.clone(),
                drift_monitor: drift.clone(),
            },
        );

        let node_id = vigil_crypto::node_id_from_private(&PrivateKey(KEY)).unwrap();
        let account = vigil_crypto::address_from_private(&PrivateKey(KEY)).unwrap();
        Self {
            registry,
            chain,
            gas_oracle,
            tx_pool,
            drift,
            sync_events: SyncEventBus::default(),
            manager,
            node_id,
            short_id: node_id.short_id(),
            account,
        }
    }

    /// Registered, staked and with power to spare.
    pub fn eligible(self) -> Self {
        self.registry.set_member(self.short_id, true);
        self.chain.set_balance(self.account, 100 * MIN_STAKE);
        self.chain.set_power(self.account, u128::from(GAS) * GAS_PRICE * 10);
        self
    }

    pub fn start(&self) {
        let identity = ServerIdentity::from_private_key(PrivateKey(KEY)).unwrap();
        self.manager.start(identity, &self.sync_events).unwrap();
    }

    pub fn required_power(&self) -> u128 {
        u128::from(GAS) * GAS_PRICE
    }
}

/// Poll `check` until it holds, failing the test after a generous bound.
pub async fn eventually<F, Fut>(what: &str, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}
