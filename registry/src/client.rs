//! The registry read path: membership, active-list enumeration, governance.

use std::sync::Arc;

use tracing::Instrument;
use vigil_types::{Address, CallRequest, NetworkParams, ShortId};

use crate::binding::{RegistryBinding, Subscription};
use crate::error::{RegistryError, TraversalError};
use crate::walk::RegistryWalk;

/// Read access to the masternode registry for one network.
pub struct RegistryClient {
    binding: Arc<dyn RegistryBinding>,
    params: NetworkParams,
}

impl RegistryClient {
    pub fn new(binding: Arc<dyn RegistryBinding>, params: NetworkParams) -> Self {
        Self { binding, params }
    }

    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    /// Whether `id` is registered at the latest block.
    pub async fn has(&self, id: ShortId) -> Result<bool, RegistryError> {
        self.binding.has(id).await
    }

    /// Start a fresh backward walk at `block`.
    pub fn walk(&self, block: u64) -> RegistryWalk {
        RegistryWalk::new(Arc::clone(&self.binding), block)
    }

    /// Ids of the masternodes active at `block`, newest first.
    ///
    /// Before the bootstrap cutoff the configured bootstrap list is returned
    /// verbatim. Afterwards the registry is walked from its tail; entries with
    /// a stale last ping, too little online credit or an off-curve identifier
    /// are skipped. A failed read stops the walk and the ids gathered so far
    /// come back inside the error.
    pub async fn get_ids_by_block_number(
        &self,
        block: Option<u64>,
    ) -> Result<Vec<String>, TraversalError> {
        let block = block.unwrap_or(0);
        if block < self.params.bootstrap_cutoff() {
            return Ok(self.params.bootstrap_ids.clone());
        }

        self.collect_active(block)
            .instrument(tracing::debug_span!("registry_walk", block))
            .await
    }

    async fn collect_active(&self, block: u64) -> Result<Vec<String>, TraversalError> {
        let mut walk = self.walk(block);
        let mut ids = Vec::new();
        while let Some(step) = walk.next().await {
            let ctx = match step {
                Ok(ctx) => ctx,
                Err(source) => {
                    tracing::error!(block, collected = ids.len(), error = %source, "registry walk aborted");
                    return Err(TraversalError { partial: ids, source });
                }
            };
            match ctx.node {
                Some(node) if node.is_active_at(block) => ids.push(node.id),
                Some(node) => {
                    tracing::trace!(id = %node.id, last_ping = node.last_ping_block, credit = node.online_credit, "skipping inactive masternode");
                }
                None => {
                    tracing::warn!(prev = %ctx.prev, "skipping registry entry with off-curve identifier");
                }
            }
        }
        Ok(ids)
    }

    /// Governance contract address at `block` (zero when `None`).
    pub async fn get_governance_address(&self, block: Option<u64>) -> Result<Address, RegistryError> {
        self.binding.governance_address(block.unwrap_or(0)).await
    }

    pub async fn watch_join(&self) -> Result<Subscription<ShortId>, RegistryError> {
        self.binding.watch_join().await
    }

    pub async fn watch_quit(&self) -> Result<Subscription<ShortId>, RegistryError> {
        self.binding.watch_quit().await
    }

    /// Gas for a ping from `from`: an empty call to the registry.
    pub async fn estimate_ping_gas(&self, from: Address) -> Result<u64, RegistryError> {
        let call = CallRequest {
            from,
            to: Some(self.params.registry_address),
            data: Vec::new(),
        };
        self.binding.estimate_gas(&call).await
    }
}
