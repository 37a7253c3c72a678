//! The masternode manager: local identity, status flags and the ping protocol.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::Instrument;
use vigil_chain::{ChainState, GasPriceOracle, TxPool};
use vigil_network::DriftMonitor;
use vigil_registry::{registration_call_data, RegistryBinding, RegistryClient, RegistryError, TraversalError};
use vigil_types::params::MIN_STAKE;
use vigil_types::{Address, NodeId, PrivateKey, ShortId, Signature, Transaction, TxHash};

use crate::config::MasternodeConfig;
use crate::heartbeat;
use crate::metrics::MasternodeMetrics;
use crate::shutdown::ShutdownController;
use crate::sync_event::SyncEventBus;
use crate::tracing_spans::{heartbeat_span, masternode_list_span};
use crate::NodeError;

/// The identity the peer-to-peer server runs under.
pub struct ServerIdentity {
    /// Packed public key advertised to peers.
    pub node_id: NodeId,
    pub private_key: PrivateKey,
}

impl ServerIdentity {
    pub fn from_private_key(private_key: PrivateKey) -> Result<Self, NodeError> {
        let node_id = vigil_crypto::node_id_from_private(&private_key)?;
        Ok(Self {
            node_id,
            private_key,
        })
    }
}

/// External services the manager reads from and submits to.
pub struct Collaborators {
    pub registry: Arc<dyn RegistryBinding>,
    pub chain: Arc<dyn ChainState>,
    pub gas_oracle: Arc<dyn GasPriceOracle>,
    pub tx_pool: Arc<dyn TxPool>,
    pub drift_monitor: Arc<dyn DriftMonitor>,
}

/// Snapshot of the two status flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MasternodeStatus {
    pub registered: bool,
    pub syncing: bool,
}

/// Why a ping tick did not send anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// `start` has not been called yet.
    NotStarted,
    NotMasternode,
    Syncing,
    InsufficientBalance { balance: u128 },
    InsufficientPower { power: u128, required: u128 },
}

impl SkipReason {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::NotStarted => "not_started",
            SkipReason::NotMasternode => "not_masternode",
            SkipReason::Syncing => "syncing",
            SkipReason::InsufficientBalance { .. } => "insufficient_balance",
            SkipReason::InsufficientPower { .. } => "insufficient_power",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotStarted => write!(f, "manager not started"),
            SkipReason::NotMasternode => write!(f, "not a masternode"),
            SkipReason::Syncing => write!(f, "chain is syncing"),
            SkipReason::InsufficientBalance { balance } => {
                write!(f, "balance {balance} below minimum stake {MIN_STAKE}")
            }
            SkipReason::InsufficientPower { power, required } => {
                write!(f, "power {power} below required {required}")
            }
        }
    }
}

/// What one ping tick did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PingOutcome {
    Sent { hash: TxHash, nonce: u64 },
    Skipped(SkipReason),
    /// A collaborator failed; the tick was abandoned.
    Failed(String),
}

struct LocalIdentity {
    summary: LocalSummary,
    private_key: PrivateKey,
}

/// The non-secret part of the local identity.
#[derive(Clone, Debug)]
pub(crate) struct LocalSummary {
    pub(crate) id: String,
    pub(crate) short_id: ShortId,
    pub(crate) node_id: NodeId,
    pub(crate) account: Address,
}

/// State shared between the manager handle and its background tasks.
pub(crate) struct Shared {
    pub(crate) config: MasternodeConfig,
    pub(crate) registry: RegistryClient,
    chain: Arc<dyn ChainState>,
    gas_oracle: Arc<dyn GasPriceOracle>,
    tx_pool: Arc<dyn TxPool>,
    pub(crate) drift_monitor: Arc<dyn DriftMonitor>,
    identity: RwLock<Option<LocalIdentity>>,
    registered: AtomicBool,
    syncing: AtomicBool,
    pub(crate) metrics: MasternodeMetrics,
}

impl Shared {
    pub(crate) fn local(&self) -> Option<LocalSummary> {
        self.identity
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(|identity| identity.summary.clone())
    }

    /// Run `f` with the local key. The lock is released before returning.
    fn with_key<R>(&self, f: impl FnOnce(&PrivateKey) -> R) -> Option<R> {
        self.identity
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(|identity| f(&identity.private_key))
    }

    pub(crate) fn is_registered(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }

    pub(crate) fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }

    pub(crate) fn set_registered(&self, registered: bool) {
        let was = self.registered.swap(registered, Ordering::SeqCst);
        self.metrics.is_masternode.set(registered as i64);
        match (was, registered) {
            (false, true) => tracing::info!("became a masternode"),
            (true, false) => tracing::info!("no longer a masternode"),
            _ => {}
        }
    }

    pub(crate) fn set_syncing(&self, syncing: bool) {
        self.syncing.store(syncing, Ordering::SeqCst);
        self.metrics.is_syncing.set(syncing as i64);
    }

    pub(crate) fn registration_payload(&self) -> Option<String> {
        self.local().map(|local| registration_call_data(&local.node_id))
    }

    pub(crate) async fn ping_tick(&self) -> PingOutcome {
        let started = Instant::now();
        let outcome = self.try_ping().await;
        self.metrics
            .ping_tick_ms
            .observe(started.elapsed().as_secs_f64() * 1000.0);
        match &outcome {
            PingOutcome::Sent { .. } => self.metrics.pings_sent.inc(),
            PingOutcome::Skipped(reason) => self.metrics.skipped(reason.label()),
            PingOutcome::Failed(_) => self.metrics.ping_failures.inc(),
        }
        outcome
    }

    async fn try_ping(&self) -> PingOutcome {
        let Some(local) = self.local() else {
            return PingOutcome::Skipped(SkipReason::NotStarted);
        };

        // the cached flag may lag a join notification; ask the registry
        if !self.is_registered() {
            match self.registry.has(local.short_id).await {
                Ok(true) => self.set_registered(true),
                Ok(false) => {
                    tracing::debug!("not a masternode, skipping ping");
                    return PingOutcome::Skipped(SkipReason::NotMasternode);
                }
                Err(e) => return failed("membership check", e),
            }
        }

        if self.is_syncing() {
            tracing::info!("chain is syncing, skipping ping");
            return PingOutcome::Skipped(SkipReason::Syncing);
        }

        let balance = match self.chain.balance_of(local.account).await {
            Ok(balance) => balance,
            Err(e) => return failed("balance read", e),
        };
        if balance < MIN_STAKE {
            tracing::info!(balance, min_stake = MIN_STAKE, "balance below minimum stake, skipping ping");
            return PingOutcome::Skipped(SkipReason::InsufficientBalance { balance });
        }

        let gas_price = match self.gas_oracle.suggest_price().await {
            Ok(price) => price,
            Err(e) => {
                let fallback = u128::from(self.config.default_gas_price);
                tracing::warn!(error = %e, gas_price = fallback, "gas price oracle failed, using default");
                fallback
            }
        };

        let gas = match self.registry.estimate_ping_gas(local.account).await {
            Ok(gas) => gas,
            Err(e) => return failed("gas estimation", e),
        };
        let required = u128::from(gas).saturating_mul(gas_price);

        let block = match self.chain.current_block_number().await {
            Ok(block) => block,
            Err(e) => return failed("block number read", e),
        };
        let power = match self.chain.power_of(local.account, block).await {
            Ok(power) => power,
            Err(e) => return failed("power read", e),
        };
        if power < required {
            tracing::info!(power, required, block, "insufficient power for ping");
            return PingOutcome::Skipped(SkipReason::InsufficientPower { power, required });
        }

        let nonce = match self.tx_pool.nonce_of(local.account).await {
            Ok(nonce) => nonce,
            Err(e) => return failed("nonce read", e),
        };
        let params = self.registry.params();
        let tx = Transaction::ping(nonce, params.registry_address, gas, gas_price);
        let signed = match self.with_key(|key| vigil_crypto::sign_transaction(tx, params.chain_id, key)) {
            Some(Ok(signed)) => signed,
            Some(Err(e)) => return failed("signing", e),
            None => return PingOutcome::Skipped(SkipReason::NotStarted),
        };

        let hash = signed.hash;
        match self.tx_pool.submit(signed).await {
            Ok(()) => {
                tracing::info!(%hash, nonce, gas, gas_price, block, "sent masternode ping");
                PingOutcome::Sent { hash, nonce }
            }
            Err(e) => failed("submission", e),
        }
    }
}

fn failed(step: &str, err: impl fmt::Display) -> PingOutcome {
    tracing::warn!(step, error = %err, "ping tick abandoned");
    PingOutcome::Failed(format!("{step}: {err}"))
}

/// Tracks whether the local node is a masternode and keeps it alive on the
/// registry.
///
/// Construct with [`new`](Self::new), then [`start`](Self::start) once the
/// local identity is known. `start` spawns the heartbeat loop and the sync
/// watcher on the current tokio runtime; [`stop`](Self::stop) cancels both
/// and waits for them.
pub struct MasternodeManager {
    shared: Arc<Shared>,
    shutdown: ShutdownController,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl MasternodeManager {
    pub fn new(config: MasternodeConfig, collaborators: Collaborators) -> Self {
        let registry = RegistryClient::new(collaborators.registry, config.network.clone());
        Self {
            shared: Arc::new(Shared {
                config,
                registry,
                chain: collaborators.chain,
                gas_oracle: collaborators.gas_oracle,
                tx_pool: collaborators.tx_pool,
                drift_monitor: collaborators.drift_monitor,
                identity: RwLock::new(None),
                registered: AtomicBool::new(false),
                syncing: AtomicBool::new(false),
                metrics: MasternodeMetrics::new(),
            }),
            shutdown: ShutdownController::new(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Adopt the local identity and launch the background tasks.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, identity: ServerIdentity, sync_events: &SyncEventBus) -> Result<(), NodeError> {
        let summary = {
            let mut slot = self
                .shared
                .identity
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if slot.is_some() {
                return Err(NodeError::AlreadyStarted);
            }
            let account = vigil_crypto::address_from_private(&identity.private_key)?;
            let short_id = identity.node_id.short_id();
            let summary = LocalSummary {
                id: short_id.to_hex(),
                short_id,
                node_id: identity.node_id,
                account,
            };
            *slot = Some(LocalIdentity {
                summary: summary.clone(),
                private_key: identity.private_key,
            });
            summary
        };
        tracing::info!(id = %summary.id, account = %summary.account, "starting masternode manager");

        let heartbeat = tokio::spawn(
            heartbeat::run(Arc::clone(&self.shared), self.shutdown.subscribe())
                .instrument(heartbeat_span(&summary.id)),
        );
        let watcher = tokio::spawn(heartbeat::watch_sync(
            Arc::clone(&self.shared),
            sync_events.subscribe(),
            self.shutdown.subscribe(),
        ));
        self.tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend([heartbeat, watcher]);
        Ok(())
    }

    /// Cancel the background tasks and wait for them to exit.
    ///
    /// Tasks still running after `shutdown_timeout_secs` are aborted and
    /// [`NodeError::ShutdownTimeout`] is returned.
    pub async fn stop(&self) -> Result<(), NodeError> {
        self.shutdown.shutdown();
        let mut tasks = std::mem::take(
            &mut *self
                .tasks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        let join_all = async {
            for task in tasks.iter_mut() {
                if let Err(e) = task.await {
                    tracing::error!(error = %e, "masternode task panicked");
                }
            }
        };
        let joined = tokio::time::timeout(self.shared.config.shutdown_timeout(), join_all).await;
        if joined.is_err() {
            tracing::warn!("masternode tasks did not stop in time, aborting them");
            for task in &tasks {
                task.abort();
            }
            return Err(NodeError::ShutdownTimeout);
        }
        Ok(())
    }

    /// Sign `hash` with the local key on behalf of masternode `id`.
    ///
    /// Only the local masternode can sign; any other id is rejected. The
    /// signature is laid out as R ‖ S ‖ V with V in {0, 1}.
    pub fn sign_hash(&self, id: &str, hash: &[u8]) -> Result<Signature, NodeError> {
        let identity = self
            .shared
            .identity
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match identity.as_ref() {
            Some(local) if local.summary.id == id => {
                Ok(vigil_crypto::sign_hash(hash, &local.private_key)?)
            }
            _ => Err(NodeError::UnknownMasternode(id.to_string())),
        }
    }

    /// Ids of the masternodes active at `block` (earliest when `None`).
    pub async fn masternode_list(&self, block: Option<u64>) -> Result<Vec<String>, TraversalError> {
        self.shared
            .registry
            .get_ids_by_block_number(block)
            .instrument(masternode_list_span(block))
            .await
    }

    pub async fn get_governance_contract_address(
        &self,
        block: Option<u64>,
    ) -> Result<Address, RegistryError> {
        self.shared.registry.get_governance_address(block).await
    }

    pub fn status(&self) -> MasternodeStatus {
        MasternodeStatus {
            registered: self.shared.is_registered(),
            syncing: self.shared.is_syncing(),
        }
    }

    /// Printable id of the local masternode, once started.
    pub fn local_id(&self) -> Option<String> {
        self.shared.local().map(|local| local.id)
    }

    pub fn local_account(&self) -> Option<Address> {
        self.shared.local().map(|local| local.account)
    }

    /// Call data that registers the local node, once started.
    pub fn registration_call_data(&self) -> Option<String> {
        self.shared.registration_payload()
    }

    /// Run one ping tick now, outside the timer.
    pub async fn ping_tick(&self) -> PingOutcome {
        self.shared.ping_tick().await
    }

    pub fn metrics(&self) -> &MasternodeMetrics {
        &self.shared.metrics
    }
}

impl Drop for MasternodeManager {
    fn drop(&mut self) {
        self.shutdown.shutdown();
    }
}
