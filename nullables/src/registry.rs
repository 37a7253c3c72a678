//! Nullable registry: an in-memory linked list of masternodes.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use vigil_registry::{NodeInfo, RegistryBinding, RegistryError, Subscription, SubscriptionSender};
use vigil_types::{Address, CallRequest, NodeId, ShortId};

const SUBSCRIPTION_CAPACITY: usize = 16;

/// An in-memory registry.
///
/// Entries appended with [`push`](Self::push) are linked like the on-chain
/// list: each new entry points back at the previous tail. Block numbers are
/// ignored; every read sees the current contents.
pub struct NullRegistry {
    entries: Mutex<Vec<NodeInfo>>,
    members: Mutex<HashSet<ShortId>>,
    governance: Mutex<Address>,
    gas_estimate: Mutex<Result<u64, RegistryError>>,
    failing_reads: Mutex<HashSet<ShortId>>,
    fail_last_id: Mutex<Option<RegistryError>>,
    fail_watch: Mutex<Option<RegistryError>>,
    join: tokio::sync::Mutex<Option<SubscriptionSender<ShortId>>>,
    quit: tokio::sync::Mutex<Option<SubscriptionSender<ShortId>>>,
    estimates: Mutex<Vec<CallRequest>>,
    has_calls: AtomicUsize,
    node_reads: AtomicUsize,
    hang_membership: AtomicBool,
}

impl NullRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            members: Mutex::new(HashSet::new()),
            governance: Mutex::new(Address::ZERO),
            gas_estimate: Mutex::new(Ok(21_000)),
            failing_reads: Mutex::new(HashSet::new()),
            fail_last_id: Mutex::new(None),
            fail_watch: Mutex::new(None),
            join: tokio::sync::Mutex::new(None),
            quit: tokio::sync::Mutex::new(None),
            estimates: Mutex::new(Vec::new()),
            has_calls: AtomicUsize::new(0),
            node_reads: AtomicUsize::new(0),
            hang_membership: AtomicBool::new(false),
        }
    }

    /// Append a node as the new tail and return its short id.
    pub fn push(
        &self,
        node_id: NodeId,
        account: Address,
        online_credit: u64,
        last_ping_block: u64,
    ) -> ShortId {
        let mut id1 = [0u8; 32];
        let mut id2 = [0u8; 32];
        id1.copy_from_slice(node_id.x());
        id2.copy_from_slice(node_id.y());
        let short = node_id.short_id();

        let mut entries = lock(&self.entries);
        let prev = entries.last().map(short_id_of).unwrap_or(ShortId::ZERO);
        if let Some(tail) = entries.last_mut() {
            tail.next = short;
        }
        entries.push(NodeInfo {
            id1,
            id2,
            account,
            origin_block: 0,
            online_credit,
            last_ping_block,
            prev,
            next: ShortId::ZERO,
        });
        short
    }

    /// Point `id`'s entry back at `prev`, replacing the link set by `push`.
    pub fn relink(&self, id: ShortId, prev: ShortId) {
        if let Some(info) = lock(&self.entries).iter_mut().find(|info| short_id_of(info) == id) {
            info.prev = prev;
        }
    }

    /// Make membership checks never complete.
    pub fn hang_membership(&self) {
        self.hang_membership.store(true, Ordering::SeqCst);
    }

    /// Make `has(id)` answer `registered`.
    pub fn set_member(&self, id: ShortId, registered: bool) {
        let mut members = lock(&self.members);
        if registered {
            members.insert(id);
        } else {
            members.remove(&id);
        }
    }

    pub fn set_governance(&self, address: Address) {
        *lock(&self.governance) = address;
    }

    pub fn set_gas_estimate(&self, estimate: Result<u64, RegistryError>) {
        *lock(&self.gas_estimate) = estimate;
    }

    /// Make every read of `id`'s entry fail.
    pub fn fail_reads_of(&self, id: ShortId) {
        lock(&self.failing_reads).insert(id);
    }

    pub fn fail_last_id(&self, err: RegistryError) {
        *lock(&self.fail_last_id) = Some(err);
    }

    /// Make the next subscription attempts fail with `err`.
    pub fn fail_watch(&self, err: RegistryError) {
        *lock(&self.fail_watch) = Some(err);
    }

    /// Deliver a join notification. Returns `false` if nobody is subscribed.
    pub async fn emit_join(&self, id: ShortId) -> bool {
        match self.join.lock().await.as_ref() {
            Some(tx) => tx.send(id).await,
            None => false,
        }
    }

    pub async fn emit_quit(&self, id: ShortId) -> bool {
        match self.quit.lock().await.as_ref() {
            Some(tx) => tx.send(id).await,
            None => false,
        }
    }

    /// Report a failure on the join subscription.
    pub async fn break_join(&self, err: RegistryError) {
        if let Some(tx) = self.join.lock().await.as_mut() {
            tx.fail(err);
        }
    }

    pub async fn break_quit(&self, err: RegistryError) {
        if let Some(tx) = self.quit.lock().await.as_mut() {
            tx.fail(err);
        }
    }

    /// Whether a live join subscriber exists.
    pub async fn join_subscribed(&self) -> bool {
        self.join.lock().await.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    pub async fn quit_subscribed(&self) -> bool {
        self.quit.lock().await.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Gas estimation requests seen so far.
    pub fn estimates(&self) -> Vec<CallRequest> {
        lock(&self.estimates).clone()
    }

    pub fn has_calls(&self) -> usize {
        self.has_calls.load(Ordering::SeqCst)
    }

    pub fn node_reads(&self) -> usize {
        self.node_reads.load(Ordering::SeqCst)
    }
}

impl Default for NullRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryBinding for NullRegistry {
    async fn has(&self, id: ShortId) -> Result<bool, RegistryError> {
        self.has_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_membership.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(lock(&self.members).contains(&id))
    }

    async fn last_id(&self, _block: u64) -> Result<ShortId, RegistryError> {
        if let Some(err) = lock(&self.fail_last_id).clone() {
            return Err(err);
        }
        Ok(lock(&self.entries)
            .last()
            .map(short_id_of)
            .unwrap_or(ShortId::ZERO))
    }

    async fn node_info(&self, id: ShortId, _block: u64) -> Result<NodeInfo, RegistryError> {
        self.node_reads.fetch_add(1, Ordering::SeqCst);
        if lock(&self.failing_reads).contains(&id) {
            return Err(RegistryError::call("getNode", format!("read of {id} failed")));
        }
        lock(&self.entries)
            .iter()
            .find(|info| short_id_of(info) == id)
            .cloned()
            .ok_or_else(|| RegistryError::call("getNode", format!("no entry {id}")))
    }

    async fn governance_address(&self, _block: u64) -> Result<Address, RegistryError> {
        Ok(*lock(&self.governance))
    }

    async fn watch_join(&self) -> Result<Subscription<ShortId>, RegistryError> {
        if let Some(err) = lock(&self.fail_watch).clone() {
            return Err(err);
        }
        let (tx, sub) = Subscription::channel(SUBSCRIPTION_CAPACITY);
        *self.join.lock().await = Some(tx);
        Ok(sub)
    }

    async fn watch_quit(&self) -> Result<Subscription<ShortId>, RegistryError> {
        if let Some(err) = lock(&self.fail_watch).clone() {
            return Err(err);
        }
        let (tx, sub) = Subscription::channel(SUBSCRIPTION_CAPACITY);
        *self.quit.lock().await = Some(tx);
        Ok(sub)
    }

    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, RegistryError> {
        lock(&self.estimates).push(call.clone());
        lock(&self.gas_estimate).clone()
    }
}

fn short_id_of(info: &NodeInfo) -> ShortId {
    let mut short = [0u8; 8];
    short.copy_from_slice(&info.id1[..8]);
    ShortId(short)
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_id(seed: u8) -> NodeId {
        NodeId([seed; 64])
    }

    #[tokio::test]
    async fn push_links_entries_backwards() {
        let registry = NullRegistry::new();
        let a = registry.push(node_id(1), Address::ZERO, 900, 0);
        let b = registry.push(node_id(2), Address::ZERO, 900, 0);

        assert_eq!(registry.last_id(0).await.unwrap(), b);
        let tail = registry.node_info(b, 0).await.unwrap();
        assert_eq!(tail.prev, a);
        let head = registry.node_info(a, 0).await.unwrap();
        assert!(head.prev.is_zero());
        assert_eq!(head.next, b);
    }

    #[tokio::test]
    async fn empty_registry_has_zero_tail() {
        let registry = NullRegistry::new();
        assert!(registry.last_id(0).await.unwrap().is_zero());
    }

    #[tokio::test]
    async fn membership_is_programmable() {
        let registry = NullRegistry::new();
        let id = node_id(3).short_id();
        assert!(!registry.has(id).await.unwrap());
        registry.set_member(id, true);
        assert!(registry.has(id).await.unwrap());
        assert_eq!(registry.has_calls(), 2);
    }

    #[tokio::test]
    async fn emits_to_subscriber() {
        let registry = NullRegistry::new();
        assert!(!registry.emit_join(ShortId([1; 8])).await);
        let mut sub = registry.watch_join().await.unwrap();
        assert!(registry.emit_join(ShortId([1; 8])).await);
        assert_eq!(
            sub.next().await,
            vigil_registry::Notification::Event(ShortId([1; 8]))
        );
    }
}
