//! Nullable chain collaborators: account state, gas price, transaction pool.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use vigil_chain::{ChainError, ChainState, GasPriceOracle, TxPool};
use vigil_types::{Address, SignedTransaction};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Programmed balances and power values at a settable head block.
///
/// Power is stored per account, not recomputed from the block; tests set the
/// value they want the manager to see.
pub struct NullChainState {
    balances: Mutex<HashMap<Address, u128>>,
    powers: Mutex<HashMap<Address, u128>>,
    block: AtomicU64,
    failure: Mutex<Option<ChainError>>,
    power_queries: Mutex<Vec<(Address, u64)>>,
    hang: AtomicBool,
    balance_reads: AtomicU64,
}

impl NullChainState {
    pub fn new(block: u64) -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            powers: Mutex::new(HashMap::new()),
            block: AtomicU64::new(block),
            failure: Mutex::new(None),
            power_queries: Mutex::new(Vec::new()),
            hang: AtomicBool::new(false),
            balance_reads: AtomicU64::new(0),
        }
    }

    pub fn set_balance(&self, address: Address, balance: u128) {
        lock(&self.balances).insert(address, balance);
    }

    pub fn set_power(&self, address: Address, power: u128) {
        lock(&self.powers).insert(address, power);
    }

    pub fn set_block(&self, block: u64) {
        self.block.store(block, Ordering::SeqCst);
    }

    /// Make every read fail with `err`; `None` restores normal reads.
    pub fn set_failure(&self, err: Option<ChainError>) {
        *lock(&self.failure) = err;
    }

    /// Make balance reads never complete.
    pub fn hang_balance_reads(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    pub fn balance_reads(&self) -> u64 {
        self.balance_reads.load(Ordering::SeqCst)
    }

    /// `(address, block)` of every power read so far.
    pub fn power_queries(&self) -> Vec<(Address, u64)> {
        lock(&self.power_queries).clone()
    }

    fn check(&self) -> Result<(), ChainError> {
        match lock(&self.failure).clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ChainState for NullChainState {
    async fn balance_of(&self, address: Address) -> Result<u128, ChainError> {
        self.balance_reads.fetch_add(1, Ordering::SeqCst);
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.check()?;
        Ok(lock(&self.balances).get(&address).copied().unwrap_or(0))
    }

    async fn power_of(&self, address: Address, block: u64) -> Result<u128, ChainError> {
        self.check()?;
        lock(&self.power_queries).push((address, block));
        Ok(lock(&self.powers).get(&address).copied().unwrap_or(0))
    }

    async fn current_block_number(&self) -> Result<u64, ChainError> {
        self.check()?;
        Ok(self.block.load(Ordering::SeqCst))
    }
}

/// Gas-price oracle returning a programmed price or error.
pub struct NullGasOracle {
    price: Mutex<Result<u128, ChainError>>,
    delay: Mutex<Duration>,
}

impl NullGasOracle {
    pub fn new(price: u128) -> Self {
        Self::answering(Ok(price))
    }

    pub fn failing(reason: &str) -> Self {
        Self::answering(Err(ChainError::GasPrice(reason.to_string())))
    }

    fn answering(price: Result<u128, ChainError>) -> Self {
        Self {
            price: Mutex::new(price),
            delay: Mutex::new(Duration::ZERO),
        }
    }

    pub fn set_price(&self, price: Result<u128, ChainError>) {
        *lock(&self.price) = price;
    }

    /// Answer only after `delay` of tokio time.
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = delay;
    }
}

#[async_trait]
impl GasPriceOracle for NullGasOracle {
    async fn suggest_price(&self) -> Result<u128, ChainError> {
        let delay = *lock(&self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        lock(&self.price).clone()
    }
}

/// Transaction pool that records submissions instead of relaying them.
///
/// Each accepted submission bumps the sender's nonce.
pub struct NullTxPool {
    nonces: Mutex<HashMap<Address, u64>>,
    submitted: Mutex<Vec<SignedTransaction>>,
    rejection: Mutex<Option<ChainError>>,
}

impl NullTxPool {
    pub fn new() -> Self {
        Self {
            nonces: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            rejection: Mutex::new(None),
        }
    }

    pub fn set_nonce(&self, address: Address, nonce: u64) {
        lock(&self.nonces).insert(address, nonce);
    }

    /// Reject every submission with `err`; `None` accepts again.
    pub fn set_rejection(&self, err: Option<ChainError>) {
        *lock(&self.rejection) = err;
    }

    pub fn submitted(&self) -> Vec<SignedTransaction> {
        lock(&self.submitted).clone()
    }
}

impl Default for NullTxPool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TxPool for NullTxPool {
    async fn nonce_of(&self, address: Address) -> Result<u64, ChainError> {
        Ok(lock(&self.nonces).get(&address).copied().unwrap_or(0))
    }

    async fn submit(&self, tx: SignedTransaction) -> Result<(), ChainError> {
        if let Some(err) = lock(&self.rejection).clone() {
            return Err(err);
        }
        *lock(&self.nonces).entry(tx.from).or_insert(0) += 1;
        lock(&self.submitted).push(tx);
        Ok(())
    }
}
