//! Namenode context: the process-wide singletons
//!
//! Owns the transactional store, the clock, and the inode ID generator,
//! plus the lifecycle of the ticker that advances the generator's timestamp
//! prefix. Initialized once at startup and torn down at shutdown; there is
//! no other process-wide mutable state.

use std::sync::{Arc, Mutex};

use rocketfs_concurrency::TxnStore;
use rocketfs_core::{Clock, Config, InodeIdGen, Result, SystemClock, TickerHandle};
use rocketfs_storage::RedbKvStore;
use tracing::info;

/// Shared state behind every request handler
pub struct NameNodeContext {
    config: Config,
    store: TxnStore,
    clock: Arc<dyn Clock>,
    id_gen: Arc<InodeIdGen>,
    ticker: Mutex<Option<TickerHandle>>,
}

impl NameNodeContext {
    /// Open the store and start the background ticker, using the system
    /// clock
    pub fn start(config: Config) -> Result<Arc<Self>> {
        Self::start_with_clock(config, Arc::new(SystemClock))
    }

    /// Open the store and start the background ticker with an explicit
    /// clock (tests pin time through this)
    pub fn start_with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Arc<Self>> {
        let kv = Arc::new(RedbKvStore::open(&config.kv_store_db_path)?);
        let id_gen = Arc::new(InodeIdGen::new(
            InodeIdGen::epoch_secs_now(clock.as_ref()),
            config.node_id,
            0,
        ));
        let ticker = TickerHandle::spawn(Arc::clone(&id_gen), Arc::clone(&clock));
        info!(node_id = config.node_id, "namenode context started");
        Ok(Arc::new(NameNodeContext {
            config,
            store: TxnStore::new(kv),
            clock,
            id_gen,
            ticker: Mutex::new(Some(ticker)),
        }))
    }

    /// Stop the background ticker; idempotent
    pub fn stop(&self) {
        let handle = self
            .ticker
            .lock()
            .expect("ticker mutex poisoned")
            .take();
        if let Some(handle) = handle {
            handle.stop();
            info!("namenode context stopped");
        }
    }

    /// Process configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The transactional metadata store
    pub fn store(&self) -> &TxnStore {
        &self.store
    }

    /// The wall clock
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// The inode ID generator
    pub fn id_gen(&self) -> &InodeIdGen {
        &self.id_gen
    }
}

impl Drop for NameNodeContext {
    fn drop(&mut self) {
        self.stop();
    }
}
