//! Cache Store Module
//!
//! The expiring cache: a locked HashMap of entries, a two-phase
//! stale/evictable policy, and the background sweep that goes with it.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::cache::entry::CacheEntry;
use crate::cache::stats::{CacheStats, StatsCounters};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_sweep_task, SweepHandle, Sweepable};

// == Lookup ==
/// State of a key at one instant, as seen by a read.
enum Lookup<V> {
    Absent,
    Fresh(V),
    Stale(V),
    /// Past grace; carries the value only once it has been removed
    Evictable(Option<V>),
}

// == Entry Store ==
/// Shared state behind an [`ExpiringCache`].
///
/// The sweep task only ever holds a `Weak` to this, so it cannot keep the
/// store alive past its owning cache.
pub(crate) struct EntryStore<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    expiration: Duration,
    eviction_grace: Duration,
    stats: StatsCounters,
    /// Set under the write lock when the owning cache is dropped
    closed: AtomicBool,
}

impl<K, V> EntryStore<K, V> {
    fn new(expiration: Duration, eviction_grace: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            expiration,
            eviction_grace,
            stats: StatsCounters::default(),
            closed: AtomicBool::new(false),
        }
    }

    // A panic while holding the lock cannot leave an entry half-written:
    // every mutation is a single HashMap call. Recover the guard.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks the store closed. Waits for an in-flight sweep to release the lock.
    fn close(&self) {
        let _entries = self.write();
        self.closed.store(true, Ordering::Release);
    }
}

impl<K, V> EntryStore<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn classify(&self, entry: &CacheEntry<V>, now: Instant) -> Lookup<V> {
        if entry.is_evictable(now, self.eviction_grace) {
            Lookup::Evictable(None)
        } else if entry.is_expired(now) {
            Lookup::Stale(entry.value.clone())
        } else {
            Lookup::Fresh(entry.value.clone())
        }
    }

    fn peek<Q>(&self, key: &Q, now: Instant) -> Lookup<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.read().get(key) {
            Some(entry) => self.classify(entry, now),
            None => Lookup::Absent,
        }
    }

    /// Removes the entry if it is still evictable under the write lock,
    /// returning the removed value.
    ///
    /// The entry may have been replaced or removed since the read lock was
    /// released, so the decision is taken again here.
    fn evict_if_evictable<Q>(&self, key: &Q, now: Instant) -> Lookup<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut entries = self.write();
        let lookup = match entries.get(key) {
            Some(entry) => self.classify(entry, now),
            None => return Lookup::Absent,
        };
        match lookup {
            Lookup::Evictable(_) => {
                let removed = entries.remove(key).map(|entry| entry.value);
                self.stats.record_lazy_eviction();
                trace!("Lazily evicted entry past its grace period");
                Lookup::Evictable(removed)
            }
            other => other,
        }
    }
}

impl<K, V> Sweepable for EntryStore<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn sweep_evictable(&self, now: Instant) -> Option<usize> {
        let mut entries = self.write();
        if self.closed.load(Ordering::Acquire) {
            return None;
        }

        let before = entries.len();
        entries.retain(|_, entry| !entry.is_evictable(now, self.eviction_grace));
        let removed = before - entries.len();

        self.stats.record_sweep(removed);
        Some(removed)
    }
}

// == Expiring Cache ==
/// Thread-safe key-value cache with expiration and eviction grace.
///
/// Entries go stale `expiration` after they are set. A stale entry is no
/// longer returned by [`get`](Self::get), but [`get_stale`](Self::get_stale)
/// still hands it out until `eviction_grace` has also elapsed. Past that
/// point the entry is evictable and is removed either by the next read of
/// its key or by the background sweep. A `get_stale` that performs the
/// removal returns the value one last time; `get` never does.
///
/// Each cache owns one sweep task on a Tokio runtime. Dropping the cache
/// stops the task; no sweep touches the store once drop has begun.
///
/// Share a cache between threads with `Arc<ExpiringCache<K, V>>`.
///
/// # Example
/// ```
/// use expiring_cache::ExpiringCache;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let cache = ExpiringCache::new(Duration::from_secs(300), Duration::from_secs(60));
///     cache.set("alice", 42);
///     assert_eq!(cache.get("alice"), Some(42));
/// }
/// ```
pub struct ExpiringCache<K, V> {
    store: Arc<EntryStore<K, V>>,
    sweep_period: Duration,
    sweeper: SweepHandle,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a cache with the given expiration and eviction grace, sweeping
    /// at the default period.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime, like `tokio::spawn`.
    /// Use [`with_config`](Self::with_config) to get an error instead.
    pub fn new(expiration: Duration, eviction_grace: Duration) -> Self {
        Self::start(
            CacheConfig::new(expiration, eviction_grace),
            &Handle::current(),
        )
    }

    /// Creates a cache from a configuration, on the current Tokio runtime.
    ///
    /// # Errors
    /// - `CacheError::InvalidConfig` if the configuration fails validation
    /// - `CacheError::RuntimeUnavailable` if no runtime is running
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| CacheError::RuntimeUnavailable)?;
        Ok(Self::start(config, &runtime))
    }

    /// Creates a cache whose sweep task runs on the given runtime.
    ///
    /// Useful when the cache is built from a thread that is not itself
    /// inside a runtime.
    pub fn with_config_on(config: CacheConfig, runtime: &Handle) -> Result<Self> {
        config.validate()?;
        Ok(Self::start(config, runtime))
    }

    fn start(config: CacheConfig, runtime: &Handle) -> Self {
        let store = Arc::new(EntryStore::new(config.expiration, config.eviction_grace));
        let sweeper = spawn_sweep_task(Arc::downgrade(&store), config.sweep_period, runtime);

        debug!(
            expiration = ?config.expiration,
            eviction_grace = ?config.eviction_grace,
            sweep_period = ?config.sweep_period,
            "Expiring cache created"
        );

        Self {
            store,
            sweep_period: config.sweep_period,
            sweeper,
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// The new entry expires `expiration` from now, whatever the age of the
    /// entry it replaces.
    pub fn set(&self, key: K, value: V) {
        let entry = CacheEntry::new(value, Instant::now(), self.store.expiration);
        self.store.write().insert(key, entry);
    }

    // == Get ==
    /// Returns the value for `key` if it has not expired.
    ///
    /// A lookup that finds an entry past its grace period removes it.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup(key, false)
    }

    /// Returns the value for `key` even if it has expired.
    ///
    /// Once the grace period has also elapsed, the read that finds the entry
    /// removes it and still hands its value back this one time; later reads
    /// return `None`. Meant for callers that prefer stale data over nothing,
    /// e.g. while an upstream source is failing.
    pub fn get_stale<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup(key, true)
    }

    fn lookup<Q>(&self, key: &Q, ignore_expiration: bool) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let lookup = match self.store.peek(key, now) {
            Lookup::Evictable(_) => self.store.evict_if_evictable(key, now),
            other => other,
        };

        match lookup {
            Lookup::Fresh(value) => {
                self.store.stats.record_hit();
                Some(value)
            }
            Lookup::Stale(value) | Lookup::Evictable(Some(value)) if ignore_expiration => {
                self.store.stats.record_stale_hit();
                Some(value)
            }
            Lookup::Stale(_) | Lookup::Evictable(_) | Lookup::Absent => {
                self.store.stats.record_miss();
                None
            }
        }
    }

    // == Remove ==
    /// Removes the entry for `key`, if any.
    pub fn remove<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.write().remove(key);
    }

    // == Clear ==
    /// Removes every entry.
    ///
    /// Runs under the write lock, so once it returns no reader can see an
    /// entry that existed before the call.
    pub fn clear(&self) {
        let removed = {
            let mut entries = self.store.write();
            let removed = entries.len();
            entries.clear();
            removed
        };
        debug!(removed, "Expiring cache cleared");
    }

    // == Inspection ==
    /// Returns true if an entry for `key` is physically stored.
    ///
    /// Stale and evictable entries count; nothing is evicted.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.read().contains_key(key)
    }

    /// Returns the number of physically stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    /// Returns true if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    /// Time after insertion at which entries go stale.
    pub fn expiration(&self) -> Duration {
        self.store.expiration
    }

    /// Extra time a stale entry is kept before it becomes evictable.
    pub fn eviction_grace(&self) -> Duration {
        self.store.eviction_grace
    }

    /// Interval between background sweeps.
    pub fn sweep_period(&self) -> Duration {
        self.sweep_period
    }

    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        self.store.stats.snapshot(self.len())
    }
}

impl<K, V> Drop for ExpiringCache<K, V> {
    fn drop(&mut self) {
        self.store.close();
        self.sweeper.stop();
    }
}

impl<K, V> fmt::Debug for ExpiringCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("expiration", &self.store.expiration)
            .field("eviction_grace", &self.store.eviction_grace)
            .field("sweep_period", &self.sweep_period)
            .finish_non_exhaustive()
    }
}
