use crate::configuration::Configuration;
use crate::engine::{ProcessorProviders, Response};
use crate::entry::Record;
use crate::error::{BuildError, EngineError};
use crate::gate::KeyGates;
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::reply::{Reply, Source};
use crate::store::ShardedStore;

use core::fmt;
use std::sync::atomic::Ordering;

use futures_util::future::BoxFuture;
use futures_util::stream::{self, BoxStream};
use futures_util::{FutureExt, StreamExt};

/// Builds a `MemoryEngine`.
#[derive(Debug, Clone)]
pub struct MemoryEngineBuilder {
  shards: usize,
  max_entries: Option<usize>,
  use_expired_data_if_loader_not_available: bool,
}

impl Default for MemoryEngineBuilder {
  fn default() -> Self {
    Self::new()
  }
}

impl MemoryEngineBuilder {
  pub fn new() -> Self {
    Self {
      shards: (num_cpus::get() * 4).max(1).next_power_of_two(),
      max_entries: None,
      use_expired_data_if_loader_not_available: false,
    }
  }

  /// Sets the number of independently locked shards.
  pub fn shards(mut self, shards: usize) -> Self {
    // Power of two for fast bitwise ANDing.
    self.shards = shards.max(1).next_power_of_two();
    self
  }

  /// Caps the number of stored entries. When a write goes over the cap the
  /// oldest expirable entries are dropped; non-expirable entries are kept
  /// even if that leaves the engine over the cap.
  pub fn max_entries(mut self, max_entries: usize) -> Self {
    self.max_entries = Some(max_entries);
    self
  }

  /// What `StaleFallback::EngineDefault` resolves to. Defaults to `false`.
  pub fn use_expired_data_if_loader_not_available(mut self, enabled: bool) -> Self {
    self.use_expired_data_if_loader_not_available = enabled;
    self
  }

  pub fn build(self) -> Result<MemoryEngine, BuildError> {
    if self.max_entries == Some(0) {
      return Err(BuildError::ZeroCapacity);
    }

    Ok(MemoryEngine {
      store: ShardedStore::new(self.shards, ahash::RandomState::new()),
      gates: KeyGates::new(),
      metrics: Metrics::new(),
      max_entries: self.max_entries,
      use_expired_data_if_loader_not_available: self.use_expired_data_if_loader_not_available,
    })
  }
}

enum Lookup<T> {
  Fresh { value: T, encrypted: bool },
  Stale { value: T, encrypted: bool },
  Missing,
}

/// An in-process `ProcessorProviders` implementation.
///
/// Values live in a sharded map for the lifetime of the engine; nothing is
/// persisted and the `encrypted` flag is recorded and reported but not acted
/// on. Requests for the same key are serialized.
pub struct MemoryEngine {
  store: ShardedStore,
  gates: KeyGates,
  metrics: Metrics,
  max_entries: Option<usize>,
  use_expired_data_if_loader_not_available: bool,
}

impl fmt::Debug for MemoryEngine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MemoryEngine")
      .field("store", &self.store)
      .field("max_entries", &self.max_entries)
      .field(
        "use_expired_data_if_loader_not_available",
        &self.use_expired_data_if_loader_not_available,
      )
      .field("metrics", &self.metrics.snapshot())
      .finish_non_exhaustive()
  }
}

impl Default for MemoryEngine {
  fn default() -> Self {
    Self::new()
  }
}

impl MemoryEngine {
  /// Creates an unbounded engine with default settings.
  pub fn new() -> Self {
    Self {
      store: ShardedStore::new(
        (num_cpus::get() * 4).max(1).next_power_of_two(),
        ahash::RandomState::new(),
      ),
      gates: KeyGates::new(),
      metrics: Metrics::new(),
      max_entries: None,
      use_expired_data_if_loader_not_available: false,
    }
  }

  pub fn builder() -> MemoryEngineBuilder {
    MemoryEngineBuilder::new()
  }

  pub fn metrics(&self) -> MetricsSnapshot {
    self.metrics.snapshot()
  }

  /// The number of stored entries, expired ones included.
  pub fn len(&self) -> usize {
    self.store.iter_shards().map(|shard| shard.read().len()).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns `true` if anything, fresh or expired, is stored under `key`.
  pub fn contains_key(&self, key: &str) -> bool {
    self.store.get_shard(key).read().contains_key(key)
  }

  async fn resolve<T>(&self, mut config: Configuration<T>) -> Result<Response<T>, EngineError>
  where
    T: Clone + Send + Sync + 'static,
  {
    let _permit = self.gates.acquire(&config.key).await;
    let key = config.key.clone();
    let use_expired = config
      .stale_fallback
      .resolve(self.use_expired_data_if_loader_not_available);

    let stale = if config.evict.evict() {
      self.invalidate(&key);
      None
    } else {
      match self.lookup::<T>(&key, use_expired)? {
        Lookup::Fresh { value, encrypted } => {
          let reply = Reply::new(value, Source::Memory, encrypted, false);
          return Ok(Response::shaped(reply, config.detail_response));
        }
        Lookup::Stale { value, encrypted } => Some((value, encrypted)),
        Lookup::Missing => None,
      }
    };

    let loader = config.take_loader();
    let placeholder = loader.is_placeholder();
    match loader.load().await {
      Ok(value) => {
        self.write(&key, value.clone(), &config);
        let reply = Reply::new(value, Source::Loader, config.encrypted, false);
        Ok(Response::shaped(reply, config.detail_response))
      }
      Err(source) => {
        if !placeholder {
          Metrics::incr(&self.metrics.loader_failures);
        }
        if let Some((value, encrypted)) = stale {
          tracing::debug!(key = %key, "serving expired value, no fresh data available");
          Metrics::incr(&self.metrics.stale_served);
          let reply = Reply::new(value, Source::Memory, encrypted, true);
          return Ok(Response::shaped(reply, config.detail_response));
        }
        if placeholder {
          Err(EngineError::NoLoaderAvailable { key })
        } else {
          Err(EngineError::Loader { key, source })
        }
      }
    }
  }

  /// Looks `key` up, discarding it if it is expired and may not be served.
  fn lookup<T: Clone + 'static>(&self, key: &str, keep_expired: bool) -> Result<Lookup<T>, EngineError> {
    let mut guard = self.store.get_shard(key).write();

    let Some(record) = guard.get(key) else {
      Metrics::incr(&self.metrics.misses);
      return Ok(Lookup::Missing);
    };

    let value = record.value::<T>().ok_or_else(|| EngineError::TypeMismatch {
      key: key.to_string(),
    })?;
    let encrypted = record.is_encrypted();

    if !record.is_expired() {
      Metrics::incr(&self.metrics.hits);
      return Ok(Lookup::Fresh { value, encrypted });
    }

    Metrics::incr(&self.metrics.misses);
    if keep_expired {
      Ok(Lookup::Stale { value, encrypted })
    } else {
      guard.remove(key);
      Metrics::incr(&self.metrics.expired);
      self.metrics.current_entries.fetch_sub(1, Ordering::Relaxed);
      Ok(Lookup::Missing)
    }
  }

  fn write<T>(&self, key: &str, value: T, config: &Configuration<T>)
  where
    T: Send + Sync + 'static,
  {
    let record = Record::new(
      value,
      config.lifetime_millis,
      config.expirable,
      config.encrypted,
    );

    {
      let mut guard = self.store.get_shard(key).write();
      if guard.insert(key.to_string(), record).is_none() {
        self.metrics.current_entries.fetch_add(1, Ordering::Relaxed);
      }
    }
    Metrics::incr(&self.metrics.loads);

    self.enforce_capacity(key);
  }

  fn invalidate(&self, key: &str) -> bool {
    let removed = self.store.get_shard(key).write().remove(key).is_some();
    if removed {
      Metrics::incr(&self.metrics.invalidations);
      self.metrics.current_entries.fetch_sub(1, Ordering::Relaxed);
    }
    removed
  }

  /// Drops the oldest expirable entries until the engine is back under
  /// `max_entries`. The entry just written under `protected` is never chosen.
  fn enforce_capacity(&self, protected: &str) {
    let Some(max_entries) = self.max_entries else {
      return;
    };

    while self.metrics.current_entries.load(Ordering::Relaxed) as usize > max_entries {
      let victim = self
        .store
        .iter_shards()
        .filter_map(|shard| {
          shard
            .read()
            .iter()
            .filter(|(key, record)| record.is_expirable() && key.as_str() != protected)
            .min_by_key(|(_, record)| record.stored_at())
            .map(|(key, record)| (record.stored_at(), key.clone()))
        })
        .min();

      let Some((stored_at, key)) = victim else {
        tracing::warn!(
          max_entries,
          "engine is over capacity but holds no expirable entries"
        );
        return;
      };

      let mut guard = self.store.get_shard(&key).write();
      // Re-check: the entry may have been rewritten since the scan.
      if guard.get(&key).is_some_and(|record| record.stored_at() == stored_at) {
        guard.remove(&key);
        Metrics::incr(&self.metrics.evicted_by_capacity);
        self.metrics.current_entries.fetch_sub(1, Ordering::Relaxed);
        tracing::debug!(key = %key, "dropped expirable entry over capacity");
      }
    }
  }

  fn clear(&self) {
    for shard in self.store.iter_shards() {
      let mut guard = shard.write();
      let removed = guard.len() as u64;
      guard.clear();
      self.metrics.invalidations.fetch_add(removed, Ordering::Relaxed);
      self.metrics.current_entries.fetch_sub(removed, Ordering::Relaxed);
    }
  }
}

impl ProcessorProviders for MemoryEngine {
  fn process<T>(&self, config: Configuration<T>) -> BoxStream<'_, Result<Response<T>, EngineError>>
  where
    T: Clone + Send + Sync + 'static,
  {
    stream::once(self.resolve(config)).boxed()
  }

  fn evict_all(&self) -> BoxFuture<'_, Result<(), EngineError>> {
    async move {
      tracing::debug!("evicting all entries");
      self.clear();
      Ok(())
    }
    .boxed()
  }
}
