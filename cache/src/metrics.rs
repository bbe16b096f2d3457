use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_utils::CachePadded;

/// Lock-free counters maintained by the reference engine.
#[derive(Debug)]
pub(crate) struct Metrics {
  // --- Lookups ---
  pub(crate) hits: CachePadded<AtomicU64>,
  pub(crate) misses: CachePadded<AtomicU64>,

  // --- Loader ---
  pub(crate) loads: CachePadded<AtomicU64>,
  pub(crate) loader_failures: CachePadded<AtomicU64>,
  pub(crate) stale_served: CachePadded<AtomicU64>,

  // --- Removal ---
  pub(crate) invalidations: CachePadded<AtomicU64>,
  pub(crate) evicted_by_capacity: CachePadded<AtomicU64>,
  pub(crate) expired: CachePadded<AtomicU64>,

  pub(crate) current_entries: CachePadded<AtomicU64>,

  created_at: Instant,
}

impl Default for Metrics {
  fn default() -> Self {
    Self {
      hits: CachePadded::new(AtomicU64::new(0)),
      misses: CachePadded::new(AtomicU64::new(0)),
      loads: CachePadded::new(AtomicU64::new(0)),
      loader_failures: CachePadded::new(AtomicU64::new(0)),
      stale_served: CachePadded::new(AtomicU64::new(0)),
      invalidations: CachePadded::new(AtomicU64::new(0)),
      evicted_by_capacity: CachePadded::new(AtomicU64::new(0)),
      expired: CachePadded::new(AtomicU64::new(0)),
      current_entries: CachePadded::new(AtomicU64::new(0)),
      created_at: Instant::now(),
    }
  }
}

impl Metrics {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub(crate) fn incr(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
  }

  /// Creates a point-in-time snapshot of the current metrics.
  pub(crate) fn snapshot(&self) -> MetricsSnapshot {
    let hits = self.hits.load(Ordering::Relaxed);
    let misses = self.misses.load(Ordering::Relaxed);
    let total_lookups = hits + misses;

    MetricsSnapshot {
      hits,
      misses,
      hit_ratio: if total_lookups == 0 {
        0.0
      } else {
        hits as f64 / total_lookups as f64
      },
      loads: self.loads.load(Ordering::Relaxed),
      loader_failures: self.loader_failures.load(Ordering::Relaxed),
      stale_served: self.stale_served.load(Ordering::Relaxed),
      invalidations: self.invalidations.load(Ordering::Relaxed),
      evicted_by_capacity: self.evicted_by_capacity.load(Ordering::Relaxed),
      expired: self.expired.load(Ordering::Relaxed),
      current_entries: self.current_entries.load(Ordering::Relaxed),
      uptime_secs: self.created_at.elapsed().as_secs(),
    }
  }
}

/// A point-in-time snapshot of the engine's metrics.
#[derive(Clone)]
pub struct MetricsSnapshot {
  /// Lookups answered from a fresh cached value.
  pub hits: u64,
  /// Lookups that found nothing fresh.
  pub misses: u64,
  /// hits / (hits + misses).
  pub hit_ratio: f64,
  /// Values stored from a loader or a replace.
  pub loads: u64,
  /// Deferred loaders that returned an error.
  pub loader_failures: u64,
  /// Expired values served because no fresh value was available.
  pub stale_served: u64,
  /// Entries removed by a forced evict or `evict_all`.
  pub invalidations: u64,
  /// Expirable entries dropped to stay within `max_entries`.
  pub evicted_by_capacity: u64,
  /// Expired entries discarded on lookup.
  pub expired: u64,
  pub current_entries: u64,
  pub uptime_secs: u64,
}

impl fmt::Debug for MetricsSnapshot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MetricsSnapshot")
      .field("hits", &self.hits)
      .field("misses", &self.misses)
      .field("hit_ratio", &format!("{:.2}%", self.hit_ratio * 100.0))
      .field("loads", &self.loads)
      .field("loader_failures", &self.loader_failures)
      .field("stale_served", &self.stale_served)
      .field("invalidations", &self.invalidations)
      .field("evicted_by_capacity", &self.evicted_by_capacity)
      .field("expired", &self.expired)
      .field("current_entries", &self.current_entries)
      .field("uptime_secs", &self.uptime_secs)
      .finish()
  }
}
