use crate::entry::Record;

use core::fmt;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash, Hasher};

use crossbeam_utils::CachePadded;
use parking_lot::RwLock;

pub(crate) type Shard<H> = RwLock<HashMap<String, Record, H>>;

/// A helper function to hash a key using a `BuildHasher`.
#[inline]
fn hash_key<K: Hash + ?Sized, H: BuildHasher>(hasher: &H, key: &K) -> u64 {
  let mut state = hasher.build_hasher();
  key.hash(&mut state);
  state.finish()
}

/// A record store partitioned into independently locked shards.
///
/// Operations on different keys rarely contend for the same lock. Locks are
/// only ever held for synchronous critical sections, never across an await.
pub(crate) struct ShardedStore<H = ahash::RandomState> {
  shards: Box<[CachePadded<Shard<H>>]>,
  hasher: H,
}

impl<H> fmt::Debug for ShardedStore<H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ShardedStore")
      .field("num_shards", &self.shards.len())
      .finish()
  }
}

impl<H> ShardedStore<H>
where
  H: BuildHasher + Clone,
{
  /// Creates a store with `num_shards` shards. `num_shards` must be a
  /// non-zero power of two.
  pub(crate) fn new(num_shards: usize, hasher: H) -> Self {
    debug_assert!(num_shards.is_power_of_two());
    let shards = (0..num_shards)
      .map(|_| CachePadded::new(RwLock::new(HashMap::with_hasher(hasher.clone()))))
      .collect::<Vec<_>>();

    Self {
      shards: shards.into_boxed_slice(),
      hasher,
    }
  }

  /// Returns the lock guarding the shard that owns `key`.
  #[inline]
  pub(crate) fn get_shard(&self, key: &str) -> &Shard<H> {
    let hash = hash_key(&self.hasher, key);
    let index = hash as usize & (self.shards.len() - 1);
    &self.shards[index]
  }

  /// Iterates over all shard locks, for whole-store operations.
  pub(crate) fn iter_shards(&self) -> impl Iterator<Item = &Shard<H>> {
    self.shards.iter().map(|padded| &**padded)
  }
}
