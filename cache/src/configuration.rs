use crate::loader::Loader;

/// Whether an existing cached value must be discarded before the request
/// is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvictDynamicKey {
  force_evict: bool,
}

impl EvictDynamicKey {
  pub fn new(force_evict: bool) -> Self {
    Self { force_evict }
  }

  #[inline]
  pub fn evict(&self) -> bool {
    self.force_evict
  }
}

/// What the engine may do with expired data when no fresh value can be
/// obtained from the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleFallback {
  /// Serve the expired value rather than failing.
  AllowStale,
  /// Never serve an expired value.
  DenyStale,
  /// Use whatever the engine was configured with.
  #[default]
  EngineDefault,
}

impl StaleFallback {
  /// Resolves the fallback against the engine's configured default.
  #[inline]
  pub fn resolve(self, engine_default: bool) -> bool {
    match self {
      StaleFallback::AllowStale => true,
      StaleFallback::DenyStale => false,
      StaleFallback::EngineDefault => engine_default,
    }
  }
}

impl From<Option<bool>> for StaleFallback {
  fn from(value: Option<bool>) -> Self {
    match value {
      Some(true) => StaleFallback::AllowStale,
      Some(false) => StaleFallback::DenyStale,
      None => StaleFallback::EngineDefault,
    }
  }
}

/// A single, fully specified request for the cache-processing engine.
///
/// One is assembled fresh for every dispatched operation and handed over by
/// value; nothing keeps it afterwards.
#[derive(Debug)]
pub struct Configuration<T> {
  pub(crate) key: String,
  pub(crate) encrypted: bool,
  pub(crate) expirable: bool,
  pub(crate) lifetime_millis: Option<u64>,
  pub(crate) loader: Loader<T>,
  pub(crate) evict: EvictDynamicKey,
  pub(crate) detail_response: bool,
  pub(crate) stale_fallback: StaleFallback,
}

impl<T> Configuration<T> {
  pub fn key(&self) -> &str {
    &self.key
  }

  pub fn is_encrypted(&self) -> bool {
    self.encrypted
  }

  /// Whether the entry may be dropped when the engine runs short of space.
  pub fn is_expirable(&self) -> bool {
    self.expirable
  }

  /// Time after which the stored value is stale. `None` means it never
  /// expires on its own.
  pub fn lifetime_millis(&self) -> Option<u64> {
    self.lifetime_millis
  }

  pub fn evict(&self) -> EvictDynamicKey {
    self.evict
  }

  pub fn detail_response(&self) -> bool {
    self.detail_response
  }

  pub fn stale_fallback(&self) -> StaleFallback {
    self.stale_fallback
  }

  pub fn loader(&self) -> &Loader<T> {
    &self.loader
  }

  /// Takes the loader out of the request, leaving the placeholder behind.
  pub fn take_loader(&mut self) -> Loader<T> {
    std::mem::replace(&mut self.loader, Loader::Placeholder)
  }
}
