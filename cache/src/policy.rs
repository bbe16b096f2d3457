use std::time::Duration;

/// The frozen set of cache rules a `Provider` is bound to.
///
/// A `Policy` is produced once by `ProviderBuilder::with_key` and is only
/// read afterwards; every `Configuration` the provider dispatches copies its
/// fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
  pub(crate) key: String,
  pub(crate) encrypted: bool,
  pub(crate) expirable: bool,
  pub(crate) lifetime: Option<Duration>,
}

impl Policy {
  pub fn key(&self) -> &str {
    &self.key
  }

  pub fn is_encrypted(&self) -> bool {
    self.encrypted
  }

  pub fn is_expirable(&self) -> bool {
    self.expirable
  }

  pub fn lifetime(&self) -> Option<Duration> {
    self.lifetime
  }

  /// The lifetime in whole milliseconds, saturating at `u64::MAX`.
  pub fn lifetime_millis(&self) -> Option<u64> {
    self
      .lifetime
      .map(|lifetime| u64::try_from(lifetime.as_millis()).unwrap_or(u64::MAX))
  }
}
