use crate::time;

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

/// A stored value with the metadata its policy asked for.
#[derive(Debug)]
pub(crate) struct Record {
  /// The value, type-erased so one engine can serve providers of any type.
  value: Arc<dyn Any + Send + Sync>,
  /// The expiration timestamp in nanoseconds. 0 means no lifetime.
  expires_at: u64,
  /// When the value was written, used to pick capacity victims.
  stored_at: u64,
  expirable: bool,
  encrypted: bool,
}

impl Record {
  pub(crate) fn new<T>(value: T, lifetime_millis: Option<u64>, expirable: bool, encrypted: bool) -> Self
  where
    T: Send + Sync + 'static,
  {
    let expires_at = lifetime_millis.map_or(0, |millis| {
      time::deadline_after(Duration::from_millis(millis))
    });

    Self {
      value: Arc::new(value),
      expires_at,
      stored_at: time::now_nanos(),
      expirable,
      encrypted,
    }
  }

  /// Returns a clone of the value if it was stored as a `T`.
  #[inline]
  pub(crate) fn value<T: Clone + 'static>(&self) -> Option<T> {
    self.value.downcast_ref::<T>().cloned()
  }

  #[inline]
  pub(crate) fn stored_at(&self) -> u64 {
    self.stored_at
  }

  #[inline]
  pub(crate) fn is_expirable(&self) -> bool {
    self.expirable
  }

  #[inline]
  pub(crate) fn is_encrypted(&self) -> bool {
    self.encrypted
  }

  /// Checks if the record has outlived its lifetime.
  #[inline]
  pub(crate) fn is_expired(&self) -> bool {
    self.expires_at > 0 && time::now_nanos() >= self.expires_at
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn records_without_lifetime_never_expire() {
    let record = Record::new(1u8, None, true, false);
    assert!(!record.is_expired());
  }

  #[test]
  fn records_expire_after_lifetime() {
    let record = Record::new("v", Some(1), true, false);
    std::thread::sleep(Duration::from_millis(5));
    assert!(record.is_expired());
  }

  #[test]
  fn centuries_long_lifetime_is_not_expired() {
    let record = Record::new("v", Some(18_446_744_074_000), true, false);
    std::thread::sleep(Duration::from_millis(5));
    assert!(!record.is_expired());
  }

  #[test]
  fn downcast_requires_the_stored_type() {
    let record = Record::new(String::from("alice"), None, true, true);
    assert_eq!(record.value::<String>().as_deref(), Some("alice"));
    assert_eq!(record.value::<u32>(), None);
    assert!(record.is_encrypted());
  }
}
