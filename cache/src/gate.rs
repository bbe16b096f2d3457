use core::fmt;
use std::sync::Arc;

use ahash::HashMap;
use futures_util::lock::{Mutex as AsyncMutex, OwnedMutexGuard};
use parking_lot::Mutex;

/// Per-key async gates giving at most one in-flight request per key.
///
/// A gate only exists while someone holds or waits on it.
#[derive(Default)]
pub(crate) struct KeyGates {
  gates: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl fmt::Debug for KeyGates {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("KeyGates")
      .field("active", &self.gates.lock().len())
      .finish()
  }
}

/// Exclusive access to one key. Released on drop, including when the
/// owning future is cancelled.
pub(crate) struct KeyPermit<'a> {
  owner: &'a KeyGates,
  key: String,
  gate: Option<Arc<AsyncMutex<()>>>,
  guard: Option<OwnedMutexGuard<()>>,
}

impl KeyGates {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  /// Waits until no other request holds `key`.
  pub(crate) async fn acquire(&self, key: &str) -> KeyPermit<'_> {
    let gate = {
      let mut gates = self.gates.lock();
      gates
        .entry(key.to_string())
        .or_insert_with(|| Arc::new(AsyncMutex::new(())))
        .clone()
    };

    let mut permit = KeyPermit {
      owner: self,
      key: key.to_string(),
      gate: Some(Arc::clone(&gate)),
      guard: None,
    };
    permit.guard = Some(gate.lock_owned().await);
    permit
  }

  #[cfg(test)]
  pub(crate) fn len(&self) -> usize {
    self.gates.lock().len()
  }
}

impl Drop for KeyPermit<'_> {
  fn drop(&mut self) {
    // The guard and our handle go first so the count below only sees waiters.
    self.guard.take();
    self.gate.take();

    let mut gates = self.owner.gates.lock();
    if gates
      .get(&self.key)
      .is_some_and(|gate| Arc::strong_count(gate) == 1)
    {
      gates.remove(&self.key);
    }
  }
}
