use crate::configuration::{Configuration, EvictDynamicKey, StaleFallback};
use crate::loader::Loader;
use crate::policy::Policy;

impl Policy {
  /// Builds the request for one dispatched operation.
  ///
  /// This is a pure function of the frozen policy and the call-specific
  /// arguments and cannot fail: a malformed policy is rejected when the
  /// provider is bound, never here.
  pub fn assemble<T>(
    &self,
    loader: Loader<T>,
    evict: EvictDynamicKey,
    detail_response: bool,
    stale_fallback: StaleFallback,
  ) -> Configuration<T> {
    tracing::trace!(
      key = %self.key,
      loader = ?loader,
      force_evict = evict.evict(),
      detail_response,
      stale_fallback = ?stale_fallback,
      "assembling provider configuration"
    );

    Configuration {
      key: self.key.clone(),
      encrypted: self.encrypted,
      expirable: self.expirable,
      lifetime_millis: self.lifetime_millis(),
      loader,
      evict,
      detail_response,
      stale_fallback,
    }
  }
}
