use crate::error::BuildError;
use crate::policy::Policy;
use crate::provider::Provider;

use core::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Collects the policy for one cache slot before it is bound to a key.
///
/// Every setter consumes and returns the builder; `with_key` consumes it for
/// good, so a bound `Provider` can never have its policy changed.
pub struct ProviderBuilder<T, P> {
  encrypted: bool,
  expirable: bool,
  lifetime: Option<Duration>,
  processor: Arc<P>,
  _value_marker: PhantomData<fn() -> T>,
}

// Manual Debug implementation for ProviderBuilder.
impl<T, P> fmt::Debug for ProviderBuilder<T, P> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ProviderBuilder")
      .field("encrypted", &self.encrypted)
      .field("expirable", &self.expirable)
      .field("lifetime", &self.lifetime)
      .finish_non_exhaustive()
  }
}

impl<T, P> ProviderBuilder<T, P> {
  /// Creates a builder with the default policy: not encrypted, expirable,
  /// and no lifetime.
  pub fn new(processor: Arc<P>) -> Self {
    Self {
      encrypted: false,
      expirable: true,
      lifetime: None,
      processor,
      _value_marker: PhantomData,
    }
  }

  /// Asks the engine to encrypt this provider's data, if it is able to.
  pub fn encrypt(mut self, encrypt: bool) -> Self {
    self.encrypted = encrypt;
    self
  }

  /// Makes the data eligible to be dropped when the engine runs short of
  /// space. Defaults to `true`.
  pub fn expirable(mut self, expirable: bool) -> Self {
    self.expirable = expirable;
    self
  }

  /// Sets how long stored data stays fresh.
  ///
  /// Without a lifetime the data never expires on its own and is only
  /// removed through `Provider::evict` or `Provider::replace`.
  pub fn life_cache(mut self, lifetime: Duration) -> Self {
    self.lifetime = Some(lifetime);
    self
  }

  /// Applies a loaded `ProviderConfig` on top of the current settings.
  #[cfg(feature = "serde")]
  pub fn apply_config(mut self, config: &crate::config::ProviderConfig) -> Self {
    self.encrypted = config.encrypted;
    self.expirable = config.expirable;
    if let Some(lifetime) = config.lifetime {
      self.lifetime = Some(lifetime);
    }
    self
  }

  /// Binds the policy to `key` and returns the provider for it.
  pub fn with_key(self, key: impl ToString) -> Result<Provider<T, P>, BuildError> {
    let key = key.to_string();
    if key.is_empty() {
      return Err(BuildError::EmptyKey);
    }
    if matches!(self.lifetime, Some(lifetime) if lifetime.as_millis() == 0) {
      return Err(BuildError::ZeroLifetime);
    }

    let policy = Policy {
      key,
      encrypted: self.encrypted,
      expirable: self.expirable,
      lifetime: self.lifetime,
    };
    Ok(Provider::new(policy, self.processor))
  }
}
