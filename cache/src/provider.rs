use crate::adapter;
use crate::configuration::{Configuration, EvictDynamicKey, StaleFallback};
use crate::engine::{ProcessorProviders, Response};
use crate::error::{BoxError, EngineError, ProviderError};
use crate::loader::Loader;
use crate::policy::Policy;
use crate::reply::Reply;

use core::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::StreamExt;

/// Reads, loads, replaces and evicts the cached value behind one key.
///
/// Every operation is an `async fn`: nothing is assembled or sent to the
/// engine until the returned future is polled, and dropping the future
/// cancels the loader and the engine request along with it.
///
/// A `Provider` is cheap to clone and holds no mutable state, so it can be
/// shared freely between tasks. Ordering between concurrent operations on
/// the same key is left to the engine.
pub struct Provider<T, P> {
  policy: Arc<Policy>,
  processor: Arc<P>,
  _value_marker: PhantomData<fn() -> T>,
}

impl<T, P> Clone for Provider<T, P> {
  fn clone(&self) -> Self {
    Self {
      policy: Arc::clone(&self.policy),
      processor: Arc::clone(&self.processor),
      _value_marker: PhantomData,
    }
  }
}

impl<T, P> fmt::Debug for Provider<T, P> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Provider")
      .field("policy", &self.policy)
      .finish_non_exhaustive()
  }
}

impl<T, P> Provider<T, P> {
  pub(crate) fn new(policy: Policy, processor: Arc<P>) -> Self {
    Self {
      policy: Arc::new(policy),
      processor,
      _value_marker: PhantomData,
    }
  }

  pub fn key(&self) -> &str {
    &self.policy.key
  }

  pub fn policy(&self) -> &Policy {
    &self.policy
  }
}

impl<T, P> Provider<T, P>
where
  T: Clone + Send + Sync + 'static,
  P: ProcessorProviders,
{
  /// Evicts the cached data for this key.
  ///
  /// Succeeds whether or not anything was cached; only genuine engine
  /// faults are reported.
  pub async fn evict(&self) -> Result<(), ProviderError> {
    tracing::debug!(key = %self.policy.key, "evict");
    let config = self.policy.assemble::<T>(
      Loader::Placeholder,
      EvictDynamicKey::new(true),
      false,
      StaleFallback::DenyStale,
    );

    let mut responses = self.processor.process(config);
    while let Some(response) = responses.next().await {
      if let Err(err) = response {
        return adapter::complete_on_missing_loader(err);
      }
    }
    Ok(())
  }

  /// Reads the cached value, failing with `ProviderError::NoCachedValue`
  /// if there is none.
  pub async fn read(&self) -> Result<T, ProviderError> {
    tracing::debug!(key = %self.policy.key, "read");
    let config = self.policy.assemble(
      Loader::Placeholder,
      EvictDynamicKey::new(false),
      false,
      StaleFallback::DenyStale,
    );

    self
      .dispatch(config)
      .await
      .map(Response::into_data)
      .map_err(|err| adapter::strip_placeholder_loader(&self.policy.key, err))
  }

  /// Reads the cached value, or awaits `loader` and caches its result when
  /// nothing usable is cached.
  pub async fn read_with_loader<Fut, E>(&self, loader: Fut) -> Result<T, ProviderError>
  where
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    E: Into<BoxError> + 'static,
  {
    tracing::debug!(key = %self.policy.key, "read_with_loader");
    let config = self.policy.assemble(
      Loader::deferred(loader),
      EvictDynamicKey::new(false),
      false,
      StaleFallback::EngineDefault,
    );

    Ok(self.dispatch(config).await?.into_data())
  }

  /// Discards whatever is cached and stores `value` in its place.
  pub async fn replace(&self, value: T) -> Result<T, ProviderError> {
    tracing::debug!(key = %self.policy.key, "replace");
    let config = self.policy.assemble(
      Loader::Eager(value),
      EvictDynamicKey::new(true),
      false,
      StaleFallback::EngineDefault,
    );

    Ok(self.dispatch(config).await?.into_data())
  }

  /// Awaits `loader` and replaces the cached data with its value.
  ///
  /// If the loader fails the cache is left as it was.
  pub async fn replace_with<Fut, E>(&self, loader: Fut) -> Result<T, ProviderError>
  where
    Fut: Future<Output = Result<T, E>> + Send,
    E: Into<BoxError>,
  {
    let value = loader
      .await
      .map_err(|err| ProviderError::LoaderFailed(err.into()))?;
    self.replace(value).await
  }

  /// Same as `read_with_loader`, but returns the value wrapped in a `Reply`
  /// describing where it came from.
  pub async fn read_with_loader_as_reply<Fut, E>(
    &self,
    loader: Fut,
  ) -> Result<Reply<T>, ProviderError>
  where
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    E: Into<BoxError> + 'static,
  {
    tracing::debug!(key = %self.policy.key, "read_with_loader_as_reply");
    let config = self.policy.assemble(
      Loader::deferred(loader),
      EvictDynamicKey::new(false),
      true,
      StaleFallback::EngineDefault,
    );

    let response = self.dispatch(config).await?;
    self.expect_reply(response)
  }

  /// Same as `replace`, but returns the value wrapped in a `Reply`.
  pub async fn replace_as_reply(&self, value: T) -> Result<Reply<T>, ProviderError> {
    tracing::debug!(key = %self.policy.key, "replace_as_reply");
    let config = self.policy.assemble(
      Loader::Eager(value),
      EvictDynamicKey::new(true),
      true,
      StaleFallback::EngineDefault,
    );

    let response = self.dispatch(config).await?;
    self.expect_reply(response)
  }

  /// Sends one request and takes the first item of the engine's stream.
  async fn dispatch(&self, config: Configuration<T>) -> Result<Response<T>, EngineError> {
    let mut responses = self.processor.process(config);
    match responses.next().await {
      Some(response) => response,
      None => Err(EngineError::EmptyResponse),
    }
  }

  fn expect_reply(&self, response: Response<T>) -> Result<Reply<T>, ProviderError> {
    match response {
      Response::Reply(reply) => Ok(reply),
      Response::Data(_) => Err(
        EngineError::Internal {
          key: self.policy.key.clone(),
          source: "engine returned a bare value for a detail request".into(),
        }
        .into(),
      ),
    }
  }
}
