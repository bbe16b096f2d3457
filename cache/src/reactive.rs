use crate::builder::ProviderBuilder;
use crate::engine::ProcessorProviders;
use crate::error::ProviderError;

use std::sync::Arc;

/// Entry point: owns the engine and hands out provider builders bound to it.
#[derive(Debug)]
pub struct ReactiveCache<P> {
  processor: Arc<P>,
}

impl<P> Clone for ReactiveCache<P> {
  fn clone(&self) -> Self {
    Self {
      processor: Arc::clone(&self.processor),
    }
  }
}

impl<P: ProcessorProviders> ReactiveCache<P> {
  pub fn new(processor: P) -> Self {
    Self::from_arc(Arc::new(processor))
  }

  /// Wraps an engine that is already shared elsewhere.
  pub fn from_arc(processor: Arc<P>) -> Self {
    Self { processor }
  }

  /// Starts configuring a provider for values of type `T`.
  pub fn provider<T>(&self) -> ProviderBuilder<T, P> {
    ProviderBuilder::new(Arc::clone(&self.processor))
  }

  /// Evicts every entry the engine holds, for every provider.
  pub async fn evict_all(&self) -> Result<(), ProviderError> {
    self.processor.evict_all().await.map_err(Into::into)
  }

  pub fn processor(&self) -> &Arc<P> {
    &self.processor
  }
}
