use crate::error::{BoxError, PlaceholderLoaderError};

use std::fmt;
use std::future::Future;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

/// Where an operation gets fresh data from, if anywhere.
///
/// The engine consumes this when the cached value is missing, stale or has
/// been force-evicted.
pub enum Loader<T> {
  /// No data source. Loading always fails with `PlaceholderLoaderError`.
  Placeholder,
  /// A value that is already available, used by `replace`.
  Eager(T),
  /// A deferred computation that is only driven if the engine needs it.
  Deferred(BoxFuture<'static, Result<T, BoxError>>),
}

impl<T> Loader<T> {
  /// Wraps a caller-supplied future as a deferred loader.
  pub fn deferred<Fut, E>(future: Fut) -> Self
  where
    T: 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    E: Into<BoxError> + 'static,
  {
    Loader::Deferred(future.map(|result| result.map_err(Into::into)).boxed())
  }

  /// Returns `true` for the placeholder loader.
  pub fn is_placeholder(&self) -> bool {
    matches!(self, Loader::Placeholder)
  }

  /// Produces the loader's value, awaiting it if it is deferred.
  pub async fn load(self) -> Result<T, BoxError> {
    match self {
      Loader::Placeholder => Err(Box::new(PlaceholderLoaderError)),
      Loader::Eager(value) => Ok(value),
      Loader::Deferred(future) => future.await,
    }
  }
}

impl<T> fmt::Debug for Loader<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Loader::Placeholder => write!(f, "Loader::Placeholder"),
      Loader::Eager(_) => write!(f, "Loader::Eager(..)"),
      Loader::Deferred(_) => write!(f, "Loader::Deferred(..)"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use futures_executor::block_on;

  #[test]
  fn placeholder_always_fails_with_marker() {
    let err = block_on(Loader::<u32>::Placeholder.load()).unwrap_err();
    assert!(err.is::<PlaceholderLoaderError>());
  }

  #[test]
  fn eager_yields_its_value() {
    assert_eq!(block_on(Loader::Eager(7).load()).unwrap(), 7);
  }

  #[test]
  fn deferred_converts_the_error_type() {
    let loader = Loader::<u32>::deferred(async { Err::<u32, _>("offline") });
    let err = block_on(loader.load()).unwrap_err();
    assert_eq!(err.to_string(), "offline");
  }
}
