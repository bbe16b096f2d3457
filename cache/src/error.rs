use std::fmt;

use thiserror::Error;

/// A type-erased, thread-safe error used for loader and engine causes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur when finalizing a provider or building an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
  /// `with_key` was called with an empty key.
  EmptyKey,
  /// A lifetime was configured that rounds down to zero milliseconds.
  /// Lifetimes must be strictly positive; omit `life_cache` for entries
  /// that never expire.
  ZeroLifetime,
  /// The reference engine was configured with `max_entries(0)`.
  ZeroCapacity,
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::EmptyKey => write!(f, "provider key cannot be empty"),
      BuildError::ZeroLifetime => write!(
        f,
        "provider lifetime must be at least one millisecond"
      ),
      BuildError::ZeroCapacity => write!(f, "engine capacity cannot be zero"),
    }
  }
}

impl std::error::Error for BuildError {}

/// The failure returned by the placeholder loader.
///
/// It carries no data and only exists so the provider can recognise its own
/// "no loader available" signal in whatever shape the engine reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no loader was supplied for this operation")]
pub struct PlaceholderLoaderError;

/// Failures reported by a cache-processing engine.
#[derive(Debug, Error)]
pub enum EngineError {
  /// Nothing usable was cached for `key` and the request carried no loader.
  #[error("no cached data and no loader available for key '{key}'")]
  NoLoaderAvailable { key: String },

  /// The loader supplied with the request failed.
  #[error("loader for key '{key}' failed: {source}")]
  Loader {
    key: String,
    #[source]
    source: BoxError,
  },

  /// A storage-level fault inside the engine.
  #[error("engine failure for key '{key}': {source}")]
  Internal {
    key: String,
    #[source]
    source: BoxError,
  },

  /// The cached value for `key` has a different type than the one requested.
  #[error("cached value for key '{key}' does not have the requested type")]
  TypeMismatch { key: String },

  /// The engine completed without emitting a result.
  #[error("engine completed without producing a result")]
  EmptyResponse,
}

impl EngineError {
  /// Returns `true` if this failure was caused by the placeholder loader,
  /// either reported directly or as a wrapped loader failure.
  pub fn is_missing_loader(&self) -> bool {
    match self {
      EngineError::NoLoaderAvailable { .. } => true,
      EngineError::Loader { source, .. } => source.is::<PlaceholderLoaderError>(),
      _ => false,
    }
  }
}

/// The error type returned by every `Provider` operation.
#[derive(Debug, Error)]
pub enum ProviderError {
  /// `read()` found nothing cached for `key` and no loader was supplied.
  #[error("no cached value available for key '{key}'")]
  NoCachedValue { key: String },

  /// The caller-supplied loader failed while computing fresh data.
  #[error("loader failed: {0}")]
  LoaderFailed(#[source] BoxError),

  /// Any other failure from the underlying engine, passed through unchanged.
  #[error("cache engine failure: {0}")]
  EngineFailure(#[source] BoxError),
}

impl ProviderError {
  /// Returns `true` for `ProviderError::NoCachedValue`.
  pub fn is_no_cached_value(&self) -> bool {
    matches!(self, ProviderError::NoCachedValue { .. })
  }
}

impl From<EngineError> for ProviderError {
  fn from(err: EngineError) -> Self {
    match err {
      EngineError::Loader { source, .. } => ProviderError::LoaderFailed(source),
      other => ProviderError::EngineFailure(Box::new(other)),
    }
  }
}

/// Errors raised while loading a `ProviderConfig`.
#[cfg(feature = "serde")]
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read provider configuration: {0}")]
  Read(#[from] std::io::Error),

  #[error("failed to parse provider configuration: {0}")]
  Parse(#[from] serde_yaml::Error),

  #[error("invalid duration for '{field}': {message}")]
  InvalidDuration { field: String, message: String },
}
