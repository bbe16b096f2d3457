//! Post-processing of engine failures for the two operations that run
//! without a real loader.
//!
//! `evict` and `read` hand the engine the placeholder loader, so an engine
//! that finds nothing to serve reports "no loader available". That signal is
//! an artifact of the request shape, not a fault: eviction treats it as
//! success and `read` turns it into `ProviderError::NoCachedValue`. Every
//! other failure passes through untouched.

use crate::error::{EngineError, ProviderError};

/// Suppresses the placeholder failure on the evict path.
pub(crate) fn complete_on_missing_loader(err: EngineError) -> Result<(), ProviderError> {
  if err.is_missing_loader() {
    tracing::debug!(error = %err, "evict: suppressing placeholder loader failure");
    Ok(())
  } else {
    Err(err.into())
  }
}

/// Re-tags the placeholder failure on the read path.
pub(crate) fn strip_placeholder_loader(key: &str, err: EngineError) -> ProviderError {
  if err.is_missing_loader() {
    tracing::debug!(key, "read: nothing cached");
    ProviderError::NoCachedValue {
      key: key.to_string(),
    }
  } else {
    err.into()
  }
}
