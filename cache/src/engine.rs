use crate::configuration::Configuration;
use crate::error::EngineError;
use crate::reply::Reply;

use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;

/// The successful output of an engine request.
///
/// The shape follows `Configuration::detail_response`: a bare value when it
/// is `false`, a `Reply` when it is `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response<T> {
  Data(T),
  Reply(Reply<T>),
}

impl<T> Response<T> {
  /// Builds the response shape a configuration asked for.
  pub fn shaped(reply: Reply<T>, detail_response: bool) -> Self {
    if detail_response {
      Response::Reply(reply)
    } else {
      Response::Data(reply.into_data())
    }
  }

  /// The value, whichever shape it came in.
  pub fn into_data(self) -> T {
    match self {
      Response::Data(data) => data,
      Response::Reply(reply) => reply.into_data(),
    }
  }
}

/// A cache-processing engine: storage, retrieval, expiry and eviction.
///
/// Providers describe one access per call with a `Configuration` and leave
/// every storage decision to the engine. Implementations must serialize
/// requests for the same key; providers do no locking of their own.
pub trait ProcessorProviders: Send + Sync + 'static {
  /// Resolves a single request. The stream is expected to yield exactly one
  /// item.
  fn process<T>(&self, config: Configuration<T>) -> BoxStream<'_, Result<Response<T>, EngineError>>
  where
    T: Clone + Send + Sync + 'static;

  /// Discards every cached entry.
  fn evict_all(&self) -> BoxFuture<'_, Result<(), EngineError>>;
}
