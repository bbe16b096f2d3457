#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use fibre_reactive_cache::{
  Configuration, EngineError, Loader, MemoryEngine, PlaceholderLoaderError, ProcessorProviders,
  Provider, ReactiveCache, Reply, Response, Source, StaleFallback,
};
use futures_util::future::BoxFuture;
use futures_util::stream::{self, BoxStream};
use futures_util::{FutureExt, StreamExt};

/// Installs a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}

pub fn memory_cache() -> ReactiveCache<MemoryEngine> {
  init_tracing();
  ReactiveCache::new(MemoryEngine::builder().shards(4).build().unwrap())
}

pub fn user_provider(cache: &ReactiveCache<MemoryEngine>) -> Provider<String, MemoryEngine> {
  cache.provider::<String>().with_key("user:42").unwrap()
}

/// A loader future that counts how often it was driven.
pub fn counted(
  calls: &Arc<AtomicUsize>,
  value: &str,
) -> impl std::future::Future<Output = Result<String, io::Error>> + Send + 'static {
  let calls = calls.clone();
  let value = value.to_string();
  async move {
    calls.fetch_add(1, Ordering::SeqCst);
    Ok(value)
  }
}

pub fn failing(message: &str) -> impl std::future::Future<Output = Result<String, io::Error>> + Send + 'static {
  let message = message.to_string();
  async move { Err(io::Error::new(io::ErrorKind::Other, message)) }
}

// --- Scripted engine ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderKind {
  Placeholder,
  Eager,
  Deferred,
}

/// What a `ScriptedEngine` saw in one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seen {
  pub key: String,
  pub encrypted: bool,
  pub expirable: bool,
  pub lifetime_millis: Option<u64>,
  pub force_evict: bool,
  pub detail_response: bool,
  pub stale_fallback: StaleFallback,
  pub loader: LoaderKind,
}

pub enum Script {
  /// Drive the loader and answer with its value. The placeholder is
  /// reported as a wrapped loader failure.
  Echo,
  /// Answer with a bare value even when a reply was requested.
  IgnoreDetail,
  Fail(fn() -> EngineError),
  Empty,
}

/// An engine double that records every configuration it receives.
pub struct ScriptedEngine {
  seen: Mutex<Vec<Seen>>,
  script: Script,
}

impl ScriptedEngine {
  pub fn new(script: Script) -> Self {
    Self {
      seen: Mutex::new(Vec::new()),
      script,
    }
  }

  pub fn seen(&self) -> Vec<Seen> {
    self.seen.lock().unwrap().clone()
  }

  pub fn last(&self) -> Seen {
    self.seen().pop().expect("no request was processed")
  }
}

impl ProcessorProviders for ScriptedEngine {
  fn process<T>(&self, mut config: Configuration<T>) -> BoxStream<'_, Result<Response<T>, EngineError>>
  where
    T: Clone + Send + Sync + 'static,
  {
    let loader = match config.loader() {
      Loader::Placeholder => LoaderKind::Placeholder,
      Loader::Eager(_) => LoaderKind::Eager,
      Loader::Deferred(_) => LoaderKind::Deferred,
    };
    self.seen.lock().unwrap().push(Seen {
      key: config.key().to_string(),
      encrypted: config.is_encrypted(),
      expirable: config.is_expirable(),
      lifetime_millis: config.lifetime_millis(),
      force_evict: config.evict().evict(),
      detail_response: config.detail_response(),
      stale_fallback: config.stale_fallback(),
      loader,
    });

    match &self.script {
      Script::Echo | Script::IgnoreDetail => {
        let detail = matches!(self.script, Script::Echo) && config.detail_response();
        let key = config.key().to_string();
        let encrypted = config.is_encrypted();
        let loader = config.take_loader();
        stream::once(async move {
          match loader.load().await {
            Ok(value) => Ok(Response::shaped(
              Reply::new(value, Source::Loader, encrypted, false),
              detail,
            )),
            Err(source) => Err(EngineError::Loader { key, source }),
          }
        })
        .boxed()
      }
      Script::Fail(make) => stream::once(futures_util::future::ready(Err(make()))).boxed(),
      Script::Empty => stream::empty().boxed(),
    }
  }

  fn evict_all(&self) -> BoxFuture<'_, Result<(), EngineError>> {
    async { Ok(()) }.boxed()
  }
}

pub fn scripted(script: Script) -> (Arc<ScriptedEngine>, ReactiveCache<ScriptedEngine>) {
  init_tracing();
  let engine = Arc::new(ScriptedEngine::new(script));
  (engine.clone(), ReactiveCache::from_arc(engine))
}

pub fn placeholder_as_loader_failure() -> EngineError {
  EngineError::Loader {
    key: "k".into(),
    source: Box::new(PlaceholderLoaderError),
  }
}

pub fn storage_fault() -> EngineError {
  EngineError::Internal {
    key: "k".into(),
    source: "disk full".into(),
  }
}
