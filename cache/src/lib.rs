//! Per-key cache providers over a pluggable cache-processing engine.
//!
//! A `Provider` is bound to a single key and a frozen policy (encryption,
//! expirability, lifetime). Each of its operations resolves an access mode
//! into one `Configuration`, hands it to a `ProcessorProviders` engine and
//! adapts the engine's answer:
//!
//! - **`read`**: serve what is cached, or fail with `NoCachedValue`.
//! - **`read_with_loader`**: serve what is cached, or load, store and return.
//! - **`replace`**: discard what is cached and store a new value.
//! - **`evict`**: discard what is cached; never fails for lack of data.
//! - **`*_as_reply`**: the same, with the value wrapped in a `Reply` that
//!   tells where it came from.
//!
//! All operations are lazy `async fn`s and the crate is runtime-agnostic.
//! `MemoryEngine` is an in-process engine for applications and tests that do
//! not need persistence.
//!
//! ```
//! use fibre_reactive_cache::{MemoryEngine, ReactiveCache};
//! use std::time::Duration;
//!
//! # futures_executor::block_on(async {
//! let cache = ReactiveCache::new(MemoryEngine::new());
//! let user = cache
//!   .provider::<String>()
//!   .life_cache(Duration::from_secs(60))
//!   .with_key("user:42")
//!   .unwrap();
//!
//! assert!(user.read().await.unwrap_err().is_no_cached_value());
//! let name = user
//!   .read_with_loader(async { Ok::<_, std::io::Error>("Alice".to_string()) })
//!   .await
//!   .unwrap();
//! assert_eq!(name, "Alice");
//! assert_eq!(user.read().await.unwrap(), "Alice");
//! # });
//! ```

// Public modules that form the API
pub mod builder;
pub mod configuration;
pub mod engine;
pub mod error;
pub mod loader;
pub mod memory;
pub mod metrics;
pub mod policy;
pub mod provider;
pub mod reactive;
pub mod reply;

#[cfg(feature = "serde")]
pub mod config;

// Internal, crate-only modules
mod adapter;
mod assembler;
mod entry;
mod gate;
mod store;
mod time;

// Re-export the primary user-facing types for convenience
pub use builder::ProviderBuilder;
pub use configuration::{Configuration, EvictDynamicKey, StaleFallback};
pub use engine::{ProcessorProviders, Response};
pub use error::{BoxError, BuildError, EngineError, PlaceholderLoaderError, ProviderError};
pub use loader::Loader;
pub use memory::{MemoryEngine, MemoryEngineBuilder};
pub use metrics::MetricsSnapshot;
pub use policy::Policy;
pub use provider::Provider;
pub use reactive::ReactiveCache;
pub use reply::{Reply, Source};

#[cfg(feature = "serde")]
pub use config::ProviderConfig;
#[cfg(feature = "serde")]
pub use error::ConfigError;
