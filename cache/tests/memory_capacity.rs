mod common;

use common::init_tracing;
use fibre_reactive_cache::{BuildError, MemoryEngine, ReactiveCache};
use tokio::time::{sleep, Duration};

fn bounded(max_entries: usize) -> ReactiveCache<MemoryEngine> {
  init_tracing();
  ReactiveCache::new(
    MemoryEngine::builder()
      .shards(2)
      .max_entries(max_entries)
      .build()
      .unwrap(),
  )
}

#[test]
fn test_zero_capacity_is_rejected() {
  let err = MemoryEngine::builder().max_entries(0).build().unwrap_err();
  assert_eq!(err, BuildError::ZeroCapacity);
}

#[tokio::test]
async fn test_oldest_expirable_entry_is_dropped() {
  let cache = bounded(2);
  let providers: Vec<_> = (0..3)
    .map(|i| cache.provider::<u32>().with_key(format!("item:{i}")).unwrap())
    .collect();

  for (i, provider) in providers.iter().enumerate() {
    provider.replace(i as u32).await.unwrap();
    // Distinct write timestamps.
    sleep(Duration::from_millis(2)).await;
  }

  assert!(providers[0].read().await.unwrap_err().is_no_cached_value());
  assert_eq!(providers[1].read().await.unwrap(), 1);
  assert_eq!(providers[2].read().await.unwrap(), 2);

  let metrics = cache.processor().metrics();
  assert_eq!(metrics.evicted_by_capacity, 1);
  assert_eq!(metrics.current_entries, 2);
}

#[tokio::test]
async fn test_non_expirable_entries_survive_pressure() {
  let cache = bounded(1);
  let pinned = cache
    .provider::<String>()
    .expirable(false)
    .with_key("pinned")
    .unwrap();
  let scratch = cache.provider::<String>().with_key("scratch").unwrap();
  let other = cache.provider::<String>().with_key("other").unwrap();

  pinned.replace("keep me".to_string()).await.unwrap();
  sleep(Duration::from_millis(2)).await;
  scratch.replace("first".to_string()).await.unwrap();
  sleep(Duration::from_millis(2)).await;
  other.replace("second".to_string()).await.unwrap();

  assert_eq!(pinned.read().await.unwrap(), "keep me");
  assert!(scratch.read().await.unwrap_err().is_no_cached_value());
  assert_eq!(other.read().await.unwrap(), "second");
}

#[tokio::test]
async fn test_only_non_expirable_entries_may_exceed_capacity() {
  let cache = bounded(1);
  let a = cache.provider::<u8>().expirable(false).with_key("a").unwrap();
  let b = cache.provider::<u8>().expirable(false).with_key("b").unwrap();

  a.replace(1).await.unwrap();
  b.replace(2).await.unwrap();

  assert_eq!(a.read().await.unwrap(), 1);
  assert_eq!(b.read().await.unwrap(), 2);
  assert_eq!(cache.processor().len(), 2);
}
