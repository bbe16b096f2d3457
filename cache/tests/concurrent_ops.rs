mod common;

use common::memory_cache;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Barrier;
use tokio::time::{sleep, timeout, Duration};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_loaders_on_one_key_load_once() {
  let cache = memory_cache();
  let provider = cache.provider::<u64>().with_key("counter").unwrap();
  let load_count = Arc::new(AtomicUsize::new(0));
  let num_tasks = 16;
  let barrier = Arc::new(Barrier::new(num_tasks));

  let mut tasks = vec![];
  for _ in 0..num_tasks {
    let provider = provider.clone();
    let barrier = barrier.clone();
    let load_count = load_count.clone();
    tasks.push(tokio::spawn(async move {
      barrier.wait().await;
      provider
        .read_with_loader(async move {
          // Simulate a slow backend.
          sleep(Duration::from_millis(50)).await;
          load_count.fetch_add(1, Ordering::SeqCst);
          Ok::<_, io::Error>(99)
        })
        .await
        .unwrap()
    }));
  }

  for task in tasks {
    assert_eq!(task.await.unwrap(), 99);
  }

  assert_eq!(
    load_count.load(Ordering::SeqCst),
    1,
    "requests for one key must be serialized by the engine"
  );
  let metrics = cache.processor().metrics();
  assert_eq!(metrics.loads, 1);
  assert_eq!(metrics.hits, (num_tasks - 1) as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_different_keys_do_not_wait_on_each_other() {
  let cache = memory_cache();
  let slow = cache.provider::<u8>().with_key("slow").unwrap();
  let fast = cache.provider::<u8>().with_key("fast").unwrap();

  let slow_task = tokio::spawn(async move {
    slow
      .read_with_loader(async {
        sleep(Duration::from_millis(500)).await;
        Ok::<_, io::Error>(1)
      })
      .await
  });

  // Give the slow load time to take its key.
  sleep(Duration::from_millis(20)).await;
  let fast_result = timeout(Duration::from_millis(250), fast.replace(2)).await;
  assert_eq!(fast_result.expect("fast key was blocked").unwrap(), 2);

  assert_eq!(slow_task.await.unwrap().unwrap(), 1);
}

#[tokio::test]
async fn test_cancelled_load_stores_nothing_and_releases_key() {
  let cache = memory_cache();
  let provider = cache.provider::<String>().with_key("report").unwrap();

  let cancelled = timeout(
    Duration::from_millis(20),
    provider.read_with_loader(async {
      sleep(Duration::from_secs(60)).await;
      Ok::<_, io::Error>("never".to_string())
    }),
  )
  .await;
  assert!(cancelled.is_err(), "the load should have timed out");

  // The key is free again and nothing was written.
  let read = timeout(Duration::from_millis(250), provider.read()).await;
  assert!(read.expect("key stayed locked").unwrap_err().is_no_cached_value());

  provider.replace("done".to_string()).await.unwrap();
  assert_eq!(provider.read().await.unwrap(), "done");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_evict_and_replace_leave_a_consistent_slot() {
  let cache = memory_cache();
  let provider = cache.provider::<u32>().with_key("slot").unwrap();
  let barrier = Arc::new(Barrier::new(8));

  let mut tasks = vec![];
  for i in 0..8u32 {
    let provider = provider.clone();
    let barrier = barrier.clone();
    tasks.push(tokio::spawn(async move {
      barrier.wait().await;
      if i % 2 == 0 {
        provider.evict().await.unwrap();
      } else {
        provider.replace(i).await.unwrap();
      }
    }));
  }
  for task in tasks {
    task.await.unwrap();
  }

  match provider.read().await {
    Ok(value) => assert_eq!(value % 2, 1),
    Err(err) => assert!(err.is_no_cached_value(), "unexpected error: {err:?}"),
  }
  let entries = cache.processor().metrics().current_entries;
  assert!(entries <= 1);
}
