use fibre_reactive_cache::{MemoryEngine, ReactiveCache};
use std::io;
use tokio::time::{sleep, Duration};

// A simulated slow external service.
async fn fetch_user_name(id: u32) -> Result<String, io::Error> {
  println!("--- Backend: loading user {}...", id);
  sleep(Duration::from_millis(200)).await;
  Ok(format!("user-{}", id))
}

#[tokio::main]
async fn main() {
  let cache = ReactiveCache::new(MemoryEngine::new());
  let user = cache
    .provider::<String>()
    .life_cache(Duration::from_secs(60))
    .with_key("user:42")
    .expect("Failed to bind provider");

  match user.read().await {
    Ok(name) => println!("Cached: {}", name),
    Err(err) => println!("Nothing cached yet: {}", err),
  }

  let name = user
    .read_with_loader(fetch_user_name(42))
    .await
    .expect("Loader failed");
  println!("Loaded: {}", name);

  // Served from the cache, the backend is not called again.
  let reply = user
    .read_with_loader_as_reply(fetch_user_name(42))
    .await
    .expect("Read failed");
  println!("Again: {} (source: {})", reply.data(), reply.source());

  user
    .replace("renamed".to_string())
    .await
    .expect("Replace failed");
  println!("After replace: {}", user.read().await.expect("Read failed"));

  user.evict().await.expect("Evict failed");
  println!("After evict, read fails: {}", user.read().await.is_err());

  println!("\nEngine metrics: {:?}", cache.processor().metrics());
}
