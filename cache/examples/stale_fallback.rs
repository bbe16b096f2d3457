use fibre_reactive_cache::{MemoryEngine, ReactiveCache};
use std::io;
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() {
  // Serve expired data when a refresh fails, instead of surfacing the error.
  let engine = MemoryEngine::builder()
    .use_expired_data_if_loader_not_available(true)
    .build()
    .expect("Failed to build engine");
  let cache = ReactiveCache::new(engine);

  let rates = cache
    .provider::<f64>()
    .life_cache(Duration::from_millis(300))
    .with_key("rates:eur-usd")
    .expect("Failed to bind provider");

  rates.replace(1.08).await.expect("Replace failed");
  println!("Stored 1.08, waiting for it to expire...");
  sleep(Duration::from_millis(400)).await;

  let reply = rates
    .read_with_loader_as_reply(async {
      Err::<f64, _>(io::Error::new(io::ErrorKind::TimedOut, "rates service timed out"))
    })
    .await
    .expect("No fallback available");

  println!(
    "Got {} (source: {}, stale: {})",
    reply.data(),
    reply.source(),
    reply.is_stale()
  );
}
