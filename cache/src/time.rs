use once_cell::sync::Lazy;
use std::time::{Duration, Instant};

// The single reference point for all expiry bookkeeping in the engine.
// It is initialized lazily on its first use.
static ENGINE_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Converts an `Instant` into nanoseconds since the engine's epoch.
#[inline]
pub(crate) fn instant_to_nanos(instant: Instant) -> u64 {
  saturating_nanos(instant.saturating_duration_since(*ENGINE_EPOCH))
}

/// Nanoseconds in `duration`, clamped to `u64::MAX` (about 584 years).
#[inline]
pub(crate) fn saturating_nanos(duration: Duration) -> u64 {
  u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// The current time in nanoseconds since the epoch.
#[inline]
pub(crate) fn now_nanos() -> u64 {
  instant_to_nanos(Instant::now())
}

/// The absolute deadline for something that lives `lifetime` from now.
/// Always non-zero so that `0` can keep meaning "never expires".
#[inline]
pub(crate) fn deadline_after(lifetime: Duration) -> u64 {
  now_nanos()
    .saturating_add(saturating_nanos(lifetime))
    .max(1)
}
