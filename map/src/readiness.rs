// map/src/readiness.rs

use std::future::Future;
use std::time::Duration;

/// Suspends until `ready()` holds, checking every `interval`.
///
/// There is no timeout: a slow asset load just means a longer wait. Returns
/// the number of failed checks before success.
pub async fn wait_until_ready<P, S, F>(mut ready: P, interval: Duration, mut sleep: S) -> u32
where
    P: FnMut() -> bool,
    S: FnMut(Duration) -> F,
    F: Future<Output = ()>,
{
    let mut misses = 0u32;
    while !ready() {
        misses = misses.saturating_add(1);
        sleep(interval).await;
    }
    misses
}
