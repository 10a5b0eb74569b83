//! Retry with a fixed backoff schedule.

use std::fmt::Display;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Retry an async operation, sleeping `delays[n]` seconds after the
/// n-th failure. Total attempts are `delays.len() + 1`; the last error
/// is returned when the schedule is exhausted.
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, delays: &[u64]) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0_usize;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let Some(delay) = delays.get(attempt) else {
                    return Err(e);
                };
                attempt += 1;
                warn!(
                    "Request failed (attempt {attempt}/{}): {e}. Retrying in {delay}s...",
                    delays.len() + 1
                );
                sleep(Duration::from_secs(*delay)).await;
            }
        }
    }
}
