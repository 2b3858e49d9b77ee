//! Timer primitives.
//!
//! Both functions are thin over tokio's timer and need a tokio runtime with
//! the time driver enabled.

use crate::error::TimeoutError;
use std::future::Future;
use std::time::Duration;

/// Completes after `duration` has elapsed.
///
/// A zero duration still yields to the scheduler once.
///
/// ```
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// use patience_core::time::delay;
/// use std::time::Duration;
///
/// let start = tokio::time::Instant::now();
/// delay(Duration::from_millis(250)).await;
/// assert!(start.elapsed() >= Duration::from_millis(250));
/// # }
/// ```
pub async fn delay(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Races `pending` against a timer of `limit`.
///
/// If `pending` settles first its outcome is returned as is. If the timer
/// wins, `pending` is dropped and the call fails with
/// `E::from(TimeoutError)`. Nothing is notified; this is the raw race the
/// `deadline` wrapper in `patience` builds on.
///
/// ```
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// use patience_core::{time::{delay, timeout}, TimeoutError};
/// use std::time::Duration;
///
/// let slow = async {
///     delay(Duration::from_secs(1)).await;
///     Ok::<_, TimeoutError>("late")
/// };
/// assert_eq!(timeout(slow, Duration::from_millis(500)).await, Err(TimeoutError));
/// # }
/// ```
pub async fn timeout<F, T, E>(pending: F, limit: Duration) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<TimeoutError>,
{
    match tokio::time::timeout(limit, pending).await {
        Ok(outcome) => outcome,
        Err(_elapsed) => {
            #[cfg(feature = "tracing")]
            tracing::trace!(limit_ms = limit.as_millis() as u64, "timer won the race");

            Err(E::from(TimeoutError))
        }
    }
}
