//! Deadlines for async tasks.
//!
//! [`deadline`] races a task against a timer. If the timer wins, the caller
//! gets `E::from(TimeoutError)` and the registered observer is told which
//! limit elapsed. If the task settles first, its outcome goes through
//! unchanged and nobody is notified, even when the task itself failed with a
//! `TimeoutError`.
//!
//! By default the race does not cancel the task: it is spawned onto the
//! runtime and runs to completion in the background after the deadline has
//! fired. [`DeadlineConfigBuilder::cancel_running_future`] drops it instead.
//!
//! ```
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! use patience::{deadline, delay, TimeoutError};
//! use std::time::Duration;
//!
//! let result = deadline(
//!     || async {
//!         delay(Duration::from_secs(1)).await;
//!         Ok::<_, TimeoutError>("too late")
//!     },
//!     Duration::from_millis(500),
//! )
//! .set(|limit| eprintln!("gave up after {limit:?}"))
//! .await;
//!
//! assert_eq!(result, Err(TimeoutError));
//! # }
//! ```

mod config;
mod events;
mod layer;

pub use config::{DeadlineConfig, DeadlineConfigBuilder};
pub use events::DeadlineEvent;
pub use layer::DeadlineLayer;

pub use crate::notifier::DeadlineObserver;

use crate::notifier::{Notifier, ObserverSlot};
use futures::TryFutureExt;
use patience_core::time::timeout;
use patience_core::TimeoutError;
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tower::Service;

#[cfg(feature = "metrics")]
use metrics::{counter, histogram};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Invokes `task` and fails with `TimeoutError` if it has not settled within
/// `limit`. A zero `limit` applies no timer at all.
pub fn deadline<F, Fut, T, E>(task: F, limit: Duration) -> Notifier<T, E, DeadlineObserver>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: From<TimeoutError> + Send + 'static,
{
    DeadlineConfig::builder().limit(limit).build().deadline(task)
}

/// Outcome of the raw race, keeping a real timeout apart from a task that
/// failed with the sentinel on its own.
enum Raced<E> {
    Elapsed,
    Settled(E),
}

impl<E> From<TimeoutError> for Raced<E> {
    fn from(_: TimeoutError) -> Self {
        Raced::Elapsed
    }
}

pub(crate) fn race<Fut, T, E>(
    config: Arc<DeadlineConfig>,
    pending: Fut,
) -> Notifier<T, E, DeadlineObserver>
where
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: From<TimeoutError> + Send + 'static,
{
    let slot = ObserverSlot::for_deadline();
    let limit = config.limit;

    // No timer, so no events or metrics either.
    if limit.is_zero() {
        return Notifier::new(slot, Box::pin(pending));
    }

    let observer = slot.clone();
    let future = async move {
        let start = tokio::time::Instant::now();
        let pending = pending.map_err(Raced::Settled);

        let outcome = if config.cancel_running_future {
            timeout(pending, limit).await
        } else {
            timeout(detached(pending), limit).await
        };

        match outcome {
            Ok(value) => {
                let duration = start.elapsed();
                config.event_listeners.emit(&DeadlineEvent::Success {
                    name: config.name.clone(),
                    timestamp: Instant::now(),
                    duration,
                });

                #[cfg(feature = "metrics")]
                {
                    counter!("deadline_calls_total", "deadline" => config.name.clone(), "result" => "success").increment(1);
                    histogram!("deadline_call_duration_seconds", "deadline" => config.name.clone())
                        .record(duration.as_secs_f64());
                }

                #[cfg(feature = "tracing")]
                debug!(
                    deadline = %config.name,
                    duration_ms = duration.as_millis() as u64,
                    "task succeeded within deadline"
                );

                Ok(value)
            }
            Err(Raced::Settled(error)) => {
                let duration = start.elapsed();
                config.event_listeners.emit(&DeadlineEvent::Error {
                    name: config.name.clone(),
                    timestamp: Instant::now(),
                    duration,
                });

                #[cfg(feature = "metrics")]
                {
                    counter!("deadline_calls_total", "deadline" => config.name.clone(), "result" => "error").increment(1);
                    histogram!("deadline_call_duration_seconds", "deadline" => config.name.clone())
                        .record(duration.as_secs_f64());
                }

                #[cfg(feature = "tracing")]
                debug!(
                    deadline = %config.name,
                    duration_ms = duration.as_millis() as u64,
                    "task failed within deadline"
                );

                Err(error)
            }
            Err(Raced::Elapsed) => {
                config.event_listeners.emit(&DeadlineEvent::Timeout {
                    name: config.name.clone(),
                    timestamp: Instant::now(),
                    limit,
                });

                #[cfg(feature = "metrics")]
                {
                    counter!("deadline_calls_total", "deadline" => config.name.clone(), "result" => "timeout").increment(1);
                }

                #[cfg(feature = "tracing")]
                warn!(
                    deadline = %config.name,
                    timeout_ms = limit.as_millis() as u64,
                    "deadline elapsed"
                );

                (observer.current())(limit);

                Err(E::from(TimeoutError))
            }
        }
    };

    Notifier::new(slot, Box::pin(future))
}

/// Runs `pending` as its own task so that losing the race does not stop it.
async fn detached<Fut, T>(pending: Fut) -> T
where
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(pending).await {
        Ok(output) => output,
        Err(join_error) => match join_error.try_into_panic() {
            Ok(payload) => std::panic::resume_unwind(payload),
            // Only happens while the runtime shuts down; nothing will poll
            // this future again.
            Err(_cancelled) => std::future::pending().await,
        },
    }
}

/// A Tower [`Service`] that applies a deadline to an inner service.
#[derive(Clone)]
pub struct Deadline<S> {
    inner: S,
    config: Arc<DeadlineConfig>,
}

impl<S> Deadline<S> {
    /// Creates a new deadline service wrapping the given service.
    pub fn new(inner: S, config: Arc<DeadlineConfig>) -> Self {
        Self { inner, config }
    }
}

impl<S, Req> Service<Req> for Deadline<S>
where
    S: Service<Req>,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    S::Error: From<TimeoutError> + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Notifier<S::Response, S::Error, DeadlineObserver>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        race(Arc::clone(&self.config), self.inner.call(req))
    }
}
