//! Retry with constant or exponential backoff.
//!
//! The task is invoked once right away, when the retry is set up, then
//! re-invoked after each failure until it succeeds or the schedule runs out.
//! The initial attempt does not count as a retry, so `retries = 3` allows up
//! to four invocations.
//!
//! Per failure, in this order:
//! 1. `completed` is incremented,
//! 2. the observer gets a copy of the context and a reference to the failure,
//! 3. the front interval is taken off the queue and waited,
//! 4. the task is invoked again.
//!
//! When no retries remain the failure is returned as is: the caller gets the
//! very value the last attempt produced.

mod backoff;
mod config;
mod context;
mod events;
mod layer;

pub use backoff::{
    schedule, BackoffType, ExponentialBackoff, FixedInterval, FnInterval, IntervalFunction,
};
pub use config::{RetryConfig, RetryConfigBuilder};
pub use context::RetryContext;
pub use events::RetryEvent;
pub use layer::RetryLayer;

pub use crate::notifier::RetryObserver;

use crate::notifier::{Notifier, ObserverSlot};
use patience_core::time::delay;
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tower::{Service, ServiceExt};

#[cfg(feature = "metrics")]
use metrics::{counter, histogram};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Retries `task` with the given backoff shape.
pub fn retry<F, Fut, T, E>(
    task: F,
    retries: usize,
    interval: Duration,
    backoff_type: BackoffType,
) -> Notifier<T, E, RetryObserver<E>>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    RetryConfig::builder()
        .retries(retries)
        .interval(interval)
        .backoff_type(backoff_type)
        .build()
        .retry(task)
}

/// Retries `task` up to `retries` times, waiting `interval` before each
/// retry.
///
/// ```
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// use patience::constant_retry;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let c = Arc::clone(&calls);
/// let value = constant_retry(
///     move || {
///         let n = c.fetch_add(1, Ordering::SeqCst);
///         async move { if n < 2 { Err("warming up") } else { Ok(n) } }
///     },
///     3,
///     Duration::from_secs(1),
/// )
/// .await;
///
/// assert_eq!(value, Ok(2));
/// assert_eq!(calls.load(Ordering::SeqCst), 3);
/// # }
/// ```
pub fn constant_retry<F, Fut, T, E>(
    task: F,
    retries: usize,
    interval: Duration,
) -> Notifier<T, E, RetryObserver<E>>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    retry(task, retries, interval, BackoffType::Constant)
}

/// Retries `task` up to `retries` times, waiting `interval × 2^i` before
/// retry `i`.
pub fn exponential_retry<F, Fut, T, E>(
    task: F,
    retries: usize,
    interval: Duration,
) -> Notifier<T, E, RetryObserver<E>>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    retry(task, retries, interval, BackoffType::Exponential)
}

/// Builds the future for one retry sequence and attaches its observer slot.
pub(crate) fn sequence<F, Fut, T, E>(
    config: Arc<RetryConfig>,
    mut task: F,
) -> Notifier<T, E, RetryObserver<E>>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let slot = ObserverSlot::for_retry();
    let observer = slot.clone();
    let mut pending = task();

    let future = async move {
        // Built on the first failure only.
        let mut context: Option<RetryContext> = None;

        loop {
            let error = match pending.await {
                Ok(value) => {
                    let attempts = context.as_ref().map_or(0, RetryContext::completed) + 1;
                    config.event_listeners.emit(&RetryEvent::Success {
                        name: config.name.clone(),
                        timestamp: Instant::now(),
                        attempts,
                    });

                    #[cfg(feature = "metrics")]
                    {
                        counter!("retry_calls_total", "retry" => config.name.clone(), "result" => "success").increment(1);
                        histogram!("retry_attempts", "retry" => config.name.clone()).record(attempts as f64);
                    }

                    #[cfg(feature = "tracing")]
                    debug!(retry = %config.name, attempts, "task succeeded");

                    return Ok(value);
                }
                Err(error) => error,
            };

            let context = context.get_or_insert_with(|| RetryContext::new(config.schedule()));
            let Some((snapshot, wait)) = context.advance() else {
                let attempts = context.completed() + 1;
                config.event_listeners.emit(&RetryEvent::Exhausted {
                    name: config.name.clone(),
                    timestamp: Instant::now(),
                    attempts,
                });

                #[cfg(feature = "metrics")]
                {
                    counter!("retry_calls_total", "retry" => config.name.clone(), "result" => "exhausted").increment(1);
                    histogram!("retry_attempts", "retry" => config.name.clone()).record(attempts as f64);
                }

                #[cfg(feature = "tracing")]
                warn!(retry = %config.name, attempts, "retries exhausted");

                return Err(error);
            };

            let attempt = snapshot.completed();
            config.event_listeners.emit(&RetryEvent::Retry {
                name: config.name.clone(),
                timestamp: Instant::now(),
                attempt,
                delay: wait,
            });

            #[cfg(feature = "metrics")]
            {
                counter!("retry_attempts_total", "retry" => config.name.clone()).increment(1);
            }

            #[cfg(feature = "tracing")]
            debug!(
                retry = %config.name,
                attempt,
                delay_ms = wait.as_millis() as u64,
                "attempt failed, retrying"
            );

            (observer.current())(snapshot, &error);
            drop(error);

            delay(wait).await;
            pending = task();
        }
    };

    Notifier::new(slot, Box::pin(future))
}

/// A Tower [`Service`] that retries failed requests.
///
/// Every call returns a [`Notifier`], so callers can still attach a
/// per-request observer on top of the layer's listeners.
pub struct Retry<S> {
    inner: S,
    config: Arc<RetryConfig>,
}

impl<S> Retry<S> {
    /// Creates a new `Retry` service wrapping the given service.
    pub fn new(inner: S, config: Arc<RetryConfig>) -> Self {
        Self { inner, config }
    }
}

impl<S> Clone for Retry<S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, Req> Service<Req> for Retry<S>
where
    S: Service<Req> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    S::Error: Send + 'static,
    Req: Clone + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Notifier<S::Response, S::Error, RetryObserver<S::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Each attempt drives readiness on its own clone.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let service = self.inner.clone();
        let task = move || service.clone().oneshot(req.clone());
        sequence(Arc::clone(&self.config), task)
    }
}
