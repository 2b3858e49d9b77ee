use super::backoff::{schedule, BackoffType, IntervalFunction};
use super::events::RetryEvent;
use super::{sequence, RetryLayer, RetryObserver};
use crate::notifier::Notifier;
use patience_core::events::EventListeners;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for a retry sequence.
///
/// Reusable: every call to [`retry`](Self::retry) starts a fresh sequence
/// with its own context.
#[derive(Clone)]
pub struct RetryConfig {
    pub(crate) retries: usize,
    pub(crate) interval_fn: Arc<dyn IntervalFunction>,
    pub(crate) event_listeners: EventListeners<RetryEvent>,
    pub(crate) name: String,
}

impl RetryConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Number of retries allowed after the initial attempt.
    pub fn retries(&self) -> usize {
        self.retries
    }

    /// Instance name used in events, logs and metrics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The interval queue a new sequence starts with.
    pub fn schedule(&self) -> VecDeque<Duration> {
        schedule(self.interval_fn.as_ref(), self.retries)
    }

    /// Runs `task` under this configuration.
    ///
    /// `task` is invoked once before this returns; the returned future
    /// drives that attempt and any retries.
    ///
    /// ```
    /// # #[tokio::main(flavor = "current_thread", start_paused = true)]
    /// # async fn main() {
    /// use patience::RetryConfig;
    /// use std::time::Duration;
    ///
    /// let config = RetryConfig::builder()
    ///     .retries(4)
    ///     .exponential_backoff(Duration::from_millis(50))
    ///     .name("flaky-upstream")
    ///     .build();
    ///
    /// let outcome = config.retry(|| async { Ok::<_, std::io::Error>(42) }).await;
    /// assert_eq!(outcome.unwrap(), 42);
    /// # }
    /// ```
    pub fn retry<F, Fut, T, E>(&self, task: F) -> Notifier<T, E, RetryObserver<E>>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        sequence(Arc::new(self.clone()), task)
    }

    /// Wraps this configuration in a tower layer.
    pub fn layer(self) -> RetryLayer {
        RetryLayer::new(self)
    }
}

impl Default for RetryConfig {
    /// One retry, 1000 ms apart.
    fn default() -> Self {
        RetryConfigBuilder::new().build()
    }
}

impl fmt::Debug for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("name", &self.name)
            .field("retries", &self.retries)
            .field("event_listeners", &self.event_listeners)
            .finish_non_exhaustive()
    }
}

/// Builder for [`RetryConfig`].
pub struct RetryConfigBuilder {
    retries: usize,
    interval: Duration,
    backoff_type: BackoffType,
    custom_backoff: Option<Arc<dyn IntervalFunction>>,
    event_listeners: EventListeners<RetryEvent>,
    name: String,
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryConfigBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - retries: 1
    /// - interval: 1000 ms
    /// - backoff: constant
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            retries: 1,
            interval: Duration::from_millis(1000),
            backoff_type: BackoffType::Constant,
            custom_backoff: None,
            event_listeners: EventListeners::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets how many times a failing task is re-run after the initial
    /// attempt. Zero means the task runs exactly once.
    ///
    /// The whole interval queue is allocated on the first failure, one
    /// `Duration` per retry, so `retries` is bounded in practice by memory.
    /// A task that succeeds on its first attempt allocates nothing.
    pub fn retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the base interval, keeping the current backoff shape.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Selects one of the built-in backoff shapes.
    pub fn backoff_type(mut self, backoff_type: BackoffType) -> Self {
        self.backoff_type = backoff_type;
        self.custom_backoff = None;
        self
    }

    /// Waits `interval` before every retry.
    pub fn constant_backoff(self, interval: Duration) -> Self {
        self.interval(interval).backoff_type(BackoffType::Constant)
    }

    /// Waits `interval × 2^i` before retry `i`.
    pub fn exponential_backoff(self, interval: Duration) -> Self {
        self.interval(interval).backoff_type(BackoffType::Exponential)
    }

    /// Uses a custom interval function. Overrides `interval` and
    /// `backoff_type`.
    pub fn backoff<I>(mut self, interval_fn: I) -> Self
    where
        I: IntervalFunction + 'static,
    {
        self.custom_backoff = Some(Arc::new(interval_fn));
        self
    }

    /// Sets the name for this retry instance (used in events).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback run before each retry's delay.
    ///
    /// # Callback Signature
    /// `Fn(usize, Duration)`: the 1-indexed retry number and the delay about
    /// to be waited.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.event_listeners
            .on(RetryEvent::retried, move |(attempt, delay)| f(attempt, delay));
        self
    }

    /// Registers a callback run when the task succeeds.
    ///
    /// # Callback Signature
    /// `Fn(usize)`: total invocations, so 1 means success on the first try.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.on(RetryEvent::succeeded, f);
        self
    }

    /// Registers a callback run when the last allowed attempt fails.
    ///
    /// # Callback Signature
    /// `Fn(usize)`: total invocations, always `retries + 1`.
    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.on(RetryEvent::exhausted, f);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> RetryConfig {
        let interval_fn = self
            .custom_backoff
            .unwrap_or_else(|| self.backoff_type.interval_function(self.interval));

        RetryConfig {
            retries: self.retries,
            interval_fn,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }
}
