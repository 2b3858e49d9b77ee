//! Configuration for deadlines.

use super::events::DeadlineEvent;
use super::{race, DeadlineLayer, DeadlineObserver};
use crate::notifier::Notifier;
use patience_core::{EventListeners, TimeoutError};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the deadline wrapper.
#[derive(Clone)]
pub struct DeadlineConfig {
    pub(crate) limit: Duration,
    pub(crate) cancel_running_future: bool,
    pub(crate) event_listeners: EventListeners<DeadlineEvent>,
    pub(crate) name: String,
}

impl DeadlineConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> DeadlineConfigBuilder {
        DeadlineConfigBuilder::new()
    }

    /// The time limit. Zero disables timing.
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Instance name used in events, logs and metrics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes `task` and races its outcome against this deadline.
    pub fn deadline<F, Fut, T, E>(&self, task: F) -> Notifier<T, E, DeadlineObserver>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: From<TimeoutError> + Send + 'static,
    {
        race(Arc::new(self.clone()), task())
    }

    /// Wraps this configuration in a tower layer.
    pub fn layer(self) -> DeadlineLayer {
        DeadlineLayer::new(self)
    }
}

impl Default for DeadlineConfig {
    fn default() -> Self {
        DeadlineConfigBuilder::new().build()
    }
}

impl fmt::Debug for DeadlineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeadlineConfig")
            .field("name", &self.name)
            .field("limit", &self.limit)
            .field("cancel_running_future", &self.cancel_running_future)
            .field("event_listeners", &self.event_listeners)
            .finish()
    }
}

/// Builder for configuring and constructing a deadline.
pub struct DeadlineConfigBuilder {
    limit: Duration,
    cancel_running_future: bool,
    event_listeners: EventListeners<DeadlineEvent>,
    name: String,
}

impl DeadlineConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            limit: Duration::ZERO,
            cancel_running_future: false,
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Sets the time limit.
    ///
    /// Default: zero, meaning no timer is applied and the task's outcome is
    /// forwarded untouched. A zero limit also bypasses every listener and
    /// metric: `on_success`, `on_error` and `on_timeout` never fire.
    pub fn limit(mut self, limit: Duration) -> Self {
        self.limit = limit;
        self
    }

    /// Sets whether the task is dropped when the deadline fires.
    ///
    /// When false, the task is spawned onto the runtime and keeps running to
    /// completion after the deadline has already failed the caller; its
    /// result is discarded. When true, the task is dropped on timeout.
    ///
    /// Default: false
    pub fn cancel_running_future(mut self, cancel: bool) -> Self {
        self.cancel_running_future = cancel;
        self
    }

    /// Sets the name of this deadline instance for observability.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback to be invoked when the task succeeds in time.
    ///
    /// Only fires when a non-zero [`limit`](Self::limit) is set.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.on(DeadlineEvent::succeeded, f);
        self
    }

    /// Registers a callback to be invoked when the task fails in time.
    ///
    /// Only fires when a non-zero [`limit`](Self::limit) is set.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.on(DeadlineEvent::failed, f);
        self
    }

    /// Registers a callback to be invoked with the limit when the deadline
    /// fires.
    pub fn on_timeout<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.on(DeadlineEvent::timed_out, f);
        self
    }

    /// Builds the deadline configuration.
    pub fn build(self) -> DeadlineConfig {
        DeadlineConfig {
            limit: self.limit,
            cancel_running_future: self.cancel_running_future,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }
}

impl Default for DeadlineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
