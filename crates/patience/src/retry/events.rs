use patience_core::ResilienceEvent;
use std::time::{Duration, Instant};

/// Events emitted by a retry sequence to the config's listeners.
#[derive(Debug, Clone)]
pub enum RetryEvent {
    /// An attempt failed and a retry is about to wait `delay`.
    Retry {
        /// The name of the retry instance.
        name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// 1-indexed retry number.
        attempt: usize,
        /// The backoff interval waited before this retry runs.
        delay: Duration,
    },
    /// The task succeeded.
    Success {
        /// The name of the retry instance.
        name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// Total invocations, including the initial attempt.
        attempts: usize,
    },
    /// Every retry was used and the last attempt failed too.
    Exhausted {
        /// The name of the retry instance.
        name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// Total invocations, including the initial attempt.
        attempts: usize,
    },
}

impl RetryEvent {
    /// `(attempt, delay)` of a [`Retry`](Self::Retry) event.
    pub fn retried(&self) -> Option<(usize, Duration)> {
        match self {
            RetryEvent::Retry { attempt, delay, .. } => Some((*attempt, *delay)),
            _ => None,
        }
    }

    /// Total invocations of a [`Success`](Self::Success) event.
    pub fn succeeded(&self) -> Option<usize> {
        match self {
            RetryEvent::Success { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    /// Total invocations of an [`Exhausted`](Self::Exhausted) event.
    pub fn exhausted(&self) -> Option<usize> {
        match self {
            RetryEvent::Exhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}

impl ResilienceEvent for RetryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RetryEvent::Retry { .. } => "retry",
            RetryEvent::Success { .. } => "success",
            RetryEvent::Exhausted { .. } => "exhausted",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RetryEvent::Retry { timestamp, .. }
            | RetryEvent::Success { timestamp, .. }
            | RetryEvent::Exhausted { timestamp, .. } => *timestamp,
        }
    }

    fn name(&self) -> &str {
        match self {
            RetryEvent::Retry { name, .. }
            | RetryEvent::Success { name, .. }
            | RetryEvent::Exhausted { name, .. } => name,
        }
    }
}
