//! Event types for deadlines.

use patience_core::ResilienceEvent;
use std::time::{Duration, Instant};

/// Events emitted by a deadline to the config's listeners.
#[derive(Debug, Clone)]
pub enum DeadlineEvent {
    /// The task succeeded before the limit.
    Success {
        /// The name of the deadline instance.
        name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// How long the task took.
        duration: Duration,
    },
    /// The task failed before the limit.
    Error {
        /// The name of the deadline instance.
        name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// How long before the failure arrived.
        duration: Duration,
    },
    /// The limit elapsed first.
    Timeout {
        /// The name of the deadline instance.
        name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// The configured limit.
        limit: Duration,
    },
}

impl DeadlineEvent {
    /// Duration of a [`Success`](Self::Success) event.
    pub fn succeeded(&self) -> Option<Duration> {
        match self {
            DeadlineEvent::Success { duration, .. } => Some(*duration),
            _ => None,
        }
    }

    /// Duration of an [`Error`](Self::Error) event.
    pub fn failed(&self) -> Option<Duration> {
        match self {
            DeadlineEvent::Error { duration, .. } => Some(*duration),
            _ => None,
        }
    }

    /// Limit of a [`Timeout`](Self::Timeout) event.
    pub fn timed_out(&self) -> Option<Duration> {
        match self {
            DeadlineEvent::Timeout { limit, .. } => Some(*limit),
            _ => None,
        }
    }
}

impl ResilienceEvent for DeadlineEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DeadlineEvent::Success { .. } => "success",
            DeadlineEvent::Error { .. } => "error",
            DeadlineEvent::Timeout { .. } => "timeout",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            DeadlineEvent::Success { timestamp, .. }
            | DeadlineEvent::Error { timestamp, .. }
            | DeadlineEvent::Timeout { timestamp, .. } => *timestamp,
        }
    }

    fn name(&self) -> &str {
        match self {
            DeadlineEvent::Success { name, .. }
            | DeadlineEvent::Error { name, .. }
            | DeadlineEvent::Timeout { name, .. } => name,
        }
    }
}
