//! Retries, backoff and deadlines for async tasks.
//!
//! - [`constant_retry`] / [`exponential_retry`]: re-run a failing task on a
//!   precomputed backoff schedule.
//! - [`deadline`]: fail a task with [`TimeoutError`] if it takes too long.
//! - [`timeout`] and [`delay`]: the raw timer primitives underneath.
//!
//! Retry and deadline return a [`Notifier`]: a future with one observer slot,
//! filled with [`Notifier::set`] before the future is awaited or chained.
//!
//! # Examples
//!
//! ```
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! use patience::{deadline, exponential_retry, TimeoutError};
//! use std::time::Duration;
//!
//! #[derive(Debug, PartialEq)]
//! enum FetchError {
//!     Unavailable,
//!     TimedOut,
//! }
//!
//! impl From<TimeoutError> for FetchError {
//!     fn from(_: TimeoutError) -> Self {
//!         FetchError::TimedOut
//!     }
//! }
//!
//! let outcome = exponential_retry(
//!     || deadline(|| async { Err::<u32, _>(FetchError::Unavailable) }, Duration::from_secs(2)),
//!     3,
//!     Duration::from_millis(100),
//! )
//! .set(|context, error| {
//!     let (retry, max) = context.attempts();
//!     println!("retry {retry}/{max} in {:?} after {error:?}", context.intervals()[0]);
//! })
//! .await;
//!
//! assert_eq!(outcome, Err(FetchError::Unavailable));
//! # }
//! ```
//!
//! # Tower
//!
//! Both patterns are also available as tower middleware: [`RetryLayer`] and
//! [`DeadlineLayer`]. Their services return a [`Notifier`] from `call`.
//!
//! # Feature Flags
//!
//! - `tracing`: structured logs for retries, exhaustion and timeouts
//! - `metrics`: counters and histograms through the `metrics` facade

pub mod deadline;
pub mod notifier;
pub mod retry;

pub use deadline::{
    deadline, Deadline, DeadlineConfig, DeadlineConfigBuilder, DeadlineEvent, DeadlineLayer,
    DeadlineObserver,
};
pub use notifier::Notifier;
pub use retry::{
    constant_retry, exponential_retry, retry, BackoffType, ExponentialBackoff, FixedInterval,
    FnInterval, IntervalFunction, Retry, RetryConfig, RetryConfigBuilder, RetryContext,
    RetryEvent, RetryLayer, RetryObserver,
};

pub use patience_core::time::{delay, timeout};
pub use patience_core::{is_timeout, TimeoutError};
