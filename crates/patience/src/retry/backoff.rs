//! Backoff schedules.
//!
//! A retry sequence consumes a precomputed queue of intervals, one per
//! retry. The queue is built up front from an [`IntervalFunction`], so the
//! whole schedule is known (and observable) before the first attempt runs.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Computes the wait before a retry.
pub trait IntervalFunction: Send + Sync {
    /// Delay before retry number `retry` (0-indexed, so the first retry is 0).
    fn next_interval(&self, retry: usize) -> Duration;
}

/// The two built-in schedule shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackoffType {
    /// Every retry waits the same interval.
    #[default]
    Constant,
    /// Retry `i` waits `interval × 2^i`.
    Exponential,
}

impl BackoffType {
    /// Returns the interval function for this shape with base `interval`.
    pub fn interval_function(self, interval: Duration) -> Arc<dyn IntervalFunction> {
        match self {
            BackoffType::Constant => Arc::new(FixedInterval::new(interval)),
            BackoffType::Exponential => Arc::new(ExponentialBackoff::new(interval)),
        }
    }

    /// Builds the full schedule for `retries` retries.
    ///
    /// ```
    /// use patience::BackoffType;
    /// use std::time::Duration;
    ///
    /// let ms = Duration::from_millis;
    /// assert_eq!(BackoffType::Constant.schedule(3, ms(1000)), [ms(1000), ms(1000), ms(1000)]);
    /// assert_eq!(BackoffType::Exponential.schedule(3, ms(1000)), [ms(1000), ms(2000), ms(4000)]);
    /// assert!(BackoffType::Exponential.schedule(0, ms(1000)).is_empty());
    /// ```
    pub fn schedule(self, retries: usize, interval: Duration) -> VecDeque<Duration> {
        schedule(self.interval_function(interval).as_ref(), retries)
    }
}

/// Builds a schedule of `retries` intervals from any interval function.
pub fn schedule(interval_fn: &dyn IntervalFunction, retries: usize) -> VecDeque<Duration> {
    (0..retries).map(|retry| interval_fn.next_interval(retry)).collect()
}

/// Same duration for every retry.
#[derive(Debug, Clone)]
pub struct FixedInterval {
    duration: Duration,
}

impl FixedInterval {
    /// Creates a fixed interval.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl IntervalFunction for FixedInterval {
    fn next_interval(&self, _retry: usize) -> Duration {
        self.duration
    }
}

/// Exponential growth by an integer multiplier, optionally capped.
///
/// Growth saturates at `Duration::MAX` rather than overflowing.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_interval: Duration,
    multiplier: u32,
    max_interval: Option<Duration>,
}

impl ExponentialBackoff {
    /// Creates an exponential backoff that doubles on each retry.
    pub fn new(initial_interval: Duration) -> Self {
        Self {
            initial_interval,
            multiplier: 2,
            max_interval: None,
        }
    }

    /// Sets the growth factor.
    pub fn multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Caps every interval at `max_interval`.
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = Some(max_interval);
        self
    }
}

impl IntervalFunction for ExponentialBackoff {
    fn next_interval(&self, retry: usize) -> Duration {
        let interval = u32::try_from(retry)
            .ok()
            .and_then(|exp| self.multiplier.checked_pow(exp))
            .and_then(|factor| self.initial_interval.checked_mul(factor))
            .unwrap_or(Duration::MAX);

        match self.max_interval {
            Some(max) => interval.min(max),
            None => interval,
        }
    }
}

/// Interval computed by a closure.
pub struct FnInterval<F> {
    f: F,
}

impl<F> FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    /// Wraps `f`, which receives the 0-indexed retry number.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> IntervalFunction for FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    fn next_interval(&self, retry: usize) -> Duration {
        (self.f)(retry)
    }
}
