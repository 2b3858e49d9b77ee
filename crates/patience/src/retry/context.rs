use std::collections::VecDeque;
use std::time::Duration;

/// Progress of one retry sequence.
///
/// `attempts` is `(completed, max)`: how many retries have been started and
/// how many are allowed. `intervals` is the part of the schedule not yet
/// waited. Both move together: each retry increments `completed` and takes
/// one interval off the front.
///
/// The engine owns the live context. Observers get a copy taken after
/// `completed` is incremented and before the interval is taken, so the
/// front of [`intervals`](Self::intervals) is the wait about to happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryContext {
    completed: usize,
    max: usize,
    intervals: VecDeque<Duration>,
}

impl RetryContext {
    /// Starts a sequence that allows one retry per scheduled interval.
    pub fn new(schedule: VecDeque<Duration>) -> Self {
        Self {
            completed: 0,
            max: schedule.len(),
            intervals: schedule,
        }
    }

    /// `(completed, max)` retry counters.
    pub fn attempts(&self) -> (usize, usize) {
        (self.completed, self.max)
    }

    /// Retries started so far.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Retries allowed in total.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Remaining backoff intervals, front first.
    pub fn intervals(&self) -> &VecDeque<Duration> {
        &self.intervals
    }

    /// True once every allowed retry has been started.
    pub fn is_exhausted(&self) -> bool {
        self.completed >= self.max
    }

    /// Starts the next retry.
    ///
    /// Returns the observer's snapshot and the interval to wait, or `None`
    /// when the sequence is exhausted.
    pub(crate) fn advance(&mut self) -> Option<(RetryContext, Duration)> {
        if self.is_exhausted() {
            return None;
        }
        self.completed += 1;
        let snapshot = self.clone();
        let wait = self.intervals.pop_front()?;
        Some((snapshot, wait))
    }
}
