//! The observer attachment returned by [`retry`](crate::retry()) and
//! [`deadline`](crate::deadline()).
//!
//! A [`Notifier`] is a future plus one observer slot. The slot starts out as
//! a no-op; [`set`](Notifier::set) replaces it and hands the notifier back so
//! registration chains with the call that produced it:
//!
//! ```
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! use patience::constant_retry;
//! use std::time::Duration;
//!
//! let result = constant_retry(|| async { Err::<(), _>("nope") }, 2, Duration::from_millis(100))
//!     .set(|context, error| println!("retry {:?} after {error}", context.attempts()))
//!     .await;
//! assert_eq!(result, Err("nope"));
//! # }
//! ```
//!
//! # Only the returned value carries the slot
//!
//! `Notifier` is a plain [`Future`], so every combinator works on it. The
//! future a combinator returns wraps the notifier but does not expose `set`:
//! observers must be registered before the chain is extended.
//!
//! ```compile_fail
//! use futures::TryFutureExt;
//! use patience::constant_retry;
//! use std::time::Duration;
//!
//! let chained = constant_retry(|| async { Ok::<u32, ()>(1) }, 1, Duration::from_millis(10))
//!     .map_ok(|v| v + 1);
//! let _ = chained.set(|_, _| {});
//! ```
//!
//! # Callability is checked at compile time
//!
//! Tasks and observers are bounded by `Fn*` traits, so passing something
//! that cannot be called is rejected before any future exists:
//!
//! ```compile_fail
//! use patience::constant_retry;
//! use std::time::Duration;
//!
//! let _ = constant_retry("not a function", 1, Duration::from_millis(10));
//! ```
//!
//! ```compile_fail
//! use patience::deadline;
//! use std::time::Duration;
//!
//! let _ = deadline("not a function", Duration::from_millis(1));
//! ```
//!
//! ```compile_fail
//! use patience::constant_retry;
//! use std::time::Duration;
//!
//! let _ = constant_retry(|| async { Ok::<(), ()>(()) }, 1, Duration::from_millis(10))
//!     .set("not a function");
//! ```

use crate::retry::RetryContext;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

/// Observer signature for retry sequences: a private copy of the context and
/// the failure that triggered the retry.
pub type RetryObserver<E> = dyn Fn(RetryContext, &E) + Send + Sync;

/// Observer signature for deadlines: the limit that elapsed.
pub type DeadlineObserver = dyn Fn(Duration) + Send + Sync;

/// Shared cell holding the current observer.
///
/// The engine reads it once per notification and calls the observer without
/// holding the lock.
pub(crate) struct ObserverSlot<O: ?Sized> {
    current: Arc<Mutex<Arc<O>>>,
}

impl<O: ?Sized> ObserverSlot<O> {
    pub(crate) fn new(initial: Arc<O>) -> Self {
        Self {
            current: Arc::new(Mutex::new(initial)),
        }
    }

    pub(crate) fn replace(&self, observer: Arc<O>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = observer;
    }

    pub(crate) fn current(&self) -> Arc<O> {
        Arc::clone(&self.current.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl<O: ?Sized> Clone for ObserverSlot<O> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
        }
    }
}

impl<E: 'static> ObserverSlot<RetryObserver<E>> {
    pub(crate) fn for_retry() -> Self {
        Self::new(Arc::new(|_: RetryContext, _: &E| {}))
    }
}

impl ObserverSlot<DeadlineObserver> {
    pub(crate) fn for_deadline() -> Self {
        Self::new(Arc::new(|_: Duration| {}))
    }
}

/// A pending result with a single observer slot attached.
///
/// Await it directly, or register an observer first with `set`. See the
/// [module docs](self) for the contract.
pub struct Notifier<T, E, O: ?Sized> {
    future: BoxFuture<'static, Result<T, E>>,
    slot: ObserverSlot<O>,
}

impl<T, E, O: ?Sized> Notifier<T, E, O> {
    pub(crate) fn new(slot: ObserverSlot<O>, future: BoxFuture<'static, Result<T, E>>) -> Self {
        Self { future, slot }
    }

    /// Drops the observer slot and returns the bare future.
    ///
    /// Any observer registered so far stays in effect.
    pub fn into_inner(self) -> BoxFuture<'static, Result<T, E>> {
        self.future
    }
}

impl<T, E: 'static> Notifier<T, E, RetryObserver<E>> {
    /// Registers the retry observer, replacing any previous one.
    ///
    /// The observer runs once per retry, after the failed attempt and before
    /// the backoff delay. It receives a copy of the context, so nothing it
    /// does can change how the sequence continues.
    pub fn set<F>(self, observer: F) -> Self
    where
        F: Fn(RetryContext, &E) + Send + Sync + 'static,
    {
        self.slot.replace(Arc::new(observer));
        self
    }
}

impl<T, E> Notifier<T, E, DeadlineObserver> {
    /// Registers the timeout observer, replacing any previous one.
    ///
    /// The observer runs at most once, with the configured limit, and only
    /// when the timer actually wins the race.
    pub fn set<F>(self, observer: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.slot.replace(Arc::new(observer));
        self
    }
}

impl<T, E, O: ?Sized> Future for Notifier<T, E, O> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.as_mut().poll(cx)
    }
}

impl<T, E, O: ?Sized> fmt::Debug for Notifier<T, E, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier").finish_non_exhaustive()
    }
}
