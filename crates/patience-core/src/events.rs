//! Event plumbing shared by the retry engine and the deadline wrapper.
//!
//! Configs collect any number of listeners and fan every event out to them.
//! This sits next to the single-slot `Notifier` observer: listeners are
//! registered once on a config and see every run, the notifier observer is
//! attached to one returned future.
//!
//! Most listeners care about one kind of event and one piece of its payload.
//! [`EventListeners::on`] pairs a selector, which picks that payload out of
//! an event, with the callback that receives it:
//!
//! ```
//! use patience_core::{EventListeners, ResilienceEvent};
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//! use std::time::Instant;
//!
//! #[derive(Debug)]
//! enum Probe {
//!     Sent { at: Instant },
//!     Lost { at: Instant, after_ms: u64 },
//! }
//!
//! impl Probe {
//!     fn lost(&self) -> Option<u64> {
//!         match self {
//!             Probe::Lost { after_ms, .. } => Some(*after_ms),
//!             Probe::Sent { .. } => None,
//!         }
//!     }
//! }
//!
//! impl ResilienceEvent for Probe {
//!     fn event_type(&self) -> &'static str {
//!         match self {
//!             Probe::Sent { .. } => "sent",
//!             Probe::Lost { .. } => "lost",
//!         }
//!     }
//!
//!     fn timestamp(&self) -> Instant {
//!         match self {
//!             Probe::Sent { at } | Probe::Lost { at, .. } => *at,
//!         }
//!     }
//!
//!     fn name(&self) -> &str {
//!         "probe"
//!     }
//! }
//!
//! let lost_ms = Arc::new(AtomicU64::new(0));
//! let l = Arc::clone(&lost_ms);
//!
//! let mut listeners = EventListeners::new();
//! listeners.on(Probe::lost, move |after_ms| {
//!     l.fetch_add(after_ms, Ordering::SeqCst);
//! });
//!
//! listeners.emit(&Probe::Sent { at: Instant::now() });
//! listeners.emit(&Probe::Lost { at: Instant::now(), after_ms: 250 });
//! assert_eq!(lost_ms.load(Ordering::SeqCst), 250);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

/// An event emitted while a retry sequence or a deadline runs.
pub trait ResilienceEvent: Send + Sync + fmt::Debug {
    /// Short, stable label for the event kind (e.g. `"retry"`, `"timeout"`).
    ///
    /// Also used as the `event` field when a listener panic is logged.
    fn event_type(&self) -> &'static str;

    /// When the event was produced.
    fn timestamp(&self) -> Instant;

    /// Name of the configured retry or deadline, as set with its builder's
    /// `name(..)`.
    fn name(&self) -> &str;
}

/// Receives events of type `E`.
pub trait EventListener<E: ResilienceEvent>: Send + Sync {
    /// Called once per emitted event.
    fn on_event(&self, event: &E);
}

/// Shared, type-erased listener.
pub type BoxedEventListener<E> = Arc<dyn EventListener<E>>;

/// Ordered set of listeners for one event type.
#[derive(Clone)]
pub struct EventListeners<E: ResilienceEvent> {
    listeners: Vec<BoxedEventListener<E>>,
}

impl<E: ResilienceEvent> EventListeners<E> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Appends a listener. Listeners are called in registration order.
    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Appends a listener that calls `f` with whatever `select` extracts,
    /// and ignores events for which `select` returns `None`.
    pub fn on<T, F>(&mut self, select: fn(&E) -> Option<T>, f: F)
    where
        E: 'static,
        T: 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        self.add(Selected { select, f });
    }

    /// Delivers `event` to every listener.
    ///
    /// A panicking listener is isolated: the panic is swallowed and the
    /// remaining listeners still run. Returns how many listeners panicked.
    pub fn emit(&self, event: &E) -> usize {
        let mut panicked = 0;
        for listener in &self.listeners {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener.on_event(event);
            }));
            if outcome.is_err() {
                panicked += 1;
            }
        }

        #[cfg(feature = "tracing")]
        if panicked > 0 {
            tracing::warn!(
                name = event.name(),
                event = event.event_type(),
                panicked,
                "event listener panicked"
            );
        }

        panicked
    }

    /// Returns true if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: ResilienceEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ResilienceEvent> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

/// Adapts a closure that wants every event into an [`EventListener`].
pub struct FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    f: F,
    _event: PhantomData<fn(&E)>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _event: PhantomData,
        }
    }
}

impl<E, F> EventListener<E> for FnListener<E, F>
where
    E: ResilienceEvent,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.f)(event)
    }
}

/// Listener built by [`EventListeners::on`].
struct Selected<E, T, F> {
    select: fn(&E) -> Option<T>,
    f: F,
}

impl<E, T, F> EventListener<E> for Selected<E, T, F>
where
    E: ResilienceEvent,
    F: Fn(T) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        if let Some(payload) = (self.select)(event) {
            (self.f)(payload);
        }
    }
}
