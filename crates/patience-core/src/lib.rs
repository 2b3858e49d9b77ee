//! Core infrastructure for patience.
//!
//! Shared by the retry engine and the deadline wrapper:
//! - [`events`]: event listeners for config-level observability
//! - [`TimeoutError`]: the sentinel failure produced by timing wrappers
//! - [`time`]: the `delay` and `timeout` primitives

pub mod error;
pub mod events;
pub mod time;

pub use error::{is_timeout, TimeoutError};
pub use events::{EventListener, EventListeners, FnListener, ResilienceEvent};
