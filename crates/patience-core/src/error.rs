//! The timeout sentinel.
//!
//! [`TimeoutError`] is the one failure value produced by the timing
//! wrappers. It is a unit struct, so every instance is the same value: code
//! that needs to tell a timeout from an application failure matches on the
//! type rather than on a message.
//!
//! ```
//! use patience_core::{is_timeout, TimeoutError};
//!
//! let boxed: Box<dyn std::error::Error + Send + Sync> = TimeoutError.into();
//! assert!(is_timeout(boxed.as_ref()));
//! assert_eq!(TimeoutError, TimeoutError::default());
//! ```

use std::error::Error;

/// The operation exceeded its deadline.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("operation timed out")]
pub struct TimeoutError;

/// Returns true if `error`, or any error in its source chain, is the
/// [`TimeoutError`] sentinel.
pub fn is_timeout(error: &(dyn Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(err) = current {
        if err.is::<TimeoutError>() {
            return true;
        }
        current = err.source();
    }
    false
}
