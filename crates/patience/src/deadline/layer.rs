use super::{Deadline, DeadlineConfig, DeadlineConfigBuilder};
use std::sync::Arc;
use tower::Layer;

/// A Tower [`Layer`] that fails requests whose response does not arrive
/// within the configured limit.
///
/// The inner service's error type must absorb the timeout sentinel through
/// `From<TimeoutError>`; `tower::BoxError` does.
#[derive(Clone, Debug)]
pub struct DeadlineLayer {
    config: Arc<DeadlineConfig>,
}

impl DeadlineLayer {
    /// Creates a deadline layer with the given configuration.
    pub fn new(config: DeadlineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Creates a new builder for configuring a deadline layer.
    pub fn builder() -> DeadlineConfigBuilder {
        DeadlineConfigBuilder::new()
    }
}

impl<S> Layer<S> for DeadlineLayer {
    type Service = Deadline<S>;

    fn layer(&self, service: S) -> Self::Service {
        Deadline::new(service, Arc::clone(&self.config))
    }
}
