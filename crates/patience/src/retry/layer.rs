use super::{Retry, RetryConfig, RetryConfigBuilder};
use std::sync::Arc;
use tower::Layer;

/// A Tower [`Layer`] that re-runs failed requests under a retry schedule.
///
/// Requests must be `Clone`; each attempt calls a fresh clone of the inner
/// service with a fresh clone of the request.
///
/// ```
/// use patience::RetryLayer;
/// use tower::ServiceBuilder;
/// use std::time::Duration;
///
/// # async fn example() {
/// let service = ServiceBuilder::new()
///     .layer(
///         RetryLayer::builder()
///             .retries(3)
///             .exponential_backoff(Duration::from_millis(100))
///             .build()
///             .layer(),
///     )
///     .service(tower::service_fn(|req: String| async move {
///         Ok::<_, std::io::Error>(req)
///     }));
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct RetryLayer {
    config: Arc<RetryConfig>,
}

impl RetryLayer {
    /// Creates a new `RetryLayer` with the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Creates a new builder for configuring a retry layer.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = Retry<S>;

    fn layer(&self, service: S) -> Self::Service {
        Retry::new(service, Arc::clone(&self.config))
    }
}
