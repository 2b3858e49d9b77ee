//! Retry as tower middleware.
//!
//! Tests cover:
//! - Requests are cloned into each attempt
//! - Exhaustion returns the inner service's error
//! - Per-request observers on top of layer listeners
//! - Layer reuse across services

use patience::{RetryContext, RetryLayer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::{Layer, Service, ServiceExt};

#[derive(Debug, Clone, PartialEq)]
struct ServiceError(String);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test(start_paused = true)]
async fn each_attempt_gets_the_same_request() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let r = Arc::clone(&requests);

    let service = tower::service_fn(move |req: String| {
        let mut seen = r.lock().unwrap();
        seen.push(req.clone());
        let attempt = seen.len();
        async move {
            if attempt < 3 {
                Err(ServiceError(format!("attempt {attempt}")))
            } else {
                Ok(req.to_uppercase())
            }
        }
    });

    let layer = RetryLayer::builder()
        .retries(3)
        .constant_backoff(ms(10))
        .build()
        .layer();
    let mut service = layer.layer(service);

    let response = service
        .ready()
        .await
        .unwrap()
        .call("hello".to_string())
        .await;

    assert_eq!(response, Ok("HELLO".to_string()));
    assert_eq!(*requests.lock().unwrap(), vec!["hello"; 3]);
}

#[tokio::test(start_paused = true)]
async fn exhaustion_returns_the_inner_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);

    let service = tower::service_fn(move |_: ()| {
        let n = c.fetch_add(1, Ordering::SeqCst);
        async move { Err::<(), _>(ServiceError(format!("failure {n}"))) }
    });

    let layer = RetryLayer::builder()
        .retries(2)
        .exponential_backoff(ms(10))
        .build()
        .layer();
    let mut service = layer.layer(service);

    let response = service.ready().await.unwrap().call(()).await;

    assert_eq!(response, Err(ServiceError("failure 2".to_string())));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn per_request_observer_and_layer_listeners() {
    let listener_retries = Arc::new(AtomicUsize::new(0));
    let observed = Arc::new(Mutex::new(Vec::<RetryContext>::new()));

    let l = Arc::clone(&listener_retries);
    let layer = RetryLayer::builder()
        .name("inventory")
        .retries(2)
        .constant_backoff(ms(50))
        .on_retry(move |_, _| {
            l.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .layer();

    let service = tower::service_fn(|_: u32| async { Err::<u32, _>(ServiceError("down".into())) });
    let mut service = layer.layer(service);

    let o = Arc::clone(&observed);
    let response = service
        .ready()
        .await
        .unwrap()
        .call(1)
        .set(move |context, error| {
            assert_eq!(error.0, "down");
            o.lock().unwrap().push(context);
        })
        .await;

    assert!(response.is_err());
    assert_eq!(listener_retries.load(Ordering::SeqCst), 2);

    let observed = observed.lock().unwrap();
    let attempts: Vec<_> = observed.iter().map(RetryContext::attempts).collect();
    assert_eq!(attempts, vec![(1, 2), (2, 2)]);
}

#[tokio::test(start_paused = true)]
async fn layer_is_reusable() {
    let layer = RetryLayer::builder()
        .retries(1)
        .constant_backoff(ms(5))
        .build()
        .layer();

    let mut ok = layer.layer(tower::service_fn(|n: u8| async move {
        Ok::<_, ServiceError>(n + 1)
    }));
    let mut failing = layer.layer(tower::service_fn(|_: u8| async {
        Err::<u8, _>(ServiceError("no".into()))
    }));

    assert_eq!(ok.ready().await.unwrap().call(1).await, Ok(2));
    assert_eq!(
        failing.ready().await.unwrap().call(1).await,
        Err(ServiceError("no".into()))
    );
}
