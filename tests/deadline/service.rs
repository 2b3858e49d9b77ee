//! Deadline as tower middleware.

use patience::{is_timeout, DeadlineLayer, RetryLayer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tower::{BoxError, Layer, Service, ServiceBuilder, ServiceExt};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test(start_paused = true)]
async fn slow_requests_time_out() {
    let timeouts = Arc::new(AtomicUsize::new(0));
    let t = Arc::clone(&timeouts);

    let layer = DeadlineLayer::builder()
        .name("api")
        .limit(ms(100))
        .on_timeout(move |_| {
            t.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .layer();

    let mut service = layer.layer(tower::service_fn(|millis: u64| async move {
        sleep(ms(millis)).await;
        Ok::<_, BoxError>(millis)
    }));

    let fast = service.ready().await.unwrap().call(10).await;
    assert_eq!(fast.unwrap(), 10);

    let slow = service.ready().await.unwrap().call(1000).await;
    assert!(is_timeout(slow.unwrap_err().as_ref()));
    assert_eq!(timeouts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn per_request_observer_gets_the_limit() {
    let layer = DeadlineLayer::builder().limit(ms(40)).build().layer();
    let mut service = layer.layer(tower::service_fn(|_: ()| async {
        sleep(ms(500)).await;
        Ok::<_, BoxError>(())
    }));

    let seen = Arc::new(AtomicUsize::new(0));
    let s = Arc::clone(&seen);
    let result = service
        .ready()
        .await
        .unwrap()
        .call(())
        .set(move |limit| {
            s.store(limit.as_millis() as usize, Ordering::SeqCst);
        })
        .await;

    assert!(result.is_err());
    assert_eq!(seen.load(Ordering::SeqCst), 40);
}

#[tokio::test(start_paused = true)]
async fn retry_over_deadline_stack() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);

    let inner = tower::service_fn(move |_: ()| {
        let n = c.fetch_add(1, Ordering::SeqCst);
        async move {
            if n == 0 {
                sleep(ms(1000)).await;
            }
            Ok::<_, BoxError>(n)
        }
    });

    let mut service = ServiceBuilder::new()
        .layer(
            RetryLayer::builder()
                .retries(2)
                .constant_backoff(ms(10))
                .build()
                .layer(),
        )
        .layer(DeadlineLayer::builder().limit(ms(100)).build().layer())
        .service(inner);

    let response = service.ready().await.unwrap().call(()).await;
    assert_eq!(response.unwrap(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
