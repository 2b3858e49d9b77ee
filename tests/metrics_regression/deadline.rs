//! Deadline metrics regression tests

use super::helpers::*;
use patience::DeadlineLayer;
use serial_test::serial;
use std::time::Duration;
use tower::{BoxError, Layer, Service, ServiceExt};

#[tokio::test]
#[serial]
async fn deadline_metrics_exist() {
    init_recorder();

    let layer = DeadlineLayer::builder()
        .name("test_deadline")
        .limit(Duration::from_millis(100))
        .build()
        .layer();

    let service = tower::service_fn(|_: ()| async { Ok::<_, BoxError>("ok") });
    let mut service = layer.layer(service);

    let _ = service.ready().await.unwrap().call(()).await;

    assert_counter_exists("deadline_calls_total");
    assert_metric_has_label("deadline_calls_total", "deadline", "test_deadline");
    assert_metric_has_label("deadline_calls_total", "result", "success");

    assert_histogram_exists("deadline_call_duration_seconds");
    assert_metric_has_label("deadline_call_duration_seconds", "deadline", "test_deadline");
}

#[tokio::test]
#[serial]
async fn deadline_error_and_timeout_metrics() {
    init_recorder();

    let layer = DeadlineLayer::builder()
        .name("outcome_deadline")
        .limit(Duration::from_millis(20))
        .cancel_running_future(true)
        .build()
        .layer();

    let service = tower::service_fn(|fail: bool| async move {
        if fail {
            Err::<(), BoxError>("refused".into())
        } else {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        }
    });
    let mut service = layer.layer(service);

    let _ = service.ready().await.unwrap().call(true).await;
    let _ = service.ready().await.unwrap().call(false).await;

    assert_metric_has_label("deadline_calls_total", "result", "error");
    assert_metric_has_label("deadline_calls_total", "result", "timeout");
}
