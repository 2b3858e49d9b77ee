//! Deadline examples for patience
//! Run with: cargo run --example deadline_example -p patience --features tracing

use patience::{deadline, delay, is_timeout, DeadlineConfig, TimeoutError};
use std::time::Duration;
use tower::{BoxError, Layer, Service, ServiceExt};
use tracing_subscriber::filter::LevelFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    println!("=== Task finishing in time ===");
    let fast = deadline(
        || async {
            delay(Duration::from_millis(50)).await;
            Ok::<_, TimeoutError>("fast")
        },
        Duration::from_millis(200),
    )
    .set(|limit| println!("✗ Gave up after {limit:?}"))
    .await;
    println!("Result: {fast:?}");

    println!("\n=== Task missing its deadline ===");
    let slow = deadline(
        || async {
            delay(Duration::from_secs(2)).await;
            Ok::<_, TimeoutError>("slow")
        },
        Duration::from_millis(100),
    )
    .set(|limit| println!("✗ Gave up after {limit:?}"))
    .await;
    println!("Result: {slow:?}");

    println!("\n=== Tower layer ===");
    let layer = DeadlineConfig::builder()
        .limit(Duration::from_millis(100))
        .cancel_running_future(true)
        .name("example-deadline")
        .on_success(|duration| println!("✓ Request succeeded in {duration:?}"))
        .on_timeout(|limit| println!("✗ Request exceeded {limit:?}"))
        .build()
        .layer();

    let service = tower::service_fn(|millis: u64| async move {
        delay(Duration::from_millis(millis)).await;
        Ok::<_, BoxError>(format!("Completed after {millis}ms"))
    });
    let mut service = layer.layer(service);

    for millis in [20, 500] {
        let ready = match service.ready().await {
            Ok(ready) => ready,
            Err(e) => {
                println!("Service unavailable: {e}");
                return;
            }
        };
        match ready.call(millis).await {
            Ok(response) => println!("Response: {response}"),
            Err(e) if is_timeout(e.as_ref()) => println!("Timed out: {e}"),
            Err(e) => println!("Error: {e}"),
        }
    }
}
