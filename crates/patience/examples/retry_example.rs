//! Retry examples for patience
//! Run with: cargo run --example retry_example -p patience --features tracing

use patience::{constant_retry, exponential_retry, RetryConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::{Layer, Service, ServiceExt};
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Clone)]
struct TemporaryError;

impl std::fmt::Display for TemporaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "temporary error")
    }
}

impl std::error::Error for TemporaryError {}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    println!("Patience Retry Example");
    println!("======================\n");

    // Example 1: constant backoff with an observer
    println!("Example 1: Constant backoff");
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);

    let value = constant_retry(
        move || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            println!("  Task called (attempt {})", n + 1);
            async move {
                if n < 2 {
                    Err(TemporaryError)
                } else {
                    Ok(n)
                }
            }
        },
        3,
        Duration::from_millis(100),
    )
    .set(|context, error| {
        let (retry, max) = context.attempts();
        println!(
            "  [RETRY] {retry}/{max} after '{error}', remaining waits {:?}",
            context.intervals()
        );
    })
    .await?;
    println!("  Result: {value}\n");

    // Example 2: exponential backoff that runs out
    println!("Example 2: Exponential backoff, exhausted");
    let result = exponential_retry(
        || async { Err::<(), _>(TemporaryError) },
        3,
        Duration::from_millis(50),
    )
    .set(|context, _| {
        println!(
            "  [RETRY] {:?}, next wait {:?}",
            context.attempts(),
            context.intervals().front()
        );
    })
    .await;
    println!("  Result: {result:?}\n");

    // Example 3: retry as tower middleware
    println!("Example 3: Tower layer");
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let service = tower::service_fn(move |req: String| {
        let n = c.fetch_add(1, Ordering::SeqCst);
        async move {
            if n < 1 {
                Err(TemporaryError)
            } else {
                Ok(format!("Success: {req}"))
            }
        }
    });

    let layer = RetryConfig::builder()
        .name("example-retry")
        .retries(4)
        .exponential_backoff(Duration::from_millis(20))
        .on_retry(|attempt, delay| println!("  [RETRY] Attempt {attempt} after {delay:?}"))
        .on_success(|attempts| println!("  [SUCCESS] After {attempts} total attempts"))
        .build()
        .layer();
    let mut service = layer.layer(service);

    let response = service.ready().await?.call("test".to_string()).await?;
    println!("  Result: {response}");

    Ok(())
}
