//! Property tests for retry sequences.
//!
//! Invariants tested:
//! - Schedule shapes: constant is flat, exponential doubles
//! - Never more than retries + 1 invocations
//! - Succeeds on the first success
//! - Snapshots count up while the queue shrinks from the front

use patience::{constant_retry, exponential_retry, BackoffType};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

fn paused_runtime() -> Runtime {
    Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: constant schedule has `retries` entries, all equal to the interval
    #[test]
    fn constant_schedule_is_flat(retries in 0usize..=20, interval_ms in 0u64..=10_000) {
        let interval = Duration::from_millis(interval_ms);
        let waits = BackoffType::Constant.schedule(retries, interval);

        prop_assert_eq!(waits.len(), retries);
        prop_assert!(waits.iter().all(|wait| *wait == interval));
    }

    /// Property: exponential entry k equals interval * 2^k
    #[test]
    fn exponential_schedule_doubles(retries in 0usize..=20, interval_ms in 0u64..=10_000) {
        let interval = Duration::from_millis(interval_ms);
        let waits = BackoffType::Exponential.schedule(retries, interval);

        prop_assert_eq!(waits.len(), retries);
        for (k, wait) in waits.iter().enumerate() {
            prop_assert_eq!(*wait, interval * 2u32.pow(k as u32));
        }
    }

    /// Property: an always-failing task runs exactly retries + 1 times
    #[test]
    fn retry_respects_max_invocations(retries in 0usize..=8, exponential in any::<bool>()) {
        let rt = paused_runtime();
        rt.block_on(async {
            let calls = Arc::new(AtomicUsize::new(0));
            let notified = Arc::new(AtomicUsize::new(0));

            let c = Arc::clone(&calls);
            let task = move || {
                c.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>("always") }
            };
            let interval = Duration::from_millis(10);
            let pending = if exponential {
                exponential_retry(task, retries, interval)
            } else {
                constant_retry(task, retries, interval)
            };

            let n = Arc::clone(&notified);
            let result = pending
                .set(move |_, _| {
                    n.fetch_add(1, Ordering::SeqCst);
                })
                .await;

            prop_assert_eq!(result, Err("always"));
            prop_assert_eq!(calls.load(Ordering::SeqCst), retries + 1);
            prop_assert_eq!(notified.load(Ordering::SeqCst), retries);
            Ok(())
        })?;
    }

    /// Property: success on call n stops the sequence after n invocations
    #[test]
    fn retry_stops_on_success(retries in 1usize..=8, succeed_on in 1usize..=9) {
        let rt = paused_runtime();
        rt.block_on(async {
            let calls = Arc::new(AtomicUsize::new(0));
            let c = Arc::clone(&calls);

            let result = constant_retry(
                move || {
                    let call = c.fetch_add(1, Ordering::SeqCst) + 1;
                    async move {
                        if call >= succeed_on { Ok(call) } else { Err(call) }
                    }
                },
                retries,
                Duration::from_millis(1),
            )
            .await;

            let invocations = calls.load(Ordering::SeqCst);
            if succeed_on <= retries + 1 {
                prop_assert_eq!(result, Ok(succeed_on));
                prop_assert_eq!(invocations, succeed_on);
            } else {
                prop_assert_eq!(result, Err(retries + 1));
                prop_assert_eq!(invocations, retries + 1);
            }
            Ok(())
        })?;
    }

    /// Property: snapshot k reports (k, retries) and the schedule minus its first k - 1 entries
    #[test]
    fn snapshots_track_the_queue(retries in 1usize..=6) {
        let rt = paused_runtime();
        rt.block_on(async {
            let snapshots = Arc::new(Mutex::new(Vec::new()));
            let s = Arc::clone(&snapshots);

            let _ = exponential_retry(
                || async { Err::<(), _>(()) },
                retries,
                Duration::from_millis(1),
            )
            .set(move |context, _| s.lock().unwrap().push(context))
            .await;

            let full = BackoffType::Exponential.schedule(retries, Duration::from_millis(1));
            let snapshots = snapshots.lock().unwrap();
            prop_assert_eq!(snapshots.len(), retries);
            for (i, context) in snapshots.iter().enumerate() {
                prop_assert_eq!(context.attempts(), (i + 1, retries));
                let expected: Vec<_> = full.iter().skip(i).copied().collect();
                let actual: Vec<_> = context.intervals().iter().copied().collect();
                prop_assert_eq!(actual, expected);
            }
            Ok(())
        })?;
    }
}
