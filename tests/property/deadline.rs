//! Property tests for deadlines.
//!
//! Invariants tested:
//! - Tasks shorter than the limit always succeed without notification
//! - Tasks longer than the limit always time out with exactly one notification

use patience::{deadline, delay, TimeoutError};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Builder;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: the outcome depends only on which of task and limit is shorter
    #[test]
    fn outcome_follows_the_shorter_side(
        task_ms in 1u64..=1_000,
        limit_ms in 1u64..=1_000,
    ) {
        prop_assume!(task_ms != limit_ms);

        let rt = Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();

        rt.block_on(async {
            let notified = Arc::new(AtomicUsize::new(0));
            let n = Arc::clone(&notified);

            let result = deadline(
                move || async move {
                    delay(Duration::from_millis(task_ms)).await;
                    Ok::<_, TimeoutError>(task_ms)
                },
                Duration::from_millis(limit_ms),
            )
            .set(move |limit| {
                assert_eq!(limit, Duration::from_millis(limit_ms));
                n.fetch_add(1, Ordering::SeqCst);
            })
            .await;

            if task_ms < limit_ms {
                prop_assert_eq!(result, Ok(task_ms));
                prop_assert_eq!(notified.load(Ordering::SeqCst), 0);
            } else {
                prop_assert_eq!(result, Err(TimeoutError));
                prop_assert_eq!(notified.load(Ordering::SeqCst), 1);
            }
            Ok(())
        })?;
    }
}
