//! Tests for the worker pool.

use super::*;
use crate::handle::JobHandle;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

const EVERY_SECOND: &str = "* * * * * ?";
const FAR_FUTURE: &str = "0 0 0 1 1 ? 2099";

fn counting_runnable(counter: Arc<AtomicU64>) -> Arc<dyn Runnable> {
    runnable_fn(move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<(), BoxError>(())
        }
    })
}

fn noop_runnable() -> Arc<dyn Runnable> {
    runnable_fn(|| async { Ok::<(), BoxError>(()) })
}

async fn fail() -> Result<(), BoxError> {
    Err("boom".into())
}

async fn explode() -> Result<(), BoxError> {
    panic!("kaboom")
}

#[test]
fn test_worker_pool_new() {
    let pool = WorkerPool::new(PoolConfig::with_pool_size(4));
    assert_eq!(pool.available_workers(), 4);
    assert_eq!(pool.scheduled_count(), 0);
    assert_eq!(pool.total_fired(), 0);
    assert!(!pool.is_shutdown());
}

#[test]
fn test_schedule_outside_runtime() {
    let pool = WorkerPool::new(PoolConfig::default());
    let result = pool.schedule("no-runtime", noop_runnable(), EVERY_SECOND);
    assert!(matches!(result, Err(SchedulerError::NoRuntime)));
}

#[tokio::test]
async fn test_schedule_invalid_expression() {
    let pool = WorkerPool::new(PoolConfig::default());
    let result = pool.schedule("bad", noop_runnable(), "every five seconds please");
    assert!(matches!(result, Err(SchedulerError::InvalidExpression { .. })));
    assert_eq!(pool.scheduled_count(), 0);
}

#[tokio::test]
async fn test_schedule_exhausted_expression() {
    let pool = WorkerPool::new(PoolConfig::default());
    let result = pool.schedule("past", noop_runnable(), "0 0 0 1 1 ? 2020");
    assert!(matches!(result, Err(SchedulerError::NoUpcomingFireTime(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fires_until_cancelled() {
    let pool = WorkerPool::new(PoolConfig::default());
    let counter = Arc::new(AtomicU64::new(0));
    let handle = pool
        .schedule("counter", counting_runnable(counter.clone()), EVERY_SECOND)
        .unwrap();

    tokio::time::sleep(Duration::from_millis(2600)).await;
    assert!(counter.load(Ordering::SeqCst) >= 2);
    assert_eq!(pool.scheduled_count(), 1);

    assert!(handle.cancel(true));
    tokio::time::sleep(Duration::from_millis(100)).await;
    let after_cancel = counter.load(Ordering::SeqCst);
    assert_eq!(pool.scheduled_count(), 0);

    tokio::time::sleep(Duration::from_millis(2200)).await;
    assert_eq!(counter.load(Ordering::SeqCst), after_cancel);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failures_do_not_cancel_schedule() {
    let failures = Arc::new(AtomicU64::new(0));
    let panics = Arc::new(AtomicU64::new(0));
    let handler: ErrorHandler = {
        let failures = failures.clone();
        let panics = panics.clone();
        Arc::new(move |failure: &FiringFailure| {
            if failure.panicked {
                panics.fetch_add(1, Ordering::SeqCst);
            } else {
                failures.fetch_add(1, Ordering::SeqCst);
            }
        })
    };
    let pool = WorkerPool::new(PoolConfig::default()).with_error_handler(handler);

    let failing = pool
        .schedule("failing", runnable_fn(fail), EVERY_SECOND)
        .unwrap();
    let panicking = pool
        .schedule("panicking", runnable_fn(explode), EVERY_SECOND)
        .unwrap();

    tokio::time::sleep(Duration::from_millis(2600)).await;
    assert!(failures.load(Ordering::SeqCst) >= 2);
    assert!(panics.load(Ordering::SeqCst) >= 2);
    assert!(pool.total_failed() >= 4);
    assert!(!failing.is_done());
    assert!(!panicking.is_done());

    pool.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_interrupts_running_firing() {
    let pool = WorkerPool::new(PoolConfig::default());
    let started = Arc::new(AtomicBool::new(false));
    let finished = Arc::new(AtomicBool::new(false));

    let runnable = {
        let started = started.clone();
        let finished = finished.clone();
        runnable_fn(move || {
            let started = started.clone();
            let finished = finished.clone();
            async move {
                started.store(true, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(10)).await;
                finished.store(true, Ordering::SeqCst);
                Ok::<(), BoxError>(())
            }
        })
    };
    let handle = pool.schedule("slow", runnable, EVERY_SECOND).unwrap();

    for _ in 0..30 {
        if started.load(Ordering::SeqCst) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(started.load(Ordering::SeqCst));
    assert_eq!(pool.active_firings(), 1);

    assert!(handle.cancel(true));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(pool.active_firings(), 0);
    assert!(!finished.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_firings_of_one_schedule_do_not_overlap() {
    let pool = WorkerPool::new(PoolConfig::default());
    let running = Arc::new(AtomicUsize::new(0));
    let max_running = Arc::new(AtomicUsize::new(0));

    let runnable = {
        let running = running.clone();
        let max_running = max_running.clone();
        runnable_fn(move || {
            let running = running.clone();
            let max_running = max_running.clone();
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                max_running.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(1500)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok::<(), BoxError>(())
            }
        })
    };
    let handle = pool.schedule("slow", runnable, EVERY_SECOND).unwrap();

    tokio::time::sleep(Duration::from_millis(4500)).await;
    handle.cancel(true);
    assert!(pool.total_fired() >= 2);
    assert_eq!(max_running.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pool_size_limits_concurrency() {
    let pool = WorkerPool::new(PoolConfig::with_pool_size(1));
    let running = Arc::new(AtomicUsize::new(0));
    let max_running = Arc::new(AtomicUsize::new(0));

    let make = || {
        let running = running.clone();
        let max_running = max_running.clone();
        runnable_fn(move || {
            let running = running.clone();
            let max_running = max_running.clone();
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                max_running.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(300)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok::<(), BoxError>(())
            }
        })
    };
    pool.schedule("a", make(), EVERY_SECOND).unwrap();
    pool.schedule("b", make(), EVERY_SECOND).unwrap();
    pool.schedule("c", make(), EVERY_SECOND).unwrap();

    tokio::time::sleep(Duration::from_millis(2500)).await;
    pool.shutdown();
    assert!(pool.total_fired() >= 3);
    assert_eq!(max_running.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_remove_on_cancel_tears_down_driver() {
    let pool = WorkerPool::new(PoolConfig::default());
    let handle = pool.schedule("far", noop_runnable(), FAR_FUTURE).unwrap();
    assert_eq!(pool.scheduled_count(), 1);

    assert!(handle.cancel(false));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(pool.scheduled_count(), 0);
}

#[tokio::test]
async fn test_cancelled_driver_lingers_without_remove_on_cancel() {
    let config = PoolConfig {
        remove_on_cancel: false,
        ..Default::default()
    };
    let pool = WorkerPool::new(config);
    let handle = pool.schedule("far", noop_runnable(), FAR_FUTURE).unwrap();

    assert!(handle.cancel(false));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(pool.scheduled_count(), 1);
    assert!(handle.is_cancelled());

    pool.shutdown();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(pool.scheduled_count(), 0);
}

#[tokio::test]
async fn test_shutdown_rejects_and_completes() {
    let pool = WorkerPool::new(PoolConfig::default());
    let handle = pool.schedule("far", noop_runnable(), FAR_FUTURE).unwrap();

    pool.shutdown();
    assert!(pool.is_shutdown());
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(handle.is_done());
    assert!(!handle.cancel(true));
    assert!(matches!(
        pool.schedule("late", noop_runnable(), EVERY_SECOND),
        Err(SchedulerError::Shutdown)
    ));
}
