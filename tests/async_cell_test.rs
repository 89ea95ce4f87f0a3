//! Tests for [`AsyncTtlCell`] — single-flight acquisition semantics.

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tolkr::cache::AsyncTtlCell;

// =========================================================================
// Single-flight
// =========================================================================

#[tokio::test]
async fn concurrent_first_readers_share_one_producer_run() {
    let cell: Arc<AsyncTtlCell<String, Infallible>> = Arc::new(AsyncTtlCell::new(None));
    let calls = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let cell = cell.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                cell.get_or_try_init(move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    // Hold the flight open so every reader attaches to it.
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    Ok("credential".to_string())
                })
                .await
                .unwrap()
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), "credential");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reader_arriving_mid_flight_attaches_to_it() {
    let cell: Arc<AsyncTtlCell<u32, Infallible>> = Arc::new(AsyncTtlCell::new(None));
    let calls = Arc::new(AtomicUsize::new(0));

    let first = {
        let cell = cell.clone();
        let calls = calls.clone();
        tokio::spawn(async move {
            cell.get_or_try_init(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(1)
            })
            .await
            .unwrap()
        })
    };

    // Let the first flight start before the second reader arrives.
    tokio::time::sleep(Duration::from_millis(10)).await;

    let second = cell
        .get_or_try_init(|| async { panic!("second reader must attach, not produce") })
        .await
        .unwrap();

    assert_eq!(first.await.unwrap(), 1);
    assert_eq!(second, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn abandoned_flight_still_resolves_for_the_next_reader() {
    let cell: Arc<AsyncTtlCell<u32, Infallible>> = Arc::new(AsyncTtlCell::new(None));
    let calls = Arc::new(AtomicUsize::new(0));

    // First reader starts the flight and is dropped before resolution.
    let abandoned = {
        let cell = cell.clone();
        let calls = calls.clone();
        tokio::spawn(async move {
            cell.get_or_try_init(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(40)).await;
                Ok(3)
            })
            .await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    abandoned.abort();

    // The in-flight entry is still installed; the next reader drives it.
    let value = cell
        .get_or_try_init(|| async { panic!("entry should still be in flight") })
        .await
        .unwrap();
    assert_eq!(value, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// =========================================================================
// Freshness and explicit mutation
// =========================================================================

#[tokio::test]
async fn expiry_triggers_one_new_flight() {
    let cell: AsyncTtlCell<u32, Infallible> = AsyncTtlCell::new(Some(Duration::from_millis(20)));
    let calls = Arc::new(AtomicUsize::new(0));

    let mut observed = Vec::new();
    for sleep_first in [false, false, true] {
        if sleep_first {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        let calls = calls.clone();
        let value = cell
            .get_or_try_init(move || async move {
                Ok(calls.fetch_add(1, Ordering::SeqCst) as u32)
            })
            .await
            .unwrap();
        observed.push(value);
    }

    // Two fresh reads share the first flight; the post-expiry read starts
    // exactly one more.
    assert_eq!(observed, vec![0, 0, 1]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn set_then_get_returns_wrapped_value() {
    let cell: AsyncTtlCell<String, Infallible> = AsyncTtlCell::new(None);
    cell.set("assigned".to_string()).await;
    assert_eq!(cell.get().await.as_deref(), Some("assigned"));
}

#[tokio::test]
async fn clear_then_get_recomputes() {
    let cell: AsyncTtlCell<u32, Infallible> = AsyncTtlCell::new(None);
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let calls = calls.clone();
        cell.get_or_try_init(move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        })
        .await
        .unwrap();
        cell.clear().await;
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// =========================================================================
// Error propagation
// =========================================================================

#[tokio::test]
async fn concurrent_readers_all_see_the_shared_failure() {
    let cell: Arc<AsyncTtlCell<u32, String>> = Arc::new(AsyncTtlCell::new(None));
    let calls = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let cell = cell.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                cell.get_or_try_init(move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Err::<u32, _>("acquisition failed".to_string())
                })
                .await
            })
        })
        .collect();

    for task in tasks {
        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err, "acquisition failed");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Failure was evicted: a later reader runs a fresh producer.
    let value = cell.get_or_try_init(|| async { Ok(5) }).await.unwrap();
    assert_eq!(value, 5);
}
