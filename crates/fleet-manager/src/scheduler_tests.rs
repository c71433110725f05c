use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

#[tokio::test(start_paused = true)]
async fn runs_immediately_then_on_interval() {
    let token = CancellationToken::new();
    let scheduler = Scheduler::new(10, token.clone());
    let runs = Arc::new(AtomicUsize::new(0));

    let r = runs.clone();
    let _handle = scheduler.spawn_periodic("test", Duration::from_secs(1), move || {
        let r = r.clone();
        async move {
            r.fetch_add(1, Ordering::SeqCst);
        }
    });

    tokio::task::yield_now().await;
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_secs(1)).await;
    tokio::task::yield_now().await;
    assert_eq!(runs.load(Ordering::SeqCst), 2);

    token.cancel();
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_future_runs() {
    let token = CancellationToken::new();
    let scheduler = Scheduler::new(10, token.clone());
    let runs = Arc::new(AtomicUsize::new(0));

    let r = runs.clone();
    let handle = scheduler.spawn_periodic("test", Duration::from_secs(1), move || {
        let r = r.clone();
        async move {
            r.fetch_add(1, Ordering::SeqCst);
        }
    });

    tokio::task::yield_now().await;
    token.cancel();
    let _ = handle.await;

    let seen = runs.load(Ordering::SeqCst);
    tokio::time::advance(Duration::from_secs(5)).await;
    assert_eq!(runs.load(Ordering::SeqCst), seen);
}
