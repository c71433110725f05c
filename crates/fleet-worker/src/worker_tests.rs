use super::*;
use crate::state_repository::InMemoryStateRepository;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration as StdDuration;
use tokio::sync::Notify;

struct ScriptedWorkload {
    name: &'static str,
    init_ok: bool,
    ping_ok: AtomicBool,
    stop_ok: AtomicBool,
    init_calls: AtomicU32,
    ping_calls: AtomicU32,
    stop_calls: AtomicU32,
}

impl ScriptedWorkload {
    fn new(name: &'static str, init_ok: bool, ping_ok: bool) -> Arc<Self> {
        Arc::new(Self {
            name,
            init_ok,
            ping_ok: AtomicBool::new(ping_ok),
            stop_ok: AtomicBool::new(true),
            init_calls: AtomicU32::new(0),
            ping_calls: AtomicU32::new(0),
            stop_calls: AtomicU32::new(0),
        })
    }

    fn new_with_failing_stop(name: &'static str, init_ok: bool) -> Arc<Self> {
        Arc::new(Self {
            name,
            init_ok,
            ping_ok: AtomicBool::new(true),
            stop_ok: AtomicBool::new(false),
            init_calls: AtomicU32::new(0),
            ping_calls: AtomicU32::new(0),
            stop_calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl Workload for ScriptedWorkload {
    fn name(&self) -> &str {
        self.name
    }

    async fn init(&self) -> Result<(), CapabilityError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.init_ok {
            Ok(())
        } else {
            Err(CapabilityError::new("init refused"))
        }
    }

    async fn ping(&self) -> Result<(), CapabilityError> {
        self.ping_calls.fetch_add(1, Ordering::SeqCst);
        if self.ping_ok.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CapabilityError::new("unreachable"))
        }
    }

    async fn stop(&self) -> Result<(), CapabilityError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        if self.stop_ok.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CapabilityError::new("stop refused"))
        }
    }

    async fn run_task(
        &self,
        _command: &str,
        _args: &[String],
        _kwargs: &HashMap<String, serde_json::Value>,
    ) -> Result<serde_json::Value, CapabilityError> {
        Ok(serde_json::json!({"ok": true}))
    }
}

async fn wait_until(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(StdDuration::from_millis(10)).await;
    }
    panic!("condition never became true");
}

#[tokio::test]
async fn add_workload_initializes_and_tracks_it() {
    let worker = Worker::new(WorkerConfig::default().worker_id("w-1"));
    let wl = ScriptedWorkload::new("wl-a", true, true);

    worker.add_workload(wl.clone()).await.unwrap();
    wait_until(|| worker.workloads().contains(&"wl-a".to_string())).await;

    assert_eq!(wl.init_calls.load(Ordering::SeqCst), 1);
    worker.stop().await;
}

#[tokio::test]
async fn add_workload_registers_with_the_state_sink_and_emits_added() {
    let state = Arc::new(InMemoryStateRepository::new());
    let notify = Arc::new(Notify::new());
    let n = notify.clone();
    let worker = Worker::new(
        WorkerConfig::default()
            .worker_id("w-1")
            .with_state_repository(state.clone())
            .with_event_callback(move |event| {
                if event.event_type == WorkerEventKind::WorkloadAdded {
                    n.notify_one();
                }
            }),
    );
    let wl = ScriptedWorkload::new("wl-a", true, true);

    worker.add_workload(wl.clone()).await.unwrap();

    tokio::time::timeout(StdDuration::from_secs(2), notify.notified())
        .await
        .expect("workload.added should fire");
    assert!(state.contains("wl-a", "w-1"));

    worker.stop().await;
}

#[tokio::test]
async fn add_workload_rejects_duplicate_name() {
    let worker = Worker::new(WorkerConfig::default());
    let wl = ScriptedWorkload::new("wl-a", true, true);

    worker.add_workload(wl.clone()).await.unwrap();
    let err = worker.add_workload(wl.clone()).await.unwrap_err();
    assert!(matches!(err, WorkerError::WorkloadExists));

    worker.stop().await;
}

#[tokio::test]
async fn failed_init_tears_down_without_leaving_it_tracked() {
    let worker = Worker::new(WorkerConfig::default());
    let wl = ScriptedWorkload::new("wl-bad", false, true);

    worker.add_workload(wl.clone()).await.unwrap();
    wait_until(|| !worker.workloads().contains(&"wl-bad".to_string()) && wl.init_calls.load(Ordering::SeqCst) == 1).await;

    worker.stop().await;
}

#[tokio::test]
async fn failed_init_stops_the_workload_and_notifies_the_sink_of_deletion() {
    let state = Arc::new(InMemoryStateRepository::new());
    let notify = Arc::new(Notify::new());
    let n = notify.clone();
    let worker = Worker::new(
        WorkerConfig::default()
            .worker_id("w-1")
            .with_state_repository(state.clone())
            .with_event_callback(move |event| {
                if event.event_type == WorkerEventKind::WorkloadDeleted {
                    n.notify_one();
                }
            }),
    );
    let wl = ScriptedWorkload::new("wl-bad", false, true);

    worker.add_workload(wl.clone()).await.unwrap();

    tokio::time::timeout(StdDuration::from_secs(2), notify.notified())
        .await
        .expect("workload.deleted should fire");

    assert_eq!(wl.stop_calls.load(Ordering::SeqCst), 1);
    assert!(!state.contains("wl-bad", "w-1"));
    assert!(!worker.workloads().contains(&"wl-bad".to_string()));

    worker.stop().await;
}

#[tokio::test]
async fn failed_init_emits_init_error_when_the_stop_attempt_itself_fails() {
    let notify = Arc::new(Notify::new());
    let n = notify.clone();
    let worker = Worker::new(WorkerConfig::default().with_event_callback(move |event| {
        if event.event_type == WorkerEventKind::WorkloadInitError {
            n.notify_one();
        }
    }));
    let wl = ScriptedWorkload::new_with_failing_stop("wl-bad", false);

    worker.add_workload(wl.clone()).await.unwrap();

    tokio::time::timeout(StdDuration::from_secs(2), notify.notified())
        .await
        .expect("workload.init.error should fire when stop itself fails");

    worker.stop().await;
}

#[tokio::test]
async fn delete_workload_stops_it_and_untracks_it() {
    let worker = Worker::new(WorkerConfig::default());
    let wl = ScriptedWorkload::new("wl-a", true, true);

    worker.add_workload(wl.clone()).await.unwrap();
    wait_until(|| worker.workloads().contains(&"wl-a".to_string())).await;

    worker.delete_workload("wl-a").await.unwrap();
    assert!(!worker.workloads().contains(&"wl-a".to_string()));
    assert_eq!(wl.stop_calls.load(Ordering::SeqCst), 1);

    worker.stop().await;
}

#[tokio::test]
async fn delete_workload_missing_is_not_found() {
    let worker = Worker::new(WorkerConfig::default());
    let err = worker.delete_workload("nope").await.unwrap_err();
    assert!(matches!(err, WorkerError::WorkloadNotFound));
    worker.stop().await;
}

#[tokio::test]
async fn run_task_dispatches_to_the_named_workload() {
    let worker = Worker::new(WorkerConfig::default().worker_id("w-1"));
    let wl = ScriptedWorkload::new("wl-a", true, true);
    worker.add_workload(wl.clone()).await.unwrap();
    wait_until(|| worker.workloads().contains(&"wl-a".to_string())).await;

    let result = worker.run_task("wl-a", &Task::new("ping")).await.unwrap();
    assert!(result.success);
    assert_eq!(result.worker_id, "w-1");
    assert_eq!(result.hostname, "wl-a");

    worker.stop().await;
}

#[tokio::test]
async fn run_task_against_unknown_target_is_not_found() {
    let worker = Worker::new(WorkerConfig::default());
    let err = worker.run_task("nope", &Task::new("ping")).await.unwrap_err();
    assert!(matches!(err, WorkerError::WorkloadNotFound));
    worker.stop().await;
}

#[tokio::test]
async fn load_without_a_catalog_entry_fails() {
    let worker = Worker::new(WorkerConfig::default());
    let err = worker.load(&WorkloadId::new("missing")).await.unwrap_err();
    assert!(err.to_string().contains("no catalog entry"));
    worker.stop().await;
}

#[tokio::test]
async fn load_from_catalog_initializes_the_matching_workload() {
    let wl = ScriptedWorkload::new("wl-a", true, true);
    let worker = Worker::new(WorkerConfig::default().with_workload(wl.clone()));

    worker.load(&WorkloadId::new("wl-a")).await.unwrap();
    wait_until(|| worker.workloads().contains(&"wl-a".to_string())).await;

    worker.stop().await;
}

#[tokio::test]
async fn stop_tears_down_every_tracked_workload() {
    let worker = Worker::new(WorkerConfig::default());
    let a = ScriptedWorkload::new("wl-a", true, true);
    let b = ScriptedWorkload::new("wl-b", true, true);
    worker.add_workload(a.clone()).await.unwrap();
    worker.add_workload(b.clone()).await.unwrap();
    wait_until(|| worker.workloads().len() == 2).await;

    worker.stop().await;

    assert_eq!(a.stop_calls.load(Ordering::SeqCst), 1);
    assert_eq!(b.stop_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn error_callback_fires_on_failed_init() {
    let notify = Arc::new(Notify::new());
    let n = notify.clone();
    let worker = Worker::new(WorkerConfig::default().with_error_callback(move |_err| {
        n.notify_one();
    }));

    let wl = ScriptedWorkload::new("wl-bad", false, true);
    worker.add_workload(wl).await.unwrap();

    tokio::time::timeout(StdDuration::from_secs(2), notify.notified())
        .await
        .expect("error callback should fire");

    worker.stop().await;
}

#[tokio::test(start_paused = true)]
async fn garbage_collector_evicts_after_max_pingdown_consecutive_failures() {
    let wl = ScriptedWorkload::new("wl-flaky", true, false);
    let config = WorkerConfig::default()
        .max_ping_down(1)
        .splay_lo(StdDuration::from_secs(1))
        .splay_hi(StdDuration::from_secs(1))
        .ping_timeout(StdDuration::from_secs(1));
    let worker = Worker::new(config);

    worker.add_workload(wl.clone()).await.unwrap();
    tokio::task::yield_now().await;

    // first jittered probe tick, at +1s, fails and bumps the fail counter to 1
    tokio::time::advance(StdDuration::from_secs(1)).await;
    tokio::task::yield_now().await;

    // next fixed 10s gc tick evicts anything at or past max_ping_down
    tokio::time::advance(StdDuration::from_secs(10)).await;
    tokio::task::yield_now().await;

    assert!(!worker.workloads().contains(&"wl-flaky".to_string()));
    assert_eq!(wl.stop_calls.load(Ordering::SeqCst), 1);

    worker.stop().await;
}
