//! End-to-end tests of the list synchronizer against a mocked backend
//!
//! Time is paused, so the refresh intervals advance instantly whenever every
//! task is idle.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use launchdeck::backend::paginate;
use launchdeck::models::{AverageUsage, MetricSample, MetricsUpdate, WorkloadKind};
use launchdeck::sync::{LifecycleAction, SyncSettings};
use launchdeck::{
    AppListSynchronizer, DeckError, DeckResult, ListQuery, ListSnapshot, Navigation,
    PaginationState, SyncHandle, WorkloadBackend, WorkloadPage, WorkloadSummary,
};
use mockall::mock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, timeout};

mock! {
    pub Backend {}

    #[async_trait]
    impl WorkloadBackend for Backend {
        async fn list_workloads(&self, query: &ListQuery) -> DeckResult<WorkloadPage>;
        async fn get_workload_metrics(&self, namespace: &str, name: &str) -> DeckResult<MetricsUpdate>;
        async fn get_average_metrics(&self, namespace: &str, name: &str) -> DeckResult<AverageUsage>;
        async fn list_namespaces(&self) -> DeckResult<Vec<String>>;
        async fn pause_workload(&self, namespace: &str, name: &str) -> DeckResult<()>;
        async fn start_workload(&self, namespace: &str, name: &str) -> DeckResult<()>;
        async fn restart_workload(&self, namespace: &str, name: &str) -> DeckResult<()>;
        async fn delete_workload(&self, namespace: &str, name: &str) -> DeckResult<()>;
    }
}

fn workloads(namespace: &str, count: usize) -> Vec<WorkloadSummary> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let mut w = WorkloadSummary::new(
                format!("{}-uid-{}", namespace, i),
                format!("app-{:03}", i),
                namespace,
                WorkloadKind::Deployment,
                5,
            );
            w.created_at = Some(base + ChronoDuration::minutes(i as i64));
            w
        })
        .collect()
}

fn cpu_update(value: f64) -> MetricsUpdate {
    MetricsUpdate {
        cpu: vec![MetricSample::new(1_700_000_000, value)],
        ..Default::default()
    }
}

/// Backend serving `items` filtered by namespace, with constant metrics
fn backend_with(items: Vec<WorkloadSummary>) -> MockBackend {
    let mut backend = MockBackend::new();
    backend.expect_list_workloads().returning(move |query| {
        let in_namespace = items
            .iter()
            .filter(|w| w.namespace == query.namespace)
            .cloned()
            .collect();
        Ok(paginate(in_namespace, query))
    });
    expect_metrics(&mut backend);
    backend
}

fn expect_metrics(backend: &mut MockBackend) {
    backend
        .expect_get_workload_metrics()
        .returning(|_, _| Ok(cpu_update(42.0)));
    backend
        .expect_get_average_metrics()
        .returning(|_, _| Ok(AverageUsage::default()));
    backend
        .expect_list_namespaces()
        .returning(|| Ok(vec!["team".to_string(), "default".to_string()]));
}

fn start(backend: MockBackend, initial: PaginationState) -> SyncHandle {
    AppListSynchronizer::start(Arc::new(backend), SyncSettings::default(), initial)
}

async fn wait_for(handle: &SyncHandle, pred: impl Fn(&ListSnapshot) -> bool) -> ListSnapshot {
    let mut rx = handle.subscribe();
    timeout(Duration::from_secs(60), async move {
        loop {
            let snap = rx.borrow_and_update().clone();
            if pred(&snap) {
                return snap;
            }
            rx.changed().await.expect("synchronizer dropped");
        }
    })
    .await
    .expect("timed out waiting for snapshot")
}

fn loaded(snap: &ListSnapshot) -> bool {
    !snap.is_loading && snap.revision > 0
}

#[tokio::test(start_paused = true)]
async fn test_first_fetch_then_metrics() {
    let handle = start(
        backend_with(workloads("team", 5)),
        PaginationState::new("team", 10),
    );
    assert!(handle.snapshot().is_loading);

    let snap = wait_for(&handle, |s| {
        loaded(s)
            && s.items.len() == 5
            && s.items.iter().all(|w| w.cpu_usage.latest() == Some(42.0))
    })
    .await;

    assert_eq!(snap.pagination.total_items, 5);
    assert_eq!(snap.pagination.total_pages, 1);
    assert_eq!(snap.location, "namespace=team&page=1&pageSize=10");
    assert_eq!(snap.namespaces, vec!["default", "team"]);
    assert_eq!(snap.items[0].name, "app-004");

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_refresh_keeps_previous_list() {
    let items = workloads("team", 3);
    let calls = Arc::new(AtomicUsize::new(0));
    let mut backend = MockBackend::new();
    let counter = Arc::clone(&calls);
    backend.expect_list_workloads().returning(move |query| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(paginate(items.clone(), query))
        } else {
            Err(DeckError::Transport("connection reset".to_string()))
        }
    });
    expect_metrics(&mut backend);

    let handle = start(backend, PaginationState::new("team", 10));
    let mut notices = handle.notices().expect("notice receiver");
    assert!(handle.notices().is_none());

    wait_for(&handle, |s| loaded(s) && s.items.len() == 3).await;
    handle.refetch(Navigation::default()).unwrap();

    let notice = timeout(Duration::from_secs(30), notices.recv())
        .await
        .expect("no notice")
        .expect("notice channel closed");
    assert!(notice.is_error);
    assert!(notice.message.contains("connection reset"));

    let snap = handle.snapshot();
    assert_eq!(snap.items.len(), 3);
    assert!(!snap.is_loading);
    assert!(calls.load(Ordering::SeqCst) >= 2);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_navigation_refetches() {
    let mut items = workloads("team", 25);
    items.extend(workloads("other", 3));
    let handle = start(backend_with(items), PaginationState::new("team", 10));

    wait_for(&handle, |s| loaded(s) && s.pagination.total_items == 25).await;
    let unchanged = handle.prev_page().unwrap();
    assert_eq!(unchanged.page, 1);

    let state = handle.next_page().unwrap();
    assert_eq!(state.page, 2);
    assert!(handle.snapshot().is_loading);

    let snap = wait_for(&handle, |s| loaded(s) && s.pagination.page == 2).await;
    assert_eq!(snap.items.len(), 10);
    assert_eq!(snap.items[0].name, "app-014");
    assert_eq!(snap.location, "namespace=team&page=2&pageSize=10");

    let state = handle.set_namespace("other").unwrap();
    assert_eq!(state.page, 1);
    let snap = wait_for(&handle, |s| loaded(s) && s.pagination.namespace == "other").await;
    assert_eq!(snap.items.len(), 3);
    assert!(snap.items.iter().all(|w| w.namespace == "other"));

    let err = handle.set_page_size(15).unwrap_err();
    assert!(matches!(err, DeckError::InvalidArgument(_)));
    assert_eq!(handle.snapshot().pagination.page_size, 10);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_polls_skip_paused_and_follow_viewport() {
    let mut items = workloads("team", 5);
    items[2].is_paused = true;
    let paused_name = items[2].name.clone();

    let polled = Arc::new(Mutex::new(Vec::<String>::new()));
    let mut backend = MockBackend::new();
    backend
        .expect_list_workloads()
        .returning(move |query| Ok(paginate(items.clone(), query)));
    let record = Arc::clone(&polled);
    backend
        .expect_get_workload_metrics()
        .returning(move |_, name| {
            record.lock().unwrap().push(name.to_string());
            Ok(cpu_update(42.0))
        });
    backend
        .expect_get_average_metrics()
        .returning(|_, _| Ok(AverageUsage::default()));
    backend.expect_list_namespaces().returning(|| Ok(Vec::new()));

    let handle = start(backend, PaginationState::new("team", 10));
    wait_for(&handle, |s| {
        loaded(s)
            && s.items
                .iter()
                .filter(|w| !w.is_paused)
                .all(|w| w.cpu_usage.latest() == Some(42.0))
    })
    .await;
    assert!(!polled.lock().unwrap().contains(&paused_name));

    handle.set_visible(["team-uid-0", "team-uid-1", "team-uid-3"]);
    sleep(Duration::from_millis(500)).await;
    polled.lock().unwrap().clear();
    sleep(Duration::from_secs(10)).await;

    let polled = polled.lock().unwrap().clone();
    assert!(!polled.is_empty());
    assert!(
        polled
            .iter()
            .all(|name| ["app-000", "app-001", "app-003"].contains(&name.as_str()))
    );

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_lifecycle_action_reports_and_refreshes() {
    let mut backend = backend_with(workloads("team", 2));
    let paused = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&paused);
    backend
        .expect_pause_workload()
        .times(1)
        .returning(move |namespace, name| {
            record
                .lock()
                .unwrap()
                .push(format!("{}/{}", namespace, name));
            Ok(())
        });

    let handle = start(backend, PaginationState::new("team", 10));
    let mut notices = handle.notices().expect("notice receiver");
    wait_for(&handle, |s| loaded(s) && s.items.len() == 2).await;

    handle
        .run_action(LifecycleAction::Pause, "team-uid-0")
        .await
        .unwrap();
    assert_eq!(*paused.lock().unwrap(), vec!["team/app-000".to_string()]);

    let notice = notices.recv().await.expect("notice channel closed");
    assert!(!notice.is_error);
    assert_eq!(notice.message, "pause app-000: ok");

    let err = handle
        .run_action(LifecycleAction::Pause, "missing")
        .await
        .unwrap_err();
    assert!(matches!(err, DeckError::InvalidArgument(_)));

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_delete_action_calls_backend() {
    let mut backend = backend_with(workloads("team", 2));
    let deleted = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&deleted);
    backend
        .expect_delete_workload()
        .times(1)
        .returning(move |namespace, name| {
            record
                .lock()
                .unwrap()
                .push(format!("{}/{}", namespace, name));
            Ok(())
        });

    let handle = start(backend, PaginationState::new("team", 10));
    let mut notices = handle.notices().expect("notice receiver");
    wait_for(&handle, |s| loaded(s) && s.items.len() == 2).await;

    handle
        .run_action(LifecycleAction::Delete, "team-uid-1")
        .await
        .unwrap();
    assert_eq!(*deleted.lock().unwrap(), vec!["team/app-001".to_string()]);

    let notice = notices.recv().await.expect("notice channel closed");
    assert_eq!(notice.message, "delete app-001: ok");

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_search_is_debounced_and_resets_page() {
    let queries = Arc::new(Mutex::new(Vec::<String>::new()));
    let items = workloads("team", 25);
    let record = Arc::clone(&queries);
    let mut backend = MockBackend::new();
    backend.expect_list_workloads().returning(move |query| {
        record.lock().unwrap().push(query.filter_text.clone());
        Ok(paginate(items.clone(), query))
    });
    expect_metrics(&mut backend);

    let handle = start(backend, PaginationState::new("team", 10));
    wait_for(&handle, |s| loaded(s) && s.pagination.total_items == 25).await;
    handle.next_page().unwrap();
    wait_for(&handle, |s| loaded(s) && s.pagination.page == 2).await;

    handle.search("app-01");
    sleep(Duration::from_millis(100)).await;
    handle.search("app-012");
    sleep(Duration::from_millis(100)).await;
    // Still inside the quiet period
    assert_eq!(handle.snapshot().pagination.filter_text, "");
    assert_eq!(handle.snapshot().pagination.page, 2);

    let snap = wait_for(&handle, |s| {
        loaded(s) && s.pagination.filter_text == "app-012"
    })
    .await;
    assert_eq!(snap.pagination.page, 1);
    assert_eq!(snap.items.len(), 1);
    assert_eq!(snap.items[0].name, "app-012");
    assert_eq!(snap.location, "namespace=team&page=1&pageSize=10&filterText=app-012");

    let queries = queries.lock().unwrap().clone();
    assert!(queries.iter().any(|f| f == "app-012"));
    assert!(queries.iter().all(|f| f != "app-01"));

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_dispose_drops_pending_search() {
    let items = workloads("team", 3);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut backend = MockBackend::new();
    backend.expect_list_workloads().returning(move |query| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(paginate(items.clone(), query))
    });
    expect_metrics(&mut backend);

    let handle = start(backend, PaginationState::new("team", 10));
    wait_for(&handle, |s| loaded(s) && s.items.len() == 3).await;

    handle.search("app-001");
    handle.shutdown().await;
    let after_dispose = calls.load(Ordering::SeqCst);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(calls.load(Ordering::SeqCst), after_dispose);
    assert_eq!(handle.snapshot().pagination.filter_text, "");
}

#[tokio::test(start_paused = true)]
async fn test_average_cadence_replaces_history() {
    let mut items = workloads("team", 4);
    items[2].is_paused = true;
    let paused_name = items[2].name.clone();

    let requested = Arc::new(Mutex::new(Vec::<String>::new()));
    let mut backend = MockBackend::new();
    backend
        .expect_list_workloads()
        .returning(move |query| Ok(paginate(items.clone(), query)));
    backend
        .expect_get_workload_metrics()
        .returning(|_, _| Ok(cpu_update(42.0)));
    let record = Arc::clone(&requested);
    backend
        .expect_get_average_metrics()
        .returning(move |_, name| {
            record.lock().unwrap().push(name.to_string());
            Ok(AverageUsage {
                cpu: vec![MetricSample::new(60, 10.0), MetricSample::new(120, 20.0)],
                memory: vec![MetricSample::new(60, 30.0)],
            })
        });
    backend.expect_list_namespaces().returning(|| Ok(Vec::new()));

    let handle = start(backend, PaginationState::new("team", 10));
    wait_for(&handle, |s| {
        loaded(s)
            && s.items.iter().filter(|w| !w.is_paused).all(|w| {
                w.average_cpu.latest() == Some(20.0) && w.average_memory.latest() == Some(30.0)
            })
    })
    .await;
    assert!(!requested.lock().unwrap().contains(&paused_name));

    // Metrics and list refreshes keep running; averages wait for their own interval
    sleep(Duration::from_secs(1)).await;
    let settled = requested.lock().unwrap().len();
    sleep(Duration::from_secs(10)).await;
    assert_eq!(requested.lock().unwrap().len(), settled);

    sleep(Duration::from_secs(120)).await;
    let requested = requested.lock().unwrap().clone();
    assert!(requested.len() > settled);
    assert!(!requested.contains(&paused_name));

    let snap = handle.snapshot();
    for w in snap.items.iter().filter(|w| !w.is_paused) {
        let stamps: Vec<i64> = w.average_cpu.samples().map(|s| s.timestamp).collect();
        assert!(stamps.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(stamps.iter().filter(|t| **t > 0).count(), 2);
        assert_eq!(w.average_cpu.len(), 5);
    }

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_dispose_stops_all_requests() {
    let items = workloads("team", 2);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut backend = MockBackend::new();
    backend.expect_list_workloads().returning(move |query| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(paginate(items.clone(), query))
    });
    expect_metrics(&mut backend);

    let handle = start(backend, PaginationState::new("team", 10));
    wait_for(&handle, |s| loaded(s) && s.items.len() == 2).await;

    handle.shutdown().await;
    assert!(handle.is_disposed());
    assert!(handle.refetch(Navigation::page(1)).is_err());

    let after_dispose = calls.load(Ordering::SeqCst);
    sleep(Duration::from_secs(30)).await;
    assert_eq!(calls.load(Ordering::SeqCst), after_dispose);
}
