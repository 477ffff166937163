//! App list synchronizer
//!
//! Runs the three refresh cadences over one [`WorkloadStore`]:
//! - full refresh: the list query for the current pagination state
//! - metrics: per-workload utilisation for the rows on screen
//! - average: coarse utilisation history, on a much slower interval
//!
//! Each cadence is its own tokio task with its own interval, trigger and
//! shutdown receiver. They only meet in the store, whose merges are keyed by
//! workload id.

use crate::backend::{ListQuery, WorkloadBackend};
use crate::constants::{
    AVERAGE_REFRESH_MS, FULL_REFRESH_MS, METRICS_CONCURRENCY, METRICS_REFRESH_MS,
    SEARCH_DEBOUNCE_MS, VIEWPORT_MIN_VISIBLE,
};
use crate::error::{DeckError, DeckResult};
use crate::sync::debounce::SearchDebouncer;
use crate::sync::pagination::{Navigation, PaginationState};
use crate::sync::store::{Cadence, ListSnapshot, Notice, ReplaceOutcome, WorkloadStore};
use crate::sync::throttle::{BatchReport, RequestController};
use crate::sync::viewport::ViewportTracker;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Timing and concurrency knobs for the cadences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub full_refresh: Duration,
    pub metrics_refresh: Duration,
    pub average_refresh: Duration,
    pub concurrency: usize,
    pub viewport_threshold: usize,
    pub search_debounce: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            full_refresh: Duration::from_millis(FULL_REFRESH_MS),
            metrics_refresh: Duration::from_millis(METRICS_REFRESH_MS),
            average_refresh: Duration::from_millis(AVERAGE_REFRESH_MS),
            concurrency: METRICS_CONCURRENCY,
            viewport_threshold: VIEWPORT_MIN_VISIBLE,
            search_debounce: Duration::from_millis(SEARCH_DEBOUNCE_MS),
        }
    }
}

/// Lifecycle operation on a single workload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Pause,
    Start,
    Restart,
    Delete,
}

impl LifecycleAction {
    pub fn verb(&self) -> &'static str {
        match self {
            LifecycleAction::Pause => "pause",
            LifecycleAction::Start => "start",
            LifecycleAction::Restart => "restart",
            LifecycleAction::Delete => "delete",
        }
    }

    /// Run the action against a backend
    pub async fn execute(
        &self,
        backend: &dyn WorkloadBackend,
        namespace: &str,
        name: &str,
    ) -> DeckResult<()> {
        match self {
            LifecycleAction::Pause => backend.pause_workload(namespace, name).await,
            LifecycleAction::Start => backend.start_workload(namespace, name).await,
            LifecycleAction::Restart => backend.restart_workload(namespace, name).await,
            LifecycleAction::Delete => backend.delete_workload(namespace, name).await,
        }
    }
}

#[derive(Clone, Default)]
struct Triggers {
    full: Arc<Notify>,
    metrics: Arc<Notify>,
    average: Arc<Notify>,
}

/// State shared by the cadence tasks
#[derive(Clone)]
struct CadenceContext {
    store: WorkloadStore,
    backend: Arc<dyn WorkloadBackend>,
    controller: RequestController,
    viewport: ViewportTracker,
    settings: SyncSettings,
    triggers: Triggers,
    notices: mpsc::UnboundedSender<Notice>,
}

impl CadenceContext {
    fn notify(&self, notice: Notice) {
        // Nobody listening is fine
        let _ = self.notices.send(notice);
    }

    /// One list fetch for the current pagination state
    async fn full_refresh(&self) {
        let requested = self.store.pagination();
        let query = ListQuery::from(&requested);
        tracing::debug!(
            "Fetching workloads: namespace={} page={} pageSize={} filter={:?}",
            query.namespace,
            query.page,
            query.page_size,
            query.filter_text
        );

        match self.backend.list_workloads(&query).await {
            Ok(page) => match self.store.replace_items(&requested, page) {
                ReplaceOutcome::Applied {
                    ids_changed,
                    clamped,
                } => {
                    if clamped {
                        tracing::debug!("Page clamped after refresh, fetching again");
                        self.triggers.full.notify_one();
                    }
                    if ids_changed {
                        // Rows on screen belong to the old list until the view reports again
                        self.viewport.clear();
                        self.triggers.metrics.notify_one();
                        self.triggers.average.notify_one();
                    }
                }
                ReplaceOutcome::Stale => {
                    tracing::debug!("Discarding list response for an outdated query");
                    self.triggers.full.notify_one();
                }
                ReplaceOutcome::Disposed => {}
            },
            Err(e) => {
                if self.store.is_disposed() {
                    return;
                }
                if e.is_transient() {
                    tracing::warn!("Failed to list workloads, retrying next tick: {}", e);
                } else {
                    tracing::error!("Failed to list workloads: {}", e);
                }
                self.store.mark_failed();
                self.notify(Notice::error(format!("Failed to load applications: {}", e)));
            }
        }
    }

    async fn refresh_namespaces(&self) {
        match self.backend.list_namespaces().await {
            Ok(namespaces) => self.store.set_namespaces(namespaces),
            Err(e) => tracing::warn!("Failed to list namespaces: {}", e),
        }
    }

    /// One metric pass over the prioritised, non-paused items
    async fn poll(&self, cadence: Cadence) -> DeckResult<BatchReport> {
        let targets = self.store.poll_targets();
        let ids: Vec<String> = targets.iter().map(|t| t.id.clone()).collect();
        let selected: HashSet<String> = self
            .viewport
            .select(&ids, self.settings.viewport_threshold)
            .into_iter()
            .collect();

        let tasks: Vec<_> = targets
            .into_iter()
            .filter(|t| selected.contains(&t.id))
            .map(|target| {
                let store = self.store.clone();
                let backend = Arc::clone(&self.backend);
                move || async move {
                    let ticket = store.issue_ticket();
                    match cadence {
                        Cadence::Metrics => {
                            let update = backend
                                .get_workload_metrics(&target.namespace, &target.name)
                                .await?;
                            store.merge_metrics(&target.id, ticket, &update);
                        }
                        Cadence::Average => {
                            let usage = backend
                                .get_average_metrics(&target.namespace, &target.name)
                                .await?;
                            store.merge_average(&target.id, ticket, &usage);
                        }
                    }
                    Ok::<(), DeckError>(())
                }
            })
            .collect();

        tracing::debug!("{:?} pass over {} workloads", cadence, tasks.len());
        self.controller
            .run_tasks(tasks, self.settings.concurrency)
            .await
    }
}

/// Apply a navigation and schedule the list fetch
fn apply_navigation(
    store: &WorkloadStore,
    full: &Notify,
    nav: &Navigation,
) -> DeckResult<PaginationState> {
    match store.navigate(nav) {
        Ok(state) => {
            tracing::debug!("Navigated to {}", state.to_query());
            full.notify_one();
            Ok(state)
        }
        Err(e) => {
            tracing::error!("Rejected navigation {:?}: {}", nav, e);
            Err(e)
        }
    }
}

async fn run_full_refresh(ctx: CadenceContext, mut shutdown: watch::Receiver<bool>) {
    tracing::info!("Full refresh cadence started ({:?})", ctx.settings.full_refresh);
    ctx.refresh_namespaces().await;

    let mut ticker = tokio::time::interval(ctx.settings.full_refresh);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
            _ = ctx.triggers.full.notified() => {}
        }

        tokio::select! {
            _ = ctx.full_refresh() => {}
            _ = shutdown.changed() => break,
        }
        ticker.reset();
    }
    tracing::info!("Full refresh cadence stopped");
}

async fn run_poll_cadence(
    ctx: CadenceContext,
    cadence: Cadence,
    mut shutdown: watch::Receiver<bool>,
) {
    let (period, trigger) = match cadence {
        Cadence::Metrics => (ctx.settings.metrics_refresh, Arc::clone(&ctx.triggers.metrics)),
        Cadence::Average => (ctx.settings.average_refresh, Arc::clone(&ctx.triggers.average)),
    };
    tracing::info!("{:?} cadence started ({:?})", cadence, period);

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
            _ = trigger.notified() => {}
        }

        tokio::select! {
            result = ctx.poll(cadence) => match result {
                Ok(report) => tracing::debug!("{:?} pass finished: {:?}", cadence, report),
                Err(e) => tracing::error!("{:?} pass rejected: {}", cadence, e),
            },
            _ = shutdown.changed() => break,
        }
        ticker.reset();
    }
    tracing::info!("{:?} cadence stopped", cadence);
}

struct SyncInner {
    ctx: CadenceContext,
    shutdown: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    debouncer: SearchDebouncer,
    notices: Mutex<Option<mpsc::UnboundedReceiver<Notice>>>,
}

impl SyncInner {
    fn dispose(&self) {
        self.ctx.store.dispose();
        self.ctx.controller.stop();
        self.debouncer.cancel();
        let _ = self.shutdown.send(true);
    }
}

impl Drop for SyncInner {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Entry point: spawns the cadences and hands out a [`SyncHandle`]
pub struct AppListSynchronizer;

impl AppListSynchronizer {
    /// Start all cadences for `initial`
    ///
    /// Must be called from within a tokio runtime. The first list fetch starts
    /// immediately.
    pub fn start(
        backend: Arc<dyn WorkloadBackend>,
        settings: SyncSettings,
        initial: PaginationState,
    ) -> SyncHandle {
        let store = WorkloadStore::new(initial);
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, _) = watch::channel(false);
        let triggers = Triggers::default();

        let ctx = CadenceContext {
            store: store.clone(),
            backend,
            controller: RequestController::new(),
            viewport: ViewportTracker::new(),
            settings: settings.clone(),
            triggers: triggers.clone(),
            notices: notice_tx,
        };

        let search_store = store.clone();
        let search_trigger = Arc::clone(&triggers.full);
        let debouncer = SearchDebouncer::new(settings.search_debounce, move |text| {
            let _ = apply_navigation(&search_store, &search_trigger, &Navigation::filter(text));
        });

        let tasks = vec![
            tokio::spawn(run_full_refresh(ctx.clone(), shutdown_tx.subscribe())),
            tokio::spawn(run_poll_cadence(
                ctx.clone(),
                Cadence::Metrics,
                shutdown_tx.subscribe(),
            )),
            tokio::spawn(run_poll_cadence(
                ctx.clone(),
                Cadence::Average,
                shutdown_tx.subscribe(),
            )),
        ];

        SyncHandle {
            inner: Arc::new(SyncInner {
                ctx,
                shutdown: shutdown_tx,
                tasks: Mutex::new(tasks),
                debouncer,
                notices: Mutex::new(Some(notice_rx)),
            }),
        }
    }
}

/// Handle given to the view layer
///
/// Clones share the same synchronizer. Dropping the last clone disposes it.
#[derive(Clone)]
pub struct SyncHandle {
    inner: Arc<SyncInner>,
}

impl SyncHandle {
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.inner.ctx.store.subscribe()
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.inner.ctx.store.snapshot()
    }

    /// Take the notice receiver; only the first caller gets it
    pub fn notices(&self) -> Option<mpsc::UnboundedReceiver<Notice>> {
        self.inner.notices.lock().ok().and_then(|mut rx| rx.take())
    }

    pub fn viewport(&self) -> ViewportTracker {
        self.inner.ctx.viewport.clone()
    }

    /// Apply a navigation and fetch the list for it
    ///
    /// Every field is optional; an empty navigation just refetches. A rejected
    /// navigation is logged and leaves the state as it was.
    pub fn refetch(&self, nav: Navigation) -> DeckResult<PaginationState> {
        apply_navigation(&self.inner.ctx.store, &self.inner.ctx.triggers.full, &nav)
    }

    /// Debounced filter change
    pub fn search(&self, text: impl Into<String>) {
        self.inner.debouncer.on_input(text);
    }

    /// Move to the next page; no-op on the last page
    pub fn next_page(&self) -> DeckResult<PaginationState> {
        let current = self.inner.ctx.store.pagination();
        if !current.has_next() {
            return Ok(current);
        }
        self.refetch(Navigation::page(current.page + 1))
    }

    /// Move to the previous page; no-op on the first page
    pub fn prev_page(&self) -> DeckResult<PaginationState> {
        let current = self.inner.ctx.store.pagination();
        if !current.has_prev() {
            return Ok(current);
        }
        self.refetch(Navigation::page(current.page - 1))
    }

    pub fn set_page_size(&self, page_size: usize) -> DeckResult<PaginationState> {
        self.refetch(Navigation::page_size(page_size))
    }

    /// Apply a filter now, dropping any pending debounced search
    pub fn set_filter(&self, text: impl Into<String>) -> DeckResult<PaginationState> {
        self.inner.debouncer.cancel();
        self.refetch(Navigation::filter(text))
    }

    pub fn set_namespace(&self, namespace: impl Into<String>) -> DeckResult<PaginationState> {
        self.inner.debouncer.cancel();
        self.refetch(Navigation::namespace(namespace))
    }

    /// Record the rows on screen; a changed set triggers a metrics pass
    pub fn set_visible<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: HashSet<String> = ids.into_iter().map(Into::into).collect();
        let viewport = &self.inner.ctx.viewport;
        if viewport.visible() != ids {
            viewport.set_visible(ids);
            self.inner.ctx.triggers.metrics.notify_one();
        }
    }

    /// Run a lifecycle action on a workload, then refresh the list
    pub async fn run_action(&self, action: LifecycleAction, id: &str) -> DeckResult<()> {
        let ctx = &self.inner.ctx;
        let (namespace, name) = ctx
            .store
            .locate(id)
            .ok_or_else(|| DeckError::invalid(format!("unknown workload {}", id)))?;

        tracing::info!("Running {} on {}/{}", action.verb(), namespace, name);
        let result = action.execute(ctx.backend.as_ref(), &namespace, &name).await;
        match &result {
            Ok(()) => ctx.notify(Notice::info(format!("{} {}: ok", action.verb(), name))),
            Err(e) => {
                tracing::warn!("Failed to {} {}/{}: {}", action.verb(), namespace, name, e);
                ctx.notify(Notice::error(format!("Failed to {} {}: {}", action.verb(), name, e)));
            }
        }
        ctx.triggers.full.notify_one();
        result
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.ctx.store.is_disposed()
    }

    /// Stop every cadence, the throttler and any pending search
    pub fn dispose(&self) {
        tracing::info!("Disposing app list synchronizer");
        self.inner.dispose();
    }

    /// Dispose and wait for the cadence tasks to exit
    pub async fn shutdown(&self) {
        self.dispose();
        let tasks: Vec<JoinHandle<()>> = match self.inner.tasks.lock() {
            Ok(mut tasks) => tasks.drain(..).collect(),
            Err(_) => Vec::new(),
        };
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!("Cadence task ended abnormally: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for SyncHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncHandle")
            .field("settings", &self.inner.ctx.settings)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
