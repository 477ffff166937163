//! Identifier-keyed workload store
//!
//! [`WorkloadStore`] owns the list, the pagination state and the per-item
//! request tickets. Every write goes through the inner `watch` sender, so
//! mutations are serialised and subscribers see each committed revision.

use crate::backend::WorkloadPage;
use crate::error::{DeckError, DeckResult};
use crate::models::{AverageUsage, MetricsUpdate, WorkloadSummary};
use crate::sync::pagination::{Navigation, PaginationState};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// What subscribers observe
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSnapshot {
    pub items: Vec<WorkloadSummary>,
    pub pagination: PaginationState,
    /// A query different from the one currently shown is being fetched
    pub is_loading: bool,
    /// Query string form of the pagination state
    pub location: String,
    /// Incremented on every committed change
    pub revision: u64,
    pub namespaces: Vec<String>,
    #[serde(skip)]
    loaded: Option<PaginationState>,
}

impl ListSnapshot {
    fn new(pagination: PaginationState) -> Self {
        Self {
            items: Vec::new(),
            location: pagination.to_query(),
            pagination,
            is_loading: true,
            revision: 0,
            namespaces: Vec::new(),
            loaded: None,
        }
    }

    pub fn get(&self, id: &str) -> Option<&WorkloadSummary> {
        self.items.iter().find(|w| w.id == id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|w| w.id.clone()).collect()
    }

    fn refresh_loading(&mut self) {
        self.is_loading = !self
            .loaded
            .as_ref()
            .is_some_and(|q| q.same_query(&self.pagination));
    }
}

/// One-shot user-visible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub is_error: bool,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

/// Polling cadence a ticket belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
    Metrics,
    Average,
}

/// Result of applying a list response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Applied {
        /// The set of identifiers differs from the previous list
        ids_changed: bool,
        /// The page was out of range and clamped to the last page
        clamped: bool,
    },
    /// The pagination changed while the request was in flight
    Stale,
    Disposed,
}

/// Unit of work for one metric poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTarget {
    pub id: String,
    pub namespace: String,
    pub name: String,
}

struct StoreInner {
    tx: watch::Sender<ListSnapshot>,
    disposed: AtomicBool,
    next_ticket: AtomicU64,
    applied: Mutex<HashMap<(Cadence, String), u64>>,
}

/// Shared list state, cheap to clone
#[derive(Clone)]
pub struct WorkloadStore {
    inner: Arc<StoreInner>,
}

impl WorkloadStore {
    pub fn new(pagination: PaginationState) -> Self {
        let (tx, _rx) = watch::channel(ListSnapshot::new(pagination));
        Self {
            inner: Arc::new(StoreInner {
                tx,
                disposed: AtomicBool::new(false),
                next_ticket: AtomicU64::new(1),
                applied: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.inner.tx.subscribe()
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.inner.tx.borrow().clone()
    }

    pub fn pagination(&self) -> PaginationState {
        self.inner.tx.borrow().pagination.clone()
    }

    /// Poll targets for every item that is not paused, in list order
    pub fn poll_targets(&self) -> Vec<PollTarget> {
        self.inner
            .tx
            .borrow()
            .items
            .iter()
            .filter(|w| !w.is_paused)
            .map(|w| PollTarget {
                id: w.id.clone(),
                namespace: w.namespace.clone(),
                name: w.name.clone(),
            })
            .collect()
    }

    /// Namespace and name of an item
    pub fn locate(&self, id: &str) -> Option<(String, String)> {
        self.inner
            .tx
            .borrow()
            .get(id)
            .map(|w| (w.namespace.clone(), w.name.clone()))
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Stop accepting writes; later merges are discarded
    pub fn dispose(&self) {
        self.inner.disposed.store(true, Ordering::SeqCst);
    }

    /// Validate and apply a navigation atomically
    ///
    /// On error the pagination state is left untouched.
    pub fn navigate(&self, nav: &Navigation) -> DeckResult<PaginationState> {
        if self.is_disposed() {
            return Err(DeckError::invalid("workload store is disposed"));
        }
        let mut result = Err(DeckError::invalid("navigation was not applied"));
        self.inner.tx.send_if_modified(|snap| match snap.pagination.navigate(nav) {
            Ok(next) => {
                snap.location = next.to_query();
                snap.pagination = next.clone();
                snap.refresh_loading();
                snap.revision += 1;
                result = Ok(next);
                true
            }
            Err(e) => {
                result = Err(e);
                false
            }
        });
        result
    }

    /// Replace the list with a response fetched for `requested`
    pub fn replace_items(&self, requested: &PaginationState, page: WorkloadPage) -> ReplaceOutcome {
        if self.is_disposed() {
            return ReplaceOutcome::Disposed;
        }

        let mut outcome = ReplaceOutcome::Stale;
        self.inner.tx.send_if_modified(|snap| {
            if !snap.pagination.same_query(requested) {
                return false;
            }

            let old: HashSet<&str> = snap.items.iter().map(|w| w.id.as_str()).collect();
            let new: HashSet<&str> = page.items.iter().map(|w| w.id.as_str()).collect();
            let ids_changed = old != new;

            // Keep series already collected for items that survive the refresh
            let mut previous: HashMap<String, WorkloadSummary> = snap
                .items
                .drain(..)
                .map(|w| (w.id.clone(), w))
                .collect();
            snap.items = page
                .items
                .into_iter()
                .map(|mut w| {
                    if let Some(prev) = previous.remove(&w.id) {
                        w.cpu_usage = prev.cpu_usage;
                        w.memory_usage = prev.memory_usage;
                        w.average_cpu = prev.average_cpu;
                        w.average_memory = prev.average_memory;
                    }
                    w
                })
                .collect();

            snap.loaded = Some(snap.pagination.clone());
            let clamped = snap.pagination.apply_totals(page.total);
            snap.location = snap.pagination.to_query();
            snap.refresh_loading();
            snap.revision += 1;

            outcome = ReplaceOutcome::Applied {
                ids_changed,
                clamped,
            };
            true
        });

        if let ReplaceOutcome::Applied {
            ids_changed: true, ..
        } = outcome
        {
            self.prune_tickets();
        }
        outcome
    }

    /// Mark the in-flight full refresh as finished without new data
    pub fn mark_failed(&self) {
        if self.is_disposed() {
            return;
        }
        self.inner.tx.send_if_modified(|snap| {
            if snap.is_loading {
                snap.is_loading = false;
                snap.revision += 1;
                return true;
            }
            false
        });
    }

    pub fn set_namespaces(&self, mut namespaces: Vec<String>) {
        if self.is_disposed() {
            return;
        }
        namespaces.sort();
        namespaces.dedup();
        self.inner.tx.send_if_modified(|snap| {
            if snap.namespaces == namespaces {
                return false;
            }
            snap.namespaces = namespaces;
            snap.revision += 1;
            true
        });
    }

    /// Ticket for a request about to be sent; higher tickets are newer
    pub fn issue_ticket(&self) -> u64 {
        self.inner.next_ticket.fetch_add(1, Ordering::SeqCst)
    }

    /// Record `ticket` as applied unless a newer one already was
    fn claim(&self, cadence: Cadence, id: &str, ticket: u64) -> bool {
        let Ok(mut applied) = self.inner.applied.lock() else {
            return false;
        };
        let last = applied.entry((cadence, id.to_string())).or_insert(0);
        if ticket <= *last {
            return false;
        }
        *last = ticket;
        true
    }

    fn prune_tickets(&self) {
        let ids: HashSet<String> = self.inner.tx.borrow().ids().into_iter().collect();
        if let Ok(mut applied) = self.inner.applied.lock() {
            applied.retain(|(_, id), _| ids.contains(id));
        }
    }

    /// Merge a metrics response into an item
    ///
    /// Returns `false` when the store is disposed, the item is gone, or a newer
    /// response was already applied.
    pub fn merge_metrics(&self, id: &str, ticket: u64, update: &MetricsUpdate) -> bool {
        self.merge(Cadence::Metrics, id, ticket, |w| w.apply_metrics(update))
    }

    pub fn merge_average(&self, id: &str, ticket: u64, usage: &AverageUsage) -> bool {
        self.merge(Cadence::Average, id, ticket, |w| w.apply_average(usage))
    }

    fn merge(
        &self,
        cadence: Cadence,
        id: &str,
        ticket: u64,
        apply: impl FnOnce(&mut WorkloadSummary),
    ) -> bool {
        if self.is_disposed() {
            tracing::debug!("Discarding {:?} response for {} after dispose", cadence, id);
            return false;
        }
        if self.inner.tx.borrow().get(id).is_none() {
            return false;
        }
        if !self.claim(cadence, id, ticket) {
            tracing::debug!("Discarding stale {:?} response for {} (ticket {})", cadence, id, ticket);
            return false;
        }

        self.inner.tx.send_if_modified(|snap| {
            match snap.items.iter_mut().find(|w| w.id == id) {
                Some(item) => {
                    apply(item);
                    snap.revision += 1;
                    true
                }
                None => false,
            }
        })
    }
}

impl std::fmt::Debug for WorkloadStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkloadStore")
            .field("disposed", &self.is_disposed())
            .field("revision", &self.inner.tx.borrow().revision)
            .finish()
    }
}
