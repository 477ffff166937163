//! Core App struct
//!
//! The App owns view state only. Workload data lives in the synchronizer's
//! store and arrives here as snapshots.

use super::state::{UiState, ViewState};
use crate::models::{Column, WorkloadSummary, workload_columns};
use crate::sync::{ListSnapshot, Notice, SyncHandle};
use crate::tui::theme::Theme;
use tokio::sync::watch;

/// Main application state
pub struct App {
    pub(super) handle: SyncHandle,
    snapshot_rx: watch::Receiver<ListSnapshot>,
    pub(super) snapshot: ListSnapshot,
    pub(super) context: Option<String>,
    pub(super) read_only: bool,
    pub(super) columns: Vec<Column<WorkloadSummary>>,
    pub(super) theme: Theme,
    pub(super) view_state: ViewState,
    pub(super) ui_state: UiState,
    /// Ids of the rows drawn in the last frame
    pub(super) visible_ids: Vec<String>,
}

impl App {
    pub fn new(
        handle: SyncHandle,
        context: Option<String>,
        read_only: bool,
        no_icons: bool,
        theme: Theme,
    ) -> Self {
        let snapshot_rx = handle.subscribe();
        let snapshot = snapshot_rx.borrow().clone();
        Self {
            handle,
            snapshot_rx,
            snapshot,
            context,
            read_only,
            columns: workload_columns(no_icons),
            theme,
            view_state: ViewState::default(),
            ui_state: UiState::default(),
            visible_ids: Vec::new(),
        }
    }

    /// Pull the latest snapshot if the store changed; returns whether it did
    pub fn refresh_snapshot(&mut self) -> bool {
        if !self.snapshot_rx.has_changed().unwrap_or(false) {
            return false;
        }
        self.snapshot = self.snapshot_rx.borrow_and_update().clone();
        self.clamp_selection();
        true
    }

    pub fn snapshot(&self) -> &ListSnapshot {
        &self.snapshot
    }

    pub fn selected(&self) -> Option<&WorkloadSummary> {
        self.snapshot.items.get(self.view_state.selected_index)
    }

    pub fn apply_notice(&mut self, notice: Notice) {
        self.ui_state
            .set_status_message(notice.message, notice.is_error);
    }

    pub fn check_status_message_timeout(&mut self) {
        self.ui_state.check_status_message_timeout();
    }

    /// Report the rows drawn in the last frame to the viewport tracker
    pub fn publish_visible(&self) {
        self.handle.set_visible(self.visible_ids.iter().cloned());
    }

    pub(super) fn clamp_selection(&mut self) {
        let len = self.snapshot.items.len();
        if len == 0 {
            self.view_state.selected_index = 0;
        } else if self.view_state.selected_index >= len {
            self.view_state.selected_index = len - 1;
        }
    }

    pub fn dispose(&self) {
        self.handle.dispose();
    }
}
