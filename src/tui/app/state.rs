//! Application state structures
//!
//! State sub-structures that group the App's fields by concern.

use crate::constants::STATUS_MESSAGE_TIMEOUT_SECS;
use crate::sync::LifecycleAction;
use std::time::{Duration, Instant};

/// Lifecycle action awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    pub action: LifecycleAction,
    pub id: String,
    pub name: String,
}

/// What keystrokes currently mean
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing a name filter; each keystroke feeds the debounced search
    Search,
    /// Typing a namespace to switch to
    Namespace,
    Confirm(PendingAction),
}

/// Navigation and input state
#[derive(Debug, Default)]
pub struct ViewState {
    pub mode: InputMode,
    /// Text being typed in search or namespace mode
    pub input: String,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub show_help: bool,
}

/// Transient status line
#[derive(Debug, Default)]
pub struct UiState {
    /// (message, is_error)
    pub status_message: Option<(String, bool)>,
    pub status_message_time: Option<Instant>,
}

impl UiState {
    pub fn set_status_message(&mut self, message: impl Into<String>, is_error: bool) {
        self.status_message = Some((message.into(), is_error));
        self.status_message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
        self.status_message_time = None;
    }

    /// Drop the status message once it has been shown long enough
    pub fn check_status_message_timeout(&mut self) {
        let timeout = Duration::from_secs(STATUS_MESSAGE_TIMEOUT_SECS);
        if let Some(set_at) = self.status_message_time {
            if set_at.elapsed() >= timeout {
                self.clear_status_message();
            }
        }
    }
}
