//! Event handling for the application
//!
//! Keys are first mapped to an [`Intent`] for the current [`InputMode`], then
//! applied to the App and the synchronizer handle.

use super::core::App;
use super::state::{InputMode, PendingAction};
use crate::constants::ALLOWED_PAGE_SIZES;
use crate::sync::LifecycleAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a keystroke asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Quit,
    MoveUp,
    MoveDown,
    Top,
    Bottom,
    NextPage,
    PrevPage,
    CyclePageSize,
    BeginSearch,
    BeginNamespace,
    ToggleHelp,
    Lifecycle(LifecycleAction),
    Input(char),
    Backspace,
    Complete,
    Submit,
    Cancel,
    Confirm,
}

/// Map a key to an intent for the given mode
pub fn key_intent(mode: &InputMode, key: KeyEvent) -> Option<Intent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Intent::Quit);
    }

    match mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => Some(Intent::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(Intent::MoveDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Intent::MoveUp),
            KeyCode::Char('g') | KeyCode::Home => Some(Intent::Top),
            KeyCode::Char('G') | KeyCode::End => Some(Intent::Bottom),
            KeyCode::Char(']') | KeyCode::Right | KeyCode::PageDown => Some(Intent::NextPage),
            KeyCode::Char('[') | KeyCode::Left | KeyCode::PageUp => Some(Intent::PrevPage),
            KeyCode::Char('z') => Some(Intent::CyclePageSize),
            KeyCode::Char('/') => Some(Intent::BeginSearch),
            KeyCode::Char(':') => Some(Intent::BeginNamespace),
            KeyCode::Char('?') => Some(Intent::ToggleHelp),
            KeyCode::Char('p') => Some(Intent::Lifecycle(LifecycleAction::Pause)),
            KeyCode::Char('s') => Some(Intent::Lifecycle(LifecycleAction::Start)),
            KeyCode::Char('r') => Some(Intent::Lifecycle(LifecycleAction::Restart)),
            KeyCode::Char('d') => Some(Intent::Lifecycle(LifecycleAction::Delete)),
            KeyCode::Esc => Some(Intent::Cancel),
            _ => None,
        },
        InputMode::Search | InputMode::Namespace => match key.code {
            KeyCode::Enter => Some(Intent::Submit),
            KeyCode::Esc => Some(Intent::Cancel),
            KeyCode::Backspace => Some(Intent::Backspace),
            KeyCode::Tab => Some(Intent::Complete),
            KeyCode::Char(c) => Some(Intent::Input(c)),
            _ => None,
        },
        InputMode::Confirm(_) => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(Intent::Confirm),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Intent::Cancel),
            _ => None,
        },
    }
}

/// Page size following `current` in the allowed set, wrapping around
pub fn next_page_size(current: usize) -> usize {
    let position = ALLOWED_PAGE_SIZES.iter().position(|s| *s == current);
    match position {
        Some(i) => ALLOWED_PAGE_SIZES[(i + 1) % ALLOWED_PAGE_SIZES.len()],
        None => ALLOWED_PAGE_SIZES[0],
    }
}

/// First known namespace starting with `prefix`
pub fn complete_namespace<'a>(namespaces: &'a [String], prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    namespaces
        .iter()
        .find(|ns| ns.starts_with(prefix))
        .map(String::as_str)
}

impl App {
    /// Main keyboard event handler; returns `true` to quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.check_status_message_timeout();

        let Some(intent) = key_intent(&self.view_state.mode, key) else {
            return false;
        };

        match intent {
            Intent::Quit => return true,
            Intent::MoveDown => {
                let len = self.snapshot.items.len();
                if self.view_state.selected_index + 1 < len {
                    self.view_state.selected_index += 1;
                }
            }
            Intent::MoveUp => {
                self.view_state.selected_index = self.view_state.selected_index.saturating_sub(1);
            }
            Intent::Top => self.view_state.selected_index = 0,
            Intent::Bottom => {
                self.view_state.selected_index = self.snapshot.items.len().saturating_sub(1);
            }
            Intent::NextPage => {
                if self.handle.next_page().is_ok() {
                    self.view_state.selected_index = 0;
                }
            }
            Intent::PrevPage => {
                if self.handle.prev_page().is_ok() {
                    self.view_state.selected_index = 0;
                }
            }
            Intent::CyclePageSize => {
                let size = next_page_size(self.snapshot.pagination.page_size);
                if self.handle.set_page_size(size).is_ok() {
                    self.ui_state
                        .set_status_message(format!("Page size {}", size), false);
                }
            }
            Intent::BeginSearch => {
                self.view_state.input = self.snapshot.pagination.filter_text.clone();
                self.view_state.mode = InputMode::Search;
            }
            Intent::BeginNamespace => {
                self.view_state.input.clear();
                self.view_state.mode = InputMode::Namespace;
            }
            Intent::ToggleHelp => self.view_state.show_help = !self.view_state.show_help,
            Intent::Lifecycle(action) => self.request_action(action),
            Intent::Input(c) => {
                self.view_state.input.push(c);
                self.on_input_changed();
            }
            Intent::Backspace => {
                self.view_state.input.pop();
                self.on_input_changed();
            }
            Intent::Complete => {
                if self.view_state.mode == InputMode::Namespace {
                    if let Some(ns) =
                        complete_namespace(&self.snapshot.namespaces, &self.view_state.input)
                    {
                        self.view_state.input = ns.to_string();
                    }
                }
            }
            Intent::Submit => self.submit_input(),
            Intent::Cancel => self.cancel(),
            Intent::Confirm => self.confirm_action(),
        }

        false
    }

    fn on_input_changed(&mut self) {
        if self.view_state.mode == InputMode::Search {
            self.handle.search(self.view_state.input.clone());
        }
    }

    fn submit_input(&mut self) {
        let input = std::mem::take(&mut self.view_state.input);
        match self.view_state.mode {
            InputMode::Search => {
                let _ = self.handle.set_filter(input.trim());
            }
            InputMode::Namespace => {
                let namespace = input.trim();
                if !namespace.is_empty() && self.handle.set_namespace(namespace).is_ok() {
                    self.view_state.selected_index = 0;
                    self.ui_state
                        .set_status_message(format!("Namespace {}", namespace), false);
                }
            }
            _ => {}
        }
        self.view_state.mode = InputMode::Normal;
    }

    fn cancel(&mut self) {
        match self.view_state.mode {
            InputMode::Search => {
                // Esc clears the filter entirely
                self.view_state.input.clear();
                let _ = self.handle.set_filter("");
            }
            InputMode::Normal => {
                if self.view_state.show_help {
                    self.view_state.show_help = false;
                } else {
                    self.ui_state.clear_status_message();
                }
            }
            _ => self.view_state.input.clear(),
        }
        self.view_state.mode = InputMode::Normal;
    }

    fn request_action(&mut self, action: LifecycleAction) {
        if self.read_only {
            self.ui_state.set_status_message(
                "Read-only mode: lifecycle operations are disabled",
                true,
            );
            return;
        }
        let Some((id, name, is_paused)) = self
            .selected()
            .map(|w| (w.id.clone(), w.name.clone(), w.is_paused))
        else {
            return;
        };
        if action == LifecycleAction::Start && !is_paused {
            self.ui_state
                .set_status_message(format!("{} is not paused", name), true);
            return;
        }
        if action == LifecycleAction::Pause && is_paused {
            self.ui_state
                .set_status_message(format!("{} is already paused", name), true);
            return;
        }

        self.view_state.mode = InputMode::Confirm(PendingAction { action, id, name });
    }

    fn confirm_action(&mut self) {
        let mode = std::mem::take(&mut self.view_state.mode);
        let InputMode::Confirm(pending) = mode else {
            return;
        };

        self.ui_state.set_status_message(
            format!("Running {} on {}...", pending.action.verb(), pending.name),
            false,
        );
        // The outcome arrives as a notice
        let handle = self.handle.clone();
        tokio::spawn(async move {
            let _ = handle.run_action(pending.action, &pending.id).await;
        });
    }
}
