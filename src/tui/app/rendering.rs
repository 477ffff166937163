//! Rendering logic for the application

use super::core::App;
use super::state::InputMode;
use crate::tui::views;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

impl App {
    /// Draw one frame and remember which rows were visible
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(5),
                Constraint::Length(2),
            ])
            .split(f.area());

        views::render_header(
            f,
            chunks[0],
            &self.snapshot,
            self.context.as_deref(),
            self.read_only,
            &self.theme,
        );

        self.visible_ids = views::render_workload_list(
            f,
            chunks[1],
            &self.snapshot.items,
            &self.columns,
            self.view_state.selected_index,
            &mut self.view_state.scroll_offset,
            self.snapshot.is_loading,
            &self.theme,
        );

        views::render_footer(
            f,
            chunks[2],
            &self.view_state.mode,
            &self.view_state.input,
            self.ui_state.status_message.as_ref(),
            self.read_only,
            &self.theme,
        );

        if let InputMode::Confirm(pending) = &self.view_state.mode {
            views::render_confirmation(f, chunks[1], pending, &self.theme);
        } else if self.view_state.show_help {
            views::render_help(f, chunks[1], self.read_only, &self.theme);
        }
    }
}
