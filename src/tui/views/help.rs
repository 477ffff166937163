//! Help overlay rendering

use crate::tui::keybindings::help_sections;
use crate::tui::theme::Theme;
use crate::tui::views::helpers::{centered_rect, create_themed_block};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
};

/// Render the keybinding overlay over `area`
pub fn render_help(f: &mut Frame, area: Rect, read_only: bool, theme: &Theme) {
    let mut lines = Vec::new();
    for (title, entries) in help_sections(read_only) {
        lines.push(Line::from(Span::styled(
            title,
            Style::default()
                .fg(theme.text_label)
                .add_modifier(Modifier::BOLD),
        )));
        for (key, description) in entries {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<14}", key), theme.footer_key_style()),
                Span::raw(description),
            ]));
        }
        lines.push(Line::from(""));
    }

    let popup = centered_rect(44, lines.len() as u16 + 2, area);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(create_themed_block(" Help ", theme)),
        popup,
    );
}
