//! Confirmation dialog rendering

use crate::sync::LifecycleAction;
use crate::tui::app::state::PendingAction;
use crate::tui::theme::Theme;
use crate::tui::views::helpers::{centered_rect, create_themed_block};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
};

/// Question asked before running `action`
pub fn confirmation_message(pending: &PendingAction) -> String {
    match pending.action {
        LifecycleAction::Pause => {
            format!("Pause {}? Its replicas will be scaled to 0.", pending.name)
        }
        LifecycleAction::Start => {
            format!("Start {} with its previous replica count?", pending.name)
        }
        LifecycleAction::Restart => format!("Restart all pods of {}?", pending.name),
        LifecycleAction::Delete => format!("Delete {}? This cannot be undone.", pending.name),
    }
}

/// Render the confirmation dialog centered in `area`
pub fn render_confirmation(f: &mut Frame, area: Rect, pending: &PendingAction, theme: &Theme) {
    let key_style = |color: Color| Style::default().fg(color).add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "CONFIRMATION REQUIRED",
            theme.operation_warning_style(),
        )),
        Line::from(""),
        Line::from(confirmation_message(pending)),
        Line::from(""),
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("y", key_style(theme.operation_confirm)),
            Span::raw(" to confirm, "),
            Span::styled("n", key_style(theme.operation_cancel)),
            Span::raw(" or "),
            Span::styled("Esc", key_style(theme.operation_cancel)),
            Span::raw(" to cancel"),
        ]),
    ];

    let popup = centered_rect(60, lines.len() as u16 + 2, area);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(create_themed_block(" Confirm ", theme)),
        popup,
    );
}
