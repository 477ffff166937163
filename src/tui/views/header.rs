//! Header view rendering

use crate::sync::ListSnapshot;
use crate::tui::theme::Theme;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Render context, namespace, paging and the current location
pub fn render_header(
    f: &mut Frame,
    area: Rect,
    snapshot: &ListSnapshot,
    context: Option<&str>,
    read_only: bool,
    theme: &Theme,
) {
    let pagination = &snapshot.pagination;
    let label = Style::default().fg(theme.text_label);

    let mut first = vec![
        Span::styled("Context: ", label),
        Span::styled(context.unwrap_or("-").to_string(), theme.header_context_style()),
        Span::raw("  "),
        Span::styled("Namespace: ", label),
        Span::styled(pagination.namespace.clone(), theme.header_namespace_style()),
    ];
    if !pagination.filter_text.is_empty() {
        first.push(Span::raw("  "));
        first.push(Span::styled(
            format!("name~'{}'", pagination.filter_text),
            Style::default().fg(theme.header_filter),
        ));
    }
    if read_only {
        first.push(Span::raw("  "));
        first.push(Span::styled("[read-only]", theme.operation_warning_style()));
    }

    let mut second = vec![
        Span::styled("Page: ", label),
        Span::raw(format!(
            "{}/{}  ({} workloads, {} per page)",
            pagination.page,
            pagination.last_page(),
            pagination.total_items,
            pagination.page_size
        )),
    ];
    if snapshot.is_loading {
        second.push(Span::raw("  "));
        second.push(Span::styled("loading...", theme.operation_warning_style()));
    }

    let third = Line::from(vec![
        Span::styled("Location: ", label),
        Span::styled(
            format!("?{}", snapshot.location),
            Style::default().fg(theme.header_location),
        ),
    ]);

    let header = Paragraph::new(vec![Line::from(first), Line::from(second), third])
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, area);
}
