//! Workload table rendering

use crate::models::{Align, Column, WorkloadSummary};
use crate::tui::theme::Theme;
use crate::tui::views::helpers::{render_empty_state, update_scroll_offset};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Cell, Row, Table},
};

const SCROLL_BUFFER: usize = 2;

/// Rows of `items` that fit in a table of `visible_height` rows
pub fn visible_window(
    items_len: usize,
    scroll_offset: usize,
    visible_height: usize,
) -> std::ops::Range<usize> {
    let start = scroll_offset.min(items_len);
    let end = (start + visible_height).min(items_len);
    start..end
}

/// Render the workload table and return the ids of the rows drawn
pub fn render_workload_list(
    f: &mut Frame,
    area: Rect,
    items: &[WorkloadSummary],
    columns: &[Column<WorkloadSummary>],
    selected_index: usize,
    scroll_offset: &mut usize,
    is_loading: bool,
    theme: &Theme,
) -> Vec<String> {
    // Borders plus the header row
    let visible_height = (area.height as usize).saturating_sub(3);
    let title = format!(" Applications ({}) ", items.len());

    if items.is_empty() {
        let message = if is_loading {
            "Loading applications..."
        } else {
            "No applications found"
        };
        render_empty_state(f, area, &title, message, theme);
        return Vec::new();
    }

    update_scroll_offset(selected_index, visible_height, scroll_offset, SCROLL_BUFFER);
    *scroll_offset = (*scroll_offset).min(items.len().saturating_sub(visible_height));
    let window = visible_window(items.len(), *scroll_offset, visible_height);

    let header = Row::new(
        columns
            .iter()
            .map(|c| Cell::from(aligned(c.title.to_string(), c.align))),
    )
    .style(theme.table_header_style());

    let rows: Vec<Row> = items[window.clone()]
        .iter()
        .enumerate()
        .map(|(offset, workload)| {
            let index = window.start + offset;
            let cells = columns.iter().map(|column| {
                let cell = Cell::from(aligned(column.value(workload), column.align));
                if column.title == "STATUS" {
                    cell.style(theme.status_style(workload.status))
                } else {
                    cell
                }
            });
            let style = if index == selected_index {
                theme.table_selected_style()
            } else {
                Style::default()
            };
            Row::new(cells).style(style)
        })
        .collect();

    let widths: Vec<Constraint> = columns
        .iter()
        .map(|c| Constraint::Length(c.width as u16))
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(2)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.text_label)),
        );
    f.render_widget(table, area);

    items[window].iter().map(|w| w.id.clone()).collect()
}

fn aligned(text: String, align: Align) -> Line<'static> {
    let alignment = match align {
        Align::Left => Alignment::Left,
        Align::Right => Alignment::Right,
    };
    Line::from(text).alignment(alignment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_window_clamps_to_items() {
        assert_eq!(visible_window(5, 0, 10), 0..5);
        assert_eq!(visible_window(30, 10, 8), 10..18);
        assert_eq!(visible_window(3, 7, 8), 3..3);
    }
}
