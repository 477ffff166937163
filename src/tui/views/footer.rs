//! Footer view rendering

use crate::tui::app::state::InputMode;
use crate::tui::keybindings::footer_hints;
use crate::tui::theme::Theme;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Render the footer for the current input mode
pub fn render_footer(
    f: &mut Frame,
    area: Rect,
    mode: &InputMode,
    input: &str,
    status_message: Option<&(String, bool)>,
    read_only: bool,
    theme: &Theme,
) {
    let line = match mode {
        InputMode::Search => prompt_line("/", input, "Enter apply, Esc clear", theme),
        InputMode::Namespace => {
            prompt_line(":ns ", input, "Tab complete, Enter switch, Esc cancel", theme)
        }
        InputMode::Confirm(pending) => Line::from(vec![
            Span::styled(
                format!("{} {}? ", pending.action.verb(), pending.name),
                theme.operation_warning_style(),
            ),
            Span::styled("y", theme.footer_key_style()),
            Span::raw("/"),
            Span::styled("n", theme.footer_key_style()),
        ]),
        InputMode::Normal => match status_message {
            Some((message, is_error)) => Line::from(Span::styled(
                message.clone(),
                if *is_error {
                    theme.operation_error_style()
                } else {
                    theme.operation_success_style()
                },
            )),
            None => hints_line(read_only, theme),
        },
    };

    let footer = Paragraph::new(line).block(Block::default().borders(Borders::TOP));
    f.render_widget(footer, area);
}

fn prompt_line(prompt: &str, input: &str, help: &str, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(prompt.to_string(), Style::default().fg(theme.input_prompt)),
        Span::raw(format!("{}_", input)),
        Span::raw("  "),
        Span::styled(help.to_string(), Style::default().fg(theme.text_secondary)),
    ])
}

fn hints_line(read_only: bool, theme: &Theme) -> Line<'static> {
    let mut spans = Vec::new();
    for (key, label) in footer_hints(read_only) {
        spans.push(Span::styled(format!("<{}>", key), theme.footer_key_style()));
        spans.push(Span::raw(format!(" {}  ", label)));
    }
    Line::from(spans)
}
