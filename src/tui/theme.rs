//! Theme and styling definitions
//!
//! Centralized color and style definitions for the workload console.

use crate::models::WorkloadStatus;
use ratatui::style::{Color, Modifier, Style};

/// Colors used by the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    // Header colors
    pub header_context: Color,
    pub header_namespace: Color,
    pub header_location: Color,
    pub header_filter: Color,

    // Status colors
    pub status_running: Color,
    pub status_pending: Color,
    pub status_paused: Color,
    pub status_error: Color,

    // Table colors
    pub table_header: Color,
    pub table_selected: Color,
    pub table_selected_bg: Color,

    // Text colors
    pub text_label: Color,
    pub text_secondary: Color,

    // Input and operation colors
    pub input_prompt: Color,
    pub operation_success: Color,
    pub operation_error: Color,
    pub operation_warning: Color,
    pub operation_confirm: Color,
    pub operation_cancel: Color,

    pub footer_key: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header_context: Color::Yellow,
            header_namespace: Color::Yellow,
            header_location: Color::Gray,
            header_filter: Color::Magenta,

            status_running: Color::Green,
            status_pending: Color::Yellow,
            status_paused: Color::Gray,
            status_error: Color::Red,

            table_header: Color::Cyan,
            table_selected: Color::Blue,
            table_selected_bg: Color::DarkGray,

            text_label: Color::Cyan,
            text_secondary: Color::Gray,

            input_prompt: Color::Yellow,
            operation_success: Color::Green,
            operation_error: Color::Red,
            operation_warning: Color::Yellow,
            operation_confirm: Color::Green,
            operation_cancel: Color::Red,

            footer_key: Color::Yellow,
        }
    }
}

impl Theme {
    pub fn header_context_style(&self) -> Style {
        Style::default()
            .fg(self.header_context)
            .add_modifier(Modifier::BOLD)
    }

    pub fn header_namespace_style(&self) -> Style {
        Style::default()
            .fg(self.header_namespace)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_style(&self, status: WorkloadStatus) -> Style {
        let color = match status {
            WorkloadStatus::Running => self.status_running,
            WorkloadStatus::Creating | WorkloadStatus::Waiting => self.status_pending,
            WorkloadStatus::Paused | WorkloadStatus::Stopped => self.status_paused,
            WorkloadStatus::Error => self.status_error,
        };
        Style::default().fg(color)
    }

    pub fn table_header_style(&self) -> Style {
        Style::default()
            .fg(self.table_header)
            .add_modifier(Modifier::BOLD)
    }

    pub fn table_selected_style(&self) -> Style {
        Style::default()
            .fg(self.table_selected)
            .bg(self.table_selected_bg)
    }

    pub fn footer_key_style(&self) -> Style {
        Style::default().fg(self.footer_key)
    }

    pub fn operation_success_style(&self) -> Style {
        Style::default()
            .fg(self.operation_success)
            .add_modifier(Modifier::BOLD)
    }

    pub fn operation_error_style(&self) -> Style {
        Style::default()
            .fg(self.operation_error)
            .add_modifier(Modifier::BOLD)
    }

    pub fn operation_warning_style(&self) -> Style {
        Style::default()
            .fg(self.operation_warning)
            .add_modifier(Modifier::BOLD)
    }
}
