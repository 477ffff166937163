//! Rendering tests for the TUI views
//!
//! Views are drawn into a `TestBackend` and checked line by line.

use launchdeck::models::{WorkloadKind, WorkloadStatus, WorkloadSummary, workload_columns};
use launchdeck::sync::{LifecycleAction, WorkloadStore};
use launchdeck::tui::views::{
    render_confirmation, render_footer, render_header, render_workload_list,
};
use launchdeck::tui::{InputMode, PendingAction, Theme};
use launchdeck::{ListSnapshot, PaginationState};
use ratatui::{Terminal, backend::TestBackend};

/// Create a test theme
fn create_test_theme() -> Theme {
    Theme::default()
}

fn create_test_workloads(count: usize) -> Vec<WorkloadSummary> {
    (0..count)
        .map(|i| {
            let mut w = WorkloadSummary::new(
                format!("uid-{}", i),
                format!("app-{:02}", i),
                "ns-team",
                WorkloadKind::Deployment,
                10,
            );
            w.status = if i == 1 {
                WorkloadStatus::Paused
            } else {
                WorkloadStatus::Running
            };
            w
        })
        .collect()
}

fn create_test_snapshot() -> ListSnapshot {
    let mut pagination = PaginationState::new("ns-team", 20);
    pagination.filter_text = "app".into();
    let mut snapshot = WorkloadStore::new(pagination).snapshot();
    snapshot.pagination.apply_totals(45);
    snapshot.location = snapshot.pagination.to_query();
    snapshot
}

fn buffer_lines(terminal: &Terminal<TestBackend>) -> Vec<String> {
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect()
}

fn screen_contains(terminal: &Terminal<TestBackend>, needle: &str) -> bool {
    buffer_lines(terminal).iter().any(|line| line.contains(needle))
}

#[test]
fn test_render_header() {
    let snapshot = create_test_snapshot();
    let theme = create_test_theme();
    let mut terminal = Terminal::new(TestBackend::new(120, 4)).unwrap();

    terminal
        .draw(|frame| {
            let area = frame.area();
            render_header(frame, area, &snapshot, Some("prod-cluster"), true, &theme);
        })
        .unwrap();

    assert!(screen_contains(&terminal, "Context: prod-cluster"));
    assert!(screen_contains(&terminal, "Namespace: ns-team"));
    assert!(screen_contains(&terminal, "name~'app'"));
    assert!(screen_contains(&terminal, "[read-only]"));
    assert!(screen_contains(
        &terminal,
        "Page: 1/3  (45 workloads, 20 per page)"
    ));
    assert!(screen_contains(&terminal, "loading..."));
    assert!(screen_contains(
        &terminal,
        "Location: ?namespace=ns-team&page=1&pageSize=20&filterText=app"
    ));
}

#[test]
fn test_render_workload_list_reports_drawn_rows() {
    let workloads = create_test_workloads(12);
    let columns = workload_columns(true);
    let theme = create_test_theme();
    // Borders and header leave 5 data rows
    let mut terminal = Terminal::new(TestBackend::new(140, 8)).unwrap();
    let mut scroll_offset = 0;
    let mut drawn = Vec::new();

    terminal
        .draw(|frame| {
            let area = frame.area();
            drawn = render_workload_list(
                frame,
                area,
                &workloads,
                &columns,
                0,
                &mut scroll_offset,
                false,
                &theme,
            );
        })
        .unwrap();

    assert_eq!(drawn, vec!["uid-0", "uid-1", "uid-2", "uid-3", "uid-4"]);
    assert!(screen_contains(&terminal, "Applications (12)"));
    assert!(screen_contains(&terminal, "NAME"));
    assert!(screen_contains(&terminal, "app-04"));
    assert!(!screen_contains(&terminal, "app-05"));
    assert!(screen_contains(&terminal, "Paused"));
}

#[test]
fn test_render_workload_list_scrolls_with_selection() {
    let workloads = create_test_workloads(12);
    let columns = workload_columns(true);
    let theme = create_test_theme();
    let mut terminal = Terminal::new(TestBackend::new(140, 8)).unwrap();
    let mut scroll_offset = 0;
    let mut drawn = Vec::new();

    terminal
        .draw(|frame| {
            let area = frame.area();
            drawn = render_workload_list(
                frame,
                area,
                &workloads,
                &columns,
                11,
                &mut scroll_offset,
                false,
                &theme,
            );
        })
        .unwrap();

    assert_eq!(scroll_offset, 7);
    assert_eq!(drawn.last().map(String::as_str), Some("uid-11"));
    assert!(screen_contains(&terminal, "app-11"));
}

#[test]
fn test_render_empty_list() {
    let columns = workload_columns(true);
    let theme = create_test_theme();
    let mut terminal = Terminal::new(TestBackend::new(80, 8)).unwrap();
    let mut scroll_offset = 0;

    terminal
        .draw(|frame| {
            let area = frame.area();
            let drawn = render_workload_list(
                frame,
                area,
                &[],
                &columns,
                0,
                &mut scroll_offset,
                true,
                &theme,
            );
            assert!(drawn.is_empty());
        })
        .unwrap();

    assert!(screen_contains(&terminal, "Loading applications..."));
}

#[test]
fn test_render_footer_modes() {
    let theme = create_test_theme();
    let mut terminal = Terminal::new(TestBackend::new(120, 2)).unwrap();

    terminal
        .draw(|frame| {
            let area = frame.area();
            render_footer(frame, area, &InputMode::Normal, "", None, true, &theme);
        })
        .unwrap();
    assert!(screen_contains(&terminal, "<q> quit"));
    assert!(!screen_contains(&terminal, "<p> pause"));

    terminal
        .draw(|frame| {
            let area = frame.area();
            render_footer(frame, area, &InputMode::Search, "web", None, false, &theme);
        })
        .unwrap();
    assert!(screen_contains(&terminal, "/web_"));

    let status = ("pause app-01: ok".to_string(), false);
    terminal
        .draw(|frame| {
            let area = frame.area();
            render_footer(
                frame,
                area,
                &InputMode::Normal,
                "",
                Some(&status),
                false,
                &theme,
            );
        })
        .unwrap();
    assert!(screen_contains(&terminal, "pause app-01: ok"));
}

#[test]
fn test_render_confirmation() {
    let theme = create_test_theme();
    let pending = PendingAction {
        action: LifecycleAction::Restart,
        id: "uid-3".to_string(),
        name: "app-03".to_string(),
    };
    let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();

    terminal
        .draw(|frame| {
            let area = frame.area();
            render_confirmation(frame, area, &pending, &theme);
        })
        .unwrap();

    assert!(screen_contains(&terminal, "CONFIRMATION REQUIRED"));
    assert!(screen_contains(&terminal, "Restart all pods of app-03?"));
}
