//! TUI module
//!
//! Terminal user interface for the workload list, built with ratatui. The UI
//! reads snapshots from a [`SyncHandle`] and reports which rows are on screen
//! back to it.

mod app;
pub mod keybindings;
mod theme;
pub mod views;

pub use app::*;
pub use theme::*;

use crate::sync::SyncHandle;
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::Duration;

/// Options the TUI takes from configuration
#[derive(Debug, Clone, Default)]
pub struct TuiOptions {
    pub context: Option<String>,
    pub read_only: bool,
    pub enable_mouse: bool,
    pub no_icons: bool,
}

/// Run the TUI until the user quits, then shut the synchronizer down
pub async fn run_tui(handle: SyncHandle, options: TuiOptions) -> Result<()> {
    tracing::debug!("Initializing TUI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if options.enable_mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, handle.clone(), &options).await;

    tracing::debug!("TUI shutting down");
    handle.shutdown().await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    if options.enable_mouse {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    handle: SyncHandle,
    options: &TuiOptions,
) -> Result<()> {
    let mut notices = handle.notices();
    let mut app = App::new(
        handle,
        options.context.clone(),
        options.read_only,
        options.no_icons,
        Theme::default(),
    );

    tracing::debug!("TUI initialized, entering main loop");

    loop {
        app.refresh_snapshot();
        if let Some(rx) = notices.as_mut() {
            while let Ok(notice) = rx.try_recv() {
                app.apply_notice(notice);
            }
        }
        app.check_status_message_timeout();

        terminal.draw(|f| app.render(f))?;
        app.publish_visible();

        // Poll without blocking the runtime worker for long
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key) {
                    break;
                }
            }
        }
        tokio::task::yield_now().await;
    }

    app.dispose();
    Ok(())
}
