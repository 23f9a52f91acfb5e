//! Interactive TUI for the report service.
//!
//! Lists the reports of the selected project, uploads archives and deletes
//! reports. Requests run on background tasks and report back through the
//! event channel, which the loop drains between frames.

mod app;
mod input;
mod ui;

use std::io::{self, stdout};
use std::panic::PanicHookInfo;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    cursor, event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::context::AppContext;
use crate::core::boundary::{TracingSink, panic_message};
use crate::core::events::{self, EventReceiver};
use crate::logging;

pub use app::{Action, InputMode, Mode, Status, TuiApp};
pub use ui::Boundaries;

/// How long to wait for a key before checking for finished requests.
const TICK: Duration = Duration::from_millis(100);

/// Raw mode, the alternate screen and the logging panic hook, undone on
/// drop. Dropping during a panic also tells the user where the log went,
/// since the hook only writes to the log.
struct TerminalGuard {
    previous_hook: Option<Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>>,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        let previous_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|info| {
            let location = info
                .location()
                .map(|l| format!("{}:{}", l.file(), l.line()))
                .unwrap_or_default();
            tracing::error!(
                panic = %panic_message(info.payload()),
                %location,
                "Panic"
            );
        }));
        let guard = Self {
            previous_hook: Some(previous_hook),
        };

        enable_raw_mode().context("Failed to enable raw mode")?;
        execute!(stdout(), EnterAlternateScreen).context("Failed to enter alternate screen")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen, cursor::Show);
        if let Some(hook) = self.previous_hook.take() {
            std::panic::set_hook(hook);
        }
        if std::thread::panicking() {
            eprintln!(
                "allure-lite crashed. Details are in {}",
                logging::default_tui_log_path().display()
            );
        }
    }
}

/// Run the TUI against the configured report service.
pub async fn run(ctx: AppContext) -> Result<()> {
    let guard = TerminalGuard::enter()?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Create app and run
    let (tx, rx) = events::channel();
    let result = match TuiApp::new(ctx, tx) {
        Ok(mut app) => run_app(&mut terminal, &mut app, rx).await,
        Err(e) => Err(e),
    };

    drop(guard);
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut TuiApp,
    mut rx: EventReceiver,
) -> Result<()> {
    let mut boundaries = Boundaries::new(Arc::new(TracingSink));

    // Initial data fetch
    app.init();

    loop {
        // Render
        terminal.draw(|frame| ui::render(frame, app, &mut boundaries))?;

        // Check for input with timeout so finished requests get applied
        if event::poll(TICK)? {
            let event = event::read()?;
            if let Some(action) = input::handle_event(event, app.input_mode()) {
                app.handle_action(action);
            }
        }

        while let Ok(event) = rx.try_recv() {
            app.handle_event(event);
        }

        if !app.running {
            break;
        }
    }

    Ok(())
}
