mod state;
mod event_loop;
mod render;
mod input;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, Clear, ClearType},
};

use crate::model::AppView;
use crate::orchestrator::{ConfirmationGate, Panel};
use crate::stack_controller::{StackAction, StackMonitor};
use crate::view::Presenter;

pub use state::confirmation_prompt;

/// Restore the terminal to normal mode. Safe to call multiple times.
pub fn restore_terminal() {
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Main application state and event loop.
pub struct App {
    pub monitor: StackMonitor,
    pub app_view: AppView,
    pub confirmation: ConfirmationGate<StackAction>,
    pub last_second: Instant,
    pub tick_rate: Duration,
}

impl App {
    pub fn new(monitor: StackMonitor) -> Self {
        let app_view = if monitor.is_grid() { AppView::Grid } else { AppView::Status };
        Self {
            monitor,
            app_view,
            confirmation: ConfirmationGate::default(),
            last_second: Instant::now(),
            tick_rate: Duration::from_secs(1),
        }
    }

    /// View to return to when the log view closes.
    pub fn home_view(&self) -> AppView {
        if self.monitor.is_grid() { AppView::Grid } else { AppView::Status }
    }
}

/// Run the application. Sets up terminal, runs the main loop, restores terminal on exit.
pub fn run(panel: Panel, should_quit: Arc<AtomicBool>) -> io::Result<()> {
    let rt = Arc::new(
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .worker_threads(2)
            .build()?,
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Clear(ClearType::All))?;

    let mut app = App::new(StackMonitor::new(Arc::new(panel), rt));
    app.monitor.initial_load();
    let mut needs_render = true;

    loop {
        if should_quit.load(Ordering::Relaxed) {
            break;
        }

        let now = Instant::now();

        if app.expire_pending_action(now) {
            needs_render = true;
        }
        if app.process_tick(now) {
            needs_render = true;
        }
        if app.poll_background(now) {
            needs_render = true;
        }

        if needs_render {
            if Presenter::render_size_guard()? {
                needs_render = false;
                if crossterm::event::poll(Duration::from_millis(100))? {
                    let _ = crossterm::event::read()?;
                }
                continue;
            }

            render::render(&app)?;

            if let (Some(prompt), Some(left)) = (app.confirmation.description(), app.confirmation.remaining(now)) {
                Presenter::render_confirmation(prompt, left)?;
            }

            needs_render = false;
        }

        if crossterm::event::poll(Duration::from_millis(100))? {
            if let crossterm::event::Event::Key(key_event) = crossterm::event::read()? {
                match input::handle_key(&mut app, key_event) {
                    Some(input::InputResult::Quit) => break,
                    Some(input::InputResult::Consumed) => needs_render = true,
                    None => {}
                }
            }
        }
    }

    restore_terminal();
    Ok(())
}
