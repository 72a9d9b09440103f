mod shared;
mod header;
mod status;
mod grid;
mod logs;
mod toasts;
mod confirmation;

use std::io::{self, Write};
use crossterm::{execute, cursor, queue, style::{Color, SetForegroundColor, ResetColor}, terminal};

use crate::model::{LogViewState, SelectionState};
use crate::orchestrator::{ButtonLock, LogAutoStream, ToastQueue};
use crate::reconcile::{StackCard, StackView};

pub use shared::{stack_buttons, truncate_str, safe_truncate, ButtonCell};
pub use grid::card_lines;
pub use status::member_row;

pub struct Presenter;

/// Minimum terminal dimensions for usable rendering.
pub const MIN_COLS: u16 = 80;
pub const MIN_ROWS: u16 = 12;

impl Presenter {
    /// Check if the terminal is large enough. If not, render a "too small"
    /// message and return `true` (meaning "skip normal rendering").
    pub fn render_size_guard() -> io::Result<bool> {
        let (cols, rows) = terminal::size()?;
        if cols < MIN_COLS || rows < MIN_ROWS {
            let mut out = std::io::stdout();
            execute!(out, terminal::Clear(terminal::ClearType::All), cursor::MoveTo(0, 0))?;
            let msg = format!(
                "Terminal too small ({}x{}). Resize to at least {}x{}.",
                cols, rows, MIN_COLS, MIN_ROWS
            );
            let y = rows / 2;
            let x = cols.saturating_sub(msg.len() as u16) / 2;
            queue!(out, cursor::MoveTo(x, y), SetForegroundColor(Color::Yellow))?;
            write!(out, "{}", msg)?;
            queue!(out, ResetColor)?;
            out.flush()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn render_header(
        out: &mut impl Write,
        title: &str,
        countdown: &str,
        updated_at: Option<&str>,
    ) -> io::Result<()> {
        header::render_header(out, title, countdown, updated_at)
    }

    pub fn render_status(
        view: Option<&StackView>,
        fetch_error: Option<&str>,
        selection: &SelectionState,
        lock: &ButtonLock,
        status_message: Option<&str>,
    ) -> io::Result<()> {
        status::render_status(view, fetch_error, selection, lock, status_message)
    }

    pub fn render_grid(
        cards: &[StackCard],
        fetch_error: Option<&str>,
        selection: &SelectionState,
        lock: &ButtonLock,
        status_message: Option<&str>,
    ) -> io::Result<()> {
        grid::render_grid(cards, fetch_error, selection, lock, status_message)
    }

    pub fn render_logs(log_state: &LogViewState, stream: &LogAutoStream) -> io::Result<()> {
        logs::render_logs(log_state, stream)
    }

    pub fn render_toasts(toasts: &ToastQueue) -> io::Result<()> {
        toasts::render_toasts(toasts)
    }

    pub fn render_confirmation(prompt: &str, remaining: std::time::Duration) -> io::Result<()> {
        confirmation::render_confirmation(prompt, remaining)
    }
}
