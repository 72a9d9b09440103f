use std::io;

use crossterm::{execute, cursor::MoveTo, terminal::Clear, terminal::ClearType};

use crate::config::Target;
use crate::model::AppView;
use crate::view::Presenter;

use super::App;

pub fn render(app: &App) -> io::Result<()> {
    let monitor = &app.monitor;
    let mut out = io::stdout();

    match &app.app_view {
        AppView::MemberLogs(_, _) => {
            if let Some(ref log_state) = monitor.log_state {
                Presenter::render_logs(log_state, &monitor.log_stream)?;
            }
        }
        AppView::Status | AppView::Grid => {
            execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
            let title = match monitor.target() {
                Target::All => "All stacks".to_string(),
                Target::Stack(name) if name.is_empty() => "stackpanel".to_string(),
                Target::Stack(name) => format!("Stack › {}", name),
            };
            let countdown = if monitor.is_errored() { "disabled".to_string() } else { monitor.countdown.label() };
            Presenter::render_header(&mut out, &title, &countdown, monitor.updated_at.as_deref())?;

            if app.app_view == AppView::Grid {
                Presenter::render_grid(
                    monitor.cards(),
                    monitor.fetch_error.as_deref(),
                    &monitor.selection,
                    &monitor.lock,
                    monitor.status_message.as_deref(),
                )?;
            } else {
                Presenter::render_status(
                    monitor.view(),
                    monitor.fetch_error.as_deref(),
                    &monitor.selection,
                    &monitor.lock,
                    monitor.status_message.as_deref(),
                )?;
            }
        }
    }

    Presenter::render_toasts(&monitor.toasts)
}
