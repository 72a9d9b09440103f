use std::io::{self, Write, stdout};
use crossterm::{cursor::MoveTo, execute, queue, style::{Color, SetForegroundColor, ResetColor, SetAttribute, Attribute}, terminal::{self, Clear, ClearType}};

use crate::model::{short_id, LogViewState};
use crate::orchestrator::LogAutoStream;
use super::header::render_footer;
use super::shared::safe_truncate;

fn stream_indicator(stream: &LogAutoStream) -> &'static str {
    match (stream.is_on(), stream.is_fetching()) {
        (_, true) => "FETCHING",
        (true, false) => "AUTO",
        (false, false) => "MANUAL",
    }
}

/// Index range of `visible` lines that fits `area_height`, honouring the scroll offset.
pub fn window(total: usize, area_height: usize, auto_follow: bool, scroll_offset: usize) -> (usize, usize) {
    let bottom_start = total.saturating_sub(area_height);
    let start = if auto_follow { bottom_start } else { bottom_start.saturating_sub(scroll_offset) };
    (start, (start + area_height).min(total))
}

pub fn render_logs(log_state: &LogViewState, stream: &LogAutoStream) -> io::Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    let size = terminal::size()?;
    let width = size.0 as usize;
    let height = size.1 as usize;

    let follow_indicator = if log_state.auto_follow { "FOLLOWING" } else { "PAUSED" };
    let search_indicator = if !log_state.search_query.is_empty() {
        format!(" | SEARCH: \"{}\"", log_state.search_query)
    } else {
        String::new()
    };
    let fetched = log_state
        .fetched_at
        .as_deref()
        .map(|t| format!(" | fetched {}", t))
        .unwrap_or_default();
    let header = format!(
        "  Logs: {} ({}) - {} | {}{}{}",
        log_state.container_name,
        short_id(&log_state.container_id),
        follow_indicator,
        stream_indicator(stream),
        fetched,
        search_indicator
    );

    queue!(io::stdout(), SetAttribute(Attribute::Bold))?;
    if !log_state.auto_follow {
        queue!(io::stdout(), SetForegroundColor(Color::Yellow))?;
    }
    write!(out, "{}\r\n", header)?;
    queue!(io::stdout(), SetAttribute(Attribute::Reset), ResetColor)?;

    if log_state.search_mode {
        queue!(io::stdout(), SetForegroundColor(Color::Cyan))?;
        write!(out, "  Search: {}_\r\n", log_state.search_query)?;
        queue!(io::stdout(), ResetColor)?;
    } else {
        let sep: String = "─".repeat(width);
        queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
        write!(out, "{}\r\n", sep)?;
        queue!(io::stdout(), ResetColor)?;
    }

    let log_area_height = height.saturating_sub(4);
    let has_search = !log_state.search_query.is_empty();
    let display_lines = log_state.visible_lines();
    let (start, end) = window(display_lines.len(), log_area_height, log_state.auto_follow, log_state.scroll_offset);

    for line in &display_lines[start..end] {
        let display_line = safe_truncate(line, width);
        if has_search {
            queue!(io::stdout(), SetForegroundColor(Color::Yellow))?;
            write!(out, "{}\r\n", display_line)?;
            queue!(io::stdout(), ResetColor)?;
        } else {
            write!(out, "{}\r\n", display_line)?;
        }
    }

    let help = if log_state.search_mode {
        "Type to search | Enter: Confirm | Esc: Cancel"
    } else if stream.is_on() {
        "q/Esc/←: Back | a: Stop auto-refresh | ↑/↓/PgUp/PgDn: Scroll | f/End: Follow | /: Search"
    } else {
        "q/Esc/←: Back | r: Refresh | a: Auto-refresh (2s) | ↑/↓/PgUp/PgDn: Scroll | f/End: Follow | /: Search"
    };
    render_footer(&mut out, help)?;

    out.flush()?;
    Ok(())
}
