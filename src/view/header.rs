use std::io::{self, Write};
use crossterm::{
    cursor, queue,
    style::{Color, SetForegroundColor, SetBackgroundColor, ResetColor},
    terminal,
};

/// Title bar: target on the left, refresh countdown and clock on the right.
pub fn render_header(
    out: &mut impl Write,
    title: &str,
    countdown: &str,
    updated_at: Option<&str>,
) -> io::Result<()> {
    write!(out, "  ")?;
    queue!(io::stdout(), SetBackgroundColor(Color::DarkBlue), SetForegroundColor(Color::White))?;
    write!(out, " {} ", title)?;
    queue!(io::stdout(), ResetColor)?;

    let size = terminal::size()?;
    let time = chrono::Local::now().format("%H:%M:%S");
    let updated = updated_at.map(|t| format!("updated {} | ", t)).unwrap_or_default();
    let right = format!("{} | {}stackpanel - {} ", countdown, updated, time);
    let col = (size.0 as usize).saturating_sub(right.chars().count());
    queue!(io::stdout(), cursor::MoveTo(col as u16, 0))?;
    queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
    write!(out, "{}", right)?;
    queue!(io::stdout(), ResetColor)?;

    write!(out, "\r\n")?;
    let sep: String = "─".repeat(size.0 as usize);
    queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
    write!(out, "{}\r\n", sep)?;
    queue!(io::stdout(), ResetColor)?;

    Ok(())
}

/// Key help on the last terminal row.
pub fn render_footer(out: &mut impl Write, help: &str) -> io::Result<()> {
    let size = terminal::size()?;
    queue!(
        out,
        cursor::MoveTo(1, size.1.saturating_sub(1)),
        SetForegroundColor(Color::DarkGrey),
        crossterm::style::Print(format!("{:<width$}", help, width = size.0.saturating_sub(1) as usize)),
        ResetColor
    )
}
