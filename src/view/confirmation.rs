use std::io::{self, Write, stdout};
use std::time::Duration;

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Color, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal,
};

use super::shared::truncate_str;

/// Text of the confirmation bar, padded or cut to `width`.
pub fn confirmation_line(prompt: &str, remaining: Duration, width: usize) -> String {
    // Round up so the bar never shows 0s while the prompt is still open.
    let secs = remaining.as_millis().div_ceil(1000);
    let line = format!("  {} [y] confirm  [any key] cancel  ({}s)", prompt, secs);
    format!("{:<width$}", truncate_str(&line, width), width = width)
}

/// Draw the prompt on the third line from the bottom, above the toasts.
pub fn render_confirmation(prompt: &str, remaining: Duration) -> io::Result<()> {
    let mut out = stdout();
    let (cols, rows) = terminal::size()?;

    queue!(
        out,
        MoveTo(0, rows.saturating_sub(3)),
        SetBackgroundColor(Color::DarkRed),
        SetForegroundColor(Color::White),
        SetAttribute(Attribute::Bold)
    )?;
    write!(out, "{}", confirmation_line(prompt, remaining, cols as usize))?;
    queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_shows_prompt_and_seconds_left() {
        let line = confirmation_line("Stop stack 'demo'?", Duration::from_millis(4200), 60);
        assert_eq!(line.chars().count(), 60);
        assert!(line.starts_with("  Stop stack 'demo'? [y] confirm"));
        assert!(line.trim_end().ends_with("(5s)"));
    }
}
