use std::io::{self, Write};
use crossterm::{queue, style::{Color, SetForegroundColor, SetBackgroundColor, ResetColor, Attribute, SetAttribute}};

use crate::orchestrator::{Button, ButtonLock};
use crate::reconcile::Controls;

/// Truncate a string to at most `max_len` characters (not bytes), appending "..."
/// if truncated. Safe for multi-byte UTF-8.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else {
        let keep = max_len.saturating_sub(3);
        let truncated: String = s.chars().take(keep).collect();
        format!("{}...", truncated)
    }
}

/// Truncate a string to at most `max_len` characters for display. Returns a &str
/// slice up to the last valid char boundary within `max_len` bytes.
pub fn safe_truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

pub fn writeln(out: &mut impl Write, text: &str) -> io::Result<()> {
    write!(out, "{}\r\n", text)
}

pub fn write_section_header(out: &mut impl Write, text: &str) -> io::Result<()> {
    queue!(io::stdout(), SetAttribute(Attribute::Bold))?;
    write!(out, "{}\r\n", text)?;
    queue!(io::stdout(), SetAttribute(Attribute::Reset))?;
    Ok(())
}

pub fn write_selectable(out: &mut impl Write, text: &str, selected: bool) -> io::Result<()> {
    if selected {
        queue!(io::stdout(), SetBackgroundColor(Color::DarkGrey), SetForegroundColor(Color::White))?;
    }
    write!(out, "{}\r\n", text)?;
    if selected {
        queue!(io::stdout(), ResetColor)?;
    }
    Ok(())
}

pub fn status_color(running: bool) -> Color {
    if running { Color::Green } else { Color::Red }
}

/// One rendered button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButtonCell {
    pub button: Button,
    pub key: &'static str,
    pub enabled: bool,
    pub spinning: bool,
}

impl ButtonCell {
    pub fn text(&self) -> String {
        let marker = if self.spinning { "~ " } else { "" };
        format!("[{}{} ({})]", marker, self.button.label(), self.key)
    }
}

/// Buttons visible for a stack: Refresh always, the lifecycle buttons only
/// when a status is known and applies to them.
pub fn stack_buttons(controls: Option<Controls>, lock: &ButtonLock) -> Vec<ButtonCell> {
    let mut visible = vec![(Button::Refresh, "r")];
    if let Some(c) = controls {
        if c.start {
            visible.push((Button::Start, "s"));
        }
        if c.stop {
            visible.push((Button::Stop, "x"));
        }
        if c.restart {
            visible.push((Button::Restart, "R"));
        }
    }
    visible
        .into_iter()
        .map(|(button, key)| ButtonCell {
            button,
            key,
            enabled: !lock.is_disabled(),
            spinning: lock.is_spinning(button),
        })
        .collect()
}

pub fn write_buttons(out: &mut impl Write, cells: &[ButtonCell]) -> io::Result<()> {
    write!(out, "  ")?;
    for cell in cells {
        if cell.spinning {
            queue!(io::stdout(), SetForegroundColor(Color::Cyan), SetAttribute(Attribute::Bold))?;
        } else if !cell.enabled {
            queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
        } else {
            queue!(io::stdout(), SetForegroundColor(Color::White), SetAttribute(Attribute::Bold))?;
        }
        write!(out, "{} ", cell.text())?;
        queue!(io::stdout(), ResetColor, SetAttribute(Attribute::Reset))?;
    }
    write!(out, "\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_str_short_string() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn truncate_str_long_string() {
        assert_eq!(truncate_str("hello world", 8), "hello...");
    }

    #[test]
    fn truncate_str_utf8() {
        assert_eq!(truncate_str("café", 4), "café");
        assert_eq!(truncate_str("hello世界", 6), "hel...");
    }

    #[test]
    fn safe_truncate_utf8_boundary() {
        let s = "café";
        assert_eq!(safe_truncate(s, 3), "caf");
        assert_eq!(safe_truncate(s, 5), "café");
    }

    fn labels(cells: &[ButtonCell]) -> Vec<Button> {
        cells.iter().map(|c| c.button).collect()
    }

    #[test]
    fn running_stack_shows_stop_and_restart() {
        let lock = ButtonLock::new(false);
        let controls = Controls { start: false, stop: true, restart: true };
        let cells = stack_buttons(Some(controls), &lock);
        assert_eq!(labels(&cells), vec![Button::Refresh, Button::Stop, Button::Restart]);
        assert!(cells.iter().all(|c| c.enabled));
    }

    #[test]
    fn unknown_status_shows_only_refresh() {
        let cells = stack_buttons(None, &ButtonLock::new(false));
        assert_eq!(labels(&cells), vec![Button::Refresh]);
    }

    #[test]
    fn busy_lock_greys_out_and_marks_active() {
        let mut lock = ButtonLock::new(false);
        lock.begin(Button::Start);
        let controls = Controls { start: true, stop: false, restart: false };
        let cells = stack_buttons(Some(controls), &lock);
        assert!(cells.iter().all(|c| !c.enabled));
        assert_eq!(cells[1].text(), "[~ Start (s)]");
        assert!(!cells[0].spinning);
    }
}
