use std::io::{self, Write, stdout};
use crossterm::{cursor::MoveTo, queue, style::{Color, SetForegroundColor, SetAttribute, Attribute, ResetColor}, terminal};

use crate::orchestrator::{Toast, ToastKind, ToastQueue};
use super::shared::truncate_str;

const TOAST_WIDTH: usize = 60;

fn kind_color(kind: ToastKind) -> Color {
    match kind {
        ToastKind::Success => Color::Green,
        ToastKind::Warning => Color::Yellow,
        ToastKind::Error => Color::Red,
    }
}

pub fn toast_line(toast: &Toast, width: usize) -> String {
    let text = format!("{} {}: {}", toast.stamp, toast.kind.title(), toast.message);
    truncate_str(&text, width)
}

/// Toasts stack in the top-right corner under the header, newest last.
pub fn render_toasts(toasts: &ToastQueue) -> io::Result<()> {
    if toasts.is_empty() {
        return Ok(());
    }
    let mut out = stdout();
    let (cols, _) = terminal::size()?;
    let width = TOAST_WIDTH.min(cols.saturating_sub(2) as usize);
    let x = (cols as usize).saturating_sub(width + 1) as u16;

    for (i, toast) in toasts.iter().enumerate() {
        queue!(out, MoveTo(x, 2 + i as u16))?;
        queue!(out, SetForegroundColor(kind_color(toast.kind)), SetAttribute(Attribute::Bold))?;
        write!(out, "{:<width$}", toast_line(toast, width), width = width)?;
        queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
    }
    out.flush()?;
    Ok(())
}
