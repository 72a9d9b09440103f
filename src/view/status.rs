use std::io::{self, Write, stdout};
use crossterm::{cursor, queue, style::{Color, SetForegroundColor, ResetColor, SetAttribute, Attribute}};

use crate::model::{Member, MemberDetail, SelectionState};
use crate::orchestrator::ButtonLock;
use crate::reconcile::StackView;
use super::header::render_footer;
use super::shared::{stack_buttons, status_color, truncate_str, write_buttons, write_section_header, write_selectable, writeln};

pub fn member_row(member: &Member) -> String {
    match &member.detail {
        MemberDetail::Compose { status, .. } => format!(
            "  {:<40} {:<12} {}",
            truncate_str(&member.name, 38),
            truncate_str(&member.state_text(), 10),
            status
        ),
        MemberDetail::Swarm { .. } => format!(
            "  {:<40} {}",
            truncate_str(&member.name, 38),
            member.state_text()
        ),
    }
}

pub fn render_status(
    view: Option<&StackView>,
    fetch_error: Option<&str>,
    selection: &SelectionState,
    lock: &ButtonLock,
    status_message: Option<&str>,
) -> io::Result<()> {
    let mut out = stdout();
    queue!(out, cursor::MoveTo(0, 2))?;
    writeln(&mut out, "")?;

    match view {
        Some(view) => {
            write_section_header(&mut out, &format!("  Stack: {}", view.stack.name))?;
            write!(out, "  Status: ")?;
            queue!(io::stdout(), SetForegroundColor(status_color(view.running())))?;
            write!(out, "● ")?;
            queue!(io::stdout(), ResetColor)?;
            write!(out, "{}", view.status_text())?;
            queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
            write!(
                out,
                "   {}/{} {} running\r\n",
                view.running_members(),
                view.total_members(),
                view.orchestration.member_noun().to_lowercase()
            )?;
            queue!(io::stdout(), ResetColor)?;
        }
        None => {
            write_section_header(&mut out, "  Stack status unavailable")?;
        }
    }

    if let Some(err) = fetch_error {
        queue!(io::stdout(), SetForegroundColor(Color::Red))?;
        writeln(&mut out, &format!("  {}", err))?;
        queue!(io::stdout(), ResetColor)?;
    }

    writeln(&mut out, "")?;
    write_buttons(&mut out, &stack_buttons(view.map(StackView::controls), lock))?;
    writeln(&mut out, "")?;

    if let Some(view) = view {
        write_section_header(&mut out, &format!("  {}:", view.orchestration.member_noun()))?;
        if view.members.is_empty() {
            queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
            writeln(&mut out, &format!("  No {} found", view.orchestration.member_noun().to_lowercase()))?;
            queue!(io::stdout(), ResetColor)?;
        }
        for (idx, member) in view.members.iter().enumerate() {
            queue!(io::stdout(), SetForegroundColor(status_color(member.running)))?;
            write!(out, "●")?;
            queue!(io::stdout(), ResetColor)?;
            write_selectable(&mut out, &member_row(member), idx == selection.selected_index)?;
        }
    }

    if let Some(msg) = status_message {
        writeln(&mut out, "")?;
        queue!(io::stdout(), SetForegroundColor(Color::Yellow), SetAttribute(Attribute::Italic))?;
        writeln(&mut out, &format!("  {}", msg))?;
        queue!(io::stdout(), ResetColor, SetAttribute(Attribute::Reset))?;
    }

    render_footer(
        &mut out,
        "q: Quit | r: Refresh | s: Start | x: Stop | R: Restart | ↑/↓: Select | l: Logs | m: Restart container | c: Dismiss",
    )?;
    out.flush()?;
    Ok(())
}
