use std::io::{self, Write, stdout};
use std::ops::Range;
use crossterm::{cursor, queue, style::{Color, SetForegroundColor, SetBackgroundColor, ResetColor}, terminal};

use crate::model::SelectionState;
use crate::orchestrator::ButtonLock;
use crate::reconcile::StackCard;
use super::header::render_footer;
use super::shared::{stack_buttons, status_color, truncate_str, write_buttons, writeln};

const CARD_WIDTH: usize = 36;
const CARD_HEIGHT: u16 = 5;

/// Text lines of one card, each at most `CARD_WIDTH - 2` characters.
pub fn card_lines(card: &StackCard) -> Vec<String> {
    let inner = CARD_WIDTH - 2;
    let kind = match card.orchestration {
        Ok(o) => o.label().to_string(),
        Err(unknown) => format!("unsupported type {}", unknown.0),
    };
    let state = if card.running() { "Running" } else { "Stopped" };
    vec![
        truncate_str(card.name(), inner),
        truncate_str(&format!("● {} ({})", state, kind), inner),
        format!("{}/{} running", card.running_members(), card.total_members()),
        truncate_str(
            &card
                .members
                .iter()
                .map(|m| m.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            inner,
        ),
    ]
}

/// Cards that fit in `fit_rows` rows of `per_row`, scrolled by whole rows so
/// the selected card is on screen.
pub fn visible_cards(count: usize, per_row: usize, selected: usize, fit_rows: usize) -> Range<usize> {
    let per_row = per_row.max(1);
    let fit_rows = fit_rows.max(1);
    let selected_row = selected.min(count.saturating_sub(1)) / per_row;
    let first_row = selected_row.saturating_sub(fit_rows - 1);
    let start = (first_row * per_row).min(count);
    start..(start + fit_rows * per_row).min(count)
}

pub fn render_grid(
    cards: &[StackCard],
    fetch_error: Option<&str>,
    selection: &SelectionState,
    lock: &ButtonLock,
    status_message: Option<&str>,
) -> io::Result<()> {
    let mut out = stdout();
    queue!(out, cursor::MoveTo(0, 2))?;
    writeln(&mut out, "")?;

    if let Some(err) = fetch_error {
        queue!(io::stdout(), SetForegroundColor(Color::Red))?;
        writeln(&mut out, &format!("  {}", err))?;
        queue!(io::stdout(), ResetColor)?;
    }

    let selected = cards.get(selection.selected_index);
    let controls = selected.and_then(StackCard::view).map(|v| v.controls());
    write_buttons(&mut out, &stack_buttons(controls, lock))?;
    writeln(&mut out, "")?;

    if cards.is_empty() && fetch_error.is_none() {
        writeln(&mut out, "  No stacks found.")?;
    }

    let (cols, rows) = terminal::size()?;
    let per_row = ((cols as usize).saturating_sub(2) / (CARD_WIDTH + 2)).max(1);
    // header, blank, optional error, buttons, blank
    let top = 5 + u16::from(fetch_error.is_some());
    // footer and the status line stay clear
    let usable = rows.saturating_sub(top + 2);
    let fit_rows = (usable / (CARD_HEIGHT + 1)).max(1) as usize;
    let shown = visible_cards(cards.len(), per_row, selection.selected_index, fit_rows);

    for (idx, card) in cards.iter().enumerate().take(shown.end).skip(shown.start) {
        let slot = idx - shown.start;
        let x = (2 + (slot % per_row) * (CARD_WIDTH + 2)) as u16;
        let y = top + (slot / per_row) as u16 * (CARD_HEIGHT + 1);
        let is_selected = idx == selection.selected_index;

        for (line_no, line) in card_lines(card).iter().enumerate() {
            queue!(out, cursor::MoveTo(x, y + line_no as u16))?;
            if is_selected {
                queue!(out, SetBackgroundColor(Color::DarkGrey))?;
            }
            match line_no {
                0 => queue!(out, SetForegroundColor(Color::White))?,
                1 => queue!(out, SetForegroundColor(status_color(card.running())))?,
                _ => queue!(out, SetForegroundColor(Color::Grey))?,
            }
            write!(out, " {:<width$} ", line, width = CARD_WIDTH - 2)?;
            queue!(out, ResetColor)?;
        }
    }

    let drawn_rows = shown.len().div_ceil(per_row) as u16;
    let below = (top + drawn_rows * (CARD_HEIGHT + 1)).min(rows.saturating_sub(2));
    let scroll_hint = (shown.len() < cards.len())
        .then(|| format!("stacks {}-{} of {}", shown.start + 1, shown.end, cards.len()));
    let line = match (status_message, scroll_hint) {
        (Some(msg), Some(hint)) => Some(format!("{}   {}", msg, hint)),
        (msg, hint) => msg.map(str::to_string).or(hint),
    };
    if let Some(line) = line {
        queue!(out, cursor::MoveTo(2, below))?;
        queue!(out, SetForegroundColor(Color::Yellow))?;
        write!(out, "{}", truncate_str(&line, (cols as usize).saturating_sub(4)))?;
        queue!(out, ResetColor)?;
    }

    render_footer(
        &mut out,
        "q: Quit | r: Refresh | ←/→/↑/↓: Select stack | s: Start | x: Stop | R: Restart | c: Dismiss",
    )?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Member, MemberDetail, ServiceMode, Stack, UnknownOrchestration};

    fn card(kind: i64, running_members: &[bool]) -> StackCard {
        let stack = Stack { id: 1, name: "web".into(), kind, status: 1 };
        StackCard {
            orchestration: stack.orchestration(),
            stack,
            members: running_members
                .iter()
                .enumerate()
                .map(|(i, &running)| Member {
                    id: i.to_string(),
                    name: format!("web-{}", i),
                    running,
                    detail: MemberDetail::Swarm { mode: ServiceMode::Replicated(running as u64) },
                })
                .collect(),
        }
    }

    #[test]
    fn card_shows_counts_and_type() {
        let lines = card_lines(&card(1, &[true, false, true]));
        assert_eq!(lines[0], "web");
        assert_eq!(lines[1], "● Running (Docker Swarm)");
        assert_eq!(lines[2], "2/3 running");
        assert_eq!(lines[3], "web-0, web-1, web-2");
    }

    #[test]
    fn window_scrolls_to_keep_selection_visible() {
        // 7 cards, 2 per row, room for 2 rows
        assert_eq!(visible_cards(7, 2, 0, 2), 0..4);
        assert_eq!(visible_cards(7, 2, 3, 2), 0..4);
        assert_eq!(visible_cards(7, 2, 4, 2), 2..6);
        assert_eq!(visible_cards(7, 2, 6, 2), 4..7);
        assert_eq!(visible_cards(3, 4, 2, 1), 0..3);
        assert_eq!(visible_cards(0, 2, 0, 3), 0..0);
    }

    #[test]
    fn unknown_type_card_is_labelled() {
        let c = card(3, &[]);
        assert_eq!(c.orchestration, Err(UnknownOrchestration(3)));
        assert!(card_lines(&c)[1].contains("unsupported type 3"));
    }
}
