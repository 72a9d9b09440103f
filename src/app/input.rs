use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::AppView;
use crate::stack_controller::{RefreshKind, StackAction};

use super::state::{confirmation_prompt, needs_confirmation};
use super::App;

/// Result of handling a key: Quit the app, or key was consumed (needs render).
/// None means the key was not handled.
pub enum InputResult {
    Quit,
    Consumed,
}

/// Handle a key event. Returns Some(Quit) to exit, Some(Consumed) if key was handled and
/// a render is needed, None if the key was not handled.
pub fn handle_key(app: &mut App, key_event: KeyEvent) -> Option<InputResult> {
    let KeyEvent { code, modifiers, .. } = key_event;

    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Some(InputResult::Quit);
    }

    if app.confirmation.is_pending() {
        let confirmed = matches!(code, KeyCode::Char('y') | KeyCode::Char('Y'));
        if let Some(action) = app.confirmation.resolve(confirmed) {
            app.monitor.run_action(action);
        }
        return Some(InputResult::Consumed);
    }

    match &app.app_view {
        AppView::Status => handle_status(app, code),
        AppView::Grid => handle_grid(app, code),
        AppView::MemberLogs(_, _) => handle_member_logs(app, code),
    }
}

/// Run `action` now, or ask first if it interrupts a running stack.
fn request_action(app: &mut App, action: StackAction) {
    if app.monitor.lock.is_disabled() {
        if !app.monitor.is_errored() {
            app.monitor.status_message = Some("An action is already in progress...".to_string());
        }
        return;
    }
    if !needs_confirmation(&action) {
        app.monitor.run_action(action);
        return;
    }
    let prompt = confirmation_prompt(&action);
    if let Err(e) = app.confirmation.request(prompt, action, Instant::now()) {
        app.monitor.toasts.error(e.to_string());
    }
}

/// Keys shared by the status view and the grid.
fn handle_stack_keys(app: &mut App, code: KeyCode) -> Option<InputResult> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(InputResult::Quit),
        KeyCode::Char('r') | KeyCode::F(5) => {
            app.monitor.refresh(RefreshKind::Manual);
            Some(InputResult::Consumed)
        }
        KeyCode::Char('c') => {
            app.monitor.toasts.dismiss_latest();
            Some(InputResult::Consumed)
        }
        KeyCode::Char('s') | KeyCode::Char('x') | KeyCode::Char('R') => {
            let view = app.monitor.target_view()?;
            let controls = view.controls();
            let name = view.stack.name.clone();
            let action = match code {
                KeyCode::Char('s') if controls.start => StackAction::Start(name),
                KeyCode::Char('x') if controls.stop => StackAction::Stop(name),
                KeyCode::Char('R') if controls.restart => StackAction::Restart(name),
                _ => return None,
            };
            request_action(app, action);
            Some(InputResult::Consumed)
        }
        KeyCode::Up => app.monitor.selection.move_by(-1).then_some(InputResult::Consumed),
        KeyCode::Down => app.monitor.selection.move_by(1).then_some(InputResult::Consumed),
        _ => None,
    }
}

fn handle_status(app: &mut App, code: KeyCode) -> Option<InputResult> {
    match code {
        KeyCode::Char('l') | KeyCode::Enter | KeyCode::Right => {
            let member = app.monitor.selected_member()?;
            if !member.is_container() {
                app.monitor.status_message = Some("Logs are only available for containers".to_string());
                return Some(InputResult::Consumed);
            }
            if app.monitor.is_errored() {
                return None;
            }
            let (id, name) = (member.id.clone(), member.name.clone());
            app.monitor.open_logs(&id, &name);
            app.app_view = AppView::MemberLogs(id, name);
            Some(InputResult::Consumed)
        }
        KeyCode::Char('m') => {
            let member = app.monitor.selected_member()?;
            if !member.is_container() {
                app.monitor.status_message = Some("Only containers can be restarted individually".to_string());
                return Some(InputResult::Consumed);
            }
            let action = StackAction::RestartMember {
                id: member.id.clone(),
                name: member.name.clone(),
            };
            request_action(app, action);
            Some(InputResult::Consumed)
        }
        _ => handle_stack_keys(app, code),
    }
}

fn handle_grid(app: &mut App, code: KeyCode) -> Option<InputResult> {
    match code {
        KeyCode::Left => app.monitor.selection.move_by(-1).then_some(InputResult::Consumed),
        KeyCode::Right => app.monitor.selection.move_by(1).then_some(InputResult::Consumed),
        _ => handle_stack_keys(app, code),
    }
}

fn handle_member_logs(app: &mut App, code: KeyCode) -> Option<InputResult> {
    let page_size = crossterm::terminal::size()
        .map(|(_, h)| h as usize)
        .unwrap_or(24)
        .saturating_sub(4);

    if app.monitor.log_state.as_ref().is_some_and(|s| s.search_mode) {
        let log_state = app.monitor.log_state.as_mut()?;
        return match code {
            KeyCode::Enter => {
                log_state.search_mode = false;
                Some(InputResult::Consumed)
            }
            KeyCode::Esc => {
                log_state.search_mode = false;
                log_state.search_query.clear();
                Some(InputResult::Consumed)
            }
            KeyCode::Backspace => {
                log_state.search_query.pop();
                Some(InputResult::Consumed)
            }
            KeyCode::Char(c) => {
                log_state.search_query.push(c);
                Some(InputResult::Consumed)
            }
            _ => None,
        };
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc | KeyCode::Left => {
            app.monitor.close_logs();
            app.app_view = app.home_view();
            Some(InputResult::Consumed)
        }
        KeyCode::Char('a') => {
            app.monitor.toggle_log_stream();
            Some(InputResult::Consumed)
        }
        KeyCode::Char('r') => app.monitor.refresh_logs().then_some(InputResult::Consumed),
        KeyCode::Up | KeyCode::PageUp => {
            let step = if code == KeyCode::Up { 1 } else { page_size };
            let log_state = app.monitor.log_state.as_mut()?;
            log_state.auto_follow = false;
            let max_offset = log_state.lines.len().saturating_sub(1);
            log_state.scroll_offset = (log_state.scroll_offset + step).min(max_offset);
            Some(InputResult::Consumed)
        }
        KeyCode::Down | KeyCode::PageDown => {
            let step = if code == KeyCode::Down { 1 } else { page_size };
            let log_state = app.monitor.log_state.as_mut()?;
            log_state.scroll_offset = log_state.scroll_offset.saturating_sub(step);
            if log_state.scroll_offset == 0 {
                log_state.auto_follow = true;
            }
            Some(InputResult::Consumed)
        }
        KeyCode::Char('f') | KeyCode::End => {
            let log_state = app.monitor.log_state.as_mut()?;
            log_state.auto_follow = true;
            log_state.scroll_offset = 0;
            Some(InputResult::Consumed)
        }
        KeyCode::Char('/') => {
            let log_state = app.monitor.log_state.as_mut()?;
            log_state.search_mode = true;
            log_state.search_query.clear();
            Some(InputResult::Consumed)
        }
        KeyCode::Char('n') => {
            let log_state = app.monitor.log_state.as_mut()?;
            log_state.search_query.clear();
            Some(InputResult::Consumed)
        }
        _ => None,
    }
}
