use crate::stack_controller::StackAction;

/// Prompt shown in the confirmation bar for a destructive action.
pub fn confirmation_prompt(action: &StackAction) -> String {
    match action {
        StackAction::Start(name) => format!("Start stack '{}'?", name),
        StackAction::Stop(name) => format!("Stop stack '{}'?", name),
        StackAction::Restart(name) => format!("Restart stack '{}'? It will be stopped, then started", name),
        StackAction::RestartMember { name, .. } => format!("Restart container '{}'?", name),
    }
}

/// Start runs immediately; everything that interrupts a running stack asks first.
pub fn needs_confirmation(action: &StackAction) -> bool {
    !matches!(action, StackAction::Start(_))
}
