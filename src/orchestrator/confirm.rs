use std::time::{Duration, Instant};

use crate::error::PanelError;

/// How long a confirmation prompt stays open.
pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(5);

struct Pending<A> {
    description: String,
    action: A,
    expires: Instant,
}

/// Single-slot confirmation prompt guarding a destructive action.
pub struct ConfirmationGate<A> {
    pending: Option<Pending<A>>,
}

impl<A> Default for ConfirmationGate<A> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<A> ConfirmationGate<A> {
    /// Open a prompt. A second prompt while one is open is rejected.
    pub fn request(&mut self, description: String, action: A, now: Instant) -> Result<(), PanelError> {
        if self.pending.is_some() {
            return Err(PanelError::ConfirmationPending);
        }
        self.pending = Some(Pending {
            description,
            action,
            expires: now + CONFIRM_TIMEOUT,
        });
        Ok(())
    }

    /// Close the prompt. The guarded action is handed back only on yes.
    pub fn resolve(&mut self, confirmed: bool) -> Option<A> {
        let pending = self.pending.take()?;
        confirmed.then_some(pending.action)
    }

    /// Drop an expired prompt. Returns true if one was dropped.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.pending.as_ref().is_some_and(|p| now > p.expires) {
            self.pending = None;
            return true;
        }
        false
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn description(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.description.as_str())
    }

    /// Time left before the open prompt expires.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending.as_ref().map(|p| p.expires.saturating_duration_since(now))
    }
}
