use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const TOAST_LIFETIME: Duration = Duration::from_secs(5);

/// Toasts beyond this many are dropped oldest-first.
const MAX_TOASTS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Warning,
    Error,
}

impl ToastKind {
    pub fn title(self) -> &'static str {
        match self {
            ToastKind::Success => "Success",
            ToastKind::Warning => "Warning",
            ToastKind::Error => "Error",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    /// Wall-clock time shown next to the message.
    pub stamp: String,
    expires: Instant,
}

#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
}

impl ToastQueue {
    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>, now: Instant) {
        if self.toasts.len() == MAX_TOASTS {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast {
            kind,
            message: message.into(),
            stamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            expires: now + TOAST_LIFETIME,
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Success, message, Instant::now());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Warning, message, Instant::now());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Error, message, Instant::now());
    }

    /// Remove expired toasts. Returns true if any were removed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.expires > now);
        self.toasts.len() != before
    }

    /// Dismiss the newest toast.
    pub fn dismiss_latest(&mut self) -> bool {
        self.toasts.pop_back().is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_lifetime() {
        let now = Instant::now();
        let mut q = ToastQueue::default();
        q.push(ToastKind::Success, "done", now);
        q.push(ToastKind::Error, "failed", now + Duration::from_secs(2));
        assert!(!q.expire(now + Duration::from_secs(4)));
        assert!(q.expire(now + Duration::from_secs(6)));
        assert_eq!(q.len(), 1);
        assert_eq!(q.iter().next().map(|t| t.kind), Some(ToastKind::Error));
        assert!(q.expire(now + Duration::from_secs(8)));
        assert!(q.is_empty());
    }

    #[test]
    fn oldest_toast_is_dropped_when_full() {
        let now = Instant::now();
        let mut q = ToastQueue::default();
        for i in 0..7 {
            q.push(ToastKind::Warning, format!("w{}", i), now);
        }
        assert_eq!(q.len(), MAX_TOASTS);
        assert_eq!(q.iter().next().map(|t| t.message.as_str()), Some("w2"));
    }
}
