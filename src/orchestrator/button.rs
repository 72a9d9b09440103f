/// Buttons that start remote work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    Refresh,
    Start,
    Stop,
    Restart,
    MemberRestart,
}

impl Button {
    pub fn label(self) -> &'static str {
        match self {
            Button::Refresh => "Refresh",
            Button::Start => "Start",
            Button::Stop => "Stop",
            Button::Restart => "Restart",
            Button::MemberRestart => "Restart member",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LockState {
    Idle,
    Busy(Button),
}

/// Global busy lock: while any operation runs, every button is disabled
/// and only the one that started it shows a spinner.
#[derive(Debug)]
pub struct ButtonLock {
    state: LockState,
    /// Session started with a broken configuration; nothing is ever enabled.
    errored: bool,
}

impl ButtonLock {
    pub fn new(errored: bool) -> Self {
        Self {
            state: LockState::Idle,
            errored,
        }
    }

    /// Take the lock for `button`. False if busy or the session is errored.
    pub fn begin(&mut self, button: Button) -> bool {
        if self.errored || self.state != LockState::Idle {
            return false;
        }
        self.state = LockState::Busy(button);
        true
    }

    /// Release the lock. Safe to call when idle.
    pub fn settle(&mut self) {
        self.state = LockState::Idle;
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, LockState::Busy(_))
    }

    pub fn is_errored(&self) -> bool {
        self.errored
    }

    /// One lock covers every button: while any action runs, none can start.
    pub fn is_disabled(&self) -> bool {
        self.errored || self.is_busy()
    }

    pub fn is_spinning(&self, button: Button) -> bool {
        self.state == LockState::Busy(button)
    }
}
