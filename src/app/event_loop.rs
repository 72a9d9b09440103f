use std::time::Instant;

use super::App;

impl App {
    /// Once-a-second work: the refresh countdown.
    pub fn process_tick(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_second) < self.tick_rate {
            return false;
        }
        self.last_second += self.tick_rate;
        // Catch up without replaying a long stall second by second.
        if now.duration_since(self.last_second) >= self.tick_rate {
            self.last_second = now;
        }
        self.monitor.tick_second()
    }

    /// Collect finished background work and fire scheduled refreshes.
    pub fn poll_background(&mut self, now: Instant) -> bool {
        let mut needs_render = false;
        if self.monitor.poll_status() {
            needs_render = true;
        }
        if self.monitor.poll_action() {
            needs_render = true;
        }
        if self.monitor.poll_scheduled_refresh(now) {
            needs_render = true;
        }
        if self.monitor.poll_logs(now) {
            needs_render = true;
        }
        if self.monitor.expire_toasts(now) {
            needs_render = true;
        }
        needs_render
    }

    /// Expire pending confirmation if timed out.
    pub fn expire_pending_action(&mut self, now: Instant) -> bool {
        self.confirmation.expire(now)
    }
}
