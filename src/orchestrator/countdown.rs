use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownState {
    /// Seconds left until the next silent refresh.
    Counting(u64),
    /// A refresh is running; the count resumes once it settles.
    Fetching,
}

/// Seconds-granular countdown to the next automatic status refresh.
/// `tick` is expected once per second.
#[derive(Debug)]
pub struct RefreshCountdown {
    period: u64,
    state: CountdownState,
}

impl RefreshCountdown {
    pub fn new(period: Duration) -> Self {
        let period = period.as_secs().max(1);
        Self {
            period,
            state: CountdownState::Counting(period),
        }
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    /// Returns true when the count reaches zero and a silent refresh is due.
    pub fn tick(&mut self) -> bool {
        match self.state {
            CountdownState::Counting(n) if n > 1 => {
                self.state = CountdownState::Counting(n - 1);
                false
            }
            CountdownState::Counting(_) => {
                self.state = CountdownState::Fetching;
                true
            }
            CountdownState::Fetching => false,
        }
    }

    /// A refresh started outside the countdown.
    pub fn begin_manual(&mut self) {
        self.state = CountdownState::Fetching;
    }

    pub fn settle(&mut self) {
        self.state = CountdownState::Counting(self.period);
    }

    pub fn label(&self) -> String {
        match self.state {
            CountdownState::Counting(n) => format!("refresh in {}s", n),
            CountdownState::Fetching => "refreshing...".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_then_fetches_once() {
        let mut c = RefreshCountdown::new(Duration::from_secs(3));
        assert!(!c.tick());
        assert!(!c.tick());
        assert_eq!(c.state(), CountdownState::Counting(1));
        assert!(c.tick());
        assert_eq!(c.state(), CountdownState::Fetching);
        assert!(!c.tick());
        c.settle();
        assert_eq!(c.state(), CountdownState::Counting(3));
    }

    #[test]
    fn manual_refresh_suspends_count() {
        let mut c = RefreshCountdown::new(Duration::from_secs(30));
        c.tick();
        c.begin_manual();
        assert!(!c.tick());
        assert_eq!(c.label(), "refreshing...");
        c.settle();
        assert_eq!(c.label(), "refresh in 30s");
    }
}
