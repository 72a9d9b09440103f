use std::time::{Duration, Instant};

/// Periodic re-fetch of the open log view.
///
/// While on, a fetch is due immediately and then `interval` after the
/// previous one finished. At most one fetch is in flight.
#[derive(Debug)]
pub struct LogAutoStream {
    interval: Duration,
    on: bool,
    in_flight: bool,
    next_due: Option<Instant>,
}

impl LogAutoStream {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            on: false,
            in_flight: false,
            next_due: None,
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight
    }

    pub fn set_on(&mut self, now: Instant) {
        self.on = true;
        self.next_due = Some(now);
    }

    pub fn set_off(&mut self) {
        self.on = false;
        self.next_due = None;
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.on {
            self.set_off();
        } else {
            self.set_on(now);
        }
    }

    /// True when the stream wants a fetch now.
    pub fn is_due(&self, now: Instant) -> bool {
        self.on && !self.in_flight && self.next_due.is_some_and(|due| now >= due)
    }

    /// Mark a fetch (streamed or manual) as started. False if one is running.
    pub fn begin_fetch(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    pub fn finish_fetch(&mut self, now: Instant) {
        self.in_flight = false;
        if self.on {
            self.next_due = Some(now + self.interval);
        }
    }

    /// Manual refresh is only offered while streaming is off.
    pub fn manual_refresh_enabled(&self) -> bool {
        !self.on && !self.in_flight
    }

    /// Log view closed: stop streaming and forget any in-flight fetch.
    pub fn close(&mut self) {
        self.set_off();
        self.in_flight = false;
    }
}
