//! Cancellable one-shot timers on a caller-supplied millisecond clock.
//!
//! Nothing here sleeps or spawns. The host passes the current time into
//! `poll`, and a timer fires at most once per `schedule`. Scheduling again
//! replaces the pending deadline, so a superseded timer can never fire.

/// A single pending deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OneShotTimer {
    due_at: Option<u64>,
}

impl OneShotTimer {
    pub const fn new() -> Self {
        OneShotTimer { due_at: None }
    }

    /// Arm the timer for `now + delay_ms`, dropping any earlier deadline.
    pub fn schedule(&mut self, now: u64, delay_ms: u64) -> u64 {
        let due = now.saturating_add(delay_ms);
        self.due_at = Some(due);
        due
    }

    pub fn cancel(&mut self) {
        self.due_at = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due_at.is_some()
    }

    pub fn due_at(&self) -> Option<u64> {
        self.due_at
    }

    /// `true` exactly once, on the first poll at or after the deadline.
    pub fn poll(&mut self, now: u64) -> bool {
        match self.due_at {
            Some(due) if now >= due => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }
}

/// Settles on the last value scheduled within the quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay_ms: u64,
    timer: OneShotTimer,
    payload: Option<T>,
}

impl<T> Debouncer<T> {
    pub fn new(delay_ms: u64) -> Self {
        Debouncer { delay_ms, timer: OneShotTimer::new(), payload: None }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Restart the quiet period with a new payload; returns the deadline.
    pub fn schedule(&mut self, now: u64, payload: T) -> u64 {
        self.payload = Some(payload);
        self.timer.schedule(now, self.delay_ms)
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
        self.payload = None;
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    pub fn due_at(&self) -> Option<u64> {
        self.timer.due_at()
    }

    pub fn poll(&mut self, now: u64) -> Option<T> {
        if self.timer.poll(now) {
            self.payload.take()
        } else {
            None
        }
    }
}
