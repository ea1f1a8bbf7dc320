//! Elapsed-time chronometer and countdown shown beside a running drill.
//!
//! Both are advanced by the host's fixed display tick. The clock is separate
//! state from the session: it only reacts to what the session signals.

use serde::Serialize;

use crate::drill_engine::{session::SessionSignal, timer::OneShotTimer};

/// Display refresh and countdown granularity.
pub const TICK_MS: u64 = 100;

/// Chronometer start delay after a run begins.
pub const START_DELAY_MS: u64 = 100;
/// Chronometer restart delay after repeating a completed run.
pub const REPEAT_DELAY_MS: u64 = 50;
/// Chronometer restart delay after repeating a run the countdown cut short.
pub const EXPIRED_REPEAT_DELAY_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountdownOption {
    pub label: &'static str,
    pub seconds: u64,
}

const fn option(label: &'static str, seconds: u64) -> CountdownOption {
    CountdownOption { label, seconds }
}

/// Selectable countdown lengths. The first (zero) disables the countdown.
pub const COUNTDOWN_OPTIONS: [CountdownOption; 13] = [
    option("0s", 0),
    option("5s", 5),
    option("15s", 15),
    option("30s", 30),
    option("1m", 60),
    option("3m", 180),
    option("5m", 300),
    option("10m", 600),
    option("15m", 900),
    option("30m", 1_800),
    option("1h", 3_600),
    option("2h", 7_200),
    option("3h", 10_800),
];

/// `HH:MM:SS.cc`
pub fn format_clock(ms: u64) -> String {
    let total_seconds = ms / 1_000;
    format!(
        "{:02}:{:02}:{:02}.{:02}",
        total_seconds / 3_600,
        (total_seconds % 3_600) / 60,
        total_seconds % 60,
        (ms % 1_000) / 10
    )
}

// ---------------------------------------------------------------------------
// Chronometer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Chronometer {
    started_at: Option<u64>,
    running: bool,
    frozen_ms: u64,
}

impl Chronometer {
    pub fn start(&mut self, now: u64) {
        self.running = true;
        self.started_at = Some(now);
        self.frozen_ms = 0;
    }

    /// Stop and keep the reading on display.
    pub fn freeze(&mut self, now: u64) {
        if let Some(started) = self.started_at {
            self.frozen_ms = now.saturating_sub(started);
        }
        self.running = false;
    }

    /// Stop and clear back to zero.
    pub fn reset(&mut self) {
        *self = Chronometer::default();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed(&self, now: u64) -> u64 {
        match (self.running, self.started_at) {
            (true, Some(started)) => now.saturating_sub(started),
            _                     => self.frozen_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Countdown {
    option: usize,
    remaining_ms: u64,
    active: bool,
}

impl Countdown {
    pub fn new(option: usize) -> Self {
        let mut countdown = Countdown::default();
        countdown.select(option);
        countdown
    }

    pub fn option(&self) -> CountdownOption {
        COUNTDOWN_OPTIONS[self.option]
    }

    /// Choose an option (clamped to the table) and re-arm.
    pub fn select(&mut self, option: usize) {
        self.option = option.min(COUNTDOWN_OPTIONS.len() - 1);
        self.reset();
    }

    pub fn select_previous(&mut self) {
        if self.option > 0 {
            self.select(self.option - 1);
        }
    }

    pub fn select_next(&mut self) {
        self.select(self.option + 1);
    }

    /// Re-arm with the selected option's full length.
    pub fn reset(&mut self) {
        let seconds = self.option().seconds;
        self.remaining_ms = seconds * 1_000;
        self.active = seconds > 0;
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.remaining_ms = 0;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Time left on display; zero while inactive.
    pub fn remaining_ms(&self) -> u64 {
        if self.active { self.remaining_ms } else { 0 }
    }

    /// Advance one display tick. Returns `true` on the tick that expires it.
    pub fn tick(&mut self) -> bool {
        if !self.active || self.remaining_ms == 0 {
            return false;
        }
        self.remaining_ms = self.remaining_ms.saturating_sub(TICK_MS);
        if self.remaining_ms == 0 {
            self.active = false;
            return true;
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Session clock
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    ChronometerStarted,
    /// The countdown ran out: the chronometer is frozen and the host should
    /// offer to repeat the run.
    CountdownExpired,
}

#[derive(Debug, Clone, Default)]
pub struct SessionClock {
    pub chronometer: Chronometer,
    pub countdown: Countdown,
    /// Whether the learner switched the chronometer on.
    pub chronometer_enabled: bool,
    pending_start: OneShotTimer,
    expired: bool,
}

impl SessionClock {
    pub fn new(chronometer_enabled: bool, countdown_option: usize) -> Self {
        SessionClock {
            chronometer_enabled,
            countdown: Countdown::new(countdown_option),
            ..SessionClock::default()
        }
    }

    pub fn has_expired(&self) -> bool {
        self.expired
    }

    pub fn session_started(&mut self, now: u64) {
        self.expired = false;
        self.countdown.reset();
        self.schedule_start(now, START_DELAY_MS);
    }

    fn schedule_start(&mut self, now: u64, delay_ms: u64) {
        if self.chronometer_enabled {
            self.pending_start.schedule(now, delay_ms);
        } else {
            self.pending_start.cancel();
        }
    }

    /// Manual reset: chronometer to zero, countdown re-armed.
    pub fn reset(&mut self) {
        self.pending_start.cancel();
        self.chronometer.reset();
        self.countdown.reset();
        self.expired = false;
    }

    /// React to what the session reported.
    pub fn on_signal(&mut self, signal: &SessionSignal, now: u64) {
        match signal {
            SessionSignal::SessionComplete { .. } => {
                self.pending_start.cancel();
                self.chronometer.freeze(now);
                self.countdown.stop();
            }
            SessionSignal::Restarted { .. } => {
                let delay = if self.expired { EXPIRED_REPEAT_DELAY_MS } else { REPEAT_DELAY_MS };
                self.countdown.reset();
                self.chronometer.reset();
                self.expired = false;
                self.schedule_start(now, delay);
            }
            SessionSignal::ExitRequested => {
                self.pending_start.cancel();
                self.chronometer.reset();
                self.countdown.stop();
            }
            _ => {}
        }
    }

    /// One display tick.
    pub fn tick(&mut self, now: u64) -> Vec<ClockEvent> {
        let mut events = Vec::new();
        if self.pending_start.poll(now) {
            self.chronometer.start(now);
            events.push(ClockEvent::ChronometerStarted);
        }
        if self.countdown.tick() {
            self.chronometer.freeze(now);
            self.expired = true;
            tracing::info!("countdown expired");
            events.push(ClockEvent::CountdownExpired);
        }
        events
    }

    pub fn chronometer_display(&self, now: u64) -> String {
        format_clock(self.chronometer.elapsed(now))
    }

    pub fn countdown_display(&self) -> String {
        format_clock(self.countdown.remaining_ms())
    }
}
