//! JSON view of a running drill for a presentation host.
//!
//! The host redraws from the snapshot after every update; nothing in here
//! mutates the drill.

use serde_json::{json, Value};

use crate::drill_engine::{
    clock::ClockEvent,
    drill::{Drill, DrillUpdate},
    helpers::pad4,
    session::{HistoryEntry, Session, SessionSignal, SessionState},
};

/// `failCount` and `answered/total`, both four-digit padded.
fn hud(session: &Session) -> Value {
    let progress = session.progress();
    json!({
        "failCount": pad4(progress.fail_count),
        "progress":  format!("{}/{}", pad4(progress.answered), pad4(progress.total)),
        "pending":   progress.pending,
        "pass":      session.pass(),
    })
}

/// Oldest entries fade: 1.0 for the newest down to 0.2 for the oldest.
fn history_opacity(index: usize, len: usize) -> f64 {
    if len <= 1 {
        return 1.0;
    }
    let t = index as f64 / (len - 1) as f64;
    1.0 - 0.8 * t
}

fn history(session: &Session) -> Value {
    let entries: Vec<&HistoryEntry> = session.history().collect();
    let len = entries.len();
    Value::Array(
        entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                json!({
                    "text":    entry.text,
                    "correct": entry.correct,
                    "opacity": history_opacity(i, len),
                })
            })
            .collect(),
    )
}

/// Prompt block. A Fugues-hidden question shows as blank.
fn prompt(session: &Session) -> Value {
    let hidden = session.question_hidden();
    let text = if hidden { "" } else { session.current_prompt().unwrap_or("") };
    json!({
        "text":      text,
        "hidden":    hidden,
        "maxLength": session.max_length(),
        "editable":  session.state() == SessionState::AwaitingInput,
    })
}

/// Full snapshot of `drill` at time `now`.
pub fn to_host_state(drill: &Drill, now: u64) -> Value {
    let session = drill.session();
    let clock = drill.clock();
    json!({
        "state":   session.state(),
        "hud":     hud(session),
        "prompt":  prompt(session),
        "history": history(session),
        "clock": {
            "chronometer":       clock.chronometer_display(now),
            "chronometerOn":     clock.chronometer_enabled,
            "countdown":         clock.countdown_display(),
            "countdownOption":   clock.countdown.option().label,
            "expired":           clock.has_expired(),
        },
        "summary": drill.summary(),
    })
}

/// The signals in an update as JSON, for hosts that animate transitions.
pub fn signals_to_json(update: &DrillUpdate) -> Value {
    let signals: Vec<Value> = update
        .signals
        .iter()
        .map(|s| serde_json::to_value(s).unwrap_or(Value::Null))
        .collect();
    let repeat_offered = update.signals.iter().any(|s| matches!(s, SessionSignal::SessionComplete { .. }))
        || update.clock.iter().any(|e| matches!(e, ClockEvent::CountdownExpired));
    json!({
        "signals":       signals,
        "repeatOffered": repeat_offered,
    })
}
