//! Run assembly: build the working sequence from a configuration and a
//! question bank, then drive a session together with its clock.

use rand::Rng;
use serde::Serialize;

use crate::drill_engine::{
    clock::{ClockEvent, SessionClock},
    combiner::combine,
    config::DrillConfig,
    error::{DrillError, Result},
    expression::ExpressionGenerator,
    helpers::{estimated_seconds, make_rng},
    models::Question,
    pools::QuestionBank,
    session::{Session, SessionEvent, SessionSignal},
};

/// What a configuration produced, shown before a run starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub expressions: usize,
    pub poker_facts: usize,
    pub records: usize,
    pub total: usize,
    pub estimated_seconds: usize,
}

impl RunSummary {
    /// A run may start only when something was selected.
    pub fn is_runnable(&self) -> bool {
        self.total > 0
    }
}

/// Generate, adapt and combine everything `config` selects.
pub fn build_working_sequence<R: Rng>(config: &DrillConfig, bank: &QuestionBank, rng: &mut R) -> (Vec<Question>, RunSummary) {
    let mut expressions = ExpressionGenerator::from_params(&config.generation, rng).generate();
    let generated = expressions.len();

    let facts = bank.poker_expressions(&config.generation.selected_ops, &config.selection);
    let poker_facts = facts.len();
    expressions.extend(facts);

    let records = bank.records(&config.selection);
    let record_count = records.len();

    let sequence = combine(expressions, records, rng);
    let summary = RunSummary {
        expressions: generated,
        poker_facts,
        records: record_count,
        total: sequence.len(),
        estimated_seconds: estimated_seconds(sequence.len()),
    };
    tracing::debug!(?summary, "working sequence built");
    (sequence, summary)
}

/// Everything a host should react to after one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrillUpdate {
    pub signals: Vec<SessionSignal>,
    pub clock: Vec<ClockEvent>,
}

impl DrillUpdate {
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty() && self.clock.is_empty()
    }

    pub fn completed(&self) -> bool {
        self.signals.iter().any(|s| matches!(s, SessionSignal::SessionComplete { .. }))
    }
}

/// A running session plus the chronometer and countdown beside it.
#[derive(Debug)]
pub struct Drill {
    session: Session,
    clock: SessionClock,
    summary: RunSummary,
    last_seen: u64,
}

impl Drill {
    /// Build the working sequence and start a session over it.
    ///
    /// # Errors
    ///
    /// `DrillError::EmptySequence` when the configuration selects nothing.
    pub fn start(config: &DrillConfig, bank: &QuestionBank, now: u64) -> Result<(Drill, DrillUpdate)> {
        let mut rng = make_rng(config.rng_seed);
        let (sequence, summary) = build_working_sequence(config, bank, &mut rng);
        if !summary.is_runnable() {
            return Err(DrillError::EmptySequence);
        }
        Drill::with_sequence(sequence, config, summary, now)
    }

    /// Start over an already assembled sequence.
    ///
    /// # Errors
    ///
    /// `DrillError::EmptySequence` when `sequence` is empty.
    pub fn with_sequence(sequence: Vec<Question>, config: &DrillConfig, summary: RunSummary, now: u64) -> Result<(Drill, DrillUpdate)> {
        let (session, signals) = Session::start(sequence, config.session_options(), now)?;
        let mut clock = SessionClock::new(config.chronometer, config.countdown_option);
        clock.session_started(now);

        let mut drill = Drill { session, clock, summary, last_seen: now };
        let update = drill.forward(signals, now);
        Ok((drill, update))
    }

    pub fn handle(&mut self, event: SessionEvent) -> DrillUpdate {
        let now = match &event {
            SessionEvent::InputChanged { at, .. } | SessionEvent::Tick { at } | SessionEvent::Repeat { at } => *at,
            SessionEvent::Exit => self.last_seen,
        };
        self.last_seen = self.last_seen.max(now);
        let signals = self.session.handle(event);
        self.forward(signals, now)
    }

    /// One display tick: fires due session timers and advances the clock.
    pub fn tick(&mut self, now: u64) -> DrillUpdate {
        let mut update = self.handle(SessionEvent::Tick { at: now });
        update.clock.extend(self.clock.tick(now));
        update
    }

    fn forward(&mut self, signals: Vec<SessionSignal>, now: u64) -> DrillUpdate {
        for signal in &signals {
            self.clock.on_signal(signal, now);
        }
        DrillUpdate { signals, clock: Vec::new() }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    /// For the host's chronometer toggle and countdown option buttons.
    pub fn clock_mut(&mut self) -> &mut SessionClock {
        &mut self.clock
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drill_engine::{
        models::{GenerationParams, Operator},
        session::SessionState,
    };

    fn config(ops: Vec<Operator>, nums: Vec<i64>, end: i64) -> DrillConfig {
        DrillConfig {
            generation: GenerationParams {
                selected_ops: ops,
                selected_nums: nums,
                start: 1,
                end,
                ..GenerationParams::default()
            },
            rng_seed: Some(5),
            ..DrillConfig::default()
        }
    }

    #[test]
    fn summary_counts_each_pool() {
        let mut cfg = config(vec![Operator::Add], vec![1, 2], 3);
        cfg.selection.poker_levels = vec![1];
        let bank = QuestionBank::new();
        let mut rng = make_rng(Some(1));
        let (sequence, summary) = build_working_sequence(&cfg, &bank, &mut rng);

        assert_eq!(summary.expressions, 6);
        assert!(summary.poker_facts > 0);
        assert_eq!(summary.records, 0);
        assert_eq!(summary.total, sequence.len());
        assert_eq!(summary.estimated_seconds, sequence.len() * 5);
    }

    #[test]
    fn nothing_selected_cannot_start() {
        let cfg = config(vec![Operator::Add], Vec::new(), 3);
        let err = Drill::start(&cfg, &QuestionBank::new(), 0).unwrap_err();
        assert!(matches!(err, DrillError::EmptySequence));
    }

    #[test]
    fn completion_freezes_clock() {
        let mut cfg = config(vec![Operator::Mul], vec![3], 1);
        cfg.chronometer = true;
        cfg.countdown_option = 4;
        let (mut drill, update) = Drill::start(&cfg, &QuestionBank::new(), 0).unwrap();
        assert!(matches!(update.signals[0], SessionSignal::Presented { .. }));

        assert_eq!(drill.tick(100).clock, vec![ClockEvent::ChronometerStarted]);
        assert!(drill.clock().countdown.is_active());

        drill.handle(SessionEvent::InputChanged { value: "3".into(), at: 1_000 });
        let update = drill.tick(1_300);
        assert!(update.completed());
        assert_eq!(drill.session().state(), SessionState::SessionComplete);
        assert!(!drill.clock().chronometer.is_running());
        assert!(!drill.clock().countdown.is_active());
        assert_eq!(drill.clock().chronometer_display(9_000), "00:00:01.20");
    }

    #[test]
    fn repeat_restarts_clock_after_delay() {
        let mut cfg = config(vec![Operator::Mul], vec![3], 1);
        cfg.chronometer = true;
        let (mut drill, _) = Drill::start(&cfg, &QuestionBank::new(), 0).unwrap();
        drill.tick(100);
        drill.handle(SessionEvent::InputChanged { value: "3".into(), at: 200 });
        drill.tick(500);

        drill.handle(SessionEvent::Repeat { at: 600 });
        assert_eq!(drill.clock().chronometer.elapsed(600), 0);
        assert!(drill.tick(620).clock.is_empty());
        assert_eq!(drill.tick(650).clock, vec![ClockEvent::ChronometerStarted]);
    }
}
