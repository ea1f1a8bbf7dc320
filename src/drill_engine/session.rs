//! The drill session state machine.
//!
//! A session owns the working sequence, the cursor, the fail queue and the
//! counters. The host feeds it [`SessionEvent`]s (input changes, clock ticks,
//! repeat and exit requests) carrying a millisecond timestamp, and renders
//! the [`SessionSignal`]s it returns. All waiting (the Fugues reveal delay and
//! the validation debounce) is expressed as timers polled on those events.
//!
//! ```text
//! Presenting ──reveal──▶ AwaitingInput ──ready + settle──▶ Advancing
//!      ▲                                                      │
//!      └──────────── next item / next pass ◀──────────────────┘
//!                              │ nothing left
//!                              ▼
//!                       SessionComplete ──repeat──▶ Presenting
//! ```

use std::collections::VecDeque;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::drill_engine::{
    error::{DrillError, Result},
    evaluator::EvaluationOrder,
    helpers::{make_rng, shuffle},
    models::{FuguesSpeed, ModeSet, Modifier, Question},
    presentation::{expression_prompt, mirror, order_for_presentation, record_prompt},
    timer::{Debouncer, OneShotTimer},
    validator::{AnswerKey, InputCheck, Validator},
};

/// Answers kept in the visible history.
pub const HISTORY_LEN: usize = 10;

/// What happens to an item answered wrongly during a retry pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RetryPolicy {
    /// Every wrong answer is counted and queued again, in every pass, so a
    /// session only completes with a pass that has no misses.
    #[default]
    UntilCorrect,
    /// Only first-pass answers are counted, queued and logged. An item
    /// missed again in its retry pass is dropped, so a session takes at
    /// most two passes.
    SingleRetry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub modes: ModeSet,
    pub fugues_speed: FuguesSpeed,
    pub debounce_ms: u64,
    pub max_repeat_shuffles: usize,
    pub retry_policy: RetryPolicy,
    pub evaluation_order: EvaluationOrder,
    pub expression_decimals: Option<u32>,
    pub rng_seed: Option<u64>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            modes: ModeSet::new(),
            fugues_speed: FuguesSpeed::default(),
            debounce_ms: 300,
            max_repeat_shuffles: 5,
            retry_policy: RetryPolicy::default(),
            evaluation_order: EvaluationOrder::default(),
            expression_decimals: None,
            rng_seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// Question shown; input not yet editable.
    Presenting,
    AwaitingInput,
    /// Judging the settled answer.
    Advancing,
    /// Current pass exhausted; the fail queue is about to become the next pass.
    PassComplete,
    SessionComplete,
    Exited,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The learner's input now reads `value`.
    InputChanged { value: String, at: u64 },
    /// Time passed; fires any due reveal or validation.
    Tick { at: u64 },
    /// Start over from the original sequence, freshly shuffled.
    Repeat { at: u64 },
    Exit,
}

/// One judged answer, as shown in the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    /// The question as presented (mirrored expressions in mirrored form).
    pub question: Question,
    pub user_answer: String,
    pub correct: bool,
    /// Whether this attempt counted towards the fail counter and history.
    pub first_attempt: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Prompt followed by the learner's answer.
    pub text: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "camelCase")]
pub enum SessionSignal {
    /// A new question is on screen. With Fugues, `reveal_at` says when the
    /// input opens.
    #[serde(rename_all = "camelCase")]
    Presented {
        question: Question,
        prompt: String,
        max_length: usize,
        reveal_at: Option<u64>,
    },
    #[serde(rename_all = "camelCase")]
    InputEnabled { question_hidden: bool },
    /// Input was too long; the host should replace it with `value`.
    InputTruncated { value: String },
    #[serde(rename_all = "camelCase")]
    ValidationScheduled { due_at: u64 },
    Answered(AnswerRecord),
    /// A retry pass over `items` queued failures begins.
    PassStarted { pass: usize, items: usize },
    #[serde(rename_all = "camelCase")]
    SessionComplete { fail_count: usize, total: usize },
    Restarted { total: usize },
    ExitRequested,
}

/// Counters for the HUD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub fail_count: usize,
    /// `total - pending`, never below zero.
    pub answered: usize,
    /// Items left in this pass, including the one on screen, plus queued
    /// failures.
    pub pending: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
struct CurrentItem {
    question: Question,
    prompt: String,
    validator: Validator,
    hidden: bool,
}

#[derive(Debug)]
pub struct Session {
    options: SessionOptions,
    rng: StdRng,
    original: Vec<Question>,
    sequence: Vec<Question>,
    failed: Vec<Question>,
    cursor: usize,
    pass: usize,
    fail_count: usize,
    total: usize,
    state: SessionState,
    current: Option<CurrentItem>,
    presented: u64,
    reveal: OneShotTimer,
    debounce: Debouncer<String>,
    history: VecDeque<HistoryEntry>,
}

impl Session {
    /// Order `items` for presentation and show the first one.
    ///
    /// # Errors
    ///
    /// `DrillError::EmptySequence` when there is nothing to practise.
    pub fn start(items: Vec<Question>, options: SessionOptions, now: u64) -> Result<(Session, Vec<SessionSignal>)> {
        if items.is_empty() {
            return Err(DrillError::EmptySequence);
        }

        let mut rng = make_rng(options.rng_seed);
        let mut working = items;
        order_for_presentation(&mut working, &options.modes, &mut rng);

        let total = working.len();
        let mut session = Session {
            debounce: Debouncer::new(options.debounce_ms),
            options,
            rng,
            original: working.clone(),
            sequence: working,
            failed: Vec::new(),
            cursor: 0,
            pass: 0,
            fail_count: 0,
            total,
            state: SessionState::Presenting,
            current: None,
            presented: 0,
            reveal: OneShotTimer::new(),
            history: VecDeque::with_capacity(HISTORY_LEN),
        };
        tracing::info!(total, modes = ?session.options.modes, "session started");

        let mut signals = Vec::new();
        session.present_next(now, &mut signals);
        Ok((session, signals))
    }

    pub fn handle(&mut self, event: SessionEvent) -> Vec<SessionSignal> {
        let mut signals = Vec::new();
        if self.state == SessionState::Exited {
            return signals;
        }

        match event {
            SessionEvent::Exit => self.exit(&mut signals),
            SessionEvent::Tick { at } => self.poll_timers(at, &mut signals),
            SessionEvent::Repeat { at } => self.restart(at, &mut signals),
            SessionEvent::InputChanged { value, at } => {
                // A validation that fell due before this edit wins; the edit
                // then belonged to a question that is gone.
                let before = self.presented;
                self.poll_timers(at, &mut signals);
                if self.presented == before && self.state == SessionState::AwaitingInput {
                    self.on_input(&value, at, &mut signals);
                }
            }
        }
        signals
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn present_next(&mut self, now: u64, signals: &mut Vec<SessionSignal>) {
        self.debounce.cancel();
        self.reveal.cancel();

        while self.cursor >= self.sequence.len() {
            if self.failed.is_empty() {
                self.complete(signals);
                return;
            }
            self.state = SessionState::PassComplete;
            self.sequence = std::mem::take(&mut self.failed);
            self.cursor = 0;
            self.pass += 1;
            tracing::debug!(pass = self.pass, items = self.sequence.len(), "retry pass started");
            signals.push(SessionSignal::PassStarted { pass: self.pass, items: self.sequence.len() });
        }

        let item = self.sequence[self.cursor].clone();
        self.cursor += 1;
        self.presented += 1;

        let (question, prompt, key) = match item {
            Question::Expression(expr) => {
                let shown = if self.options.modes.contains(&Modifier::Mirror) { mirror(&expr) } else { expr };
                let key = AnswerKey::for_expression(&shown, self.options.evaluation_order, self.options.expression_decimals);
                let prompt = expression_prompt(&shown);
                (Question::Expression(shown), prompt, key)
            }
            Question::Record(record) => {
                let key = AnswerKey::for_record(&record);
                let prompt = record_prompt(&record.question);
                (Question::Record(record), prompt, key)
            }
        };

        let validator = Validator::new(key);
        let max_length = validator.max_length();
        self.state = SessionState::Presenting;
        self.current = Some(CurrentItem { question: question.clone(), prompt: prompt.clone(), validator, hidden: false });

        if self.options.modes.contains(&Modifier::Fugues) {
            let due = self.reveal.schedule(now, self.options.fugues_speed.latency_ms());
            signals.push(SessionSignal::Presented { question, prompt, max_length, reveal_at: Some(due) });
        } else {
            signals.push(SessionSignal::Presented { question, prompt, max_length, reveal_at: None });
            self.enable_input(false, signals);
        }
    }

    fn enable_input(&mut self, hide_question: bool, signals: &mut Vec<SessionSignal>) {
        if let Some(current) = self.current.as_mut() {
            current.hidden = hide_question;
        }
        self.state = SessionState::AwaitingInput;
        signals.push(SessionSignal::InputEnabled { question_hidden: hide_question });
    }

    fn poll_timers(&mut self, at: u64, signals: &mut Vec<SessionSignal>) {
        if self.state == SessionState::Presenting && self.reveal.poll(at) {
            self.enable_input(true, signals);
        }
        if self.state == SessionState::AwaitingInput {
            if let Some(value) = self.debounce.poll(at) {
                self.judge(value, at, signals);
            }
        }
    }

    fn on_input(&mut self, value: &str, at: u64, signals: &mut Vec<SessionSignal>) {
        self.debounce.cancel();
        let Some(current) = self.current.as_ref() else { return };
        match current.validator.check(value) {
            InputCheck::Truncated(value) => signals.push(SessionSignal::InputTruncated { value }),
            InputCheck::Ready(value) => {
                let due_at = self.debounce.schedule(at, value);
                signals.push(SessionSignal::ValidationScheduled { due_at });
            }
            InputCheck::Pending => {}
        }
    }

    fn judge(&mut self, value: String, at: u64, signals: &mut Vec<SessionSignal>) {
        self.state = SessionState::Advancing;
        let Some(current) = self.current.take() else { return };
        let correct = current.validator.judge(&value);
        let counted = match self.options.retry_policy {
            RetryPolicy::SingleRetry  => self.pass == 0,
            RetryPolicy::UntilCorrect => true,
        };

        if counted {
            if !correct {
                self.failed.push(current.question.clone());
                self.fail_count += 1;
            }
            self.history.push_front(HistoryEntry { text: format!("{}{}", current.prompt, value), correct });
            self.history.truncate(HISTORY_LEN);
        }
        tracing::debug!(correct, pass = self.pass, fail_count = self.fail_count, "answer judged");

        signals.push(SessionSignal::Answered(AnswerRecord {
            question: current.question,
            user_answer: value,
            correct,
            first_attempt: counted,
        }));
        self.present_next(at, signals);
    }

    fn complete(&mut self, signals: &mut Vec<SessionSignal>) {
        self.state = SessionState::SessionComplete;
        self.current = None;
        self.history.clear();
        tracing::info!(fail_count = self.fail_count, total = self.total, passes = self.pass + 1, "session complete");
        signals.push(SessionSignal::SessionComplete { fail_count: self.fail_count, total: self.total });
    }

    /// Reshuffle the original sequence, retrying a few times if the shuffle
    /// reproduces the original order, and start again.
    fn restart(&mut self, at: u64, signals: &mut Vec<SessionSignal>) {
        let mut reshuffled = self.original.clone();
        let mut attempts = 0;
        loop {
            shuffle(&mut reshuffled, &mut self.rng);
            attempts += 1;
            if attempts >= self.options.max_repeat_shuffles || reshuffled != self.original {
                break;
            }
        }

        self.sequence = reshuffled;
        self.failed.clear();
        self.cursor = 0;
        self.pass = 0;
        self.fail_count = 0;
        self.total = self.original.len();
        self.history.clear();
        tracing::info!(total = self.total, attempts, "session restarted");
        signals.push(SessionSignal::Restarted { total: self.total });
        self.present_next(at, signals);
    }

    fn exit(&mut self, signals: &mut Vec<SessionSignal>) {
        self.debounce.cancel();
        self.reveal.cancel();
        self.current = None;
        self.state = SessionState::Exited;
        tracing::info!("session exited");
        signals.push(SessionSignal::ExitRequested);
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Zero for the first pass, then one per retry pass.
    pub fn pass(&self) -> usize {
        self.pass
    }

    pub fn fail_count(&self) -> usize {
        self.fail_count
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn progress(&self) -> Progress {
        // The cursor already moved past the item on screen.
        let on_screen = usize::from(self.current.is_some());
        let remaining = self.sequence.len().saturating_sub(self.cursor) + on_screen;
        let pending = remaining + self.failed.len();
        Progress {
            fail_count: self.fail_count,
            answered: self.total.saturating_sub(pending),
            pending,
            total: self.total,
        }
    }

    /// Newest first.
    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter()
    }

    pub fn original_sequence(&self) -> &[Question] {
        &self.original
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref().map(|c| &c.question)
    }

    pub fn current_prompt(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.prompt.as_str())
    }

    /// Whether Fugues has hidden the current question.
    pub fn question_hidden(&self) -> bool {
        self.current.as_ref().is_some_and(|c| c.hidden)
    }

    pub fn current_key(&self) -> Option<&AnswerKey> {
        self.current.as_ref().map(|c| c.validator.key())
    }

    pub fn max_length(&self) -> Option<usize> {
        self.current.as_ref().map(|c| c.validator.max_length())
    }

    /// Earliest pending reveal or validation, for hosts that sleep between
    /// events instead of ticking.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.reveal.due_at(), self.debounce.due_at()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b)             => a.or(b),
        }
    }
}
