//! Crate-level scenario tests for `numa_drill`.
//!
//! Included from `lib.rs` under `#[cfg(test)]`.
//!
//! # Coverage
//!
//! | Group | What is tested |
//! |-------|----------------|
//! | Generation | Every generated expression evaluates to a non-negative value; seeded runs repeat |
//! | Poker facts | `"2×2=4"` is adapted to `"2×2"` and re-evaluates to 4 |
//! | Sessions | Two-item walkthrough with one miss; truncation; fail counter monotonicity; termination |
//! | Numeric answers | Comma decimals and the half-up rounding boundary |
//! | Repeat | Fresh order, counters reset, clock restarted |
//! | End to end | JSON config + authored dataset through to completion |

use crate::drill_engine::{
    evaluator::{evaluate_expression, evaluate_in, EvaluationOrder},
    expression::ExpressionGenerator,
    models::{Operator, Question, QuestionRecord, Validation},
    pools::QuestionBank,
    validator::{AnswerKey, Validator},
};
use crate::{Drill, DrillConfig, RetryPolicy, Session, SessionEvent, SessionOptions, SessionSignal, SessionState};

// ── helpers ──────────────────────────────────────────────────────────────────

const SEEDS: [u64; 5] = [1, 42, 999, 0xDEAD_BEEF, 7];

fn exprs(items: &[&str]) -> Vec<Question> {
    items.iter().map(|e| Question::expression(*e)).collect()
}

/// Drives a session with a monotonically advancing clock.
struct Learner {
    session: Session,
    now: u64,
}

impl Learner {
    fn new(items: Vec<Question>, options: SessionOptions) -> Self {
        let (session, _) = Session::start(items, options, 0).unwrap();
        Learner { session, now: 0 }
    }

    /// Type `value` and wait out the debounce.
    fn answer(&mut self, value: &str) -> Vec<SessionSignal> {
        let mut signals = self.session.handle(SessionEvent::InputChanged { value: value.into(), at: self.now });
        self.now += self.session.options().debounce_ms;
        signals.extend(self.session.handle(SessionEvent::Tick { at: self.now }));
        self.now += 50;
        signals
    }

    fn prompt(&self) -> String {
        self.session.current_prompt().unwrap_or_default().to_string()
    }

    fn canonical(&self) -> String {
        self.session.current_key().map(|k| k.canonical.clone()).unwrap_or_default()
    }
}

fn numeric_record(answer: &str, target: f64) -> QuestionRecord {
    QuestionRecord {
        dataset: "spr-practico".into(),
        question: "SPR?".into(),
        answer: answer.into(),
        accept: vec![answer.into()],
        validation: Some(Validation::numeric(1, Some(target))),
    }
}

// ── generation ───────────────────────────────────────────────────────────────

#[test]
fn generated_expressions_never_go_negative() {
    for chain in 2..=4 {
        let generator = ExpressionGenerator::new(Operator::ALL.to_vec(), vec![0, 1, 2, 5], (0..=4).collect(), chain);
        let all = generator.generate();
        assert!(!all.is_empty(), "nothing generated for chain {chain}");
        for expr in all {
            let value = evaluate_in(EvaluationOrder::LeftToRight, &expr);
            assert!(
                matches!(value, Some(v) if v >= 0.0),
                "{expr} evaluated to {value:?}"
            );
        }
    }
}

#[test]
fn seeded_runs_repeat_exactly() {
    let config = DrillConfig::from_json_str(
        r#"{"generation": {"selectedOps": ["+", "-"], "selectedNums": [2, 7], "start": 1, "end": 4,
                           "modes": ["Random"]},
            "pokerLevels": [1, 2]}"#,
    )
    .unwrap();
    let bank = QuestionBank::new();
    for seed in SEEDS {
        let seeded = DrillConfig { rng_seed: Some(seed), ..config.clone() };
        let (a, _) = Drill::start(&seeded, &bank, 0).unwrap();
        let (b, _) = Drill::start(&seeded, &bank, 0).unwrap();
        assert_eq!(a.session().original_sequence(), b.session().original_sequence(), "seed {seed}");
    }
}

#[test]
fn evaluation_is_pure() {
    for expr in ["2+3×4", "10÷4-1", "7÷0", "1.5+1.5"] {
        assert_eq!(evaluate_expression(expr), evaluate_expression(expr));
    }
}

// ── poker facts ──────────────────────────────────────────────────────────────

#[test]
fn poker_fact_round_trip() {
    let bank = QuestionBank::new();
    let facts = bank.poker_facts.expressions(&[Operator::Mul], &[1]);
    assert!(facts.iter().any(|f| f == "2×2"));
    assert!(facts.iter().all(|f| !f.contains('=')));
    assert_eq!(evaluate_expression("2×2"), Some(4.0));
}

// ── sessions ─────────────────────────────────────────────────────────────────

#[test]
fn two_item_walkthrough_with_one_miss() {
    let mut learner = Learner::new(exprs(&["2+2", "3×3"]), SessionOptions::default());
    assert_eq!(learner.session.progress().answered, 0);

    let s = learner.answer("4");
    assert!(s.iter().any(|x| matches!(x, SessionSignal::Answered(r) if r.correct)));

    // "10" is longer than any answer to 3×3, so the host gets it back cut
    // short and re-submits what is left.
    let s = learner.answer("10");
    assert_eq!(s, vec![SessionSignal::InputTruncated { value: "1".into() }]);
    let s = learner.answer("1");
    assert!(s.iter().any(|x| matches!(x, SessionSignal::Answered(r) if !r.correct)));
    assert!(s.contains(&SessionSignal::PassStarted { pass: 1, items: 1 }));
    assert_eq!(learner.session.fail_count(), 1);
    assert_eq!(learner.prompt(), "3 × 3 = ");

    let s = learner.answer("9");
    assert!(s.contains(&SessionSignal::SessionComplete { fail_count: 1, total: 2 }));
    assert_eq!(learner.session.state(), SessionState::SessionComplete);
    assert_eq!(learner.session.total(), 2);
}

#[test]
fn truncated_input_is_never_judged() {
    let mut learner = Learner::new(exprs(&["4+5"]), SessionOptions::default());
    let s = learner.answer("99");
    assert_eq!(s, vec![SessionSignal::InputTruncated { value: "9".into() }]);
    assert_eq!(learner.session.state(), SessionState::AwaitingInput);
    assert_eq!(learner.session.fail_count(), 0);
}

#[test]
fn fail_count_never_decreases() {
    let items: Vec<Question> = (1..=9).map(|i| Question::expression(format!("{i}+{i}"))).collect();
    let options = SessionOptions { rng_seed: Some(4), ..SessionOptions::default() };
    let mut learner = Learner::new(items, options);
    let mut last = 0;
    let mut toggle = false;
    while learner.session.state() != SessionState::SessionComplete {
        toggle = !toggle;
        // Canonical answers here are even, so a run of nines is always wrong
        // and always the right length to be judged.
        let canonical = learner.canonical();
        let value = if toggle { canonical } else { "9".repeat(canonical.len()) };
        learner.answer(&value);
        assert!(learner.session.fail_count() >= last);
        last = learner.session.fail_count();
    }
    assert!(last > 0);
}

#[test]
fn single_retry_ends_after_two_passes() {
    let items: Vec<Question> = (1..=6).map(|i| Question::expression(format!("{i}×1"))).collect();
    let options = SessionOptions { retry_policy: RetryPolicy::SingleRetry, ..SessionOptions::default() };
    let mut learner = Learner::new(items, options);
    let mut answers = 0;
    while learner.session.state() != SessionState::SessionComplete {
        learner.answer("0");
        answers += 1;
        assert!(answers <= 12);
    }
    assert_eq!(answers, 12);
    assert_eq!(learner.session.fail_count(), 6);
}

#[test]
fn default_policy_terminates_once_everything_is_right() {
    let mut learner = Learner::new(exprs(&["6÷2", "7-3", "5+0"]), SessionOptions::default());
    // Each item is missed twice before it is answered.
    let mut misses = std::collections::HashMap::new();
    let mut answers = 0;
    while learner.session.state() != SessionState::SessionComplete {
        let prompt = learner.prompt();
        let count = misses.entry(prompt).or_insert(0);
        if *count < 2 {
            *count += 1;
            learner.answer("0");
        } else {
            let canonical = learner.canonical();
            learner.answer(&canonical);
        }
        answers += 1;
        assert!(answers < 50, "session did not terminate");
    }
    assert_eq!(learner.session.fail_count(), 6);
    assert_eq!(learner.session.pass(), 2);
}

// ── numeric answers ──────────────────────────────────────────────────────────

#[test]
fn numeric_answers_round_half_up() {
    let validator = Validator::new(AnswerKey::for_record(&numeric_record("2.4", 2.4)));
    assert!(validator.judge("2,4"));
    assert!(validator.judge("2.35"));
    assert!(validator.judge("2.39"));
    assert!(!validator.judge("2.45"));
    assert!(!validator.judge("2.34"));
    assert!(!validator.judge("two"));
}

#[test]
fn numeric_question_in_session() {
    let items = vec![Question::Record(numeric_record("2,4", 2.4))];
    let mut learner = Learner::new(items, SessionOptions::default());
    // Too short to be ready yet.
    assert!(learner.answer("2").iter().all(|s| !matches!(s, SessionSignal::Answered(_))));
    let s = learner.answer("2,4");
    assert!(s.contains(&SessionSignal::SessionComplete { fail_count: 0, total: 1 }));
}

// ── repeat ───────────────────────────────────────────────────────────────────

#[test]
fn repeat_after_completion_starts_fresh() {
    let items: Vec<Question> = (1..=10).map(|i| Question::expression(format!("{i}+1"))).collect();
    let options = SessionOptions { rng_seed: Some(21), ..SessionOptions::default() };
    let mut learner = Learner::new(items, options);
    let first_prompts: Vec<String> = {
        let mut prompts = Vec::new();
        while learner.session.state() != SessionState::SessionComplete {
            prompts.push(learner.prompt());
            let canonical = learner.canonical();
            learner.answer(&canonical);
        }
        prompts
    };

    let s = learner.session.handle(SessionEvent::Repeat { at: learner.now });
    assert_eq!(s[0], SessionSignal::Restarted { total: 10 });
    assert_eq!(learner.session.fail_count(), 0);

    let mut second_prompts = Vec::new();
    while learner.session.state() != SessionState::SessionComplete {
        second_prompts.push(learner.prompt());
        let canonical = learner.canonical();
        learner.answer(&canonical);
    }
    assert_eq!(first_prompts.len(), second_prompts.len());
    assert_ne!(first_prompts, second_prompts);
}

// ── end to end ───────────────────────────────────────────────────────────────

#[test]
fn pot_odds_dataset_end_to_end() {
    let mut bank = QuestionBank::new();
    let loaded = bank.load_pot_odds(
        r#"{"potOddsOps": [
            {"outs": 9, "street": "flop_turn", "domain": "raw_percent", "question": "9 outs flop→turn %?", "answer": "19%"},
            {"outs": 9, "street": "turn_river", "domain": "raw_odds", "question": "9 outs turn→river odds?", "answer": "4:1"}
        ]}"#,
    );
    assert_eq!(loaded, 2);

    let config = DrillConfig::from_json_str(
        r#"{"potOdds": {"outs": [9], "domains": ["raw_percent"], "streets": ["flop_turn"]},
            "rngSeed": 8}"#,
    )
    .unwrap();
    let (mut drill, update) = Drill::start(&config, &bank, 0).unwrap();
    assert_eq!(drill.summary().records, 1);
    assert!(matches!(
        &update.signals[0],
        SessionSignal::Presented { prompt, max_length: 3, .. } if prompt == "9 outs flop→turn %? "
    ));

    drill.handle(SessionEvent::InputChanged { value: " 19% ".into(), at: 500 });
    let update = drill.tick(800);
    assert!(update.completed());
    assert_eq!(drill.session().fail_count(), 0);
}

#[test]
fn exit_is_final() {
    let mut learner = Learner::new(exprs(&["1+1", "2+2"]), SessionOptions::default());
    learner.session.handle(SessionEvent::InputChanged { value: "2".into(), at: 0 });
    assert_eq!(learner.session.handle(SessionEvent::Exit), vec![SessionSignal::ExitRequested]);
    assert!(learner.session.handle(SessionEvent::Tick { at: 10_000 }).is_empty());
    assert_eq!(learner.session.state(), SessionState::Exited);
}
