//! # numa_drill
//!
//! An offline, deterministic mental-arithmetic and poker-math drilling engine.
//!
//! The library builds a run of practice questions from two sources:
//! arithmetic expressions generated from operator and operand selections,
//! and pre-authored question sets (poker fast-math facts, pot odds, equity,
//! stack-to-pot ratio). It then drives a drill session over them: present,
//! wait for a settled answer, judge it, queue misses for a retry pass, and
//! report completion.
//!
//! ## How it works
//!
//! 1. Describe the run with a [`DrillConfig`] (JSON or struct literal) and
//!    load any authored datasets into a [`QuestionBank`].
//! 2. Call [`Drill::start`]. The engine generates and adapts every selected
//!    question, shuffles them into one working sequence and presents the
//!    first item.
//! 3. Feed [`SessionEvent`]s (input changes, ticks, repeat, exit) with a
//!    millisecond timestamp. Each call returns the [`SessionSignal`]s to
//!    render; [`host_adapter::to_host_state`] gives a full JSON snapshot.
//!
//! ## Key features
//!
//! - **Deterministic**: set `rng_seed` to reproduce the exact same run.
//! - **No I/O in the loop**: reveal delays, the answer debounce and the
//!   clocks are timers polled with the caller's timestamps, so sessions run
//!   the same under a UI event loop, a terminal or a test.
//! - **Two acceptance modes**: whitespace/case-insensitive text matching and
//!   numeric matching with comma decimals and half-up rounding.
//!
//! ## Quick start
//!
//! ```rust
//! use numa_drill::{Drill, DrillConfig, QuestionBank, SessionEvent, SessionSignal};
//!
//! let config = DrillConfig::from_json_str(
//!     r#"{"generation": {"selectedOps": ["×"], "selectedNums": [3], "start": 2, "end": 2},
//!         "rngSeed": 42}"#,
//! )
//! .unwrap();
//!
//! let (mut drill, update) = Drill::start(&config, &QuestionBank::new(), 0).unwrap();
//! assert!(matches!(update.signals[0], SessionSignal::Presented { .. }));
//! println!("{}", drill.session().current_prompt().unwrap_or_default()); // "3 × 2 = "
//!
//! drill.handle(SessionEvent::InputChanged { value: "6".into(), at: 1_000 });
//! let update = drill.tick(1_300);
//! assert!(update.completed());
//! ```

pub mod drill_engine;
pub mod host_adapter;

// Convenience re-exports so callers can use `numa_drill::Drill` directly
// without reaching into `drill_engine::`.
pub use drill_engine::{
    AnswerRecord, DrillConfig, Drill, DrillError, DrillUpdate, EvaluationOrder,
    FuguesSpeed, GenerationParams, Modifier, Operator, PoolSelection, Progress,
    Question, QuestionBank, QuestionRecord, Result, RetryPolicy, RunSummary,
    Session, SessionEvent, SessionOptions, SessionSignal, SessionState,
};

#[cfg(test)]
mod tests;
