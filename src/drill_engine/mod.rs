//! Core drill engine: expression generation, question pools, sessions and
//! answer checking.
//!
//! ## Module overview
//!
//! | Module         | Purpose |
//! |----------------|---------|
//! | `models`       | Shared types: operators, modifiers, questions, generation parameters |
//! | `evaluator`    | Binary operation semantics and whole-expression evaluation |
//! | `expression`   | Lazy chained-expression generator with the inversion fallback |
//! | `pools`        | Poker facts and the authored datasets, normalised into questions |
//! | `combiner`     | Merge generated and authored questions into one shuffled sequence |
//! | `presentation` | Random / Surges ordering, Mirror, prompt text |
//! | `validator`    | Text and numeric acceptance, readiness, truncation |
//! | `timer`        | Cancellable one-shot timers on a caller-supplied clock |
//! | `session`      | The pass / retry state machine |
//! | `clock`        | Chronometer and countdown |
//! | `drill`        | Build a run from a configuration and drive it |
//! | `config`       | JSON configuration with defaults |
//! | `error`        | `DrillError` and the crate `Result` |

pub mod clock;
pub mod combiner;
pub mod config;
pub mod drill;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod helpers;
pub mod models;
pub mod pools;
pub mod presentation;
pub mod session;
pub mod timer;
pub mod validator;

// Re-export the public API surface so callers can use
// `drill_engine::Drill` without reaching into sub-modules.
pub use clock::{ClockEvent, SessionClock};
pub use config::DrillConfig;
pub use drill::{build_working_sequence, Drill, DrillUpdate, RunSummary};
pub use error::{DrillError, Result};
pub use evaluator::{evaluate, evaluate_expression, EvaluationOrder};
pub use expression::ExpressionGenerator;
pub use models::{
    FuguesSpeed, GenerationParams, ModeSet, Modifier, Operator, Question,
    QuestionRecord, Validation, ValidationKind,
};
pub use pools::{PoolSelection, QuestionBank};
pub use session::{
    AnswerRecord, HistoryEntry, Progress, RetryPolicy, Session, SessionEvent,
    SessionOptions, SessionSignal, SessionState,
};
pub use validator::{AnswerKey, InputCheck, Validator};
