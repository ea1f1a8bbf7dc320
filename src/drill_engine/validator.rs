//! Answer acceptance.
//!
//! Text answers match after removing all whitespace and upper-casing.
//! Numeric answers accept a comma as decimal separator and match when the
//! input, rounded half-up to the configured decimals, equals the rounded
//! target.

use serde::{Deserialize, Serialize};

use crate::drill_engine::{
    evaluator::{evaluate_in, format_number, EvaluationOrder},
    models::{QuestionRecord, Validation, ValidationKind},
};

const DEFAULT_DECIMALS: u32 = 1;
const MAX_DECIMALS: u32 = 15;
const NUMERIC_MIN_WIDTH: usize = 6;
const TOLERANCE: f64 = 1e-9;

/// `Math.round`-style rounding at `decimals` places: ties go up.
pub fn round_half_up(value: f64, decimals: u32) -> f64 {
    // f64 carries no more than 15 significant decimals.
    let m = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    (value * m + 0.5).floor() / m
}

/// Drop every whitespace character and upper-case the rest.
pub fn normalize_text(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).flat_map(char::to_uppercase).collect()
}

/// Parse the longest decimal prefix of `text`, ignoring leading
/// whitespace. `"2.5 bb"` parses as 2.5; `"bb"` does not parse.
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Strict parse of learner input: whole string, comma or dot decimal.
fn parse_user_number(value: &str) -> Option<f64> {
    let normalized = value.replacen(',', ".", 1);
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Answer keys
// ---------------------------------------------------------------------------

/// What counts as correct for one presented question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerKey {
    /// The answer shown as "the" answer; also drives input sizing.
    pub canonical: String,
    pub accepted: Vec<String>,
    pub validation: Option<Validation>,
}

impl AnswerKey {
    /// Key for a generated or fact expression.
    ///
    /// By default the canonical answer is the evaluated value's text and
    /// matching is textual. With `decimals`, matching is numeric against the
    /// exact value and the canonical text is rounded.
    pub fn for_expression(expr: &str, order: EvaluationOrder, decimals: Option<u32>) -> Self {
        let value = evaluate_in(order, expr);
        match (value, decimals) {
            (Some(v), Some(d)) => {
                let canonical = format_number(round_half_up(v, d));
                AnswerKey {
                    accepted: vec![canonical.clone()],
                    canonical,
                    validation: Some(Validation::numeric(d, Some(v))),
                }
            }
            _ => {
                let canonical = value.map(format_number).unwrap_or_else(|| "NaN".to_string());
                AnswerKey { accepted: vec![canonical.clone()], canonical, validation: None }
            }
        }
    }

    pub fn for_record(record: &QuestionRecord) -> Self {
        if let Some(first) = record.accept.first() {
            AnswerKey {
                canonical: first.clone(),
                accepted: record.accept.clone(),
                validation: record.validation.clone(),
            }
        } else {
            AnswerKey {
                canonical: record.answer.clone(),
                accepted: vec![record.answer.clone()],
                validation: record.validation.clone(),
            }
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(&self.validation, Some(v) if v.kind == ValidationKind::Numeric)
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Outcome of one input change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCheck {
    /// Input was longer than allowed; the host should replace it with this
    /// value. No validation is scheduled for this change.
    Truncated(String),
    /// Input has a plausible length; judge this (trimmed) value once the
    /// debounce settles.
    Ready(String),
    /// Keep waiting for more input.
    Pending,
}

#[derive(Debug, Clone)]
pub struct Validator {
    key: AnswerKey,
    lengths: Vec<usize>,
    max_length: usize,
    normalized: Vec<String>,
    target: Option<f64>,
    decimals: u32,
    min_length: usize,
}

impl Validator {
    pub fn new(key: AnswerKey) -> Self {
        let answers: Vec<&String> = if key.accepted.is_empty() {
            vec![&key.canonical]
        } else {
            key.accepted.iter().collect()
        };

        let mut lengths: Vec<usize> = answers.iter().map(|a| a.chars().count()).filter(|&n| n > 0).collect();
        if lengths.is_empty() {
            lengths.push(key.canonical.chars().count().max(1));
        }

        let widest = lengths.iter().copied().max().unwrap_or(1).max(1);
        let numeric = key.is_numeric();
        let validation = key.validation.clone().unwrap_or_default();
        let max_length = if numeric {
            validation.max_length.unwrap_or(widest.max(NUMERIC_MIN_WIDTH)).max(1)
        } else {
            validation.max_length.map_or(widest, |n| n.max(1))
        };

        let decimals = validation.decimals.unwrap_or(DEFAULT_DECIMALS);
        let (normalized, target, min_length) = if numeric {
            let raw_target = validation
                .target
                .filter(|t| t.is_finite())
                .or_else(|| parse_float_prefix(&key.canonical.replacen(',', ".", 1)));
            let min_length = validation
                .min_length
                .unwrap_or_else(|| normalize_text(&key.canonical).chars().count())
                .max(1);
            (Vec::new(), raw_target.map(|t| round_half_up(t, decimals)), min_length)
        } else {
            (answers.iter().map(|a| normalize_text(a)).collect(), None, 1)
        };

        Validator { key, lengths, max_length, normalized, target, decimals, min_length }
    }

    pub fn key(&self) -> &AnswerKey {
        &self.key
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Rounded numeric target, when this is a numeric question with one.
    pub fn target(&self) -> Option<f64> {
        self.target
    }

    /// Classify the current raw input.
    pub fn check(&self, raw: &str) -> InputCheck {
        let value = raw.trim();
        if value.chars().count() > self.max_length {
            return InputCheck::Truncated(value.chars().take(self.max_length).collect());
        }
        if self.is_ready(value) {
            InputCheck::Ready(value.to_string())
        } else {
            InputCheck::Pending
        }
    }

    /// Numeric input is ready once it reaches the minimum length; text
    /// input when its length equals that of some accepted answer.
    pub fn is_ready(&self, value: &str) -> bool {
        if self.key.is_numeric() {
            value.chars().filter(|c| !c.is_whitespace()).count() >= self.min_length
        } else {
            self.lengths.contains(&value.chars().count())
        }
    }

    pub fn judge(&self, value: &str) -> bool {
        if self.key.is_numeric() {
            let Some(target) = self.target else { return false };
            match parse_user_number(value) {
                Some(parsed) => (round_half_up(parsed, self.decimals) - target).abs() < TOLERANCE,
                None         => false,
            }
        } else {
            self.normalized.contains(&normalize_text(value))
        }
    }
}
