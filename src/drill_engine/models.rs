use std::collections::BTreeSet;
use std::fmt;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Operators and presentation modifiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "×", alias = "*")]
    Mul,
    #[serde(rename = "÷", alias = "/")]
    Div,
}

impl Operator {
    pub const ALL: [Operator; 4] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '×',
            Operator::Div => '÷',
        }
    }

    /// Parse an operator symbol. ASCII `*` and `/` are accepted as aliases.
    pub fn from_symbol(c: char) -> Option<Operator> {
        match c {
            '+'       => Some(Operator::Add),
            '-'       => Some(Operator::Sub),
            '×' | '*' => Some(Operator::Mul),
            '÷' | '/' => Some(Operator::Div),
            _         => None,
        }
    }

    /// Operators whose operands may be swapped to rescue a negative or
    /// undefined intermediate result.
    pub fn is_invertible(self) -> bool {
        matches!(self, Operator::Sub | Operator::Div)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Modifier {
    /// Extra shuffle of the working sequence at session start.
    Random,
    /// Operands and operators rendered right-to-left.
    Mirror,
    /// Expressions ordered by ascending complexity.
    Surges,
    /// Question shown, then hidden when the input is revealed.
    Fugues,
    /// Operand pools replaced by random 2- or 3-digit numbers.
    Cipher,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Random => write!(f, "Random"),
            Modifier::Mirror => write!(f, "Mirror"),
            Modifier::Surges => write!(f, "Surges"),
            Modifier::Fugues => write!(f, "Fugues"),
            Modifier::Cipher => write!(f, "Cipher"),
        }
    }
}

pub type ModeSet = BTreeSet<Modifier>;

/// Reveal latency table for the Fugues modifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuguesSpeed {
    #[default]
    #[serde(rename = "1H")]
    H1,
    #[serde(rename = "2H")]
    H2,
    #[serde(rename = "3H")]
    H3,
    #[serde(rename = "4H")]
    H4,
    #[serde(rename = "5H")]
    H5,
    #[serde(rename = "6H")]
    H6,
}

impl FuguesSpeed {
    pub fn latency_ms(self) -> u64 {
        match self {
            FuguesSpeed::H1 => 200,
            FuguesSpeed::H2 => 500,
            FuguesSpeed::H3 => 1_000,
            FuguesSpeed::H4 => 2_000,
            FuguesSpeed::H5 => 5_000,
            FuguesSpeed::H6 => 10_000,
        }
    }
}

impl fmt::Display for FuguesSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FuguesSpeed::H1 => "1H",
            FuguesSpeed::H2 => "2H",
            FuguesSpeed::H3 => "3H",
            FuguesSpeed::H4 => "4H",
            FuguesSpeed::H5 => "5H",
            FuguesSpeed::H6 => "6H",
        };
        write!(f, "{}", s)
    }
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationKind {
    Numeric,
    #[default]
    Text,
}

/// Per-question acceptance settings carried by record questions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    #[serde(rename = "type", default)]
    pub kind: ValidationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
}

impl Validation {
    pub fn text() -> Self {
        Validation::default()
    }

    pub fn numeric(decimals: u32, target: Option<f64>) -> Self {
        Validation {
            kind: ValidationKind::Numeric,
            decimals: Some(decimals),
            target,
            ..Validation::default()
        }
    }
}

/// A pre-authored question with its accepted answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Source dataset tag, e.g. `pot-odds` or `spr-flashcards-manos`.
    #[serde(default)]
    pub dataset: String,
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub accept: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
}

/// The atomic unit of practice.
///
/// Serialised untagged: a bare string is an infix expression, an object is a
/// record question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Question {
    Expression(String),
    Record(QuestionRecord),
}

impl Question {
    pub fn expression(expr: impl Into<String>) -> Self {
        Question::Expression(expr.into())
    }

    pub fn as_expression(&self) -> Option<&str> {
        match self {
            Question::Expression(expr) => Some(expr),
            Question::Record(_)        => None,
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, Question::Expression(_))
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Question::Expression(expr) => write!(f, "{}", expr),
            Question::Record(record)   => write!(f, "{}", record.question),
        }
    }
}

// ---------------------------------------------------------------------------
// Expression generation parameters
// ---------------------------------------------------------------------------

fn default_bound() -> i64 {
    1
}

fn default_chain() -> usize {
    2
}

/// Inputs to the expression generator, built fresh for each run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    #[serde(default)]
    pub selected_ops: Vec<Operator>,
    /// Primary operand pool (the "table" numbers).
    #[serde(default)]
    pub selected_nums: Vec<i64>,
    #[serde(default = "default_bound")]
    pub start: i64,
    #[serde(default = "default_bound")]
    pub end: i64,
    #[serde(default = "default_chain")]
    pub chain: usize,
    #[serde(default)]
    pub modes: ModeSet,
}

impl Default for GenerationParams {
    fn default() -> Self {
        GenerationParams {
            selected_ops: Vec::new(),
            selected_nums: Vec::new(),
            start: default_bound(),
            end: default_bound(),
            chain: default_chain(),
            modes: ModeSet::new(),
        }
    }
}

impl GenerationParams {
    /// Apply the configuration-surface clamps: bounds at least 1, `start`
    /// lowered to `end` when it overshoots, chain at least 2.
    pub fn normalized(&self) -> GenerationParams {
        let end = self.end.max(1);
        let start = self.start.max(1).min(end);
        GenerationParams {
            start,
            end,
            chain: self.chain.max(2),
            ..self.clone()
        }
    }

    /// Secondary operand pool: every integer between the bounds, inclusive.
    pub fn range(&self) -> Vec<i64> {
        let lo = self.start.min(self.end);
        let hi = self.start.max(self.end);
        (lo..=hi).collect()
    }

    pub fn has_mode(&self, modifier: Modifier) -> bool {
        self.modes.contains(&modifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_symbols_round_trip() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(Operator::from_symbol('*'), Some(Operator::Mul));
        assert_eq!(Operator::from_symbol('x'), None);
    }

    #[test]
    fn question_deserializes_untagged() {
        let items: Vec<Question> = serde_json::from_str(
            r#"["2×2", {"question": "SPR?", "answer": "2.5",
                "validation": {"type": "numeric", "decimals": 1}}]"#,
        )
        .unwrap();
        assert_eq!(items[0], Question::expression("2×2"));
        match &items[1] {
            Question::Record(r) => {
                let v = r.validation.as_ref().unwrap();
                assert_eq!(v.kind, ValidationKind::Numeric);
                assert_eq!(v.decimals, Some(1));
                assert!(r.accept.is_empty());
            }
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn normalized_params_apply_clamps() {
        let p = GenerationParams { start: 9, end: 4, chain: 0, ..GenerationParams::default() };
        let n = p.normalized();
        assert_eq!((n.start, n.end, n.chain), (4, 4, 2));

        let p = GenerationParams { start: -3, end: 0, ..GenerationParams::default() };
        let n = p.normalized();
        assert_eq!((n.start, n.end), (1, 1));
    }

    #[test]
    fn range_is_inclusive_regardless_of_bound_order() {
        let p = GenerationParams { start: 5, end: 3, ..GenerationParams::default() };
        assert_eq!(p.range(), vec![3, 4, 5]);
    }

    #[test]
    fn fugues_speed_table() {
        assert_eq!(FuguesSpeed::default().latency_ms(), 200);
        assert_eq!(FuguesSpeed::H6.latency_ms(), 10_000);
        let s: FuguesSpeed = serde_json::from_str("\"3H\"").unwrap();
        assert_eq!(s, FuguesSpeed::H3);
    }
}
