//! Built-in poker fast-math facts.
//!
//! Facts are authored as `lhs=result`; only the left-hand side becomes a
//! question. The evaluator re-derives the answer.

use serde::{Deserialize, Serialize};
use crate::drill_engine::models::Operator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FactLevel {
    Basic,
    Med,
    High,
    Advance,
}

impl FactLevel {
    pub const ALL: [FactLevel; 4] = [FactLevel::Basic, FactLevel::Med, FactLevel::High, FactLevel::Advance];

    /// Levels are numbered 1-4 on the configuration surface.
    pub fn from_number(level: u8) -> Option<FactLevel> {
        match level {
            1 => Some(FactLevel::Basic),
            2 => Some(FactLevel::Med),
            3 => Some(FactLevel::High),
            4 => Some(FactLevel::Advance),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

/// Authored facts for one level and operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactGroup {
    pub level: FactLevel,
    pub op: Operator,
    pub facts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokerFactTable {
    groups: Vec<FactGroup>,
}

impl PokerFactTable {
    pub fn new(groups: Vec<FactGroup>) -> Self {
        PokerFactTable { groups }
    }

    pub fn builtin() -> Self {
        let groups = BUILTIN
            .iter()
            .map(|(level, op, facts)| FactGroup {
                level: *level,
                op: *op,
                facts: facts.iter().map(|f| f.to_string()).collect(),
            })
            .collect();
        PokerFactTable { groups }
    }

    pub fn groups(&self) -> &[FactGroup] {
        &self.groups
    }

    pub fn facts(&self, level: FactLevel, op: Operator) -> &[String] {
        self.groups
            .iter()
            .find(|g| g.level == level && g.op == op)
            .map(|g| g.facts.as_slice())
            .unwrap_or(&[])
    }

    /// Left-hand expressions for the selected levels and operators, level
    /// order first, then operator order, both as selected. Unknown level
    /// numbers are skipped.
    pub fn expressions(&self, ops: &[Operator], levels: &[u8]) -> Vec<String> {
        let mut out = Vec::new();
        for level in levels.iter().filter_map(|n| FactLevel::from_number(*n)) {
            for op in ops {
                out.extend(self.facts(level, *op).iter().map(|f| strip_result(f).to_string()));
            }
        }
        out
    }
}

impl Default for PokerFactTable {
    fn default() -> Self {
        PokerFactTable::builtin()
    }
}

/// Text before the first `=`, trimmed.
pub fn strip_result(fact: &str) -> &str {
    fact.split('=').next().unwrap_or(fact).trim()
}

/// Authored right-hand side, if any.
pub fn authored_result(fact: &str) -> Option<f64> {
    fact.split_once('=').and_then(|(_, rhs)| rhs.trim().parse().ok())
}

use FactLevel::*;
use Operator::{Add, Div, Mul, Sub};

const BUILTIN: &[(FactLevel, Operator, &[&str])] = &[
    (Basic, Mul, &["2×2=4", "2×3=6", "2×4=8", "2×5=10", "3×2=6", "3×3=9", "4×3=12", "5×2=10", "5×3=15", "5×4=20", "6×2=12", "6×3=18", "10×10=100"]),
    (Basic, Add, &["1.5+1.5=3", "2+2.5=4.5", "2.5+2.5=5", "3+3=6", "5+5=10", "6+6=12", "10+15=25", "25+25=50"]),
    (Basic, Sub, &["10-2.5=7.5", "15-5=10", "25-15=10", "50-25=25"]),
    (Basic, Div, &["2÷2=1", "4÷2=2", "6÷2=3", "10÷2=5", "10÷5=2", "20÷4=5", "60÷10=6", "100÷10=10"]),

    (Med, Mul, &["2×1.5=3", "2×2.5=5", "3×1.5=4.5", "3×2.5=7.5", "4×2.5=10", "4×3.5=14", "5×2=10", "6×1.5=9", "7.5×2=15", "10×1.5=15", "1.25×4=5", "1.25×8=10", "1.5×10=15"]),
    (Med, Add, &["1+1.5=2.5", "2.5+1.5=4", "2.5+3=5.5", "3.5+1.5=5", "4.5+1.5=6", "4.5+4.5=9", "7.5+7.5=15"]),
    (Med, Sub, &["7.5-2.5=5", "10-1.5=8.5", "20-7.5=12.5", "25-7.5=17.5", "30-7.5=22.5", "50-15=35"]),
    (Med, Div, &["1÷2=0.5", "1÷4=0.25", "1÷5=0.2", "2÷1.5=1.33", "3÷1.25=2.4", "3÷4=0.75", "4÷4=1", "5÷1.5=3.33", "5÷5=1", "6÷3=2"]),

    (High, Mul, &["2.5×2=5", "2.5×3=7.5", "2.5×4=10", "2.5×6=15", "2.5×10=25", "3.5×2=7", "3.5×3=10.5", "3.5×4=14", "4.5×2=9", "4.5×3=13.5", "4.5×4=18"]),
    (High, Add, &["3+4.5=7.5", "12.5+25=37.5", "25+50=75", "75+75=150"]),
    (High, Sub, &["10-1.25=8.75", "10-1.75=8.25", "25-12.5=12.5", "30-12.5=17.5", "100-75=25"]),
    (High, Div, &["1÷3=0.33", "1÷1.25=0.8", "1÷1.75=0.57", "1÷2.25=0.44", "2÷1.75=1.14", "2.5÷1.25=2", "3.5÷1.25=2.8", "4.5÷1.5=3", "7.5÷2.5=3", "10÷3=3.33", "15÷2.5=6", "27÷18.5=1.46"]),

    (Advance, Mul, &["1.25×6=7.5", "1.25×12=15", "1.5×12=18", "1.5×15=22.5", "1.5×20=30", "1.75×4=7", "1.75×6=10.5", "1.75×8=14", "1.75×10=17.5", "2.25×4=9", "2.25×6=13.5", "2.25×10=22.5", "2.75×6=16.5", "2.75×10=27.5"]),
    (Advance, Add, &["7.5+10=17.5", "15+15=30"]),
    (Advance, Sub, &["100-37.5=62.5"]),
    (Advance, Div, &["3÷7=0.43", "4÷1.75=2.29", "5÷6=0.83", "6÷2.5=2.4", "9÷4.5=2", "10÷2.5=4", "15÷1.5=10", "20÷5=4", "25÷5.5=4.54", "30÷6=5", "30÷7.5=4", "35÷8.5=4.11", "40÷9.5=4.21", "45÷12.5=3.6", "70÷10=7", "75÷7.5=10", "80÷10=8", "100÷8=12.5"]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drill_engine::evaluator::evaluate_expression;

    #[test]
    fn strips_authored_result() {
        assert_eq!(strip_result("2×2=4"), "2×2");
        assert_eq!(strip_result(" 10-2.5 = 7.5"), "10-2.5");
        assert_eq!(strip_result("7+1"), "7+1");
    }

    #[test]
    fn expressions_follow_selection_order() {
        let table = PokerFactTable::builtin();
        let out = table.expressions(&[Operator::Sub, Operator::Add], &[4, 1]);
        assert_eq!(out[0], "100-37.5");
        assert_eq!(&out[1..3], &["7.5+10", "15+15"]);
        assert_eq!(out[3], "10-2.5");
        assert_eq!(out.len(), 1 + 2 + 4 + 8);
    }

    #[test]
    fn empty_selection_dimensions_yield_nothing() {
        let table = PokerFactTable::builtin();
        assert!(table.expressions(&[], &[1, 2]).is_empty());
        assert!(table.expressions(&[Operator::Mul], &[]).is_empty());
        assert!(table.expressions(&[Operator::Mul], &[9]).is_empty());
    }

    #[test]
    fn recomputed_values_agree_with_authored_results() {
        // Authored division results are truncated to two decimals, so the
        // recomputed value is only required to agree to within a hundredth.
        for group in PokerFactTable::builtin().groups() {
            for fact in &group.facts {
                let authored = authored_result(fact).expect("authored result");
                let value = evaluate_expression(strip_result(fact)).expect("defined fact");
                assert!((value - authored).abs() < 0.01, "{fact}: recomputed {value}");
                if (value * 100.0).fract() == 0.0 {
                    assert_eq!(value, authored, "{fact}");
                }
            }
        }
    }

    #[test]
    fn level_numbers_round_trip() {
        for level in FactLevel::ALL {
            assert_eq!(FactLevel::from_number(level.number()), Some(level));
        }
    }
}
