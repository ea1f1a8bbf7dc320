//! Arithmetic over the four drill operators.
//!
//! Division by zero is not an error here: it yields `None`, which generators
//! treat as a dead branch.

use serde::{Deserialize, Serialize};
use crate::drill_engine::models::Operator;

/// How a whole infix expression string is reduced to a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EvaluationOrder {
    /// Strictly left to right, the way the generator accumulates values.
    #[default]
    LeftToRight,
    /// `×`/`÷` bind tighter than `+`/`-`.
    Precedence,
}

/// Apply one operator. `None` means undefined (division by zero).
pub fn evaluate(a: f64, op: Operator, b: f64) -> Option<f64> {
    match op {
        Operator::Add => Some(a + b),
        Operator::Sub => Some(a - b),
        Operator::Mul => Some(a * b),
        Operator::Div => if b == 0.0 { None } else { Some(a / b) },
    }
}

/// Split an infix expression into operands and operators.
///
/// Whitespace around tokens is ignored. Returns `None` for empty operands
/// (e.g. a leading `-`) or anything that is not a decimal number.
pub fn tokenize(expr: &str) -> Option<(Vec<f64>, Vec<Operator>)> {
    let mut operands = Vec::new();
    let mut operators = Vec::new();
    let mut current = String::new();

    for c in expr.chars() {
        match Operator::from_symbol(c) {
            Some(op) => {
                operands.push(parse_operand(&current)?);
                operators.push(op);
                current.clear();
            }
            None => current.push(c),
        }
    }
    operands.push(parse_operand(&current)?);
    Some((operands, operators))
}

fn parse_operand(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Evaluate an expression left to right with no operator precedence.
pub fn evaluate_expression(expr: &str) -> Option<f64> {
    let (operands, operators) = tokenize(expr)?;
    let mut value = operands[0];
    for (op, next) in operators.iter().zip(&operands[1..]) {
        value = evaluate(value, *op, *next)?;
    }
    Some(value)
}

/// Evaluate an expression with conventional precedence.
pub fn evaluate_with_precedence(expr: &str) -> Option<f64> {
    let (operands, operators) = tokenize(expr)?;

    // Collapse ×/÷ runs first, keeping +/- for the second pass.
    let mut terms = vec![operands[0]];
    let mut additive = Vec::new();
    for (op, next) in operators.iter().zip(&operands[1..]) {
        match op {
            Operator::Mul | Operator::Div => {
                let last = terms.pop()?;
                terms.push(evaluate(last, *op, *next)?);
            }
            Operator::Add | Operator::Sub => {
                additive.push(*op);
                terms.push(*next);
            }
        }
    }

    let mut value = terms[0];
    for (op, next) in additive.iter().zip(&terms[1..]) {
        value = evaluate(value, *op, *next)?;
    }
    Some(value)
}

pub fn evaluate_in(order: EvaluationOrder, expr: &str) -> Option<f64> {
    match order {
        EvaluationOrder::LeftToRight => evaluate_expression(expr),
        EvaluationOrder::Precedence  => evaluate_with_precedence(expr),
    }
}

/// Shortest decimal text that reads back as the same value.
///
/// Integral values print without a fractional part (`4`, not `4.0`), and
/// negative zero prints as `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    format!("{}", value)
}
