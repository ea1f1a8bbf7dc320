//! How questions are ordered and rendered for the learner.

use rand::Rng;

use crate::drill_engine::{
    evaluator::evaluate,
    helpers::shuffle,
    models::{ModeSet, Modifier, Operator, Question},
    pools::pot_odds::with_trailing_space,
};

/// Split an expression into its operand texts and operators, keeping the
/// operand text as written.
fn split_expression(expr: &str) -> (Vec<&str>, Vec<Operator>) {
    let mut operands = Vec::new();
    let mut operators = Vec::new();
    let mut start = 0;
    for (i, c) in expr.char_indices() {
        if let Some(op) = Operator::from_symbol(c) {
            operands.push(&expr[start..i]);
            operators.push(op);
            start = i + c.len_utf8();
        }
    }
    operands.push(&expr[start..]);
    (operands, operators)
}

/// Render an expression right to left: operands reversed, operators
/// reversed, then interleaved again. `2+3×4` becomes `4×3+2`.
pub fn mirror(expr: &str) -> String {
    let (mut operands, mut operators) = split_expression(expr);
    operands.reverse();
    operators.reverse();

    let mut out = String::with_capacity(expr.len());
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            out.push(operators[i - 1].symbol());
        }
        out.push_str(operand);
    }
    out
}

/// Sum of the absolute first operand and every absolute intermediate
/// left-to-right value, stopping at the first undefined step.
///
/// Unparseable expressions sort last.
pub fn complexity(expr: &str) -> f64 {
    let (operands, operators) = split_expression(expr);
    let parse = |s: &str| s.trim().parse::<f64>().ok();

    let Some(mut value) = operands.first().copied().and_then(parse) else {
        return f64::INFINITY;
    };
    let mut total = value.abs();
    for (op, text) in operators.iter().zip(&operands[1..]) {
        let Some(next) = parse(*text) else { break };
        match evaluate(value, *op, next) {
            Some(v) => {
                value = v;
                total += v.abs();
            }
            None => break,
        }
    }
    total
}

/// Apply the ordering modifiers once, at session start.
///
/// Random shuffles the whole list. Surges then reorders the expression
/// strings by ascending complexity (stable) while record questions keep
/// their positions.
pub fn order_for_presentation<R: Rng>(items: &mut Vec<Question>, modes: &ModeSet, rng: &mut R) {
    if modes.contains(&Modifier::Random) {
        shuffle(items, rng);
    }
    if modes.contains(&Modifier::Surges) {
        let mut expressions: Vec<(f64, String)> = items
            .iter()
            .filter_map(Question::as_expression)
            .map(|e| (complexity(e), e.to_string()))
            .collect();
        expressions.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut sorted = expressions.into_iter().map(|(_, e)| e);
        for item in items.iter_mut() {
            if item.is_expression() {
                if let Some(next) = sorted.next() {
                    *item = Question::Expression(next);
                }
            }
        }
    }
}

/// `2+3` is shown as `2 + 3 = `.
pub fn expression_prompt(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len() * 2 + 3);
    for c in expr.chars() {
        if Operator::from_symbol(c).is_some() {
            out.push(' ');
            out.push(c);
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out.push_str(" = ");
    out
}

pub fn record_prompt(question: &str) -> String {
    with_trailing_space(question)
}
