//! Chained arithmetic expression generation.
//!
//! Every value of the primary pool seeds a chain. Each extension appends an
//! operator and an operand, drawing operands from the secondary pool (the
//! configured range) at odd depths and from the primary pool at even depths.
//!
//! Branch policy at each extension:
//! - defined, non-negative running value: keep extending;
//! - otherwise, for `-` and `÷` only, try `operand op running`; if that is
//!   defined and non-negative it is emitted immediately as a shorter
//!   expression and the branch stops there;
//! - otherwise the branch is pruned.
//!
//! Generation is a lazy walk over an explicit stack, so callers can stop
//! early with `take` and restart by calling [`ExpressionGenerator::iter`]
//! again.

use rand::Rng;
use crate::drill_engine::{
    evaluator::{evaluate, format_number},
    models::{GenerationParams, Modifier, Operator},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionGenerator {
    ops: Vec<Operator>,
    primary: Vec<i64>,
    secondary: Vec<i64>,
    chain: usize,
}

impl ExpressionGenerator {
    pub fn new(ops: Vec<Operator>, primary: Vec<i64>, secondary: Vec<i64>, chain: usize) -> Self {
        ExpressionGenerator { ops, primary, secondary, chain: chain.max(2) }
    }

    /// Build a generator from run parameters, applying Cipher when active.
    pub fn from_params<R: Rng>(params: &GenerationParams, rng: &mut R) -> Self {
        let mut generator = ExpressionGenerator::new(
            params.selected_ops.clone(),
            params.selected_nums.clone(),
            params.range(),
            params.chain,
        );
        if params.has_mode(Modifier::Cipher) {
            generator.apply_cipher(rng);
        }
        generator
    }

    /// Replace every pool value with a random 2- or 3-digit number,
    /// keeping pool sizes.
    pub fn apply_cipher<R: Rng>(&mut self, rng: &mut R) {
        for value in self.primary.iter_mut().chain(self.secondary.iter_mut()) {
            *value = cipher_operand(rng);
        }
    }

    pub fn primary(&self) -> &[i64] {
        &self.primary
    }

    pub fn secondary(&self) -> &[i64] {
        &self.secondary
    }

    pub fn chain(&self) -> usize {
        self.chain
    }

    fn pool_for(&self, depth: usize) -> &[i64] {
        if depth % 2 == 0 { &self.primary } else { &self.secondary }
    }

    pub fn iter(&self) -> Expressions<'_> {
        Expressions { generator: self, next_root: 0, stack: Vec::new() }
    }

    /// Collect every expression in generation order.
    pub fn generate(&self) -> Vec<String> {
        let expressions: Vec<String> = self.iter().collect();
        tracing::debug!(
            count = expressions.len(),
            chain = self.chain,
            ops = self.ops.len(),
            "generated expressions"
        );
        expressions
    }
}

/// Uniform digit count (2 or 3), then a uniform value with that many digits.
fn cipher_operand<R: Rng>(rng: &mut R) -> i64 {
    if rng.gen_bool(0.5) {
        rng.gen_range(10..=99)
    } else {
        rng.gen_range(100..=999)
    }
}

#[derive(Debug)]
struct Frame {
    depth: usize,
    value: f64,
    text: String,
    op_idx: usize,
    operand_idx: usize,
}

/// Lazy iterator over generated expressions.
///
/// Order is pool-major, then operator-major, then operand, depth-first.
pub struct Expressions<'a> {
    generator: &'a ExpressionGenerator,
    next_root: usize,
    stack: Vec<Frame>,
}

impl Iterator for Expressions<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let generator = self.generator;
        loop {
            if self.stack.is_empty() {
                let first = *generator.primary.get(self.next_root)?;
                self.next_root += 1;
                self.stack.push(Frame {
                    depth: 0,
                    value: first as f64,
                    text: first.to_string(),
                    op_idx: 0,
                    operand_idx: 0,
                });
                continue;
            }

            let frame = self.stack.last_mut()?;
            if frame.depth + 1 >= generator.chain {
                return self.stack.pop().map(|done| done.text);
            }

            let operands = generator.pool_for(frame.depth + 1);
            if frame.op_idx >= generator.ops.len() || operands.is_empty() {
                self.stack.pop();
                continue;
            }

            let op = generator.ops[frame.op_idx];
            let operand = operands[frame.operand_idx];
            let (depth, running) = (frame.depth, frame.value);
            let extended = format!("{}{}{}", frame.text, op, operand);

            frame.operand_idx += 1;
            if frame.operand_idx >= operands.len() {
                frame.operand_idx = 0;
                frame.op_idx += 1;
            }

            match evaluate(running, op, operand as f64) {
                Some(value) if value >= 0.0 => {
                    self.stack.push(Frame {
                        depth: depth + 1,
                        value,
                        text: extended,
                        op_idx: 0,
                        operand_idx: 0,
                    });
                }
                _ if op.is_invertible() => {
                    let swapped = evaluate(operand as f64, op, running);
                    if matches!(swapped, Some(v) if v >= 0.0) {
                        return Some(format!("{}{}{}", operand, op, format_number(running)));
                    }
                }
                _ => {}
            }
        }
    }
}
