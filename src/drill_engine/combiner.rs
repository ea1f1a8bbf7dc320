//! Merges generated expressions with fixed-pool records into one shuffled
//! run sequence.

use rand::Rng;
use crate::drill_engine::{helpers::shuffle, models::Question};

/// Concatenate then shuffle the whole list, whatever the modifiers say.
///
/// Random and Surges ordering is applied later, at session start.
pub fn combine<R: Rng>(expressions: Vec<String>, records: Vec<Question>, rng: &mut R) -> Vec<Question> {
    let mut combined: Vec<Question> = expressions
        .into_iter()
        .map(Question::Expression)
        .chain(records)
        .collect();
    shuffle(&mut combined, rng);
    tracing::debug!(count = combined.len(), "combined run sequence");
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drill_engine::{helpers::make_rng, models::QuestionRecord};

    fn record(q: &str) -> Question {
        Question::Record(QuestionRecord { question: q.into(), answer: "x".into(), ..Default::default() })
    }

    #[test]
    fn keeps_every_item() {
        let mut rng = make_rng(Some(3));
        let exprs: Vec<String> = (1..=20).map(|i| format!("{i}+1")).collect();
        let out = combine(exprs.clone(), vec![record("a"), record("b")], &mut rng);
        assert_eq!(out.len(), 22);
        for e in &exprs {
            assert!(out.contains(&Question::expression(e.as_str())));
        }
        assert!(out.contains(&record("a")));
    }

    #[test]
    fn shuffles_records_in_with_expressions() {
        let mut rng = make_rng(Some(11));
        let exprs: Vec<String> = (1..=30).map(|i| format!("{i}×2")).collect();
        let records: Vec<Question> = (0..10).map(|i| record(&format!("q{i}"))).collect();
        let out = combine(exprs, records, &mut rng);
        // Unshuffled, every record would sit in the last ten slots.
        assert!(out[..30].iter().any(|q| !q.is_expression()));
    }

    #[test]
    fn empty_inputs_stay_empty() {
        let mut rng = make_rng(Some(1));
        assert!(combine(Vec::new(), Vec::new(), &mut rng).is_empty());
    }
}
