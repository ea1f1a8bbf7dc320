//! Stack-to-pot ratio drills: numeric practice and four text flashcard decks.

use std::collections::BTreeSet;
use std::fmt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::drill_engine::{
    models::{QuestionRecord, Validation},
    pools::{pot_odds::with_trailing_space, value_text},
    validator::{parse_float_prefix, round_half_up},
};

pub const PRACTICE_DATASET: &str = "spr-practico";

const PRACTICE_DECIMALS: u32 = 1;
const MIN_ANSWER_WIDTH: usize = 6;

// ---------------------------------------------------------------------------
// Practice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SprTags {
    #[serde(default)]
    pub grupo_stack: Option<String>,
    #[serde(default)]
    pub grupo_bote: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprPracticeItem {
    #[serde(rename = "pregunta", default)]
    pub question: String,
    /// Authored answer; a string in most datasets, sometimes a bare number.
    #[serde(rename = "respuesta", default)]
    pub answer: Value,
    /// Only numeric values count; anything else falls back to the answer.
    #[serde(default)]
    pub spr: Value,
    #[serde(default)]
    pub tags: SprTags,
}

impl SprPracticeItem {
    /// The `spr` field when present, otherwise the authored answer parsed
    /// with a comma accepted as decimal separator.
    pub fn target(&self) -> Option<f64> {
        self.spr.as_f64().filter(|v| v.is_finite()).or_else(|| {
            let text = value_text(&self.answer)?;
            parse_float_prefix(&text.replacen(',', ".", 1))
        })
    }

    fn to_record(&self) -> QuestionRecord {
        let target = self.target();
        let authored = match &self.answer {
            Value::String(s) => s.trim().to_string(),
            _                => String::new(),
        };
        let answer = if authored.is_empty() {
            target
                .map(|t| format!("{:.*}", PRACTICE_DECIMALS as usize, round_half_up(t, PRACTICE_DECIMALS)))
                .unwrap_or_default()
        } else {
            authored
        };
        let max_length = answer.chars().count().max(MIN_ANSWER_WIDTH);

        QuestionRecord {
            dataset: PRACTICE_DATASET.to_string(),
            question: with_trailing_space(&self.question),
            accept: if answer.is_empty() { Vec::new() } else { vec![answer.clone()] },
            answer,
            validation: Some(Validation {
                max_length: Some(max_length),
                ..Validation::numeric(PRACTICE_DECIMALS, target)
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprPracticeSelection {
    #[serde(default)]
    pub stacks: BTreeSet<String>,
    #[serde(default)]
    pub pots: BTreeSet<String>,
}

impl SprPracticeSelection {
    pub fn normalize(&mut self) {
        if self.stacks.is_empty() {
            self.pots.clear();
        }
    }
}

pub fn select_practice(items: &[SprPracticeItem], selection: &SprPracticeSelection) -> Vec<QuestionRecord> {
    if selection.stacks.is_empty() || selection.pots.is_empty() {
        return Vec::new();
    }
    items
        .iter()
        .filter(|item| {
            let stack = item.tags.grupo_stack.as_ref().is_some_and(|s| selection.stacks.contains(s));
            let pot = item.tags.grupo_bote.as_ref().is_some_and(|p| selection.pots.contains(p));
            stack && pot
        })
        .map(SprPracticeItem::to_record)
        .collect()
}

// ---------------------------------------------------------------------------
// Flashcards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashcardDeck {
    Interpretacion,
    Ejemplos,
    Manos,
    Teoria,
}

impl FlashcardDeck {
    pub const ALL: [FlashcardDeck; 4] = [
        FlashcardDeck::Interpretacion,
        FlashcardDeck::Ejemplos,
        FlashcardDeck::Manos,
        FlashcardDeck::Teoria,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FlashcardDeck::Interpretacion => "interpretacion",
            FlashcardDeck::Ejemplos       => "ejemplos",
            FlashcardDeck::Manos          => "manos",
            FlashcardDeck::Teoria         => "teoria",
        }
    }

    pub fn dataset(self) -> String {
        format!("spr-flashcards-{}", self.key())
    }
}

impl fmt::Display for FlashcardDeck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashcardItem {
    #[serde(rename = "pregunta", default)]
    pub question: String,
    #[serde(rename = "respuesta", default)]
    pub answer: String,
}

pub fn select_flashcards(deck: FlashcardDeck, items: &[FlashcardItem]) -> Vec<QuestionRecord> {
    let dataset = deck.dataset();
    items
        .iter()
        .map(|item| QuestionRecord {
            dataset: dataset.clone(),
            question: with_trailing_space(&item.question),
            answer: item.answer.clone(),
            accept: if item.answer.is_empty() { Vec::new() } else { vec![item.answer.clone()] },
            validation: Some(Validation::text()),
        })
        .collect()
}
