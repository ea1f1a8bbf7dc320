//! Fixed-question pools.
//!
//! Each pool turns an authored dataset plus the current selection sets into
//! uniform [`Question`]s. Pools are pure given their loaded data: any empty
//! required selection dimension yields an empty list, and a dataset that
//! failed to load is treated as empty for the rest of the run.
//!
//! | Module        | Dataset |
//! |---------------|---------|
//! | `poker_facts` | Built-in poker fast-math facts, levels 1-4 |
//! | `pot_odds`    | Outs / street / domain drills |
//! | `equity`      | Equity practice and theory |
//! | `spr`         | Stack-to-pot ratio practice and flashcards |

pub mod equity;
pub mod poker_facts;
pub mod pot_odds;
pub mod spr;

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::drill_engine::{
    error::{DrillError, Result},
    models::{Operator, Question},
};
use equity::{EquityPracticeItem, EquityPracticeSelection, EquityTheoryItem, EquityTheorySelection};
use poker_facts::PokerFactTable;
use pot_odds::{PotOddsItem, PotOddsSelection};
use spr::{FlashcardDeck, FlashcardItem, SprPracticeItem, SprPracticeSelection};

// ---------------------------------------------------------------------------
// Dataset slots
// ---------------------------------------------------------------------------

/// A dataset that is loaded at most once.
///
/// A failed load is logged and remembered as an empty dataset; later load
/// calls do not retry.
#[derive(Debug, Clone)]
pub struct DatasetSlot<T> {
    name: &'static str,
    items: Option<Vec<T>>,
}

impl<T> DatasetSlot<T> {
    pub const fn new(name: &'static str) -> Self {
        DatasetSlot { name, items: None }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_loaded(&self) -> bool {
        self.items.is_some()
    }

    /// Loaded items; empty when not yet loaded or when loading failed.
    pub fn items(&self) -> &[T] {
        self.items.as_deref().unwrap_or(&[])
    }

    pub fn load_with<F>(&mut self, loader: F) -> &[T]
    where
        F: FnOnce() -> Result<Vec<T>>,
    {
        if self.items.is_none() {
            let items = match loader() {
                Ok(items) => {
                    tracing::debug!(dataset = self.name, count = items.len(), "dataset loaded");
                    items
                }
                Err(err) => {
                    tracing::warn!(dataset = self.name, error = %err, "dataset unavailable, continuing without it");
                    Vec::new()
                }
            };
            self.items = Some(items);
        }
        self.items()
    }
}

impl<T: DeserializeOwned> DatasetSlot<T> {
    /// Load from a JSON document whose top level is the item array.
    pub fn load_json(&mut self, json: &str) -> &[T] {
        let name = self.name;
        self.load_with(|| parse_items(name, json, None))
    }

    /// Load from a JSON document whose items sit under `field`.
    pub fn load_json_field(&mut self, json: &str, field: &str) -> &[T] {
        let name = self.name;
        self.load_with(|| parse_items(name, json, Some(field)))
    }

    pub fn load_file(&mut self, path: &Path) -> &[T] {
        let name = self.name;
        self.load_with(|| {
            let json = std::fs::read_to_string(path)?;
            parse_items(name, &json, None)
        })
    }

    pub fn load_file_field(&mut self, path: &Path, field: &str) -> &[T] {
        let name = self.name;
        self.load_with(|| {
            let json = std::fs::read_to_string(path)?;
            parse_items(name, &json, Some(field))
        })
    }
}

/// Parse a dataset document. A well-formed document whose items are not an
/// array is an empty dataset, not an error. Items that do not fit the record
/// shape are skipped one by one; the rest of the dataset stays usable.
fn parse_items<T: DeserializeOwned>(dataset: &str, json: &str, field: Option<&str>) -> Result<Vec<T>> {
    let mut root: Value = serde_json::from_str(json)
        .map_err(|e| DrillError::dataset_parse(dataset, e.to_string()))?;
    let array = match field {
        Some(field) => root.get_mut(field).map(Value::take).unwrap_or(Value::Null),
        None        => root,
    };
    let Value::Array(values) = array else {
        return Ok(Vec::new());
    };

    let mut items = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(item) => items.push(item),
            Err(e)   => tracing::debug!(dataset, index, error = %e, "skipping malformed dataset item"),
        }
    }
    Ok(items)
}

/// Read a string-or-number JSON field as text, the way authored datasets mix them.
pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _                => None,
    }
}

// ---------------------------------------------------------------------------
// Selections
// ---------------------------------------------------------------------------

/// Every externally maintained selection set, in one place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSelection {
    /// Poker fact levels, in the order they were selected.
    #[serde(default)]
    pub poker_levels: Vec<u8>,
    #[serde(default)]
    pub pot_odds: PotOddsSelection,
    #[serde(default)]
    pub equity_practice: EquityPracticeSelection,
    #[serde(default)]
    pub equity_theory: EquityTheorySelection,
    #[serde(default)]
    pub spr_practice: SprPracticeSelection,
    /// Flashcard decks, in the order they were selected.
    #[serde(default)]
    pub spr_flashcards: Vec<FlashcardDeck>,
}

impl PoolSelection {
    /// Clear dependent selections whose parent dimension is empty.
    pub fn normalize(&mut self) {
        self.pot_odds.normalize();
        self.equity_practice.normalize();
        self.spr_practice.normalize();
    }
}

// ---------------------------------------------------------------------------
// Question bank
// ---------------------------------------------------------------------------

/// Loaded datasets for every pool.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    pub poker_facts: PokerFactTable,
    pub pot_odds: DatasetSlot<PotOddsItem>,
    pub equity_practice: DatasetSlot<EquityPracticeItem>,
    pub equity_theory: DatasetSlot<EquityTheoryItem>,
    pub spr_practice: DatasetSlot<SprPracticeItem>,
    pub spr_interpretacion: DatasetSlot<FlashcardItem>,
    pub spr_ejemplos: DatasetSlot<FlashcardItem>,
    pub spr_manos: DatasetSlot<FlashcardItem>,
    pub spr_teoria: DatasetSlot<FlashcardItem>,
}

impl Default for QuestionBank {
    fn default() -> Self {
        QuestionBank {
            poker_facts: PokerFactTable::builtin(),
            pot_odds: DatasetSlot::new("pot-odds"),
            equity_practice: DatasetSlot::new("equiti-practico"),
            equity_theory: DatasetSlot::new("equiti-teorico"),
            spr_practice: DatasetSlot::new("spr-practico"),
            spr_interpretacion: DatasetSlot::new("spr-flashcards-interpretacion"),
            spr_ejemplos: DatasetSlot::new("spr-flashcards-ejemplos"),
            spr_manos: DatasetSlot::new("spr-flashcards-manos"),
            spr_teoria: DatasetSlot::new("spr-flashcards-teoria"),
        }
    }
}

impl QuestionBank {
    pub fn new() -> Self {
        QuestionBank::default()
    }

    /// Pot-odds documents wrap their items in a `potOddsOps` field.
    pub fn load_pot_odds(&mut self, json: &str) -> usize {
        self.pot_odds.load_json_field(json, pot_odds::DOCUMENT_FIELD).len()
    }

    pub fn flashcards(&self, deck: FlashcardDeck) -> &DatasetSlot<FlashcardItem> {
        match deck {
            FlashcardDeck::Interpretacion => &self.spr_interpretacion,
            FlashcardDeck::Ejemplos       => &self.spr_ejemplos,
            FlashcardDeck::Manos          => &self.spr_manos,
            FlashcardDeck::Teoria         => &self.spr_teoria,
        }
    }

    pub fn flashcards_mut(&mut self, deck: FlashcardDeck) -> &mut DatasetSlot<FlashcardItem> {
        match deck {
            FlashcardDeck::Interpretacion => &mut self.spr_interpretacion,
            FlashcardDeck::Ejemplos       => &mut self.spr_ejemplos,
            FlashcardDeck::Manos          => &mut self.spr_manos,
            FlashcardDeck::Teoria         => &mut self.spr_teoria,
        }
    }

    /// Poker fact expressions (left-hand sides only).
    pub fn poker_expressions(&self, ops: &[Operator], selection: &PoolSelection) -> Vec<String> {
        self.poker_facts.expressions(ops, &selection.poker_levels)
    }

    /// Record questions from every authored dataset, in dataset order:
    /// pot odds, equity practice, equity theory, SPR practice, SPR flashcards.
    pub fn records(&self, selection: &PoolSelection) -> Vec<Question> {
        let mut out = Vec::new();
        out.extend(pot_odds::select(self.pot_odds.items(), &selection.pot_odds));
        out.extend(equity::select_practice(self.equity_practice.items(), &selection.equity_practice));
        out.extend(equity::select_theory(self.equity_theory.items(), &selection.equity_theory));
        out.extend(spr::select_practice(self.spr_practice.items(), &selection.spr_practice));
        for deck in &selection.spr_flashcards {
            out.extend(spr::select_flashcards(*deck, self.flashcards(*deck).items()));
        }
        out.into_iter().map(Question::Record).collect()
    }
}
