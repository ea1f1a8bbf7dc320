//! Drill configuration.
//!
//! Everything a host collects before pressing "start": generation inputs,
//! pool selections, presentation modifiers and session tuning. Every field
//! has a default, so `{}` is a valid (if empty) configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::drill_engine::{
    error::{DrillError, Result},
    evaluator::EvaluationOrder,
    models::{FuguesSpeed, GenerationParams},
    pools::{pot_odds, spr::FlashcardDeck, PoolSelection, QuestionBank},
    session::{RetryPolicy, SessionOptions},
};

/// Settle delay before a ready answer is judged.
const fn default_debounce_ms() -> u64 {
    300
}

/// Shuffle attempts when repeating a run, looking for a new order.
const fn default_max_repeat_shuffles() -> usize {
    5
}

/// Where to read the authored datasets from. Missing entries stay empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetPaths {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pot_odds: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equity_practice: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equity_theory: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spr_practice: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub spr_flashcards: BTreeMap<FlashcardDeck, PathBuf>,
}

impl DatasetPaths {
    /// Load every configured dataset into `bank`, relative to `base`.
    /// Unreadable files leave their dataset empty.
    pub fn load_into(&self, bank: &mut QuestionBank, base: &Path) {
        if let Some(path) = &self.pot_odds {
            bank.pot_odds.load_file_field(&base.join(path), pot_odds::DOCUMENT_FIELD);
        }
        if let Some(path) = &self.equity_practice {
            bank.equity_practice.load_file(&base.join(path));
        }
        if let Some(path) = &self.equity_theory {
            bank.equity_theory.load_file(&base.join(path));
        }
        if let Some(path) = &self.spr_practice {
            bank.spr_practice.load_file(&base.join(path));
        }
        for (deck, path) in &self.spr_flashcards {
            bank.flashcards_mut(*deck).load_file(&base.join(path));
        }
    }
}

/// Top-level configuration for one drill run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillConfig {
    /// Operators, operand pools, chain length and modifiers.
    #[serde(default)]
    pub generation: GenerationParams,

    /// Poker fact levels and every dataset selection.
    #[serde(flatten)]
    pub selection: PoolSelection,

    #[serde(default)]
    pub fugues_speed: FuguesSpeed,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_max_repeat_shuffles")]
    pub max_repeat_shuffles: usize,

    #[serde(default)]
    pub retry_policy: RetryPolicy,

    #[serde(default)]
    pub evaluation_order: EvaluationOrder,

    /// Judge expressions numerically at this many decimals instead of by
    /// exact text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_decimals: Option<u32>,

    /// Fixed seed for reproducible runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,

    /// Start the chronometer with each run.
    #[serde(default)]
    pub chronometer: bool,

    /// Index into the countdown option table; 0 disables the countdown.
    #[serde(default)]
    pub countdown_option: usize,

    #[serde(default)]
    pub datasets: DatasetPaths,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            generation: GenerationParams::default(),
            selection: PoolSelection::default(),
            fugues_speed: FuguesSpeed::default(),
            debounce_ms: default_debounce_ms(),
            max_repeat_shuffles: default_max_repeat_shuffles(),
            retry_policy: RetryPolicy::default(),
            evaluation_order: EvaluationOrder::default(),
            expression_decimals: None,
            rng_seed: None,
            chronometer: false,
            countdown_option: 0,
            datasets: DatasetPaths::default(),
        }
    }
}

impl DrillConfig {
    /// Parse a JSON configuration string and normalise it.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::ConfigParse` for malformed JSON or unknown
    /// enum values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DrillError::config_parse("<inline>", e.to_string()))?;
        Ok(config.normalized())
    }

    /// Load configuration from a file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::ConfigParse` if the file exists but cannot be
    /// read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no drill config, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(DrillError::config_parse(path, format!("failed to read file: {e}")));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| DrillError::config_parse(path, e.to_string()))?;
        Ok(config.normalized())
    }

    /// Apply the input clamps and the selection gating cascade.
    pub fn normalized(mut self) -> Self {
        self.generation = self.generation.normalized();
        self.selection.normalize();
        self.max_repeat_shuffles = self.max_repeat_shuffles.max(1);
        self
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            modes: self.generation.modes.clone(),
            fugues_speed: self.fugues_speed,
            debounce_ms: self.debounce_ms,
            max_repeat_shuffles: self.max_repeat_shuffles,
            retry_policy: self.retry_policy,
            evaluation_order: self.evaluation_order,
            expression_decimals: self.expression_decimals,
            rng_seed: self.rng_seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drill_engine::models::{Modifier, Operator};

    #[test]
    fn empty_object_is_default() {
        let config = DrillConfig::from_json_str("{}").unwrap();
        assert_eq!(config, DrillConfig::default());
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.max_repeat_shuffles, 5);
        assert_eq!(config.retry_policy, RetryPolicy::UntilCorrect);
    }

    #[test]
    fn parses_camel_case_fields() {
        let config = DrillConfig::from_json_str(
            r#"{
                "generation": {"selectedOps": ["+", "×"], "selectedNums": [2, 3],
                               "start": 1, "end": 5, "chain": 3, "modes": ["Surges", "Fugues"]},
                "pokerLevels": [2, 1],
                "potOdds": {"outs": [8, 9], "domains": ["raw_percent"], "streets": ["flop_turn"]},
                "fuguesSpeed": "4H",
                "retryPolicy": "singleRetry",
                "evaluationOrder": "precedence",
                "rngSeed": 42
            }"#,
        )
        .unwrap();
        assert_eq!(config.generation.selected_ops, vec![Operator::Add, Operator::Mul]);
        assert!(config.generation.has_mode(Modifier::Fugues));
        assert_eq!(config.selection.poker_levels, vec![2, 1]);
        assert_eq!(config.selection.pot_odds.outs.len(), 2);
        assert_eq!(config.fugues_speed.latency_ms(), 2_000);
        assert_eq!(config.retry_policy, RetryPolicy::SingleRetry);
        assert_eq!(config.evaluation_order, EvaluationOrder::Precedence);

        let options = config.session_options();
        assert_eq!(options.rng_seed, Some(42));
        assert!(options.modes.contains(&Modifier::Surges));
    }

    #[test]
    fn normalisation_clamps_and_cascades() {
        let config = DrillConfig::from_json_str(
            r#"{"generation": {"start": 0, "end": -4, "chain": 1},
                "potOdds": {"outs": [], "domains": ["raw_odds"], "streets": ["turn_river"], "conversion": true},
                "maxRepeatShuffles": 0}"#,
        )
        .unwrap();
        assert_eq!((config.generation.start, config.generation.end, config.generation.chain), (1, 1, 2));
        assert!(config.selection.pot_odds.domains.is_empty());
        assert!(!config.selection.pot_odds.conversion);
        assert_eq!(config.max_repeat_shuffles, 1);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let err = DrillConfig::from_json_str(r#"{"fuguesSpeed": "9H"}"#).unwrap_err();
        assert!(matches!(err, DrillError::ConfigParse { .. }));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = DrillConfig::load_from_file(Path::new("/no/such/drill.json")).unwrap();
        assert_eq!(config, DrillConfig::default());
    }

    #[test]
    fn unreadable_datasets_stay_empty() {
        let paths = DatasetPaths {
            pot_odds: Some(PathBuf::from("missing-pot-odds.json")),
            ..DatasetPaths::default()
        };
        let mut bank = QuestionBank::new();
        paths.load_into(&mut bank, Path::new("/no/such/dir"));
        assert!(bank.pot_odds.is_loaded());
        assert!(bank.pot_odds.items().is_empty());
    }
}
