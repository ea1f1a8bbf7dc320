//! Pot-odds drills: outs on a street expressed as a percentage or as odds,
//! plus conversions between the two.

use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};

use crate::drill_engine::models::{QuestionRecord, Validation};

pub const DATASET: &str = "pot-odds";

/// Items in the authored document live under this field.
pub const DOCUMENT_FIELD: &str = "potOddsOps";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    RawPercent,
    RawOdds,
    Conversion,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Street {
    FlopTurn,
    TurnRiver,
    FlopRiver,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionFormat {
    PercentToOdds,
    OddsToPercent,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotOddsItem {
    pub outs: u32,
    pub street: Street,
    pub domain: Domain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ConversionFormat>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotOddsSelection {
    #[serde(default)]
    pub outs: BTreeSet<u32>,
    /// Only `RawPercent` and `RawOdds` are meaningful here.
    #[serde(default)]
    pub domains: BTreeSet<Domain>,
    #[serde(default)]
    pub streets: BTreeSet<Street>,
    #[serde(default)]
    pub conversion: bool,
}

impl PotOddsSelection {
    /// No outs clears everything below it; no domain clears streets and
    /// the conversion flag.
    pub fn normalize(&mut self) {
        if self.outs.is_empty() {
            self.domains.clear();
        }
        if self.domains.is_empty() {
            self.streets.clear();
            self.conversion = false;
        }
    }

    fn admits(&self, item: &PotOddsItem) -> bool {
        if !self.outs.contains(&item.outs) || !self.streets.contains(&item.street) {
            return false;
        }
        let has_percent = self.domains.contains(&Domain::RawPercent);
        let has_odds = self.domains.contains(&Domain::RawOdds);
        match (item.domain, item.format) {
            (Domain::RawPercent, _)                                    => has_percent,
            (Domain::RawOdds, _)                                       => has_odds,
            (Domain::Conversion, Some(ConversionFormat::PercentToOdds)) => self.conversion && has_percent,
            (Domain::Conversion, Some(ConversionFormat::OddsToPercent)) => self.conversion && has_odds,
            _                                                          => false,
        }
    }
}

/// Add a trailing space to a prompt that lacks one.
pub(crate) fn with_trailing_space(text: &str) -> String {
    if text.ends_with(char::is_whitespace) {
        text.to_string()
    } else {
        format!("{} ", text)
    }
}

pub fn select(items: &[PotOddsItem], selection: &PotOddsSelection) -> Vec<QuestionRecord> {
    if items.is_empty() || selection.outs.is_empty() || selection.streets.is_empty() {
        return Vec::new();
    }
    if selection.domains.is_empty() && !selection.conversion {
        return Vec::new();
    }

    items
        .iter()
        .filter(|item| selection.admits(item))
        .map(|item| QuestionRecord {
            dataset: DATASET.to_string(),
            question: with_trailing_space(&item.question),
            answer: item.answer.clone(),
            accept: if item.answer.is_empty() { Vec::new() } else { vec![item.answer.clone()] },
            validation: Some(Validation::text()),
        })
        .collect()
}
