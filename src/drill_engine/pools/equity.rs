//! Equity drills.
//!
//! Practice items pair a pot and a bet with two questions (the pot-to-call
//! ratio and the required equity). Theory items ask for the same
//! quantities in the abstract, or the reverse ("which bet needs this
//! equity?").

use std::collections::{BTreeSet, HashMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::drill_engine::{models::QuestionRecord, pools::value_text};

pub const PRACTICE_DATASET: &str = "equiti-practico";
pub const THEORY_DATASET: &str = "equiti-teorico";

/// Pot-size buckets used to tag practice items.
pub const POT_RANGES: [&str; 3] = ["2-10", "12-30", "35-50"];

/// Bet sizes as fractions of the pot.
pub const BET_FRACTIONS: [&str; 8] = ["1/4", "1/3", "1/2", "2/3", "3/4", "1x", "1.5x", "2x"];

// ---------------------------------------------------------------------------
// Practice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeKind {
    /// Pot-to-call ratio; listed first within a group.
    Relacion,
    /// Required equity percentage.
    Equity,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PracticeTags {
    #[serde(default)]
    pub grupo_bote: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPracticeItem {
    #[serde(rename = "pregunta", default)]
    pub question: String,
    #[serde(rename = "pregunta_tipo")]
    pub kind: PracticeKind,
    #[serde(rename = "respuesta_ratio", default)]
    pub answer_ratio: Option<String>,
    #[serde(rename = "respuesta_percent", default)]
    pub answer_percent: Option<String>,
    /// Pot and bet amounts; authored as numbers or strings.
    #[serde(rename = "bote", default)]
    pub pot: Value,
    #[serde(rename = "apuesta", default)]
    pub bet: Value,
    #[serde(rename = "apuesta_frac", default)]
    pub bet_fraction: Option<String>,
    #[serde(default)]
    pub tags: PracticeTags,
}

impl EquityPracticeItem {
    fn group_key(&self) -> String {
        format!(
            "{}|{}|{}",
            value_text(&self.pot).unwrap_or_default(),
            value_text(&self.bet).unwrap_or_default(),
            self.bet_fraction.as_deref().unwrap_or_default()
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityPracticeSelection {
    #[serde(default)]
    pub kinds: BTreeSet<PracticeKind>,
    /// Values from [`POT_RANGES`].
    #[serde(default)]
    pub ranges: BTreeSet<String>,
    /// Values from [`BET_FRACTIONS`].
    #[serde(default)]
    pub bets: BTreeSet<String>,
}

impl EquityPracticeSelection {
    pub fn normalize(&mut self) {
        if self.kinds.is_empty() {
            self.ranges.clear();
        }
        if self.ranges.is_empty() {
            self.bets.clear();
        }
    }
}

pub fn select_practice(items: &[EquityPracticeItem], selection: &EquityPracticeSelection) -> Vec<QuestionRecord> {
    if items.is_empty() || selection.ranges.is_empty() || selection.bets.is_empty() {
        return Vec::new();
    }
    let kind_order: Vec<PracticeKind> = [PracticeKind::Relacion, PracticeKind::Equity]
        .into_iter()
        .filter(|k| selection.kinds.contains(k))
        .collect();
    if kind_order.is_empty() {
        return Vec::new();
    }

    let mut groups: HashMap<String, HashMap<PracticeKind, &EquityPracticeItem>> = HashMap::new();
    let mut key_order = Vec::new();
    for item in items {
        let in_range = item.tags.grupo_bote.as_ref().is_some_and(|r| selection.ranges.contains(r));
        let in_bets = item.bet_fraction.as_ref().is_some_and(|b| selection.bets.contains(b));
        if !in_range || !in_bets || !selection.kinds.contains(&item.kind) {
            continue;
        }
        let key = item.group_key();
        if !groups.contains_key(&key) {
            key_order.push(key.clone());
        }
        // A later item of the same kind replaces the earlier one.
        groups.entry(key).or_default().insert(item.kind, item);
    }

    let mut out = Vec::new();
    for key in &key_order {
        let Some(group) = groups.get(key) else { continue };
        for kind in &kind_order {
            let Some(item) = group.get(kind) else { continue };
            let answer = match kind {
                PracticeKind::Relacion => item.answer_ratio.clone(),
                _                      => item.answer_percent.clone(),
            }
            .unwrap_or_default();
            out.push(QuestionRecord {
                dataset: PRACTICE_DATASET.to_string(),
                question: item.question.clone(),
                accept: if answer.is_empty() { Vec::new() } else { vec![answer.clone()] },
                answer,
                validation: None,
            });
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Theory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TheoryKind {
    Eq,
    Ratio,
    ViceversaEq,
    ViceversaRatio,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerFormat {
    Percent,
    Ratio,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityTheoryItem {
    #[serde(rename = "pregunta", default)]
    pub question: String,
    #[serde(rename = "pregunta_tipo")]
    pub kind: TheoryKind,
    #[serde(rename = "respuesta_percent", default)]
    pub answer_percent: Option<String>,
    #[serde(rename = "respuesta_ratio", default)]
    pub answer_ratio: Option<String>,
    #[serde(rename = "respuesta_frac", default)]
    pub answer_fraction: Option<String>,
    #[serde(rename = "apuesta_frac", default)]
    pub bet_fraction: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityTheorySelection {
    #[serde(default)]
    pub kinds: BTreeSet<TheoryKind>,
    #[serde(default)]
    pub formats: BTreeSet<AnswerFormat>,
}

fn non_empty(s: &Option<String>) -> Option<&String> {
    s.as_ref().filter(|s| !s.is_empty())
}

pub fn select_theory(items: &[EquityTheoryItem], selection: &EquityTheorySelection) -> Vec<QuestionRecord> {
    let kinds = &selection.kinds;
    let wants = |k| kinds.contains(&k);
    let allow_percent = selection.formats.contains(&AnswerFormat::Percent);
    let allow_ratio = selection.formats.contains(&AnswerFormat::Ratio);

    if items.is_empty() || kinds.is_empty() {
        return Vec::new();
    }
    let no_reverse = !wants(TheoryKind::ViceversaEq) && !wants(TheoryKind::ViceversaRatio);
    if no_reverse && selection.formats.is_empty() {
        return Vec::new();
    }

    // Items without a bet fraction get a group of their own.
    let mut groups: HashMap<String, HashMap<TheoryKind, &EquityTheoryItem>> = HashMap::new();
    let mut key_order: Vec<String> = Vec::new();
    for item in items {
        let key = non_empty(&item.bet_fraction)
            .cloned()
            .unwrap_or_else(|| key_order.len().to_string());
        if !groups.contains_key(&key) {
            key_order.push(key.clone());
        }
        groups.entry(key).or_default().insert(item.kind, item);
    }

    let record = |item: &EquityTheoryItem, accept: Vec<String>| QuestionRecord {
        dataset: THEORY_DATASET.to_string(),
        question: item.question.clone(),
        answer: accept.first().cloned().unwrap_or_default(),
        accept,
        validation: None,
    };

    let mut out = Vec::new();
    for key in &key_order {
        let Some(group) = groups.get(key) else { continue };

        if let Some(item) = group.get(&TheoryKind::Eq).copied().filter(|_| wants(TheoryKind::Eq)) {
            let mut accept = Vec::new();
            if allow_percent { accept.extend(non_empty(&item.answer_percent).cloned()); }
            if allow_ratio   { accept.extend(non_empty(&item.answer_ratio).cloned()); }
            if !accept.is_empty() {
                out.push(record(item, accept));
            }
        }
        if let Some(item) = group.get(&TheoryKind::Ratio).copied().filter(|_| wants(TheoryKind::Ratio)) {
            let mut accept = Vec::new();
            if allow_ratio   { accept.extend(non_empty(&item.answer_ratio).cloned()); }
            if allow_percent { accept.extend(non_empty(&item.answer_percent).cloned()); }
            if !accept.is_empty() {
                out.push(record(item, accept));
            }
        }
        for kind in [TheoryKind::ViceversaEq, TheoryKind::ViceversaRatio] {
            if let Some(item) = group.get(&kind).copied().filter(|_| wants(kind)) {
                let accept = non_empty(&item.answer_fraction).cloned().into_iter().collect();
                out.push(record(item, accept));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn practice_items() -> Vec<EquityPracticeItem> {
        serde_json::from_str(
            r#"[
                {"pregunta": "Bote 10, apuesta 5: equity?", "pregunta_tipo": "equity", "respuesta_percent": "25%",
                 "bote": 10, "apuesta": 5, "apuesta_frac": "1/2", "tags": {"grupo_bote": "2-10"}},
                {"pregunta": "Bote 10, apuesta 5: relación?", "pregunta_tipo": "relacion", "respuesta_ratio": "3:1",
                 "bote": 10, "apuesta": 5, "apuesta_frac": "1/2", "tags": {"grupo_bote": "2-10"}},
                {"pregunta": "Bote 20, apuesta 20: relación?", "pregunta_tipo": "relacion", "respuesta_ratio": "2:1",
                 "bote": "20", "apuesta": "20", "apuesta_frac": "1x", "tags": {"grupo_bote": "12-30"}},
                {"pregunta": "Bote 40, apuesta 10: relación?", "pregunta_tipo": "relacion", "respuesta_ratio": "5:1",
                 "bote": 40, "apuesta": 10, "apuesta_frac": "1/4", "tags": {"grupo_bote": "35-50"}}
            ]"#,
        )
        .unwrap()
    }

    fn practice_selection(kinds: &[PracticeKind]) -> EquityPracticeSelection {
        EquityPracticeSelection {
            kinds: kinds.iter().copied().collect(),
            ranges: ["2-10", "12-30"].iter().map(|s| s.to_string()).collect(),
            bets: ["1/2", "1x"].iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn practice_groups_put_ratio_before_equity() {
        let out = select_practice(
            &practice_items(),
            &practice_selection(&[PracticeKind::Relacion, PracticeKind::Equity]),
        );
        let answers: Vec<&str> = out.iter().map(|r| r.answer.as_str()).collect();
        assert_eq!(answers, vec!["3:1", "25%", "2:1"]);
        assert!(out.iter().all(|r| r.dataset == PRACTICE_DATASET));
    }

    #[test]
    fn practice_kind_filter_applies() {
        let out = select_practice(&practice_items(), &practice_selection(&[PracticeKind::Equity]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].accept, vec!["25%"]);
    }

    #[test]
    fn practice_cascade_clears_dependents() {
        let mut s = practice_selection(&[]);
        s.normalize();
        assert!(s.ranges.is_empty());
        assert!(s.bets.is_empty());
        assert!(select_practice(&practice_items(), &s).is_empty());
    }

    fn theory_items() -> Vec<EquityTheoryItem> {
        serde_json::from_str(
            r#"[
                {"pregunta": "Apuesta 1/2: equity?", "pregunta_tipo": "eq", "respuesta_percent": "25%",
                 "respuesta_ratio": "3:1", "apuesta_frac": "1/2"},
                {"pregunta": "Apuesta 1/2: relación?", "pregunta_tipo": "ratio", "respuesta_percent": "25%",
                 "respuesta_ratio": "3:1", "apuesta_frac": "1/2"},
                {"pregunta": "Equity 25%: apuesta?", "pregunta_tipo": "viceversa_eq", "respuesta_frac": "1/2",
                 "apuesta_frac": "1/2"},
                {"pregunta": "Sin grupo", "pregunta_tipo": "eq", "respuesta_percent": "33%"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn theory_accept_order_follows_kind() {
        let selection = EquityTheorySelection {
            kinds: [TheoryKind::Eq, TheoryKind::Ratio].into_iter().collect(),
            formats: [AnswerFormat::Percent, AnswerFormat::Ratio].into_iter().collect(),
        };
        let out = select_theory(&theory_items(), &selection);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].accept, vec!["25%", "3:1"]);
        assert_eq!(out[1].accept, vec!["3:1", "25%"]);
        assert_eq!(out[1].answer, "3:1");
        assert_eq!(out[2].question, "Sin grupo");
    }

    #[test]
    fn theory_skips_items_without_an_allowed_answer() {
        let selection = EquityTheorySelection {
            kinds: [TheoryKind::Eq].into_iter().collect(),
            formats: [AnswerFormat::Ratio].into_iter().collect(),
        };
        let out = select_theory(&theory_items(), &selection);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].answer, "3:1");
    }

    #[test]
    fn theory_reverse_kinds_need_no_format() {
        let selection = EquityTheorySelection {
            kinds: [TheoryKind::ViceversaEq].into_iter().collect(),
            formats: BTreeSet::new(),
        };
        let out = select_theory(&theory_items(), &selection);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].accept, vec!["1/2"]);

        let selection = EquityTheorySelection {
            kinds: [TheoryKind::Eq].into_iter().collect(),
            formats: BTreeSet::new(),
        };
        assert!(select_theory(&theory_items(), &selection).is_empty());
    }
}
