//! Pluggable slot extraction from user utterances

use regex::Regex;
use tracing::debug;

/// A slot assignment proposed by an extractor, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCandidate {
    pub slot: String,
    pub value: String,
}

/// Deterministic text-to-slot extraction. Runs synchronously on every
/// user turn before the model is called, so implementations must be cheap.
pub trait SlotExtractor: Send + Sync {
    fn extract(&self, input: &str) -> Vec<SlotCandidate>;
}

/// One regex rule bound to a slot name. Capture group 1 is the value.
pub struct ExtractionRule {
    slot: String,
    pattern: Regex,
}

impl ExtractionRule {
    pub fn new(slot: impl Into<String>, pattern: Regex) -> Self {
        Self {
            slot: slot.into(),
            pattern,
        }
    }
}

/// Regex-driven extractor. Candidates are ordered by match position, so a
/// caller applying them sequentially ends up with the last statement in
/// the input winning.
pub struct PatternExtractor {
    rules: Vec<ExtractionRule>,
}

impl PatternExtractor {
    /// Extractor with the built-in name rules ("my name is X",
    /// "call me X", "I'm called X"). Accented letters are accepted.
    pub fn new() -> Self {
        let name = r"([A-Za-zÀ-ÖØ-öø-ÿ][A-Za-zÀ-ÖØ-öø-ÿ'-]*)";
        let patterns = [
            format!(r"(?i)\bmy name is\s+{name}"),
            format!(r"(?i)\bcall me\s+{name}"),
            format!(r"(?i)\bi(?:'m| am) called\s+{name}"),
        ];

        let rules = patterns
            .iter()
            .map(|p| ExtractionRule::new("name", Regex::new(p).expect("valid built-in pattern")))
            .collect();

        Self { rules }
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, slot: impl Into<String>, pattern: Regex) -> Self {
        self.rules.push(ExtractionRule::new(slot, pattern));
        self
    }
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotExtractor for PatternExtractor {
    fn extract(&self, input: &str) -> Vec<SlotCandidate> {
        let mut hits: Vec<(usize, SlotCandidate)> = Vec::new();

        for rule in &self.rules {
            for captures in rule.pattern.captures_iter(input) {
                let Some(value) = captures.get(1) else { continue };
                let whole = captures.get(0).map(|m| m.start()).unwrap_or(0);
                hits.push((
                    whole,
                    SlotCandidate {
                        slot: rule.slot.clone(),
                        value: value.as_str().trim().to_string(),
                    },
                ));
            }
        }

        hits.sort_by_key(|(start, _)| *start);
        let candidates: Vec<SlotCandidate> = hits.into_iter().map(|(_, c)| c).collect();
        if !candidates.is_empty() {
            debug!(count = candidates.len(), "extracted slot candidates");
        }
        candidates
    }
}
