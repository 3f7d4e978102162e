//! Keyword rules for sorting reviews into complaint categories.
//!
//! Severe and mild defect rules form an ordered list evaluated top to bottom
//! with first match winning, so a review that mentions both a cracked screen
//! and a tight fit is counted once, as severe. Return and delivery membership
//! are checked independently of that pair and of each other.

use once_cell::sync::Lazy;

static SEVERE_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "broke", "broken", "cracked", "stopped working", "completely damaged",
        "dead", "torn", "defective",
    ]
});

static MILD_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "thin", "average quality", "not premium", "ok for price", "budget",
        "comfortable", "tight", "loose", "satisfactory",
    ]
});

static RETURN_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec!["return", "returned", "refund", "replacement", "exchange"]
});

static DELIVERY_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "delivery", "shipping", "courier", "late", "arrogant", "rude",
        "damaged in transit",
    ]
});

/// Defect tier assigned by the ordered severe-then-mild rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefectTier {
    Severe,
    Mild,
}

/// Category membership for one review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordHits {
    pub severe: bool,
    pub mild: bool,
    pub returns: bool,
    pub delivery: bool,
}

impl KeywordHits {
    /// True when any keyword list matched. Used as the gate for the
    /// positive category, which requires a keyword-free review.
    pub fn any(&self) -> bool {
        self.severe || self.mild || self.returns || self.delivery
    }
}

/// Classifies one review. Expects lower-cased text; matching is plain
/// substring containment against the fixed word lists.
pub fn classify(text: &str) -> KeywordHits {
    let defect_rules: [(DefectTier, &[&str]); 2] = [
        (DefectTier::Severe, &SEVERE_WORDS),
        (DefectTier::Mild, &MILD_WORDS),
    ];
    let tier = defect_rules
        .iter()
        .find(|(_, words)| contains_any(text, words))
        .map(|(tier, _)| *tier);

    KeywordHits {
        severe: tier == Some(DefectTier::Severe),
        mild: tier == Some(DefectTier::Mild),
        returns: contains_any(text, &RETURN_WORDS),
        delivery: contains_any(text, &DELIVERY_WORDS),
    }
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|word| text.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severe_wins_over_mild() {
        // "cracked" (severe) and "tight" (mild) in one review
        let hits = classify("the case cracked and the fit is too tight");
        assert!(hits.severe);
        assert!(!hits.mild);
    }

    #[test]
    fn test_mild_only_when_no_severe_match() {
        let hits = classify("feels a bit thin but ok for price");
        assert!(!hits.severe);
        assert!(hits.mild);
    }

    #[test]
    fn test_return_and_delivery_are_independent() {
        let hits = classify("it broke so i asked for a refund, courier was rude too");
        assert!(hits.severe);
        assert!(hits.returns);
        assert!(hits.delivery);
        assert!(!hits.mild);
    }

    #[test]
    fn test_clean_review_matches_nothing() {
        let hits = classify("absolutely love this, fantastic value");
        assert!(!hits.any());
    }
}
