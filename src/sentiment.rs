//! Sentiment scoring behind a narrow trait.
//!
//! The decision engine only ever sees `score(text) -> f64`, so the lexicon
//! engine can be swapped without touching it.

use anyhow::{bail, Result};
use vader_sentiment::SentimentIntensityAnalyzer;

/// Per-text polarity contract: a compound score in [-1, 1] where more
/// positive means more favorable. Implementations must be deterministic for
/// identical input and free of side effects.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> f64;
}

/// VADER-backed scorer using the crate's bundled lexicon.
pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    /// Builds the analyzer and probes it with a known-polarity sentence.
    /// A lexicon that cannot resolve the probe aborts startup instead of
    /// silently scoring every review as neutral.
    pub fn try_new() -> Result<Self> {
        let scorer = Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        };
        let probe = scorer.score("great excellent wonderful");
        if probe <= 0.0 {
            bail!("sentiment lexicon failed self-check (probe score {probe})");
        }
        Ok(scorer)
    }
}

impl SentimentScorer for VaderScorer {
    fn score(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }
        let scores = self.analyzer.polarity_scores(text);
        scores
            .get("compound")
            .copied()
            .unwrap_or(0.0)
            .clamp(-1.0, 1.0)
    }
}
