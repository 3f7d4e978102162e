//! Review aggregation and decision engine.
//!
//! Consumes raw review texts plus an optional star rating and produces the
//! trust verdict: durability score, return risk, sentiment summary,
//! confidence tier, advice text, a buy/avoid/caution flag and an
//! explainability bundle of sample reviews per category.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

use crate::keywords;
use crate::sentiment::SentimentScorer;

/// Reliability tier for the overall assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Final categorical recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Buy,
    Avoid,
    Caution,
}

/// Aggregated verdict over one list of reviews.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewAnalysis {
    /// Clamped to [30, 90].
    pub durability_score: i64,
    /// Percentage of reviews mentioning return/refund/replacement, 2 decimals.
    pub return_risk: f64,
    /// Mean compound sentiment, 2 decimals.
    pub average_sentiment: f64,
    pub confidence: Confidence,
    pub advice: String,
    /// Absent when there were no reviews to judge.
    pub decision_flag: Option<Decision>,
    /// Category name -> up to the first 3 matching review texts.
    pub explain: BTreeMap<String, Vec<String>>,
}

const EXPLAIN_SAMPLES: usize = 3;

static RATING_VALUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(\.\d+)?").expect("rating regex"));

/// Pulls the first decimal number out of a scraped rating string
/// ("4.3 out of 5 stars" -> 4.3). Unparseable input is skipped silently.
pub fn parse_rating(raw: &str) -> Option<f64> {
    RATING_VALUE_RE
        .find(raw)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn sample(mut reviews: Vec<String>) -> Vec<String> {
    reviews.truncate(EXPLAIN_SAMPLES);
    reviews
}

/// Scores and classifies every review, then folds the per-review signals
/// into the final verdict.
pub fn analyze_reviews(
    scorer: &dyn SentimentScorer,
    reviews: &[String],
    product_rating: Option<f64>,
) -> ReviewAnalysis {
    let total_reviews = reviews.len();
    if total_reviews == 0 {
        return ReviewAnalysis {
            durability_score: 0,
            return_risk: 0.0,
            average_sentiment: 0.0,
            confidence: Confidence::Low,
            advice: "No reviews available to analyze.".to_string(),
            decision_flag: None,
            explain: BTreeMap::new(),
        };
    }

    let mut severe_reviews = Vec::new();
    let mut mild_reviews = Vec::new();
    let mut return_reviews = Vec::new();
    let mut delivery_reviews = Vec::new();
    let mut positive_reviews = Vec::new();

    let mut severe_hits = 0usize;
    let mut mild_hits = 0usize;
    let mut return_hits = 0usize;
    let mut sentiment_total = 0.0f64;

    for review in reviews {
        let text = review.to_lowercase();
        let sentiment_score = scorer.score(&text);
        sentiment_total += sentiment_score;

        let hits = keywords::classify(&text);
        if hits.severe {
            severe_hits += 1;
            severe_reviews.push(review.clone());
        } else if hits.mild {
            mild_hits += 1;
            mild_reviews.push(review.clone());
        }
        if hits.returns {
            return_hits += 1;
            return_reviews.push(review.clone());
        }
        if hits.delivery {
            delivery_reviews.push(review.clone());
        }
        // Positive requires clearly favorable sentiment and a keyword-free review
        if sentiment_score > 0.1 && !hits.any() {
            positive_reviews.push(review.clone());
        }
    }

    let durability_score =
        (85 - 15 * severe_hits as i64 - 3 * mild_hits as i64).clamp(30, 90);
    let return_risk = round2(return_hits as f64 / total_reviews as f64 * 100.0);
    let average_sentiment = round2(sentiment_total / total_reviews as f64);

    let mut signal_strength = 0;
    if average_sentiment >= 0.25 {
        signal_strength += 1;
    }
    if return_risk < 20.0 {
        signal_strength += 1;
    }
    if durability_score >= 60 {
        signal_strength += 1;
    }
    if total_reviews >= 20 {
        signal_strength += 1;
    }
    let confidence = if signal_strength >= 3 {
        Confidence::High
    } else if signal_strength == 2 {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    let mut advice: Vec<&str> = Vec::new();
    if durability_score < 45 {
        advice.push("Multiple users reported serious durability issues.");
    } else if durability_score < 65 {
        advice.push("Some users mentioned concerns about long-term durability.");
    }

    if return_risk >= 40.0 {
        advice.push("High number of return or replacement complaints detected.");
    } else if return_risk >= 25.0 {
        advice.push("Moderate return-related issues were found.");
    }

    if average_sentiment < -0.2 {
        advice.push("Overall customer sentiment is strongly negative.");
    } else if average_sentiment < 0.0 {
        advice.push("Customer sentiment is slightly negative.");
    }

    if let Some(rating) = product_rating {
        if rating < 4.0 {
            advice.push("Average rating is below 4.0, indicating mixed customer experience.");
        }
    }

    if advice.is_empty() {
        if average_sentiment >= 0.4 && durability_score >= 70 && return_risk <= 10.0 {
            advice.push("Customers consistently praise quality, comfort, and overall satisfaction.");
        } else if average_sentiment >= 0.2 {
            advice.push("Feedback is generally positive, but enthusiasm is moderate rather than strong.");
        } else {
            advice.push("Most users are satisfied, though opinions vary slightly by personal preference.");
        }
    }

    // Buy is checked first; the thresholds are near-exclusive but buy wins
    // if both ever hold
    let decision_flag =
        if durability_score >= 68 && average_sentiment >= 0.3 && return_risk <= 15.0 {
            Decision::Buy
        } else if durability_score < 50 || average_sentiment < -0.1 || return_risk >= 35.0 {
            Decision::Avoid
        } else {
            Decision::Caution
        };

    let mut explain = BTreeMap::new();
    explain.insert("top_severe_reviews".to_string(), sample(severe_reviews));
    explain.insert("top_mild_reviews".to_string(), sample(mild_reviews));
    explain.insert("top_return_reviews".to_string(), sample(return_reviews));
    explain.insert("top_delivery_reviews".to_string(), sample(delivery_reviews));
    explain.insert("top_positive_reviews".to_string(), sample(positive_reviews));

    ReviewAnalysis {
        durability_score,
        return_risk,
        average_sentiment,
        confidence,
        advice: advice.join(" "),
        decision_flag: Some(decision_flag),
        explain,
    }
}
