//! HTTP surface: analyze a product URL and inspect recorded price history.
//!
//! Every request gets a complete response record. Extraction failures come
//! back as the same shape with scores zeroed and an `error` field, so the
//! caller never has to handle a missing payload.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::analysis::{self, Confidence, Decision, ReviewAnalysis};
use crate::crawler;
use crate::history::PriceHistoryStore;
use crate::sentiment::VaderScorer;

/// Review texts echoed back as evidence alongside the verdict.
const EVIDENCE_REVIEWS: usize = 10;

pub struct AppState {
    pub scorer: VaderScorer,
    /// Single serialization point for the read-modify-write history store.
    pub history: Mutex<PriceHistoryStore>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    pub url: String,
}

/// Full trust verdict for a product page.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub product_title: Option<String>,
    pub product_price: Option<String>,
    pub product_rating: Option<String>,
    pub durability_score: i64,
    pub return_risk: f64,
    pub average_sentiment: f64,
    pub confidence: Confidence,
    pub advice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_flag: Option<Decision>,
    #[schema(value_type = Object)]
    pub explain: BTreeMap<String, Vec<String>>,
    pub price_alert: String,
    /// Evidence layer: the first raw review texts the verdict was built from.
    pub reviews: Vec<String>,
    pub analyzed_at: String,
}

impl AnalyzeResponse {
    fn failure(err: String) -> Self {
        Self {
            error: Some(err),
            product_title: None,
            product_price: None,
            product_rating: None,
            durability_score: 0,
            return_risk: 0.0,
            average_sentiment: 0.0,
            confidence: Confidence::Low,
            advice: "Backend failed".to_string(),
            decision_flag: None,
            explain: BTreeMap::new(),
            price_alert: String::new(),
            reviews: Vec::new(),
            analyzed_at: Utc::now().to_rfc3339(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/analyze_url",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Trust verdict for the product page", body = AnalyzeResponse)
    ),
    tag = "analysis"
)]
pub async fn analyze_url(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Json<AnalyzeResponse> {
    println!("🔎 Analyzing product URL: {}", req.url);

    let product = match crawler::extract_product_page(&req.url).await {
        Ok(product) => product,
        Err(e) => {
            eprintln!("❌ Extraction failed for {}: {}", req.url, e);
            return Json(AnalyzeResponse::failure(e.to_string()));
        }
    };

    let rating_value = product.rating.as_deref().and_then(analysis::parse_rating);
    let result = analysis::analyze_reviews(&state.scorer, &product.reviews, rating_value);

    // History is keyed by real titles only; an anonymous page gets no alert
    let price_alert = match product.title.as_deref() {
        Some(title) => match state.history.lock() {
            Ok(store) => store.record_and_alert(title, product.price),
            Err(e) => {
                eprintln!("⚠️ Price history lock poisoned: {}", e);
                String::new()
            }
        },
        None => String::new(),
    };

    let ReviewAnalysis {
        durability_score,
        return_risk,
        average_sentiment,
        confidence,
        advice,
        decision_flag,
        explain,
    } = result;

    Json(AnalyzeResponse {
        error: None,
        product_title: product.title,
        product_price: product.price_text,
        product_rating: product.rating,
        durability_score,
        return_risk,
        average_sentiment,
        confidence,
        advice,
        decision_flag,
        explain,
        price_alert,
        reviews: product.reviews.into_iter().take(EVIDENCE_REVIEWS).collect(),
        analyzed_at: Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PriceHistoryResponse {
    pub product_title: String,
    /// Recorded prices, oldest first, at most the last 20.
    pub prices: Vec<i64>,
}

#[utoipa::path(
    get,
    path = "/price_history/{title}",
    params(
        ("title" = String, Path, description = "Product title the history is keyed by")
    ),
    responses(
        (status = 200, description = "Recorded prices for the title", body = PriceHistoryResponse)
    ),
    tag = "analysis"
)]
pub async fn get_price_history(
    State(state): State<Arc<AppState>>,
    Path(title): Path<String>,
) -> Json<PriceHistoryResponse> {
    let prices = match state.history.lock() {
        Ok(store) => store.prices_for(&title),
        Err(e) => {
            eprintln!("⚠️ Price history lock poisoned: {}", e);
            Vec::new()
        }
    };
    Json(PriceHistoryResponse {
        product_title: title,
        prices,
    })
}
