//! Product page extraction with Headless Chrome.
//!
//! Renders the listing page, snapshots the hydrated HTML and pulls out the
//! fields the scoring core consumes: title, price, star rating and review
//! bodies. When the browser cannot be launched a plain HTTP fetch of the
//! page is parsed with the same selectors.

use std::time::Duration;

use anyhow::{Context, Result};
use headless_chrome::{Browser, LaunchOptions};
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

static USER_AGENTS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    ]
});

/// Reviews handed to the scoring core are capped at the first 30 on the page.
const MAX_REVIEWS: usize = 30;

static RATING_LEAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d\.\d|\d").expect("rating regex"));
static PRICE_DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("price regex"));

/// Product fields pulled from a rendered listing page. Every field is
/// optional except the review list, which may simply be empty.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProductData {
    pub title: Option<String>,
    /// Raw price text as displayed, echoed back to the caller.
    pub price_text: Option<String>,
    /// Parsed integer price, thousands separators stripped.
    pub price: Option<i64>,
    pub rating: Option<String>,
    pub reviews: Vec<String>,
}

/// Extracts product data from a page, preferring the rendered-DOM snapshot
/// and falling back to a plain fetch when the browser path fails.
pub async fn extract_product_page(url: &str) -> Result<ProductData> {
    match extract_with_browser(url).await {
        Ok(data) => Ok(data),
        Err(e) => {
            eprintln!("⚠️ Browser extraction failed: {}. Falling back to plain fetch...", e);
            extract_with_fetch(url).await
        }
    }
}

fn pick_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36")
}

async fn extract_with_browser(url: &str) -> Result<ProductData> {
    let user_agent = pick_user_agent();
    let ua_arg = format!("--user-agent={}", user_agent);

    let args = vec![
        std::ffi::OsStr::new("--headless=new"),
        std::ffi::OsStr::new("--no-sandbox"),
        std::ffi::OsStr::new("--disable-gpu"),
        std::ffi::OsStr::new("--disable-dev-shm-usage"),
        std::ffi::OsStr::new("--disable-blink-features=AutomationControlled"),
        std::ffi::OsStr::new(&ua_arg),
    ];

    let browser = Browser::new(LaunchOptions {
        headless: false, // new headless mode is passed via args
        window_size: Some((1920, 1080)),
        args,
        ..Default::default()
    })?;

    let tab = browser.new_tab()?;

    println!("🛒 Navigating to product page: {}", url);
    tab.navigate_to(url)?;

    match tab.wait_for_element_with_custom_timeout("body", Duration::from_secs(15)) {
        Ok(_) => println!("Page body loaded."),
        Err(e) => println!("⚠️ Warning: Body wait timed out: {}. Attempting extraction anyway...", e),
    }

    // Let the review widgets hydrate before the snapshot
    sleep(Duration::from_secs(5)).await;

    let html = tab
        .evaluate("document.documentElement.outerHTML", false)?
        .value
        .and_then(|v| v.as_str().map(|s| s.to_string()))
        .context("page snapshot returned no HTML")?;
    println!("Extracted HTML size via Browser: {} bytes", html.len());

    Ok(parse_product_html(&html))
}

async fn extract_with_fetch(url: &str) -> Result<ProductData> {
    let client = reqwest::Client::builder()
        .user_agent(pick_user_agent())
        .redirect(reqwest::redirect::Policy::limited(10))
        .timeout(Duration::from_secs(30))
        .build()?;

    let resp = client
        .get(url)
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await?;
    let html = resp.text().await?;
    println!("Fetched HTML size: {} bytes", html.len());

    Ok(parse_product_html(&html))
}

/// Pulls title, price, rating and review bodies out of product page HTML.
pub fn parse_product_html(html: &str) -> ProductData {
    let document = Html::parse_document(html);

    let title = select_text(&document, "#productTitle");

    let price_text = select_text(&document, ".a-price-whole")
        .or_else(|| select_text(&document, ".a-offscreen"));
    let price = price_text.as_deref().and_then(parse_price);

    let rating = select_text(&document, "span[data-hook='rating-out-of-text']")
        .or_else(|| select_text(&document, ".a-icon-alt"))
        .or_else(|| find_out_of_five_span(&document))
        .map(|raw| normalize_rating(&raw));

    let review_selector =
        Selector::parse("span[data-hook='review-body']").expect("review selector");
    let reviews: Vec<String> = document
        .select(&review_selector)
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .take(MAX_REVIEWS)
        .collect();

    println!("📝 Extracted {} review(s) from page", reviews.len());

    ProductData {
        title,
        price_text,
        price,
        rating,
        reviews,
    }
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Last-ditch rating lookup: any span whose text mentions "out of 5".
fn find_out_of_five_span(document: &Html) -> Option<String> {
    let selector = Selector::parse("span").ok()?;
    document
        .select(&selector)
        .map(|e| e.text().collect::<String>().trim().to_string())
        .find(|t| t.contains("out of 5"))
}

/// Strips thousands separators and currency noise, keeping the leading
/// integer amount ("1,299.00" -> 1299).
pub fn parse_price(text: &str) -> Option<i64> {
    let cleaned = text.replace(',', "");
    PRICE_DIGITS_RE
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// Reduces a scraped rating string to its leading numeric form
/// ("4.3 out of 5 stars" -> "4.3"). Raw text is kept when no digit is found.
pub fn normalize_rating(raw: &str) -> String {
    RATING_LEAD_RE
        .find(raw)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| raw.to_string())
}
