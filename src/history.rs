//! File-backed price history with trend alerts.
//!
//! The store is a flat JSON mapping from product title to the most recent
//! prices seen for it, capped at 20 entries per title. A missing or
//! unreadable file reads as an empty mapping; a failed write is logged and
//! swallowed so the alert still reaches the caller.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::analysis::round2;

const MAX_HISTORY: usize = 20;

type PriceMap = HashMap<String, Vec<i64>>;

pub struct PriceHistoryStore {
    path: PathBuf,
}

impl PriceHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> PriceMap {
        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<PriceMap>(&content) {
                Ok(map) => map,
                Err(e) => {
                    eprintln!("⚠️ Price history file is unreadable, starting fresh: {}", e);
                    PriceMap::new()
                }
            },
            // Absent file is the valid initial state
            Err(_) => PriceMap::new(),
        }
    }

    fn save(&self, data: &PriceMap) -> Result<()> {
        let json = serde_json::to_string(data)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Recorded prices for a title, oldest first.
    pub fn prices_for(&self, title: &str) -> Vec<i64> {
        self.load().get(title).cloned().unwrap_or_default()
    }

    /// Classifies `current_price` against the historical average for `title`,
    /// then appends the observation and persists the trimmed history.
    /// An absent price returns an empty alert and touches nothing.
    pub fn record_and_alert(&self, title: &str, current_price: Option<i64>) -> String {
        let Some(current_price) = current_price else {
            return String::new();
        };

        let mut data = self.load();
        let history = data.entry(title.to_string()).or_default();

        let alert = if history.is_empty() {
            format!("First recorded price: ₹{}✅", current_price)
        } else {
            let avg = history.iter().sum::<i64>() as f64 / history.len() as f64;
            let diff_percent = round2((current_price as f64 - avg) / avg * 100.0);
            if diff_percent <= -5.0 {
                format!("Price is {}% below average – Good Deal 💰", diff_percent.abs())
            } else if diff_percent >= 5.0 {
                format!("Price is {}% above average – Consider waiting ⚠️", diff_percent)
            } else {
                "Price is around average.".to_string()
            }
        };

        history.push(current_price);
        if history.len() > MAX_HISTORY {
            let excess = history.len() - MAX_HISTORY;
            history.drain(..excess);
        }

        if let Err(e) = self.save(&data) {
            eprintln!("⚠️ Failed to persist price history: {}", e);
        }

        alert
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> PriceHistoryStore {
        let mut path = std::env::temp_dir();
        path.push(format!("lifelabel_history_{}_{}.json", std::process::id(), name));
        let _ = fs::remove_file(&path);
        PriceHistoryStore::new(path)
    }

    #[test]
    fn test_first_observation_creates_one_entry_history() {
        let store = temp_store("first");
        let alert = store.record_and_alert("Widget", Some(100));
        assert!(alert.starts_with("First recorded price"), "got: {}", alert);
        assert!(alert.contains("100"));
        assert_eq!(store.prices_for("Widget"), vec![100]);
    }

    #[test]
    fn test_price_above_average_warns() {
        let store = temp_store("above");
        for _ in 0..3 {
            store.record_and_alert("Widget", Some(100));
        }
        let alert = store.record_and_alert("Widget", Some(110));
        assert!(alert.contains("10% above average"), "got: {}", alert);
        assert!(alert.contains("Consider waiting"));
        assert_eq!(store.prices_for("Widget"), vec![100, 100, 100, 110]);
    }

    #[test]
    fn test_price_below_average_is_a_deal() {
        let store = temp_store("below");
        for _ in 0..3 {
            store.record_and_alert("Widget", Some(100));
        }
        let alert = store.record_and_alert("Widget", Some(90));
        assert!(alert.contains("10% below average"), "got: {}", alert);
        assert!(alert.contains("Good Deal"));
    }

    #[test]
    fn test_small_deviation_is_around_average() {
        let store = temp_store("around");
        for _ in 0..3 {
            store.record_and_alert("Widget", Some(100));
        }
        let alert = store.record_and_alert("Widget", Some(102));
        assert_eq!(alert, "Price is around average.");
    }

    #[test]
    fn test_history_is_capped_at_twenty_entries() {
        let store = temp_store("cap");
        for price in 1..=25 {
            store.record_and_alert("Widget", Some(price));
        }
        let prices = store.prices_for("Widget");
        assert_eq!(prices.len(), 20);
        // oldest entries dropped first
        assert_eq!(prices.first(), Some(&6));
        assert_eq!(prices.last(), Some(&25));
    }

    #[test]
    fn test_missing_price_returns_empty_alert_without_mutation() {
        let store = temp_store("noprice");
        assert_eq!(store.record_and_alert("Widget", None), "");
        assert!(store.prices_for("Widget").is_empty());
    }

    #[test]
    fn test_corrupt_store_reads_as_empty() {
        let store = temp_store("corrupt");
        fs::write(&store.path, "{ not json").unwrap();
        let alert = store.record_and_alert("Widget", Some(50));
        assert!(alert.starts_with("First recorded price"));
        assert_eq!(store.prices_for("Widget"), vec![50]);
    }

    #[test]
    fn test_titles_are_tracked_independently() {
        let store = temp_store("independent");
        store.record_and_alert("Widget", Some(100));
        let alert = store.record_and_alert("Gadget", Some(500));
        assert!(alert.starts_with("First recorded price"));
        assert_eq!(store.prices_for("Widget"), vec![100]);
        assert_eq!(store.prices_for("Gadget"), vec![500]);
    }
}
