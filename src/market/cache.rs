use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;

use super::types::StockQuote;

/// Get the platform-appropriate quote cache directory for stock-scout
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("stock-scout/quotes"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/stock-scout/quotes",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Disk-persistent quote cache with a freshness window
///
/// Entries are JSON blobs in a cacache store keyed by symbol. A stale entry
/// is treated as a miss; the store is content-addressed so overwrites are
/// safe without coordination.
pub struct QuoteCache {
    path: PathBuf,
    ttl: Duration,
}

/// Serializable representation of a cache entry for disk storage
#[derive(serde::Serialize, serde::Deserialize)]
struct CacheEntry {
    fetched_at: DateTime<Utc>,
    quote: StockQuote,
}

impl QuoteCache {
    pub fn new(path: PathBuf, ttl: Duration) -> Self {
        Self { path, ttl }
    }

    /// Look up a fresh quote for a symbol. Stale and unreadable entries are
    /// both misses.
    pub fn get(&self, symbol: &str) -> Option<StockQuote> {
        let bytes = cacache::read_sync(&self.path, symbol.to_uppercase()).ok()?;
        let entry: CacheEntry = serde_json::from_slice(&bytes).ok()?;

        let age = Utc::now().signed_duration_since(entry.fetched_at);
        if age.to_std().ok()? > self.ttl {
            return None;
        }

        Some(entry.quote)
    }

    /// Store a quote. Disk errors are ignored; the cache is an optimization,
    /// not a source of truth.
    pub fn put(&self, quote: &StockQuote) {
        let entry = CacheEntry {
            fetched_at: Utc::now(),
            quote: quote.clone(),
        };
        if let Ok(serialized) = serde_json::to_vec(&entry) {
            let _ = cacache::write_sync(&self.path, quote.symbol.to_uppercase(), &serialized);
        }
    }

    /// Drop every cached entry so the next fetch hits the API
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove cache directory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::types::StockMetrics;

    fn sample_quote(symbol: &str) -> StockQuote {
        StockQuote {
            symbol: symbol.to_string(),
            company_name: Some("Test Corp".to_string()),
            metrics: StockMetrics {
                revenue_growth_pct: 10.0,
                earnings_growth_pct: 5.0,
                pe_ratio: 14.0,
                debt_to_ebitda: 1.5,
            },
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_put_then_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = QuoteCache::new(dir.path().to_path_buf(), Duration::from_secs(60));

        cache.put(&sample_quote("SMCI"));

        let hit = cache.get("SMCI").unwrap();
        assert_eq!(hit.symbol, "SMCI");
        assert_eq!(hit.metrics.pe_ratio, 14.0);
    }

    #[test]
    fn test_get_is_case_insensitive_on_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let cache = QuoteCache::new(dir.path().to_path_buf(), Duration::from_secs(60));

        cache.put(&sample_quote("SMCI"));
        assert!(cache.get("smci").is_some());
    }

    #[test]
    fn test_missing_symbol_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = QuoteCache::new(dir.path().to_path_buf(), Duration::from_secs(60));
        assert!(cache.get("NOPE").is_none());
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = QuoteCache::new(dir.path().to_path_buf(), Duration::from_secs(0));

        cache.put(&sample_quote("SMCI"));
        std::thread::sleep(Duration::from_millis(10));
        assert!(cache.get("SMCI").is_none());
    }

    #[test]
    fn test_clear_empties_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes");
        let cache = QuoteCache::new(path, Duration::from_secs(60));

        cache.put(&sample_quote("SMCI"));
        cache.clear().unwrap();
        assert!(cache.get("SMCI").is_none());

        // Clearing an already-missing directory is fine
        cache.clear().unwrap();
    }
}
