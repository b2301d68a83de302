use crate::config::Config;
use crate::market::{fetch_quotes, MarketClient, QuoteCache, StockQuote};
use crate::policy::PolicySettings;
use crate::scoring::{evaluate, ScoreResult};
use anyhow::Result;
use std::collections::HashSet;

/// Fetch quotes for the configured watchlist, score them against the active
/// policy settings, and return them ranked best-first.
///
/// This function is called from main.rs for one-shot runs and from the TUI
/// event loop for manual/auto refresh.
pub async fn fetch_and_score_stocks(
    client: &MarketClient,
    config: &Config,
    settings: &PolicySettings,
    cache: Option<&QuoteCache>,
    verbose: bool,
) -> Result<Vec<(StockQuote, ScoreResult)>> {
    let symbols: Vec<String> = config
        .watchlist
        .iter()
        .map(|t| t.symbol.clone())
        .collect();
    fetch_and_score_symbols(client, &symbols, settings, cache, verbose).await
}

/// Same as [`fetch_and_score_stocks`] but over an explicit symbol list (the
/// TUI owns its own watchlist copy so session edits don't touch the config).
pub async fn fetch_and_score_symbols(
    client: &MarketClient,
    symbols: &[String],
    settings: &PolicySettings,
    cache: Option<&QuoteCache>,
    verbose: bool,
) -> Result<Vec<(StockQuote, ScoreResult)>> {
    // Deduplicate symbols (a ticker may be listed twice by hand)
    let mut seen = HashSet::new();
    let unique_symbols: Vec<String> = symbols
        .iter()
        .filter(|s| seen.insert(s.as_str()))
        .cloned()
        .collect();

    if verbose {
        crate::buffered_eprintln!("Fetching {} symbols", unique_symbols.len());
    }

    let report = fetch_quotes(client, &unique_symbols, cache, verbose).await;

    for (symbol, reason) in &report.failures {
        crate::buffered_eprintln!("Fetch failed: {} - {}", symbol, reason);
    }

    if report.quotes.is_empty() && !unique_symbols.is_empty() {
        anyhow::bail!("All quotes failed. Check your network connection and ticker symbols.");
    }

    if verbose {
        crate::buffered_eprintln!(
            "Fetched {} quotes ({} from cache, {} failed)",
            report.quotes.len(),
            report.from_cache,
            report.failures.len()
        );
    }

    Ok(score_and_rank(report.quotes, settings))
}

/// Score quotes against the given settings and sort by score descending,
/// symbol ascending for ties. Pure; the TUI reuses it when a policy input
/// flips so held quotes re-rank without a refetch.
pub fn score_and_rank(
    quotes: Vec<StockQuote>,
    settings: &PolicySettings,
) -> Vec<(StockQuote, ScoreResult)> {
    let mut scored: Vec<(StockQuote, ScoreResult)> = quotes
        .into_iter()
        .map(|quote| {
            let result = evaluate(settings, &quote.metrics);
            (quote, result)
        })
        .collect();

    scored.sort_by(|a, b| {
        // Primary: score descending
        b.1.score
            .cmp(&a.1.score)
            // Tie-breaker: symbol ascending
            .then_with(|| a.0.symbol.cmp(&b.0.symbol))
    });

    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::StockMetrics;
    use crate::policy::{BalanceSheetTrend, RateLevel};
    use chrono::Utc;

    fn quote(symbol: &str, revenue: f64, earnings: f64, pe: f64, debt: f64) -> StockQuote {
        StockQuote {
            symbol: symbol.to_string(),
            company_name: None,
            metrics: StockMetrics {
                revenue_growth_pct: revenue,
                earnings_growth_pct: earnings,
                pe_ratio: pe,
                debt_to_ebitda: debt,
            },
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_rank_sorts_by_score_descending() {
        let settings = PolicySettings::new(RateLevel::High, BalanceSheetTrend::Decreasing);
        let quotes = vec![
            quote("JUNK", 0.0, -5.0, 40.0, 6.0), // -3
            quote("VALU", 0.0, 0.0, 10.0, 1.0),  // +3
            quote("MEH", 0.0, 0.0, 20.0, 3.0),   // 0
        ];

        let ranked = score_and_rank(quotes, &settings);
        let symbols: Vec<&str> = ranked.iter().map(|(q, _)| q.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["VALU", "MEH", "JUNK"]);
        assert_eq!(ranked[0].1.score, 3);
        assert_eq!(ranked[2].1.score, -3);
    }

    #[test]
    fn test_rank_ties_break_by_symbol() {
        let settings = PolicySettings::new(RateLevel::High, BalanceSheetTrend::Increasing);
        let quotes = vec![
            quote("ZZZ", 0.0, 0.0, 20.0, 3.0),
            quote("AAA", 0.0, 0.0, 20.0, 3.0),
        ];

        let ranked = score_and_rank(quotes, &settings);
        assert_eq!(ranked[0].0.symbol, "AAA");
        assert_eq!(ranked[1].0.symbol, "ZZZ");
    }

    #[test]
    fn test_rescoring_under_new_settings_changes_rank() {
        // A hypergrowth name outranks a value name only in the easing regime
        let growth = quote("GRW", 60.0, 15.0, 30.0, 3.0);
        let value = quote("VAL", 0.0, 0.0, 10.0, 1.0);

        let tightening = PolicySettings::new(RateLevel::High, BalanceSheetTrend::Decreasing);
        let ranked = score_and_rank(vec![growth.clone(), value.clone()], &tightening);
        assert_eq!(ranked[0].0.symbol, "VAL");

        let easing = PolicySettings::new(RateLevel::Low, BalanceSheetTrend::Increasing);
        let ranked = score_and_rank(vec![growth, value], &easing);
        assert_eq!(ranked[0].0.symbol, "GRW");
    }
}
