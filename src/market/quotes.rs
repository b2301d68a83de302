use anyhow::{anyhow, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_retry::{strategy::ExponentialBackoff, Retry};

use super::cache::QuoteCache;
use super::client::MarketClient;
use super::types::{QuoteSummaryEnvelope, StockQuote};

const MAX_CONCURRENT_FETCHES: usize = 4;

/// Fetch the scoring fundamentals for one ticker
///
/// Retries transient failures with exponential backoff (3 attempts) before
/// giving up, the same policy the original data source needed in practice.
pub async fn fetch_quote(client: &MarketClient, symbol: &str) -> Result<StockQuote> {
    let retry_strategy = ExponentialBackoff::from_millis(100)
        .max_delay(std::time::Duration::from_secs(5))
        .take(3);

    let envelope = Retry::spawn(retry_strategy, || async {
        request_quote_summary(client, symbol).await
    })
    .await?;

    let body = envelope.quote_summary;
    if let Some(error) = body.error {
        return Err(anyhow!(
            "Market data error for {}: {}",
            symbol,
            error.description.unwrap_or_else(|| "unknown".to_string())
        ));
    }

    let result = body
        .result
        .and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.remove(0))
            }
        })
        .ok_or_else(|| anyhow!("No data found for {}", symbol))?;

    Ok(result.into_quote(symbol.to_string()))
}

async fn request_quote_summary(
    client: &MarketClient,
    symbol: &str,
) -> Result<QuoteSummaryEnvelope> {
    let url = format!(
        "{}/v10/finance/quoteSummary/{}?modules=price,summaryDetail,financialData",
        client.base_url, symbol
    );

    let response = client
        .http
        .get(&url)
        .send()
        .await
        .map_err(|e| anyhow!("Network error fetching {}: {}", symbol, e))?;

    let status = response.status();
    if status.as_u16() == 404 {
        return Err(anyhow!(
            "Unknown symbol '{}'. Check the ticker spelling.",
            symbol
        ));
    }
    if status.as_u16() == 429 || status.as_u16() == 403 {
        return Err(anyhow!(
            "Market data API rate limit exceeded. Wait a few minutes and try again."
        ));
    }
    if !status.is_success() {
        return Err(anyhow!("Market data API error for {}: HTTP {}", symbol, status));
    }

    response
        .json::<QuoteSummaryEnvelope>()
        .await
        .map_err(|e| anyhow!("Malformed market data response for {}: {}", symbol, e))
}

/// Outcome of a batch fetch. Failures are reported per symbol so one bad
/// ticker never sinks the rest of the watchlist.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub quotes: Vec<StockQuote>,
    pub failures: Vec<(String, String)>,
    pub from_cache: usize,
}

/// Fetch quotes for a list of symbols with bounded concurrency
///
/// Cache hits are served without touching the network. Once a rate limit is
/// observed, remaining symbols are skipped and recorded as failures instead
/// of hammering the API further.
pub async fn fetch_quotes(
    client: &MarketClient,
    symbols: &[String],
    cache: Option<&QuoteCache>,
    verbose: bool,
) -> FetchReport {
    let mut report = FetchReport::default();

    // Serve what we can from the cache before fanning out
    let mut to_fetch = Vec::new();
    for symbol in symbols {
        match cache.and_then(|c| c.get(symbol)) {
            Some(quote) => {
                if verbose {
                    crate::buffered_eprintln!("  {} served from cache", symbol);
                }
                report.from_cache += 1;
                report.quotes.push(quote);
            }
            None => to_fetch.push(symbol.clone()),
        }
    }

    let rate_limited = Arc::new(AtomicBool::new(false));

    let mut futures = FuturesUnordered::new();
    let mut symbols_iter = to_fetch.into_iter();

    for _ in 0..MAX_CONCURRENT_FETCHES {
        if let Some(symbol) = symbols_iter.next() {
            futures.push(fetch_with_rate_limit_check(
                client.clone(),
                symbol,
                rate_limited.clone(),
            ));
        }
    }

    while let Some((symbol, result)) = futures.next().await {
        match result {
            Ok(quote) => {
                if let Some(cache) = cache {
                    cache.put(&quote);
                }
                report.quotes.push(quote);
            }
            Err(e) => report.failures.push((symbol, e.to_string())),
        }

        // Feed the next symbol unless the API already pushed back
        if !rate_limited.load(Ordering::Relaxed) {
            if let Some(next) = symbols_iter.next() {
                futures.push(fetch_with_rate_limit_check(
                    client.clone(),
                    next,
                    rate_limited.clone(),
                ));
            }
        }
    }

    // Symbols never submitted because of the rate limit
    for symbol in symbols_iter {
        report
            .failures
            .push((symbol, "skipped after rate limit".to_string()));
    }

    report
}

async fn fetch_with_rate_limit_check(
    client: MarketClient,
    symbol: String,
    rate_limited: Arc<AtomicBool>,
) -> (String, Result<StockQuote>) {
    if rate_limited.load(Ordering::Relaxed) {
        return (symbol, Err(anyhow!("skipped after rate limit")));
    }

    let result = fetch_quote(&client, &symbol).await;
    if let Err(e) = &result {
        if e.to_string().contains("rate limit") {
            rate_limited.store(true, Ordering::Relaxed);
        }
    }
    (symbol, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn summary_body(revenue: f64, earnings: f64, pe: f64, debt: f64, ebitda: f64) -> serde_json::Value {
        serde_json::json!({
            "quoteSummary": {
                "result": [{
                    "price": {"longName": "Test Corp"},
                    "summaryDetail": {"trailingPE": {"raw": pe}},
                    "financialData": {
                        "revenueGrowth": {"raw": revenue},
                        "earningsGrowth": {"raw": earnings},
                        "totalDebt": {"raw": debt},
                        "ebitda": {"raw": ebitda}
                    }
                }],
                "error": null
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_quote_maps_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/TEST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(summary_body(0.25, 0.1, 18.0, 4.0, 2.0)),
            )
            .mount(&server)
            .await;

        let client = MarketClient::with_base_url(&server.uri()).unwrap();
        let quote = fetch_quote(&client, "TEST").await.unwrap();

        assert_eq!(quote.symbol, "TEST");
        assert_eq!(quote.company_name.as_deref(), Some("Test Corp"));
        assert!((quote.metrics.revenue_growth_pct - 25.0).abs() < 1e-9);
        assert!((quote.metrics.earnings_growth_pct - 10.0).abs() < 1e-9);
        assert!((quote.metrics.debt_to_ebitda - 2.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_fetch_quote_unknown_symbol() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = MarketClient::with_base_url(&server.uri()).unwrap();
        let err = fetch_quote(&client, "NOPE").await.unwrap_err();
        assert!(err.to_string().contains("Unknown symbol"));
    }

    #[tokio::test]
    async fn test_fetch_quote_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "quoteSummary": {"result": [], "error": null}
            })))
            .mount(&server)
            .await;

        let client = MarketClient::with_base_url(&server.uri()).unwrap();
        let err = fetch_quote(&client, "EMPTY").await.unwrap_err();
        assert!(err.to_string().contains("No data found"));
    }

    #[tokio::test]
    async fn test_fetch_quote_retries_transient_failures() {
        let server = MockServer::start().await;
        // First two attempts fail, third succeeds
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(summary_body(0.0, 0.0, 10.0, 0.0, 1.0)),
            )
            .mount(&server)
            .await;

        let client = MarketClient::with_base_url(&server.uri()).unwrap();
        let quote = fetch_quote(&client, "FLAKY").await.unwrap();
        assert_eq!(quote.symbol, "FLAKY");
    }

    #[tokio::test]
    async fn test_fetch_quotes_partial_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/GOOD"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(summary_body(0.1, 0.1, 12.0, 1.0, 1.0)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/BAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = MarketClient::with_base_url(&server.uri()).unwrap();
        let symbols = vec!["GOOD".to_string(), "BAD".to_string()];
        let report = fetch_quotes(&client, &symbols, None, false).await;

        assert_eq!(report.quotes.len(), 1);
        assert_eq!(report.quotes[0].symbol, "GOOD");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "BAD");
    }
}
