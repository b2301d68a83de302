use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four fundamentals the scorer consumes. Growth rates are percentages
/// (already multiplied out of the fractional form the API returns).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockMetrics {
    pub revenue_growth_pct: f64,
    pub earnings_growth_pct: f64,
    pub pe_ratio: f64,
    pub debt_to_ebitda: f64,
}

/// A fetched (or manually entered) snapshot of one stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: String,
    pub company_name: Option<String>,
    pub metrics: StockMetrics,
    pub fetched_at: DateTime<Utc>,
}

impl StockQuote {
    /// Quote page for the browser
    pub fn quote_url(&self) -> String {
        format!("https://finance.yahoo.com/quote/{}", self.symbol)
    }

    /// Display name: company name when known, symbol otherwise
    pub fn display_name(&self) -> &str {
        self.company_name.as_deref().unwrap_or(&self.symbol)
    }
}

/// Normalize and validate a ticker symbol: trimmed, uppercased, and limited
/// to the character set exchanges actually use (letters, digits, '.', '-').
pub fn normalize_symbol(input: &str) -> Result<String> {
    let symbol = input.trim().to_uppercase();
    if symbol.is_empty() {
        bail!("Ticker symbol cannot be empty");
    }
    if symbol.len() > 12 {
        bail!("Ticker symbol too long: {}", symbol);
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        bail!("Invalid ticker symbol: {}", symbol);
    }
    Ok(symbol)
}

// Wire types for the quoteSummary endpoint. Numeric fields arrive wrapped
// as {"raw": ..., "fmt": "..."}; only raw is read.

#[derive(Debug, Deserialize)]
pub(crate) struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    pub quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuoteSummaryBody {
    pub result: Option<Vec<QuoteSummaryResult>>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct QuoteSummaryResult {
    pub price: Option<PriceModule>,
    #[serde(rename = "summaryDetail")]
    pub summary_detail: Option<SummaryDetailModule>,
    #[serde(rename = "financialData")]
    pub financial_data: Option<FinancialDataModule>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PriceModule {
    #[serde(rename = "longName")]
    pub long_name: Option<String>,
    #[serde(rename = "shortName")]
    pub short_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SummaryDetailModule {
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FinancialDataModule {
    #[serde(rename = "revenueGrowth")]
    pub revenue_growth: Option<RawValue>,
    #[serde(rename = "earningsGrowth")]
    pub earnings_growth: Option<RawValue>,
    #[serde(rename = "totalDebt")]
    pub total_debt: Option<RawValue>,
    pub ebitda: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawValue {
    pub raw: Option<f64>,
}

impl QuoteSummaryResult {
    /// Map the API modules onto a quote. Missing fields default to 0.0 and
    /// a non-positive EBITDA yields a leverage ratio of 0.0 rather than a
    /// division artifact.
    pub(crate) fn into_quote(self, symbol: String) -> StockQuote {
        fn raw(value: &Option<RawValue>) -> f64 {
            value.as_ref().and_then(|v| v.raw).unwrap_or(0.0)
        }

        let financial = self.financial_data.unwrap_or_default();
        let summary = self.summary_detail.unwrap_or_default();
        let price = self.price.unwrap_or_default();

        let total_debt = raw(&financial.total_debt);
        let ebitda = raw(&financial.ebitda);
        let debt_to_ebitda = if ebitda > 0.0 {
            total_debt / ebitda
        } else {
            0.0
        };

        StockQuote {
            symbol,
            company_name: price.long_name.or(price.short_name),
            metrics: StockMetrics {
                revenue_growth_pct: raw(&financial.revenue_growth) * 100.0,
                earnings_growth_pct: raw(&financial.earnings_growth) * 100.0,
                pe_ratio: raw(&summary.trailing_pe),
                debt_to_ebitda,
            },
            fetched_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol_uppercases_and_trims() {
        assert_eq!(normalize_symbol(" smci ").unwrap(), "SMCI");
        assert_eq!(normalize_symbol("brk.b").unwrap(), "BRK.B");
    }

    #[test]
    fn test_normalize_symbol_rejects_garbage() {
        assert!(normalize_symbol("").is_err());
        assert!(normalize_symbol("   ").is_err());
        assert!(normalize_symbol("AAPL; DROP").is_err());
        assert!(normalize_symbol("TOOLONGSYMBOLXX").is_err());
    }

    #[test]
    fn test_into_quote_maps_growth_to_percent() {
        let body: QuoteSummaryResult = serde_json::from_str(
            r#"{
                "price": {"longName": "Super Micro Computer, Inc."},
                "summaryDetail": {"trailingPE": {"raw": 28.4, "fmt": "28.40"}},
                "financialData": {
                    "revenueGrowth": {"raw": 0.45, "fmt": "45.00%"},
                    "earningsGrowth": {"raw": 0.12, "fmt": "12.00%"},
                    "totalDebt": {"raw": 2000000000.0},
                    "ebitda": {"raw": 1000000000.0}
                }
            }"#,
        )
        .unwrap();

        let quote = body.into_quote("SMCI".to_string());
        assert_eq!(
            quote.company_name.as_deref(),
            Some("Super Micro Computer, Inc.")
        );
        assert!((quote.metrics.revenue_growth_pct - 45.0).abs() < 1e-9);
        assert!((quote.metrics.earnings_growth_pct - 12.0).abs() < 1e-9);
        assert!((quote.metrics.pe_ratio - 28.4).abs() < 1e-9);
        assert!((quote.metrics.debt_to_ebitda - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_into_quote_missing_fields_default_to_zero() {
        let body: QuoteSummaryResult = serde_json::from_str(r#"{}"#).unwrap();
        let quote = body.into_quote("XYZ".to_string());
        assert_eq!(quote.metrics.revenue_growth_pct, 0.0);
        assert_eq!(quote.metrics.earnings_growth_pct, 0.0);
        assert_eq!(quote.metrics.pe_ratio, 0.0);
        assert_eq!(quote.metrics.debt_to_ebitda, 0.0);
        assert!(quote.company_name.is_none());
    }

    #[test]
    fn test_into_quote_negative_ebitda_gives_zero_leverage() {
        let body: QuoteSummaryResult = serde_json::from_str(
            r#"{"financialData": {"totalDebt": {"raw": 100.0}, "ebitda": {"raw": -50.0}}}"#,
        )
        .unwrap();
        let quote = body.into_quote("XYZ".to_string());
        assert_eq!(quote.metrics.debt_to_ebitda, 0.0);
    }

    #[test]
    fn test_quote_url() {
        let quote = StockQuote {
            symbol: "SMCI".to_string(),
            company_name: None,
            metrics: StockMetrics {
                revenue_growth_pct: 0.0,
                earnings_growth_pct: 0.0,
                pe_ratio: 0.0,
                debt_to_ebitda: 0.0,
            },
            fetched_at: Utc::now(),
        };
        assert_eq!(quote.quote_url(), "https://finance.yahoo.com/quote/SMCI");
    }
}
