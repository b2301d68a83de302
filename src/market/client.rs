use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// HTTP client for the market-data API. Cheap to clone.
#[derive(Clone)]
pub struct MarketClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
}

impl MarketClient {
    /// Create a client against the public endpoint. The endpoint rejects
    /// requests without a User-Agent, so one is always set.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against an alternate base URL (used by tests)
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("stock-scout/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create market data client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}
