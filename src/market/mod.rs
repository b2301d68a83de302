pub mod cache;
pub mod client;
pub mod quotes;
pub mod types;

pub use cache::{get_cache_path, QuoteCache};
pub use client::MarketClient;
pub use quotes::{fetch_quote, fetch_quotes, FetchReport};
pub use types::{normalize_symbol, StockMetrics, StockQuote};
