use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_auto_refresh_interval() -> u64 {
    300
}

fn default_cache_ttl() -> String {
    "15m".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub watchlist: Vec<TickerConfig>,

    /// Seconds between automatic refreshes in the TUI
    #[serde(default = "default_auto_refresh_interval")]
    pub auto_refresh_interval: u64,

    /// How long a fetched quote stays fresh, as a humantime string ("15m", "1h")
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TickerConfig {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Config {
    pub fn cache_ttl_duration(&self) -> Result<Duration> {
        humantime::parse_duration(&self.cache_ttl)
            .with_context(|| format!("Invalid cache_ttl '{}' in config", self.cache_ttl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let yaml = r#"
watchlist:
  - symbol: AAPL
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.watchlist.len(), 1);
        assert_eq!(config.watchlist[0].symbol, "AAPL");
        assert!(config.watchlist[0].name.is_none());
        assert_eq!(config.auto_refresh_interval, 300);
        assert_eq!(config.cache_ttl, "15m");
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
watchlist:
  - symbol: SMCI
    name: Super Micro Computer
  - symbol: AAPL
auto_refresh_interval: 120
cache_ttl: 1h
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.watchlist.len(), 2);
        assert_eq!(
            config.watchlist[0].name.as_deref(),
            Some("Super Micro Computer")
        );
        assert_eq!(config.auto_refresh_interval, 120);
        assert_eq!(
            config.cache_ttl_duration().unwrap(),
            Duration::from_secs(3600)
        );
    }

    #[test]
    fn test_bad_cache_ttl_is_rejected() {
        let yaml = r#"
watchlist:
  - symbol: AAPL
cache_ttl: soonish
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert!(config.cache_ttl_duration().is_err());
    }
}
