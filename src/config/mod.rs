mod init;
mod schema;

pub use init::run_init_wizard;
pub use schema::{Config, TickerConfig};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/stock-scout/)
pub fn get_config_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Could not determine home directory");
    home.join(".config").join("stock-scout")
}

/// Get the default config file path (~/.config/stock-scout/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Ensure the config directory exists
pub fn ensure_config_dir() -> Result<()> {
    let config_dir = get_config_dir();
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir).with_context(|| {
            format!(
                "Failed to create config directory at {}",
                config_dir.display()
            )
        })?;
    }
    Ok(())
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/stock-scout/config.yaml)
///
/// # Errors
///
/// Returns an error if the config file is missing, unreadable, fails to
/// parse, or contains an invalid ticker symbol.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        anyhow::bail!(
            "Config file not found at {}. Run `stock-scout init` to create one.",
            config_path.display()
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let mut config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    // Normalize symbols up front so everything downstream sees clean tickers
    for ticker in &mut config.watchlist {
        ticker.symbol = crate::market::normalize_symbol(&ticker.symbol)
            .with_context(|| format!("Invalid watchlist entry in {}", config_path.display()))?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(dir.path().join("config.yaml"))).unwrap_err();
        assert!(err.to_string().contains("stock-scout init"));
    }

    #[test]
    fn test_load_config_normalizes_symbols() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "watchlist:\n  - symbol: smci\n  - symbol: ' aapl '\n").unwrap();

        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.watchlist[0].symbol, "SMCI");
        assert_eq!(config.watchlist[1].symbol, "AAPL");
    }

    #[test]
    fn test_load_config_rejects_bad_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "watchlist:\n  - symbol: 'A;B'\n").unwrap();

        assert!(load_config(Some(path)).is_err());
    }
}
