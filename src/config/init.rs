use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, Config, TickerConfig};
use crate::market::normalize_symbol;
use crate::policy::{
    get_settings_path, save_settings, BalanceSheetTrend, PolicySettings, RateLevel,
};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout().flush().context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Print text with a typewriter effect, one character at a time.
fn typewriter(text: &str) {
    use std::thread;
    use std::time::Duration;
    for c in text.chars() {
        print!("{}", c);
        std::io::stdout().flush().ok();
        thread::sleep(Duration::from_millis(18));
    }
    println!();
}

/// Run the interactive init wizard to create the config and settings files.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    typewriter("Stock Scout Configuration Wizard");
    println!("================================");
    println!();

    // 1. Macro policy settings
    typewriter("First, the macro backdrop. The scorer reads the monetary regime from two inputs:");
    typewriter("interest-rate level and the central bank's balance-sheet trend.");
    println!();

    let rates = loop {
        let input = prompt_with_default("Interest rates (high/low)", "high")?;
        match input.to_lowercase().as_str() {
            "high" => break RateLevel::High,
            "low" => break RateLevel::Low,
            other => println!("  Invalid: '{}'. Enter 'high' or 'low'.", other),
        }
    };

    let balance_sheet = loop {
        let input = prompt_with_default("Balance sheet trend (increasing/decreasing)", "decreasing")?;
        match input.to_lowercase().as_str() {
            "increasing" => break BalanceSheetTrend::Increasing,
            "decreasing" => break BalanceSheetTrend::Decreasing,
            other => println!("  Invalid: '{}'. Enter 'increasing' or 'decreasing'.", other),
        }
    };

    let settings = PolicySettings::new(rates, balance_sheet);

    // 2. Watchlist (at least one ticker required)
    println!();
    typewriter("Now your watchlist. These are the tickers fetched and ranked on every run.");
    typewriter("Use the exchange symbol, e.g. AAPL, SMCI, BRK.B.");
    println!();

    let mut watchlist: Vec<TickerConfig> = Vec::new();
    loop {
        let symbol = loop {
            let s = prompt("Ticker symbol: ")?;
            match normalize_symbol(&s) {
                Ok(symbol) => break symbol,
                Err(e) => println!("  Invalid: {}. Try again.", e),
            }
        };

        let name = prompt("Company name (optional, Enter to skip): ")?;
        watchlist.push(TickerConfig {
            symbol,
            name: if name.is_empty() { None } else { Some(name) },
        });

        let add_another = prompt_yes_no("Add another ticker?", watchlist.len() < 3)?;
        if !add_another {
            break;
        }
    }

    // 3. Tuning
    println!();
    let auto_refresh_interval: u64 = loop {
        let input = prompt_with_default("Auto-refresh interval in seconds (TUI)", "300")?;
        match input.parse::<u64>() {
            Ok(v) if v >= 30 => break v,
            Ok(_) => println!("  Invalid: must be at least 30 seconds. Try again."),
            Err(_) => println!("  Invalid: must be a number of seconds. Try again."),
        }
    };

    let cache_ttl = loop {
        let input = prompt_with_default("Quote cache freshness (e.g. 15m, 1h)", "15m")?;
        match humantime::parse_duration(&input) {
            Ok(_) => break input,
            Err(e) => println!("  Invalid duration: {}. Try again.", e),
        }
    };

    // 4. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    // Check if file already exists
    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 5. Write config and settings
    let config = Config {
        watchlist,
        auto_refresh_interval,
        cache_ttl,
    };

    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    let settings_path = get_settings_path();
    save_settings(&settings_path, &settings)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Policy settings written to {}", settings_path.display());
    typewriter("Flip the policy inputs any time from the dashboard (i and t), or pass --rates/--balance-sheet for a one-off run.");
    println!("Run `stock-scout` to get started.");

    Ok(())
}
