use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use stock_scout::market::{MarketClient, QuoteCache, StockMetrics, StockQuote};
use stock_scout::policy::{BalanceSheetTrend, RateLevel};
use stock_scout::scoring::evaluate;
use stock_scout::tui::{resolve_theme, ThemeColors};

const EXIT_SUCCESS: i32 = 0;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank the watchlist by score (default if no subcommand)
    List {
        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Score one ticker; metrics are fetched unless all four are given
    Analyze {
        /// Ticker symbol (e.g. SMCI)
        symbol: String,
        /// Revenue growth in percent (manual entry)
        #[arg(long)]
        revenue_growth: Option<f64>,
        /// Earnings growth in percent (manual entry)
        #[arg(long)]
        earnings_growth: Option<f64>,
        /// Trailing P/E ratio (manual entry)
        #[arg(long)]
        pe: Option<f64>,
        /// Debt/EBITDA ratio (manual entry)
        #[arg(long)]
        debt_ebitda: Option<f64>,
    },
    /// Open a stock's quote page in the browser
    Open {
        /// Rank number from `list` (1-based) or a ticker symbol
        target: String,
    },
    /// Launch the interactive dashboard
    Ui,
    /// Create the config and settings files interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "stock-scout")]
#[command(about = "Rank a stock watchlist against the macro regime", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/stock-scout/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Skip the quote cache and hit the API directly
    #[arg(long, global = true)]
    no_cache: bool,

    /// Override the saved interest-rate level for this run
    #[arg(long, global = true, value_enum)]
    rates: Option<RateLevel>,

    /// Override the saved balance-sheet trend for this run
    #[arg(long, global = true, value_enum)]
    balance_sheet: Option<BalanceSheetTrend>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::List { tsv: false });
    let start_time = Instant::now();

    // Init runs before any config is required
    if let Commands::Init = command {
        let config_path = cli.config.map(PathBuf::from);
        if let Err(e) = stock_scout::config::run_init_wizard(config_path) {
            eprintln!("Init failed: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match stock_scout::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if cli.verbose {
        eprintln!("Loaded {} tickers from config", config.watchlist.len());
        for (i, ticker) in config.watchlist.iter().enumerate() {
            eprintln!(
                "  Ticker {}: {} ({})",
                i + 1,
                ticker.symbol,
                ticker.name.as_deref().unwrap_or("(unnamed)")
            );
        }
    }

    // Load policy settings, then apply any CLI overrides for this run
    let settings_path = stock_scout::policy::get_settings_path();
    let mut settings = match stock_scout::policy::load_settings(&settings_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Settings error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    if let Some(rates) = cli.rates {
        settings.rates = rates;
    }
    if let Some(balance_sheet) = cli.balance_sheet {
        settings.balance_sheet = balance_sheet;
    }

    if cli.verbose {
        eprintln!(
            "Policy: rates {}, balance sheet {} ({} regime)",
            settings.rates,
            settings.balance_sheet,
            settings.regime_label()
        );
    }

    // Quote cache (disabled by --no-cache)
    let cache = if cli.no_cache {
        None
    } else {
        match config.cache_ttl_duration() {
            Ok(ttl) => Some(QuoteCache::new(stock_scout::market::get_cache_path(), ttl)),
            Err(e) => {
                eprintln!("Config error: {}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    };

    // Market data client
    let client = match MarketClient::new() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create market data client: {}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };

    match command {
        Commands::List { tsv } => {
            if config.watchlist.is_empty() {
                eprintln!("No tickers configured. Add a watchlist to the config file:");
                eprintln!("  watchlist:");
                eprintln!("    - symbol: AAPL");
                std::process::exit(EXIT_CONFIG);
            }

            let scored = match stock_scout::fetch::fetch_and_score_stocks(
                &client,
                &config,
                &settings,
                cache.as_ref(),
                cli.verbose,
            )
            .await
            {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_NETWORK);
                }
            };

            let scored_refs: Vec<stock_scout::output::ScoredStock> = scored
                .iter()
                .map(|(quote, result)| stock_scout::output::ScoredStock { quote, result })
                .collect();

            if tsv {
                let output = stock_scout::output::format_tsv(&scored_refs);
                if !output.is_empty() {
                    println!("{}", output);
                }
            } else {
                let use_colors = stock_scout::output::should_use_colors();
                println!(
                    "{}",
                    stock_scout::output::format_stock_table(&scored_refs, use_colors)
                );
            }

            if cli.verbose {
                eprintln!();
                eprintln!(
                    "Total: {} stocks in {:?}",
                    scored.len(),
                    start_time.elapsed()
                );
            }
        }
        Commands::Analyze {
            symbol,
            revenue_growth,
            earnings_growth,
            pe,
            debt_ebitda,
        } => {
            let symbol = match stock_scout::market::normalize_symbol(&symbol) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };

            let manual_flags = [revenue_growth, earnings_growth, pe, debt_ebitda];
            let provided = manual_flags.iter().filter(|f| f.is_some()).count();

            let quote = match provided {
                // Manual entry: no network involved
                4 => StockQuote {
                    symbol,
                    company_name: None,
                    metrics: StockMetrics {
                        revenue_growth_pct: revenue_growth.unwrap(),
                        earnings_growth_pct: earnings_growth.unwrap(),
                        pe_ratio: pe.unwrap(),
                        debt_to_ebitda: debt_ebitda.unwrap(),
                    },
                    fetched_at: chrono::Utc::now(),
                },
                0 => match cache.as_ref().and_then(|c| c.get(&symbol)) {
                    Some(quote) => quote,
                    None => match stock_scout::market::fetch_quote(&client, &symbol).await {
                        Ok(quote) => {
                            if let Some(cache) = cache.as_ref() {
                                cache.put(&quote);
                            }
                            quote
                        }
                        Err(e) => {
                            eprintln!("{}", e);
                            std::process::exit(EXIT_NETWORK);
                        }
                    },
                },
                _ => {
                    eprintln!(
                        "Manual entry needs all four metrics: \
                         --revenue-growth, --earnings-growth, --pe, --debt-ebitda"
                    );
                    std::process::exit(EXIT_CONFIG);
                }
            };

            let result = evaluate(&settings, &quote.metrics);
            let use_colors = stock_scout::output::should_use_colors();
            println!(
                "{}",
                stock_scout::output::format_stock_detail(&quote, &result, use_colors)
            );
        }
        Commands::Open { target } => {
            // A rank number refers to the current `list` ordering; a symbol
            // opens its quote page directly without a fetch.
            let url = if let Ok(index) = target.parse::<usize>() {
                let scored = match stock_scout::fetch::fetch_and_score_stocks(
                    &client,
                    &config,
                    &settings,
                    cache.as_ref(),
                    cli.verbose,
                )
                .await
                {
                    Ok(s) => s,
                    Err(e) => {
                        eprintln!("{}", e);
                        std::process::exit(EXIT_NETWORK);
                    }
                };

                if index < 1 || index > scored.len() {
                    eprintln!(
                        "Invalid rank {}. Must be between 1 and {}.",
                        index,
                        scored.len()
                    );
                    std::process::exit(EXIT_CONFIG);
                }
                scored[index - 1].0.quote_url()
            } else {
                match stock_scout::market::normalize_symbol(&target) {
                    Ok(symbol) => format!("https://finance.yahoo.com/quote/{}", symbol),
                    Err(e) => {
                        eprintln!("{}", e);
                        std::process::exit(EXIT_CONFIG);
                    }
                }
            };

            if let Err(e) = stock_scout::browser::open_url(&url) {
                eprintln!("Failed to open browser: {}", e);
                std::process::exit(EXIT_NETWORK);
            }
            println!("Opening {}", url);
        }
        Commands::Ui => {
            let theme = ThemeColors::for_theme(resolve_theme());
            let app = stock_scout::tui::App::new_loading(
                config,
                settings,
                settings_path,
                cache.map(Arc::new),
                cli.verbose,
                theme,
            );
            if let Err(e) = stock_scout::tui::run_tui(app, client).await {
                eprintln!("Dashboard error: {}", e);
                std::process::exit(EXIT_NETWORK);
            }
        }
        Commands::Init => unreachable!("handled above"),
    }

    std::process::exit(EXIT_SUCCESS);
}
