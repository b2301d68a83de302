use crate::config::Config;
use crate::market::{normalize_symbol, QuoteCache, StockQuote};
use crate::policy::PolicySettings;
use crate::scoring::ScoreResult;
use crate::tui::theme::ThemeColors;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    AddTicker,
    Help,
    Breakdown,
}

/// All mutable dashboard state lives here: the analyzed-stock list, the
/// session watchlist, the active policy settings, and the widget state. The
/// render and update layers receive it explicitly.
pub struct App {
    pub stocks: Vec<(StockQuote, ScoreResult)>,
    pub watchlist: Vec<String>,
    pub table_state: ratatui::widgets::TableState,
    pub settings: PolicySettings,
    pub settings_path: PathBuf,
    pub settings_dirty: bool,
    pub input_mode: InputMode,
    pub ticker_input: String,
    pub flash_message: Option<(String, Instant)>,
    pub last_refresh: Instant,
    pub last_interaction: Instant,
    pub needs_refresh: bool,
    pub force_refresh: bool,
    pub should_quit: bool,
    pub config: Config,
    pub cache: Option<Arc<QuoteCache>>,
    pub verbose: bool,
    pub is_loading: bool,
    pub spinner_frame: usize,
    pub theme: ThemeColors,
}

impl App {
    /// Create an App with an empty stock list in loading state; the first
    /// background fetch fills it in.
    pub fn new_loading(
        config: Config,
        settings: PolicySettings,
        settings_path: PathBuf,
        cache: Option<Arc<QuoteCache>>,
        verbose: bool,
        theme: ThemeColors,
    ) -> Self {
        let watchlist = config.watchlist.iter().map(|t| t.symbol.clone()).collect();
        Self {
            stocks: Vec::new(),
            watchlist,
            table_state: ratatui::widgets::TableState::default(),
            settings,
            settings_path,
            settings_dirty: false,
            input_mode: InputMode::Normal,
            ticker_input: String::new(),
            flash_message: None,
            last_refresh: Instant::now(),
            last_interaction: Instant::now(),
            needs_refresh: false,
            force_refresh: false,
            should_quit: false,
            config,
            cache,
            verbose,
            is_loading: true,
            spinner_frame: 0,
            theme,
        }
    }

    pub fn next_row(&mut self) {
        if self.stocks.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= self.stocks.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        if self.stocks.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.stocks.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected_stock(&self) -> Option<&(StockQuote, ScoreResult)> {
        self.table_state.selected().and_then(|i| self.stocks.get(i))
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    /// Advance the loading spinner animation frame
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }

    /// Open the selected stock's quote page in the browser
    pub fn open_selected(&self) -> anyhow::Result<()> {
        if let Some((quote, _)) = self.selected_stock() {
            crate::browser::open_url(&quote.quote_url())?;
        }
        Ok(())
    }

    /// Start add-ticker input mode
    pub fn start_ticker_input(&mut self) {
        self.input_mode = InputMode::AddTicker;
        self.ticker_input.clear();
    }

    /// Confirm and apply the add-ticker input
    pub fn confirm_ticker_input(&mut self) {
        let input = self.ticker_input.clone();
        self.input_mode = InputMode::Normal;
        self.ticker_input.clear();

        let symbol = match normalize_symbol(&input) {
            Ok(s) => s,
            Err(e) => {
                self.show_flash(format!("{}", e));
                return;
            }
        };

        if self.watchlist.contains(&symbol) {
            self.show_flash(format!("{} is already on the watchlist", symbol));
            return;
        }

        self.watchlist.push(symbol.clone());
        self.needs_refresh = true;
        self.show_flash(format!("Added {} (session only)", symbol));
    }

    /// Cancel add-ticker input
    pub fn cancel_ticker_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.ticker_input.clear();
    }

    /// Drop the selected stock from the session watchlist
    pub fn remove_selected(&mut self) {
        let symbol = match self.selected_stock() {
            Some((quote, _)) => quote.symbol.clone(),
            None => return,
        };

        self.watchlist.retain(|s| s != &symbol);
        self.stocks.retain(|(q, _)| q.symbol != symbol);
        self.clamp_selection();
        self.show_flash(format!("Removed {} (session only)", symbol));
    }

    /// Flip the interest-rate input and re-rank in place
    pub fn flip_rates(&mut self) {
        self.settings.flip_rates();
        self.settings_dirty = true;
        self.rescore_held();
        self.show_flash(format!(
            "Rates: {} ({} regime, s to save)",
            self.settings.rates,
            self.settings.regime_label()
        ));
    }

    /// Flip the balance-sheet input and re-rank in place
    pub fn flip_balance_sheet(&mut self) {
        self.settings.flip_balance_sheet();
        self.settings_dirty = true;
        self.rescore_held();
        self.show_flash(format!(
            "Balance sheet: {} ({} regime, s to save)",
            self.settings.balance_sheet,
            self.settings.regime_label()
        ));
    }

    /// Persist the current policy settings
    pub fn save_policy_settings(&mut self) {
        match crate::policy::save_settings(&self.settings_path, &self.settings) {
            Ok(()) => {
                self.settings_dirty = false;
                self.show_flash("Policy settings saved".to_string());
            }
            Err(e) => self.show_flash(format!("Failed to save settings: {}", e)),
        }
    }

    /// Re-score the held quotes against the current settings without a
    /// refetch; metrics don't depend on policy, so nothing is stale.
    pub fn rescore_held(&mut self) {
        let quotes: Vec<StockQuote> = self.stocks.drain(..).map(|(q, _)| q).collect();
        self.stocks = crate::fetch::score_and_rank(quotes, &self.settings);
        self.clamp_selection();
    }

    /// Show the rule breakdown overlay for the selected stock
    pub fn show_breakdown(&mut self) {
        if self.selected_stock().is_some() {
            self.input_mode = InputMode::Breakdown;
        }
    }

    pub fn dismiss_breakdown(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Replace the stock list with fresh fetch results
    pub fn update_stocks(&mut self, stocks: Vec<(StockQuote, ScoreResult)>) {
        self.stocks = stocks;
        self.clamp_selection();
        self.last_refresh = Instant::now();
        self.show_flash(format!("Refreshed ({} stocks)", self.stocks.len()));
    }

    fn clamp_selection(&mut self) {
        if self.stocks.is_empty() {
            self.table_state.select(None);
        } else if let Some(selected) = self.table_state.selected() {
            if selected >= self.stocks.len() {
                self.table_state.select(Some(self.stocks.len() - 1));
            }
        } else {
            self.table_state.select(Some(0));
        }
    }

    pub fn auto_refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.config.auto_refresh_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TickerConfig;
    use crate::market::StockMetrics;
    use crate::policy::{BalanceSheetTrend, RateLevel};
    use crate::tui::theme::ThemeColors;
    use chrono::Utc;

    fn test_app() -> App {
        let config = Config {
            watchlist: vec![
                TickerConfig {
                    symbol: "VALU".to_string(),
                    name: None,
                },
                TickerConfig {
                    symbol: "GRW".to_string(),
                    name: None,
                },
            ],
            auto_refresh_interval: 300,
            cache_ttl: "15m".to_string(),
        };
        App::new_loading(
            config,
            PolicySettings::default(),
            PathBuf::from("/tmp/does-not-exist/settings.json"),
            None,
            false,
            ThemeColors::dark(),
        )
    }

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

    fn seeded_app() -> App {
        let mut app = test_app();
        let quotes = vec![
            quote("VALU", 0.0, 0.0, 10.0, 1.0),
            quote("GRW", 60.0, 15.0, 30.0, 3.0),
        ];
        app.update_stocks(crate::fetch::score_and_rank(quotes, &app.settings));
        app.is_loading = false;
        app
    }

    #[test]
    fn test_watchlist_seeded_from_config() {
        let app = test_app();
        assert_eq!(app.watchlist, vec!["VALU", "GRW"]);
        assert!(app.is_loading);
        assert!(app.table_state.selected().is_none());
    }

    #[test]
    fn test_update_stocks_selects_first_row() {
        let app = seeded_app();
        assert_eq!(app.table_state.selected(), Some(0));
        // Tightening default regime ranks the value name first
        assert_eq!(app.stocks[0].0.symbol, "VALU");
    }

    #[test]
    fn test_row_navigation_wraps() {
        let mut app = seeded_app();
        app.next_row();
        assert_eq!(app.table_state.selected(), Some(1));
        app.next_row();
        assert_eq!(app.table_state.selected(), Some(0));
        app.previous_row();
        assert_eq!(app.table_state.selected(), Some(1));
    }

    #[test]
    fn test_flip_rates_rescores_in_place() {
        let mut app = seeded_app();
        assert_eq!(app.stocks[0].0.symbol, "VALU");

        // high/decreasing -> low/decreasing (mixed) -> still value on top via
        // the leverage bonus; flip the trend too for the easing regime
        app.flip_rates();
        app.flip_balance_sheet();
        assert_eq!(app.settings.rates, RateLevel::Low);
        assert_eq!(app.settings.balance_sheet, BalanceSheetTrend::Increasing);
        assert!(app.settings_dirty);
        assert_eq!(app.stocks[0].0.symbol, "GRW");
    }

    #[test]
    fn test_confirm_ticker_input_adds_and_flags_refresh() {
        let mut app = seeded_app();
        app.start_ticker_input();
        assert_eq!(app.input_mode, InputMode::AddTicker);

        app.ticker_input = "aapl".to_string();
        app.confirm_ticker_input();

        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.watchlist.contains(&"AAPL".to_string()));
        assert!(app.needs_refresh);
    }

    #[test]
    fn test_confirm_ticker_input_rejects_duplicates() {
        let mut app = seeded_app();
        app.start_ticker_input();
        app.ticker_input = "valu".to_string();
        app.confirm_ticker_input();

        assert_eq!(
            app.watchlist.iter().filter(|s| *s == "VALU").count(),
            1
        );
        assert!(!app.needs_refresh);
    }

    #[test]
    fn test_confirm_ticker_input_rejects_invalid() {
        let mut app = seeded_app();
        app.start_ticker_input();
        app.ticker_input = "not a ticker".to_string();
        app.confirm_ticker_input();

        assert_eq!(app.watchlist.len(), 2);
        assert!(app.flash_message.is_some());
    }

    #[test]
    fn test_remove_selected_drops_stock_and_symbol() {
        let mut app = seeded_app();
        app.remove_selected(); // VALU is selected
        assert_eq!(app.watchlist, vec!["GRW"]);
        assert_eq!(app.stocks.len(), 1);
        assert_eq!(app.table_state.selected(), Some(0));

        app.remove_selected();
        assert!(app.stocks.is_empty());
        assert!(app.table_state.selected().is_none());
    }

    #[test]
    fn test_breakdown_requires_selection() {
        let mut app = test_app();
        app.show_breakdown();
        assert_eq!(app.input_mode, InputMode::Normal);

        let mut app = seeded_app();
        app.show_breakdown();
        assert_eq!(app.input_mode, InputMode::Breakdown);
    }
}
