pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, Theme, ThemeColors};

use std::time::Duration;

use crate::market::MarketClient;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};

pub async fn run_tui(mut app: App, client: MarketClient) -> anyhow::Result<()> {
    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();

    // Create event handler with tick rate and auto-refresh interval
    let refresh_secs = app.config.auto_refresh_interval;
    let mut events = EventHandler::new(250, refresh_secs); // 250ms tick, N-second refresh

    // Spawn initial fetch as background task
    let mut pending_fetch = Some(spawn_fetch(&app, &client));
    app.is_loading = true;

    // Main loop
    loop {
        // Draw UI
        terminal.draw(|frame| ui::draw(frame, &mut app))?;

        // Handle events
        match events.next().await {
            Event::Key(key) => {
                app.last_interaction = std::time::Instant::now();
                handle_key_event(&mut app, key);
            }
            Event::Tick => {
                app.update_flash();
                app.advance_spinner();
            }
            Event::Refresh => {
                app.needs_refresh = true;
            }
        }

        // Check if background fetch has completed
        if let Some(handle) = &mut pending_fetch {
            if handle.is_finished() {
                let handle = pending_fetch.take().unwrap();
                match handle.await {
                    Ok(Ok(Ok(stocks))) => {
                        app.update_stocks(stocks);
                    }
                    Ok(Ok(Err(e))) => {
                        app.show_flash(format!("Refresh failed: {}", e));
                    }
                    Ok(Err(_elapsed)) => {
                        // Timeout: fetch took longer than 20 seconds
                        app.show_flash(
                            "Refresh timed out (20s). Will retry on next refresh.".to_string(),
                        );
                    }
                    Err(e) => {
                        app.show_flash(format!("Refresh task panicked: {}", e));
                    }
                }
                app.is_loading = false;
            }
        }

        // Spawn new refresh if needed and no fetch is pending
        if app.needs_refresh && pending_fetch.is_none() {
            // Check if this is a manual refresh (force_refresh) or auto-refresh
            let is_manual = app.force_refresh;
            let modal_open = app.input_mode != app::InputMode::Normal;
            let recent_interaction = app.last_interaction.elapsed() < Duration::from_secs(10);

            // Suppress auto-refresh if modal is open or user interacted recently.
            // Manual refresh ('r' key) always proceeds.
            // When suppressed, needs_refresh stays true so it retries on the next tick.
            if is_manual || (!modal_open && !recent_interaction) {
                app.needs_refresh = false;

                if is_manual {
                    if let Some(cache) = &app.cache {
                        if let Err(e) = cache.clear() {
                            crate::buffered_eprintln!("Failed to clear quote cache: {}", e);
                        }
                    }
                    app.force_refresh = false;
                }

                pending_fetch = Some(spawn_fetch(&app, &client));
                app.is_loading = true;
            }
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    ratatui::restore();

    // Flush buffered stderr messages now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    Ok(())
}

type FetchResult =
    Result<anyhow::Result<Vec<(crate::market::StockQuote, crate::scoring::ScoreResult)>>, tokio::time::error::Elapsed>;

fn spawn_fetch(app: &App, client: &MarketClient) -> tokio::task::JoinHandle<FetchResult> {
    let client = client.clone();
    let symbols = app.watchlist.clone();
    let settings = app.settings.clone();
    let cache = app.cache.clone();
    let verbose = app.verbose;

    tokio::spawn(async move {
        tokio::time::timeout(
            Duration::from_secs(20),
            crate::fetch::fetch_and_score_symbols(
                &client,
                &symbols,
                &settings,
                cache.as_deref(),
                verbose,
            ),
        )
        .await
    })
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        app::InputMode::Normal => {
            match key.code {
                // Quit
                KeyCode::Char('q') => app.should_quit = true,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.should_quit = true
                }

                // Navigation
                KeyCode::Char('j') | KeyCode::Down => app.next_row(),
                KeyCode::Char('k') | KeyCode::Up => app.previous_row(),

                // Open quote page in browser
                KeyCode::Enter | KeyCode::Char('o') => {
                    if let Some((quote, _)) = app.selected_stock() {
                        let symbol = quote.symbol.clone();
                        if let Err(e) = app.open_selected() {
                            app.show_flash(format!("Failed to open browser: {}", e));
                        } else {
                            app.show_flash(format!("Opened: {}", symbol));
                        }
                    }
                }

                // Watchlist edits
                KeyCode::Char('a') => app.start_ticker_input(),
                KeyCode::Char('d') => app.remove_selected(),

                // Policy inputs
                KeyCode::Char('i') => app.flip_rates(),
                KeyCode::Char('t') => app.flip_balance_sheet(),
                KeyCode::Char('s') => app.save_policy_settings(),

                // Rule breakdown
                KeyCode::Char('b') => app.show_breakdown(),

                // Refresh (manual = force fresh data)
                KeyCode::Char('r') => {
                    app.needs_refresh = true;
                    app.force_refresh = true;
                    app.show_flash("Refreshing (fresh data)...".to_string());
                }

                // Help
                KeyCode::Char('?') => app.show_help(),

                _ => {}
            }
        }
        app::InputMode::AddTicker => {
            match key.code {
                // Confirm ticker
                KeyCode::Enter => app.confirm_ticker_input(),

                // Cancel
                KeyCode::Esc => app.cancel_ticker_input(),

                // Backspace
                KeyCode::Backspace => {
                    app.ticker_input.pop();
                }

                // Character input (symbol charset)
                KeyCode::Char(c) if c.is_ascii_alphanumeric() || c == '.' || c == '-' => {
                    app.ticker_input.push(c.to_ascii_uppercase());
                }

                // Ignore all other keys (don't propagate to Normal mode)
                _ => {}
            }
        }
        app::InputMode::Breakdown => match key.code {
            KeyCode::Esc | KeyCode::Char('b') => app.dismiss_breakdown(),
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
            _ => {}
        },
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}
