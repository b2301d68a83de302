use crate::output::format_score;
use crate::tui::app::{App, InputMode};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 6 || area.width < 40 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Policy(1) + Table(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1), // Title bar
        Constraint::Length(1), // Policy bar
        Constraint::Fill(1),   // Stock table
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_policy_bar(frame, chunks[1], app);
    render_table(frame, chunks[2], app);
    render_status_bar(frame, chunks[3], app);

    // Render overlays based on input mode
    match app.input_mode {
        InputMode::AddTicker => render_ticker_popup(frame, app),
        InputMode::Breakdown => render_breakdown_popup(frame, app),
        InputMode::Help => render_help_popup(frame, app),
        InputMode::Normal => {}
    }

    // Render loading overlay if loading (appears on top of everything)
    if app.is_loading {
        render_loading_overlay(frame, app);
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let mut spans = vec![Span::styled(
        "Stock Scout",
        Style::default().fg(theme.title_color).bold(),
    )];

    let elapsed = app.last_refresh.elapsed();
    let refresh_text = if elapsed.as_secs() < 60 {
        format!("refreshed {}s ago", elapsed.as_secs())
    } else {
        format!("refreshed {}m ago", elapsed.as_secs() / 60)
    };
    let left_len = "Stock Scout".len();
    let padding_len = (area.width as usize).saturating_sub(left_len + refresh_text.len());
    spans.push(Span::raw(" ".repeat(padding_len)));
    spans.push(Span::styled(refresh_text, Style::default().fg(theme.muted)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_policy_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let dirty = if app.settings_dirty { " (unsaved)" } else { "" };
    let line = Line::from(vec![
        Span::styled("Rates: ", Style::default().fg(theme.muted)),
        Span::styled(
            app.settings.rates.to_string(),
            Style::default().fg(theme.title_color).bold(),
        ),
        Span::styled("  Balance sheet: ", Style::default().fg(theme.muted)),
        Span::styled(
            app.settings.balance_sheet.to_string(),
            Style::default().fg(theme.title_color).bold(),
        ),
        Span::styled(
            format!("  [{} regime]{}", app.settings.regime_label(), dirty),
            Style::default().fg(theme.muted),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_table(frame: &mut Frame, area: Rect, app: &mut App) {
    let theme = app.theme.clone();

    if app.stocks.is_empty() {
        let empty_msg = Paragraph::new("No stocks on the watchlist (a to add)")
            .alignment(Alignment::Center)
            .block(Block::default());
        frame.render_widget(empty_msg, area);
        return;
    }

    let rows: Vec<Row> = app
        .stocks
        .iter()
        .enumerate()
        .map(|(idx, (quote, result))| {
            let index = format!("{}.", idx + 1);
            let tier_color = theme.tier_color(result.recommendation);

            // Alternating row background (odd rows get subtle background)
            let row_style = if idx % 2 == 1 {
                Style::default().bg(theme.row_alt_bg)
            } else {
                Style::default()
            };

            let m = &quote.metrics;
            Row::new(vec![
                Cell::from(index).style(Style::default().fg(theme.index_color)),
                Cell::from(format!("{:>3}", format_score(result.score)))
                    .style(Style::default().fg(tier_color).bold()),
                Cell::from(format!(
                    "{} ({})",
                    result.recommendation.label(),
                    result.recommendation.allocation_range()
                ))
                .style(Style::default().fg(tier_color)),
                Cell::from(quote.symbol.clone()),
                Cell::from(format!("{:+.1}%", m.revenue_growth_pct)),
                Cell::from(format!("{:+.1}%", m.earnings_growth_pct)),
                Cell::from(format!("{:.1}", m.pe_ratio)),
                Cell::from(format!("{:.1}", m.debt_to_ebitda)),
                Cell::from(quote.company_name.clone().unwrap_or_default())
                    .style(Style::default().fg(theme.muted)),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),  // Index: "99."
        Constraint::Length(5),  // Score: " +3"
        Constraint::Length(31), // Tier: "Strong Buy (0-50% of portfolio)"
        Constraint::Length(7),  // Symbol
        Constraint::Length(7),  // Revenue growth
        Constraint::Length(7),  // Earnings growth
        Constraint::Length(6),  // P/E
        Constraint::Length(5),  // Debt/EBITDA
        Constraint::Fill(1),    // Company name
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec![
                "#", "Score", "Recommendation", "Sym", "Rev", "Eps", "P/E", "D/E", "Name",
            ])
            .style(theme.header_style)
            .bottom_margin(1),
        )
        .row_highlight_style(theme.row_selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let text = if let Some((ref msg, _)) = app.flash_message {
        // Show flash message with color based on message type
        let msg_color = if msg.starts_with("Failed") || msg.starts_with("Refresh failed") {
            theme.flash_error
        } else if msg.starts_with("Added")
            || msg.starts_with("Removed")
            || msg.starts_with("Refreshed")
            || msg.contains("saved")
        {
            theme.flash_success
        } else {
            theme.flash_default
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let count = format!("{} stocks", app.stocks.len());

        let hints = [
            ("j", "/", "k", ":nav "),
            ("Enter", "", "", ":open "),
            ("a", "", "", ":add "),
            ("d", "", "", ":del "),
            ("i", "", "", ":rates "),
            ("t", "", "", ":trend "),
            ("s", "", "", ":save "),
            ("b", "", "", ":breakdown "),
            ("r", "", "", ":refresh "),
            ("?", "", "", ":help "),
            ("q", "", "", ":quit"),
        ];

        let mut spans = vec![
            Span::styled(count, Style::default().fg(theme.muted)),
            Span::raw("  "),
        ];
        for (i, (key1, sep, key2, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(
                *key1,
                Style::default().fg(theme.status_key_color),
            ));
            if !sep.is_empty() {
                spans.push(Span::raw(*sep));
                spans.push(Span::styled(
                    *key2,
                    Style::default().fg(theme.status_key_color),
                ));
            }
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme.status_bar_bg)),
        area,
    );
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    // Clamp dimensions to area bounds
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the add-ticker input popup
fn render_ticker_popup(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(40, 5, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title("Add Ticker")
        .border_style(Style::default().fg(app.theme.popup_border));
    frame.render_widget(block.clone(), popup_area);

    let inner = block.inner(popup_area);
    let chunks = Layout::vertical([
        Constraint::Length(1), // Input line
        Constraint::Length(1), // Help text
    ])
    .split(inner);

    let input_text = format!("{}|", app.ticker_input);
    frame.render_widget(Paragraph::new(input_text), chunks[0]);

    let help = Paragraph::new("Enter: confirm | Esc: cancel")
        .style(Style::default().fg(app.theme.muted));
    frame.render_widget(help, chunks[1]);
}

/// Render the rule breakdown overlay for the selected stock
fn render_breakdown_popup(frame: &mut Frame, app: &App) {
    let (quote, result) = match app.selected_stock() {
        Some(entry) => entry,
        None => return,
    };
    let theme = &app.theme;

    let height = (result.breakdown.rules.len() as u16).max(1) + 6;
    let popup_area = centered_rect_fixed(60, height, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(format!(" {} ", quote.symbol))
        .border_style(Style::default().fg(theme.popup_border));
    frame.render_widget(block.clone(), popup_area);

    let inner = block.inner(popup_area);

    let mut lines = Vec::new();
    if result.breakdown.rules.is_empty() {
        lines.push(Line::from(Span::styled(
            "No rules fired",
            Style::default().fg(theme.muted),
        )));
    } else {
        for rule in &result.breakdown.rules {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:<16}", rule.label),
                    Style::default().fg(theme.title_color).bold(),
                ),
                Span::raw(format!("{:>2} -> {:<3} ", rule.before, rule.after)),
                Span::styled(rule.description.clone(), Style::default().fg(theme.muted)),
            ]));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "Score {}: {} ({})",
            format_score(result.score),
            result.recommendation.label(),
            result.recommendation.allocation_range()
        ),
        Style::default()
            .fg(theme.tier_color(result.recommendation))
            .bold(),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Esc or b to close",
        Style::default().fg(theme.muted),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(52, 17, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(" Keyboard Shortcuts ")
        .border_style(Style::default().fg(app.theme.popup_border));
    frame.render_widget(block.clone(), popup_area);

    let inner = block.inner(popup_area);

    let key_style = Style::default().fg(app.theme.status_key_color).bold();
    let entries = [
        ("j / Down      ", "Move down"),
        ("k / Up        ", "Move up"),
        ("Enter / o     ", "Open quote page in browser"),
        ("a             ", "Add ticker (session only)"),
        ("d             ", "Remove ticker (session only)"),
        ("i             ", "Flip interest-rate level"),
        ("t             ", "Flip balance-sheet trend"),
        ("s             ", "Save policy settings"),
        ("b             ", "Show rule breakdown"),
        ("r             ", "Refresh (bypasses cache)"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Quit"),
    ];

    let mut help_lines: Vec<Line> = entries
        .iter()
        .map(|(key, label)| Line::from(vec![Span::styled(*key, key_style), Span::raw(*label)]))
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(app.theme.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}

/// Render the loading spinner overlay
fn render_loading_overlay(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(30, 3, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered();
    frame.render_widget(block.clone(), popup_area);

    let inner = block.inner(popup_area);

    // Braille spinner animation
    let spinner_chars = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let spinner = spinner_chars[app.spinner_frame % 10];

    let text = if app.stocks.is_empty() {
        format!("{} Loading quotes...", spinner)
    } else {
        format!("{} Refreshing...", spinner)
    };

    let loading_text = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.title_color));

    frame.render_widget(loading_text, inner);
}
