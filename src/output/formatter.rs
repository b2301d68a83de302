use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::market::StockQuote;
use crate::scoring::{Recommendation, ScoreResult};

/// A quote with its calculated score for display
pub struct ScoredStock<'a> {
    pub quote: &'a StockQuote,
    pub result: &'a ScoreResult,
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score with an explicit sign ("+3", "-2", "+0")
pub fn format_score(score: i32) -> String {
    format!("{:+}", score)
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a company name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn format_metrics(quote: &StockQuote) -> String {
    let m = &quote.metrics;
    format!(
        "rev {:+.1}%  eps {:+.1}%  pe {:.1}  d/e {:.1}",
        m.revenue_growth_pct, m.earnings_growth_pct, m.pe_ratio, m.debt_to_ebitda
    )
}

fn tier_cell(recommendation: Recommendation) -> String {
    format!(
        "{} ({})",
        recommendation.label(),
        recommendation.allocation_range()
    )
}

/// Format stocks as a ranked table, best first
/// Columns: Index, Score, Recommendation, Symbol, Metrics, Name
/// No headers; every metric field is self-labeled.
pub fn format_stock_table(stocks: &[ScoredStock], use_colors: bool) -> String {
    if stocks.is_empty() {
        return "No stocks analyzed.".to_string();
    }

    let term_width = get_terminal_width();

    // Widest tier cell is "Moderate Buy (0-20%)" at 20 chars; allocation for
    // Strong Buy pushes it to 30
    let tier_width = stocks
        .iter()
        .map(|s| tier_cell(s.result.recommendation).len())
        .max()
        .unwrap_or(0);
    let symbol_width = stocks
        .iter()
        .map(|s| s.quote.symbol.len())
        .max()
        .unwrap_or(0);

    stocks
        .iter()
        .enumerate()
        .map(|(idx, scored)| {
            let index_str = format!("{:>2}.", idx + 1);
            let score_str = format!("{:>3}", format_score(scored.result.score));
            let tier = format!("{:<width$}", tier_cell(scored.result.recommendation), width = tier_width);
            let symbol = format!("{:<width$}", scored.quote.symbol, width = symbol_width);
            let metrics = format_metrics(scored.quote);

            // Company name fills whatever width remains; pipes get it in full
            let fixed_width = 3 + 1 + 3 + 2 + tier_width + 2 + symbol_width + 2 + metrics.len() + 2;
            let name = match (term_width, scored.quote.company_name.as_deref()) {
                (_, None) => String::new(),
                (None, Some(n)) => n.to_string(),
                (Some(width), Some(n)) if width > fixed_width + 10 => {
                    truncate_name(n, width - fixed_width)
                }
                (Some(_), Some(_)) => String::new(),
            };

            if use_colors {
                let tier_colored = match scored.result.recommendation {
                    Recommendation::StrongBuy => tier.green().bold().to_string(),
                    Recommendation::ModerateBuy => tier.yellow().to_string(),
                    Recommendation::Avoid => tier.red().to_string(),
                };
                format!(
                    "{} {}  {}  {}  {}  {}",
                    index_str.dimmed(),
                    score_str.bold(),
                    tier_colored,
                    symbol.cyan(),
                    metrics,
                    name.dimmed()
                )
            } else {
                format!(
                    "{} {}  {}  {}  {}  {}",
                    index_str, score_str, tier, symbol, metrics, name
                )
            }
            .trim_end()
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a single stock with detailed multi-line output, including the
/// rule-by-rule score breakdown
pub fn format_stock_detail(quote: &StockQuote, result: &ScoreResult, use_colors: bool) -> String {
    let mut lines = Vec::new();

    let header = if use_colors {
        match quote.company_name.as_deref() {
            Some(name) => format!("{} {}", quote.symbol.cyan().bold(), name.dimmed()),
            None => format!("{}", quote.symbol.cyan().bold()),
        }
    } else {
        match quote.company_name.as_deref() {
            Some(name) => format!("{} {}", quote.symbol, name),
            None => quote.symbol.clone(),
        }
    };
    lines.push(header);
    lines.push(format!(
        "  Revenue growth:  {:+.2}%",
        quote.metrics.revenue_growth_pct
    ));
    lines.push(format!(
        "  Earnings growth: {:+.2}%",
        quote.metrics.earnings_growth_pct
    ));
    lines.push(format!("  P/E ratio:       {:.2}", quote.metrics.pe_ratio));
    lines.push(format!(
        "  Debt/EBITDA:     {:.2}",
        quote.metrics.debt_to_ebitda
    ));

    if result.breakdown.rules.is_empty() {
        lines.push("  No rules fired".to_string());
    } else {
        for rule in &result.breakdown.rules {
            lines.push(format!(
                "  {}: {} ({} -> {})",
                rule.label, rule.description, rule.before, rule.after
            ));
        }
    }

    let verdict = format!(
        "Score {}: {} ({})",
        format_score(result.score),
        result.recommendation.label(),
        result.recommendation.allocation_range()
    );
    if use_colors {
        let colored = match result.recommendation {
            Recommendation::StrongBuy => verdict.green().bold().to_string(),
            Recommendation::ModerateBuy => verdict.yellow().to_string(),
            Recommendation::Avoid => verdict.red().to_string(),
        };
        lines.push(format!("  {}", colored));
    } else {
        lines.push(format!("  {}", verdict));
    }

    lines.join("\n")
}

/// Format stocks as tab-separated values for scripting
/// Columns: score, recommendation, allocation, symbol, rev, eps, pe, d/e
/// (no headers, no colors)
pub fn format_tsv(stocks: &[ScoredStock]) -> String {
    if stocks.is_empty() {
        return String::new();
    }

    stocks
        .iter()
        .map(|scored| {
            let m = &scored.quote.metrics;
            format!(
                "{}\t{}\t{}\t{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}",
                scored.result.score,
                scored.result.recommendation.label(),
                scored.result.recommendation.allocation_range(),
                scored.quote.symbol,
                m.revenue_growth_pct,
                m.earnings_growth_pct,
                m.pe_ratio,
                m.debt_to_ebitda
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
