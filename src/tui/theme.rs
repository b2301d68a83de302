//! Centralized theme module for TUI color constants and styles

use crate::scoring::Recommendation;
use ratatui::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

/// Pick a theme from the terminal background. Defaults to dark when the
/// background luma cannot be determined (pipes, unsupported terminals).
pub fn resolve_theme() -> Theme {
    match terminal_light::luma() {
        Ok(luma) if luma > 0.6 => Theme::Light,
        _ => Theme::Dark,
    }
}

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Recommendation tier colors (traffic light pattern)
    pub tier_strong_buy: Color,
    pub tier_moderate_buy: Color,
    pub tier_avoid: Color,

    // Table colors
    pub row_alt_bg: Color,
    pub index_color: Color,
    pub header_style: Style,
    pub row_selected: Style,

    // General colors
    pub muted: Color,
    pub title_color: Color,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,
    pub flash_default: Color,

    // Popup overlay colors
    pub popup_border: Color,
}

impl ThemeColors {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            tier_strong_buy: Color::Green,
            tier_moderate_buy: Color::Yellow,
            tier_avoid: Color::Red,
            row_alt_bg: Color::Indexed(235),
            index_color: Color::DarkGray,
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Gray,
            title_color: Color::Cyan,
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            flash_default: Color::White,
            popup_border: Color::Cyan,
        }
    }

    pub fn light() -> Self {
        Self {
            tier_strong_buy: Color::Indexed(28),
            tier_moderate_buy: Color::Indexed(130),
            tier_avoid: Color::Indexed(124),
            row_alt_bg: Color::Indexed(254),
            index_color: Color::Indexed(245),
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Indexed(240),
            title_color: Color::Indexed(25),
            status_bar_bg: Color::Indexed(253),
            status_key_color: Color::Indexed(25),
            flash_success: Color::Indexed(28),
            flash_error: Color::Indexed(124),
            flash_default: Color::Black,
            popup_border: Color::Indexed(25),
        }
    }

    /// Color for a recommendation tier
    pub fn tier_color(&self, recommendation: Recommendation) -> Color {
        match recommendation {
            Recommendation::StrongBuy => self.tier_strong_buy,
            Recommendation::ModerateBuy => self.tier_moderate_buy,
            Recommendation::Avoid => self.tier_avoid,
        }
    }
}
