use serde::{Deserialize, Serialize};
use std::fmt;

/// Interest-rate level of the current monetary regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RateLevel {
    High,
    Low,
}

impl fmt::Display for RateLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateLevel::High => write!(f, "high"),
            RateLevel::Low => write!(f, "low"),
        }
    }
}

/// Central-bank balance-sheet trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BalanceSheetTrend {
    Increasing,
    Decreasing,
}

impl fmt::Display for BalanceSheetTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceSheetTrend::Increasing => write!(f, "increasing"),
            BalanceSheetTrend::Decreasing => write!(f, "decreasing"),
        }
    }
}

/// The saved macro policy settings. Serialized field names are stable; the
/// settings file is hand-editable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySettings {
    pub version: u32,
    pub rates: RateLevel,
    pub balance_sheet: BalanceSheetTrend,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self::new(RateLevel::High, BalanceSheetTrend::Decreasing)
    }
}

impl PolicySettings {
    pub fn new(rates: RateLevel, balance_sheet: BalanceSheetTrend) -> Self {
        Self {
            version: 1,
            rates,
            balance_sheet,
        }
    }

    /// Short name for the regime the two inputs describe.
    pub fn regime_label(&self) -> &'static str {
        match (self.rates, self.balance_sheet) {
            (RateLevel::High, BalanceSheetTrend::Decreasing) => "tightening",
            (RateLevel::Low, BalanceSheetTrend::Increasing) => "easing",
            _ => "mixed",
        }
    }

    pub fn flip_rates(&mut self) {
        self.rates = match self.rates {
            RateLevel::High => RateLevel::Low,
            RateLevel::Low => RateLevel::High,
        };
    }

    pub fn flip_balance_sheet(&mut self) {
        self.balance_sheet = match self.balance_sheet {
            BalanceSheetTrend::Increasing => BalanceSheetTrend::Decreasing,
            BalanceSheetTrend::Decreasing => BalanceSheetTrend::Increasing,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_first_run() {
        let settings = PolicySettings::default();
        assert_eq!(settings.version, 1);
        assert_eq!(settings.rates, RateLevel::High);
        assert_eq!(settings.balance_sheet, BalanceSheetTrend::Decreasing);
    }

    #[test]
    fn test_serialized_field_names() {
        let settings = PolicySettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"rates\":\"high\""));
        assert!(json.contains("\"balance_sheet\":\"decreasing\""));
    }

    #[test]
    fn test_regime_labels() {
        let mut settings = PolicySettings::default();
        assert_eq!(settings.regime_label(), "tightening");

        settings.flip_rates();
        assert_eq!(settings.rates, RateLevel::Low);
        assert_eq!(settings.regime_label(), "mixed");

        settings.flip_balance_sheet();
        assert_eq!(settings.regime_label(), "easing");
    }
}
