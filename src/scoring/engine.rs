use super::types::{Recommendation, RuleContribution, ScoreBreakdown, ScoreResult};
use crate::market::types::StockMetrics;
use crate::policy::{BalanceSheetTrend, PolicySettings, RateLevel};

/// Score a stock's metrics against the active policy regime.
///
/// Rules are applied in a fixed order (macro alignment, earnings penalty,
/// leverage, tiering) and each rule that fires records a before/after
/// contribution so the final score can be audited.
pub fn evaluate(settings: &PolicySettings, metrics: &StockMetrics) -> ScoreResult {
    let mut score = 0i32;
    let mut rules = Vec::new();

    // Macro-alignment rule: reward stocks whose profile fits the regime.
    match (settings.rates, settings.balance_sheet) {
        (RateLevel::High, BalanceSheetTrend::Decreasing) => {
            if metrics.pe_ratio <= 15.0 && metrics.debt_to_ebitda <= 2.0 {
                let before = score;
                score += 2;
                rules.push(RuleContribution {
                    label: "Macro alignment".to_string(),
                    description: "tightening regime: cheap and lightly levered".to_string(),
                    before,
                    after: score,
                });
            } else if metrics.revenue_growth_pct >= 5.0 && metrics.earnings_growth_pct >= 5.0 {
                let before = score;
                score += 1;
                rules.push(RuleContribution {
                    label: "Macro alignment".to_string(),
                    description: "tightening regime: steady grower".to_string(),
                    before,
                    after: score,
                });
            }
        }
        (RateLevel::Low, BalanceSheetTrend::Increasing) => {
            if metrics.revenue_growth_pct > 50.0 && metrics.pe_ratio > 25.0 {
                let before = score;
                score += 2;
                rules.push(RuleContribution {
                    label: "Macro alignment".to_string(),
                    description: "easing regime: aggressive growth".to_string(),
                    before,
                    after: score,
                });
            } else if metrics.revenue_growth_pct >= 20.0 && metrics.earnings_growth_pct >= 10.0 {
                let before = score;
                score += 1;
                rules.push(RuleContribution {
                    label: "Macro alignment".to_string(),
                    description: "easing regime: solid growth".to_string(),
                    before,
                    after: score,
                });
            }
        }
        // Mixed regimes contribute nothing.
        (RateLevel::High, BalanceSheetTrend::Increasing)
        | (RateLevel::Low, BalanceSheetTrend::Decreasing) => {}
    }

    // Earnings penalty: shrinking earnings cost a point regardless of regime.
    if metrics.earnings_growth_pct < 0.0 {
        let before = score;
        score -= 1;
        rules.push(RuleContribution {
            label: "Earnings".to_string(),
            description: format!("earnings shrinking ({:.1}%)", metrics.earnings_growth_pct),
            before,
            after: score,
        });
    }

    // Leverage rule: heavy debt load penalized, near-clean balance sheet rewarded.
    if metrics.debt_to_ebitda > 5.0 {
        let before = score;
        score -= 2;
        rules.push(RuleContribution {
            label: "Leverage".to_string(),
            description: format!("debt/EBITDA {:.1} above 5", metrics.debt_to_ebitda),
            before,
            after: score,
        });
    } else if metrics.debt_to_ebitda <= 1.0 {
        let before = score;
        score += 1;
        rules.push(RuleContribution {
            label: "Leverage".to_string(),
            description: format!("debt/EBITDA {:.1} at or below 1", metrics.debt_to_ebitda),
            before,
            after: score,
        });
    }

    ScoreResult {
        score,
        recommendation: Recommendation::from_score(score),
        breakdown: ScoreBreakdown { rules },
    }
}
