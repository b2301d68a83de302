/// Recommendation tier derived from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    StrongBuy,
    ModerateBuy,
    Avoid,
}

impl Recommendation {
    /// Tier for a final score: >= 3 Strong Buy, >= 1 Moderate Buy, else Avoid.
    pub fn from_score(score: i32) -> Self {
        if score >= 3 {
            Recommendation::StrongBuy
        } else if score >= 1 {
            Recommendation::ModerateBuy
        } else {
            Recommendation::Avoid
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "Strong Buy",
            Recommendation::ModerateBuy => "Moderate Buy",
            Recommendation::Avoid => "Avoid",
        }
    }

    /// Suggested portfolio allocation for this tier.
    pub fn allocation_range(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "0-50% of portfolio",
            Recommendation::ModerateBuy => "0-20%",
            Recommendation::Avoid => "0%",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuleContribution {
    pub label: String,       // e.g. "Macro alignment", "Leverage"
    pub description: String, // e.g. "tightening regime, cheap and lightly levered"
    pub before: i32,         // Score before this rule
    pub after: i32,          // Score after this rule
}

#[derive(Debug, Clone, Default)]
pub struct ScoreBreakdown {
    pub rules: Vec<RuleContribution>,
}

#[derive(Debug, Clone)]
pub struct ScoreResult {
    pub score: i32,
    pub recommendation: Recommendation,
    pub breakdown: ScoreBreakdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(Recommendation::from_score(3), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_score(4), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_score(2), Recommendation::ModerateBuy);
        assert_eq!(Recommendation::from_score(1), Recommendation::ModerateBuy);
        assert_eq!(Recommendation::from_score(0), Recommendation::Avoid);
        assert_eq!(Recommendation::from_score(-3), Recommendation::Avoid);
    }

    #[test]
    fn test_allocation_ranges() {
        assert_eq!(
            Recommendation::StrongBuy.allocation_range(),
            "0-50% of portfolio"
        );
        assert_eq!(Recommendation::ModerateBuy.allocation_range(), "0-20%");
        assert_eq!(Recommendation::Avoid.allocation_range(), "0%");
    }
}
