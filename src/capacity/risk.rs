// src/capacity/risk.rs

use crate::types::RiskTier;

/// Utilization at or below this percentage is low risk.
pub const LOW_RISK_MAX_PCT: f64 = 70.0;

/// Utilization at or below this percentage (and above the low band) is
/// medium risk; anything above is high.
pub const MEDIUM_RISK_MAX_PCT: f64 = 100.0;

/// Map a utilization percentage onto a risk tier.
pub fn risk_for_utilization(utilization_pct: f64) -> RiskTier {
    if utilization_pct <= LOW_RISK_MAX_PCT {
        RiskTier::Low
    } else if utilization_pct <= MEDIUM_RISK_MAX_PCT {
        RiskTier::Medium
    } else {
        RiskTier::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges() {
        assert_eq!(risk_for_utilization(0.0), RiskTier::Low);
        assert_eq!(risk_for_utilization(70.0), RiskTier::Low);
        assert_eq!(risk_for_utilization(70.01), RiskTier::Medium);
        assert_eq!(risk_for_utilization(100.0), RiskTier::Medium);
        assert_eq!(risk_for_utilization(100.01), RiskTier::High);
        assert_eq!(risk_for_utilization(250.0), RiskTier::High);
    }
}
