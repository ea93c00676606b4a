// src/sla/assess.rs

use serde::Serialize;

use crate::sla::model::{SlaPolicy, SlaPolicyRule};
use crate::types::SlaStatus;

/// How a job stands against its turnaround target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlaAssessment {
    pub status: SlaStatus,
    /// Elapsed time as a percentage of the turnaround target.
    pub consumed_pct: f64,
    pub target_minutes: f64,
    /// 0 = none, 1 or 2 = escalation step reached past the target.
    pub escalation_level: u8,
}

/// Classify `elapsed_minutes` against `rule` using `policy`'s thresholds.
///
/// `Breached` only once the target plus the grace period is exceeded; inside
/// the grace window the job is `Critical`. Escalation levels count minutes
/// past the target.
pub fn assess(policy: &SlaPolicy, rule: &SlaPolicyRule, elapsed_minutes: i64) -> SlaAssessment {
    let target = rule.turnaround_minutes();
    let elapsed = elapsed_minutes.max(0) as f64;
    let consumed_pct = if target > 0.0 {
        elapsed / target * 100.0
    } else {
        100.0
    };

    let grace = policy.breach_grace_minutes.max(0) as f64;
    let status = if elapsed > target + grace {
        SlaStatus::Breached
    } else if consumed_pct >= policy.critical_threshold_pct {
        SlaStatus::Critical
    } else if consumed_pct >= policy.warn_threshold_pct {
        SlaStatus::Warning
    } else {
        SlaStatus::OnTrack
    };

    let over = elapsed - target;
    let reached = |threshold: Option<i64>| match threshold {
        Some(t) => over > 0.0 && over >= t as f64,
        None => false,
    };
    let escalation_level = if reached(rule.escalation_minutes_2) {
        2
    } else if reached(rule.escalation_minutes_1) {
        1
    } else {
        0
    };

    SlaAssessment {
        status,
        consumed_pct,
        target_minutes: target,
        escalation_level,
    }
}
