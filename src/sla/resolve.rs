// src/sla/resolve.rs

use tracing::debug;

use crate::sla::model::{JobContext, SlaPolicy, SlaPolicyRule};

/// A rule picked for a job, together with the policy it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRule {
    pub policy: SlaPolicy,
    pub rule: SlaPolicyRule,
}

impl ResolvedRule {
    pub fn turnaround_hours(&self) -> f64 {
        self.rule.turnaround_hours
    }
}

fn events_match(rule: &SlaPolicyRule, ctx: &JobContext) -> bool {
    rule.service_type.trim() == ctx.service_type.trim()
        && rule.start_event.trim() == ctx.start_event.trim()
        && rule.stop_event.trim() == ctx.stop_event.trim()
}

fn workshop_specific<'a>(policy: &'a SlaPolicy, ctx: &JobContext) -> Option<&'a SlaPolicyRule> {
    let workshop = ctx.workshop.as_deref().map(str::trim).filter(|w| !w.is_empty())?;
    if !policy.apply_per_workshop {
        return None;
    }
    policy
        .rules
        .iter()
        .find(|r| events_match(r, ctx) && r.workshop_name() == Some(workshop))
}

fn generic<'a>(policy: &'a SlaPolicy, ctx: &JobContext) -> Option<&'a SlaPolicyRule> {
    policy.rules.iter().find(|r| {
        events_match(r, ctx) && (!policy.apply_per_workshop || r.workshop_name().is_none())
    })
}

/// Find the rule that governs `ctx`.
///
/// Lookup order:
/// 1. a workshop-specific rule in the enabled default policy, if it applies
///    per workshop;
/// 2. a workshop-specific rule in any other enabled per-workshop policy
///    (by name);
/// 3. a workshop-independent rule in the enabled default policy.
///
/// Returns `None` when nothing matches; falling back to a system-wide default
/// is the caller's decision.
pub fn resolve_rule(ctx: &JobContext, policies: &[SlaPolicy]) -> Option<ResolvedRule> {
    let mut enabled: Vec<&SlaPolicy> = policies.iter().filter(|p| p.enabled).collect();
    enabled.sort_by(|a, b| a.name.cmp(&b.name));

    let default = enabled.iter().copied().find(|p| p.is_default);

    let found = default
        .and_then(|p| workshop_specific(p, ctx).map(|r| (p, r)))
        .or_else(|| {
            enabled
                .iter()
                .copied()
                .filter(|p| !p.is_default)
                .find_map(|p| workshop_specific(p, ctx).map(|r| (p, r)))
        })
        .or_else(|| default.and_then(|p| generic(p, ctx).map(|r| (p, r))));

    match found {
        Some((policy, rule)) => {
            debug!(
                policy = %policy.name,
                service = %ctx.service_type,
                turnaround_hours = rule.turnaround_hours,
                "SLA rule resolved"
            );
            Some(ResolvedRule {
                policy: policy.clone(),
                rule: rule.clone(),
            })
        }
        None => {
            debug!(service = %ctx.service_type, "no SLA rule matched");
            None
        }
    }
}
