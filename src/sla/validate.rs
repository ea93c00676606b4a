// src/sla/validate.rs

use std::collections::HashSet;

use crate::errors::ValidationError;
use crate::sla::model::{SlaPolicy, SlaPolicyRule};

/// Validate a single rule.
pub fn validate_rule(rule: &SlaPolicyRule) -> Result<(), ValidationError> {
    for (field, value) in [
        ("service_type", &rule.service_type),
        ("start_event", &rule.start_event),
        ("stop_event", &rule.stop_event),
    ] {
        if value.trim().is_empty() {
            return Err(ValidationError::BlankRuleField { field });
        }
    }

    if !(rule.turnaround_hours > 0.0) {
        return Err(ValidationError::NonPositiveTurnaround {
            service_type: rule.service_type.clone(),
            value: rule.turnaround_hours,
        });
    }

    for (field, value) in [
        ("escalation_minutes_1", rule.escalation_minutes_1),
        ("escalation_minutes_2", rule.escalation_minutes_2),
    ] {
        if let Some(v) = value {
            if v < 0 {
                return Err(ValidationError::NegativeEscalation {
                    service_type: rule.service_type.clone(),
                    field,
                    value: v,
                });
            }
        }
    }

    Ok(())
}

/// Uniqueness key of a rule within its policy. The workshop only takes part
/// when the policy applies per workshop.
pub fn rule_key(policy: &SlaPolicy, rule: &SlaPolicyRule) -> (String, String, String, String) {
    let workshop = if policy.apply_per_workshop {
        rule.workshop_name().unwrap_or_default().to_string()
    } else {
        String::new()
    };

    (
        rule.service_type.trim().to_string(),
        workshop,
        rule.start_event.trim().to_string(),
        rule.stop_event.trim().to_string(),
    )
}

/// Validate a policy before it is saved.
///
/// Checks run in a fixed order and stop at the first failure: thresholds,
/// grace period, rule presence, each rule, rule uniqueness, default flag.
pub fn validate_policy(policy: &SlaPolicy) -> Result<(), ValidationError> {
    validate_thresholds(policy)?;

    if policy.breach_grace_minutes < 0 {
        return Err(ValidationError::NegativeGrace {
            policy: policy.name.clone(),
            value: policy.breach_grace_minutes,
        });
    }

    if policy.rules.is_empty() {
        return Err(ValidationError::NoRules {
            policy: policy.name.clone(),
        });
    }

    for rule in &policy.rules {
        validate_rule(rule)?;
    }

    let mut seen = HashSet::new();
    for rule in &policy.rules {
        let key = rule_key(policy, rule);
        if !seen.insert(key.clone()) {
            let (service_type, workshop, start_event, stop_event) = key;
            return Err(ValidationError::DuplicateRule {
                policy: policy.name.clone(),
                service_type,
                workshop,
                start_event,
                stop_event,
            });
        }
    }

    if policy.is_default && !policy.enabled {
        return Err(ValidationError::DefaultWhileDisabled {
            policy: policy.name.clone(),
        });
    }

    Ok(())
}

fn validate_thresholds(policy: &SlaPolicy) -> Result<(), ValidationError> {
    let warn = policy.warn_threshold_pct;
    let critical = policy.critical_threshold_pct;

    let violated = if !(warn >= 0.0) {
        Some("warn_threshold_pct must be >= 0")
    } else if !(critical <= 100.0) {
        Some("critical_threshold_pct must be <= 100")
    } else if !(warn <= critical) {
        Some("warn_threshold_pct must be <= critical_threshold_pct")
    } else {
        None
    };

    match violated {
        Some(bound) => Err(ValidationError::ThresholdBounds {
            policy: policy.name.clone(),
            bound,
            warn,
            critical,
        }),
        None => Ok(()),
    }
}

/// At most one enabled policy may be the default.
pub fn validate_single_default(policies: &[SlaPolicy]) -> Result<(), ValidationError> {
    let defaults: Vec<String> = policies
        .iter()
        .filter(|p| p.claims_default())
        .map(|p| p.name.clone())
        .collect();

    if defaults.len() > 1 {
        return Err(ValidationError::MultipleDefaults { policies: defaults });
    }
    Ok(())
}
