// tests/sla_policies.rs

mod common;
use crate::common::{PolicyBuilder, RuleBuilder, init_tracing};

use std::sync::Arc;

use shopsched::errors::{SchedError, ValidationError};
use shopsched::model::Actor;
use shopsched::sla::{JobContext, PolicyRegistry, assess, validate_policy};
use shopsched::store::{MemoryStore, PolicyStore};
use shopsched::types::SlaStatus;

fn admin() -> Actor {
    Actor::new("admin")
}

fn registry() -> (MemoryStore, PolicyRegistry) {
    init_tracing();
    let store = MemoryStore::new();
    let registry = PolicyRegistry::new(Arc::new(store.clone()));
    (store, registry)
}

fn overhaul_rule(hours: f64) -> shopsched::sla::SlaPolicyRule {
    RuleBuilder::new("Overhaul", "Intake", "QC", hours).build()
}

#[test]
fn saving_a_new_default_clears_the_previous_one() {
    let (store, registry) = registry();

    registry
        .save_policy(
            PolicyBuilder::new("old")
                .default_policy()
                .rule(overhaul_rule(24.0))
                .build(),
            &admin(),
        )
        .unwrap();
    registry
        .save_policy(
            PolicyBuilder::new("new")
                .default_policy()
                .rule(overhaul_rule(12.0))
                .build(),
            &admin(),
        )
        .unwrap();

    let defaults: Vec<String> = store
        .list_policies()
        .unwrap()
        .into_iter()
        .filter(|p| p.is_default)
        .map(|p| p.name)
        .collect();
    assert_eq!(defaults, vec!["new".to_string()]);
    assert_eq!(
        registry.get_policy("new").unwrap().modified_by.as_deref(),
        Some("admin")
    );
}

#[test]
fn saving_a_disabled_default_is_refused_and_changes_nothing() {
    let (store, registry) = registry();
    registry
        .save_policy(
            PolicyBuilder::new("current")
                .default_policy()
                .rule(overhaul_rule(24.0))
                .build(),
            &admin(),
        )
        .unwrap();

    let err = registry
        .save_policy(
            PolicyBuilder::new("broken")
                .default_policy()
                .enabled(false)
                .rule(overhaul_rule(24.0))
                .build(),
            &admin(),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        SchedError::Validation(ValidationError::DefaultWhileDisabled { .. })
    ));
    assert!(store.get_policy("broken").unwrap().is_none());
    assert!(store.get_policy("current").unwrap().unwrap().is_default);
}

#[test]
fn unknown_policy_is_not_found() {
    let (_store, registry) = registry();
    assert!(matches!(
        registry.get_policy("nope"),
        Err(SchedError::NotFound { kind: "policy", .. })
    ));
}

#[test]
fn workshop_rule_wins_over_generic_rule() {
    let (_store, registry) = registry();
    registry
        .save_policy(
            PolicyBuilder::new("standard")
                .default_policy()
                .per_workshop()
                .rule(overhaul_rule(48.0))
                .rule(
                    RuleBuilder::new("Overhaul", "Intake", "QC", 24.0)
                        .workshop("North")
                        .build(),
                )
                .build(),
            &admin(),
        )
        .unwrap();

    let north = registry
        .resolve_rule(&JobContext::new("Overhaul", Some("North"), "Intake", "QC"))
        .unwrap()
        .unwrap();
    assert_eq!(north.turnaround_hours(), 24.0);

    let south = registry
        .resolve_rule(&JobContext::new("Overhaul", Some("South"), "Intake", "QC"))
        .unwrap()
        .unwrap();
    assert_eq!(south.turnaround_hours(), 48.0);

    let other = registry
        .resolve_rule(&JobContext::new("Calibration", None, "Intake", "QC"))
        .unwrap();
    assert!(other.is_none());
}

#[test]
fn disabled_policies_are_never_resolved() {
    let (_store, registry) = registry();
    registry
        .save_policy(
            PolicyBuilder::new("off")
                .enabled(false)
                .per_workshop()
                .rule(
                    RuleBuilder::new("Overhaul", "Intake", "QC", 8.0)
                        .workshop("North")
                        .build(),
                )
                .build(),
            &admin(),
        )
        .unwrap();

    let found = registry
        .resolve_rule(&JobContext::new("Overhaul", Some("North"), "Intake", "QC"))
        .unwrap();
    assert!(found.is_none());
}

#[test]
fn assessment_walks_through_every_band() {
    let policy = PolicyBuilder::new("p")
        .thresholds(75.0, 90.0)
        .grace(30)
        .rule(
            RuleBuilder::new("Overhaul", "Intake", "QC", 10.0)
                .escalations(60, 120)
                .build(),
        )
        .build();
    validate_policy(&policy).unwrap();
    let rule = &policy.rules[0];

    // Target is 600 minutes.
    assert_eq!(assess(&policy, rule, 300).status, SlaStatus::OnTrack);
    assert_eq!(assess(&policy, rule, 450).status, SlaStatus::Warning);
    assert_eq!(assess(&policy, rule, 540).status, SlaStatus::Critical);
    assert_eq!(assess(&policy, rule, 630).status, SlaStatus::Critical);

    let breached = assess(&policy, rule, 631);
    assert_eq!(breached.status, SlaStatus::Breached);
    assert_eq!(breached.escalation_level, 0);

    assert_eq!(assess(&policy, rule, 660).escalation_level, 1);
    assert_eq!(assess(&policy, rule, 720).escalation_level, 2);
}
