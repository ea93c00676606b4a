// src/errors.rs

//! Crate-wide error types.
//!
//! - [`ValidationError`]: malformed input, always raised before any mutation.
//! - [`BlockedByDependency`]: an expected control-flow signal carrying the
//!   unsatisfied predecessors.
//! - [`SchedError`]: the umbrella error returned by public operations.

use std::fmt;

use thiserror::Error;

use crate::model::WorkItemId;
use crate::types::WorkItemStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("work item '{item}': expected_end {end} precedes expected_start {start}")]
    InvalidDateRange {
        item: WorkItemId,
        start: String,
        end: String,
    },

    #[error("work item '{item}': progress {value} is outside [0, 100]")]
    ProgressOutOfRange { item: WorkItemId, value: f64 },

    #[error("work item '{item}': completed items must keep progress at 100 (got {value})")]
    CompletedProgress { item: WorkItemId, value: f64 },

    #[error("work item '{item}': planned_effort_minutes must be >= 0 (got {value})")]
    NegativeEffort { item: WorkItemId, value: i64 },

    #[error("work item '{item}': planned_effort_minutes must be <= {max} (got {value})")]
    EffortOutOfRange {
        item: WorkItemId,
        value: i64,
        max: i64,
    },

    #[error("work item '{item}' cannot move from {from} to {to}")]
    IllegalTransition {
        item: WorkItemId,
        from: WorkItemStatus,
        to: WorkItemStatus,
    },

    #[error("work item '{item}' has unknown predecessor '{predecessor}'")]
    DanglingPredecessor {
        item: WorkItemId,
        predecessor: WorkItemId,
    },

    #[error("work item '{item}' has unknown parent '{parent}'")]
    DanglingParent { item: WorkItemId, parent: WorkItemId },

    #[error("work item '{item}' is assigned to unknown resource '{resource}'")]
    DanglingResource { item: WorkItemId, resource: String },

    #[error("work item '{item}' lists predecessor '{predecessor}' more than once")]
    DuplicatePredecessor {
        item: WorkItemId,
        predecessor: WorkItemId,
    },

    #[error("work item '{item}' cannot depend on itself")]
    SelfDependency { item: WorkItemId },

    #[error("dependency cycle detected involving work item '{item}'")]
    DependencyCycle { item: WorkItemId },

    #[error("parent cycle detected involving work item '{item}'")]
    ParentCycle { item: WorkItemId },

    #[error("work item '{item}' is still a predecessor of '{dependent}'")]
    StillReferenced {
        item: WorkItemId,
        dependent: WorkItemId,
    },

    #[error("work item '{item}' still has child '{child}'")]
    HasChildren { item: WorkItemId, child: WorkItemId },

    #[error("policy '{policy}': {bound} (warn={warn}, critical={critical})")]
    ThresholdBounds {
        policy: String,
        bound: &'static str,
        warn: f64,
        critical: f64,
    },

    #[error("policy '{policy}': breach_grace_minutes must be >= 0 (got {value})")]
    NegativeGrace { policy: String, value: i64 },

    #[error("policy '{policy}' must contain at least one rule")]
    NoRules { policy: String },

    #[error(
        "policy '{policy}': duplicate rule for service '{service_type}', workshop '{workshop}', start '{start_event}', stop '{stop_event}'"
    )]
    DuplicateRule {
        policy: String,
        service_type: String,
        workshop: String,
        start_event: String,
        stop_event: String,
    },

    #[error("policy '{policy}' cannot be the default while disabled")]
    DefaultWhileDisabled { policy: String },

    #[error("more than one enabled default policy: {policies:?}")]
    MultipleDefaults { policies: Vec<String> },

    #[error("rule for service '{service_type}': turnaround_hours must be > 0 (got {value})")]
    NonPositiveTurnaround { service_type: String, value: f64 },

    #[error("rule for service '{service_type}': {field} must be >= 0 (got {value})")]
    NegativeEscalation {
        service_type: String,
        field: &'static str,
        value: i64,
    },

    #[error("rule field '{field}' must not be blank")]
    BlankRuleField { field: &'static str },
}

/// A predecessor that is not yet `Completed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocker {
    pub id: WorkItemId,
    pub status: WorkItemStatus,
}

/// Transition refused because one or more predecessors are incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedByDependency {
    pub item: WorkItemId,
    pub target: WorkItemStatus,
    pub blockers: Vec<Blocker>,
}

impl BlockedByDependency {
    pub fn blocker_ids(&self) -> Vec<&str> {
        self.blockers.iter().map(|b| b.id.as_str()).collect()
    }
}

impl fmt::Display for BlockedByDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' blocked by ", self.item)?;
        for (i, blocker) in self.blockers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} ({})", blocker.id, blocker.status)?;
        }
        Ok(())
    }
}

impl std::error::Error for BlockedByDependency {}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Blocked(#[from] BlockedByDependency),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("work item '{item}': projected completion is out of range ({minutes} minutes from {from})")]
    CapacityOverflow {
        item: String,
        from: String,
        minutes: i64,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SchedError {
    pub fn item_not_found(id: impl Into<String>) -> Self {
        SchedError::NotFound {
            kind: "work item",
            id: id.into(),
        }
    }

    pub fn policy_not_found(name: impl Into<String>) -> Self {
        SchedError::NotFound {
            kind: "policy",
            id: name.into(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SchedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_message_lists_every_blocker() {
        let err = BlockedByDependency {
            item: "A".to_string(),
            target: WorkItemStatus::Completed,
            blockers: vec![
                Blocker {
                    id: "X".to_string(),
                    status: WorkItemStatus::Working,
                },
                Blocker {
                    id: "Y".to_string(),
                    status: WorkItemStatus::Paused,
                },
            ],
        };
        assert_eq!(err.to_string(), "'A' blocked by X (Working), Y (Paused)");
        assert_eq!(err.blocker_ids(), vec!["X", "Y"]);
    }

    #[test]
    fn duplicate_rule_message_names_the_key() {
        let err = ValidationError::DuplicateRule {
            policy: "standard".into(),
            service_type: "Overhaul".into(),
            workshop: "".into(),
            start_event: "Intake".into(),
            stop_event: "QC".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Overhaul"));
        assert!(msg.contains("Intake"));
        assert!(msg.contains("QC"));
    }
}
