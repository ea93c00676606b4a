// src/sla/model.rs

use serde::{Deserialize, Serialize};

/// One turnaround contract, keyed by service type, optional workshop and the
/// start/stop event pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaPolicyRule {
    pub service_type: String,

    #[serde(default)]
    pub workshop: Option<String>,

    pub start_event: String,

    pub stop_event: String,

    pub turnaround_hours: f64,

    #[serde(default)]
    pub escalation_minutes_1: Option<i64>,

    #[serde(default)]
    pub escalation_minutes_2: Option<i64>,
}

impl SlaPolicyRule {
    pub fn new(
        service_type: impl Into<String>,
        start_event: impl Into<String>,
        stop_event: impl Into<String>,
        turnaround_hours: f64,
    ) -> Self {
        Self {
            service_type: service_type.into(),
            workshop: None,
            start_event: start_event.into(),
            stop_event: stop_event.into(),
            turnaround_hours,
            escalation_minutes_1: None,
            escalation_minutes_2: None,
        }
    }

    /// Workshop with blanks folded to `None`.
    pub fn workshop_name(&self) -> Option<&str> {
        self.workshop
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
    }

    /// Turnaround target in minutes.
    pub fn turnaround_minutes(&self) -> f64 {
        self.turnaround_hours * 60.0
    }
}

/// A named, enable-able container of rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaPolicy {
    /// Filled from the `[policy.<name>]` key when loaded from a shop file.
    #[serde(default)]
    pub name: String,

    #[serde(default = "default_warn_threshold")]
    pub warn_threshold_pct: f64,

    #[serde(default = "default_critical_threshold")]
    pub critical_threshold_pct: f64,

    #[serde(default)]
    pub breach_grace_minutes: i64,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub is_default: bool,

    #[serde(default)]
    pub apply_per_workshop: bool,

    #[serde(default, rename = "rule")]
    pub rules: Vec<SlaPolicyRule>,

    #[serde(skip)]
    pub modified_by: Option<String>,
}

fn default_warn_threshold() -> f64 {
    75.0
}

fn default_critical_threshold() -> f64 {
    90.0
}

fn default_enabled() -> bool {
    true
}

impl SlaPolicy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            warn_threshold_pct: default_warn_threshold(),
            critical_threshold_pct: default_critical_threshold(),
            breach_grace_minutes: 0,
            enabled: default_enabled(),
            is_default: false,
            apply_per_workshop: false,
            rules: Vec::new(),
            modified_by: None,
        }
    }

    /// Whether this policy should clear the default flag on every other
    /// policy once saved.
    pub fn claims_default(&self) -> bool {
        self.enabled && self.is_default
    }
}

/// The attributes of a job that select an SLA rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobContext {
    pub service_type: String,
    pub workshop: Option<String>,
    pub start_event: String,
    pub stop_event: String,
}

impl JobContext {
    pub fn new(
        service_type: impl Into<String>,
        workshop: Option<&str>,
        start_event: impl Into<String>,
        stop_event: impl Into<String>,
    ) -> Self {
        Self {
            service_type: service_type.into(),
            workshop: workshop.map(str::to_string),
            start_event: start_event.into(),
            stop_event: stop_event.into(),
        }
    }
}
