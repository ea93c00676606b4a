// src/model.rs

//! Core records: work items, capacity snapshots, resources and actors.

use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::types::{RiskTier, WorkItemStatus};

/// Canonical work item identifier.
pub type WorkItemId = String;

/// Canonical resource (technician) identifier.
pub type ResourceId = String;

/// Who is performing a mutation. Threaded explicitly through every mutating
/// call and stamped on the record it changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(pub String);

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Actor used by background sweeps.
    pub fn system() -> Self {
        Self("system".to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Derived capacity forecast for a single work item.
///
/// Always recomputed and overwritten wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacitySnapshot {
    pub projected_completion: NaiveDateTime,
    pub utilization_pct: f64,
    pub risk: RiskTier,
}

/// A unit of schedulable work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkItem {
    pub id: WorkItemId,
    pub subject: String,
    pub status: WorkItemStatus,
    pub priority: i32,
    /// Tie-break ordering among siblings.
    pub sequence: i32,
    /// Completion percentage in `[0, 100]`.
    pub progress: f64,
    pub planned_effort_minutes: i64,
    pub assigned_resource: Option<ResourceId>,
    pub parent: Option<WorkItemId>,
    /// Items that must be `Completed` before this one may become active.
    pub predecessors: Vec<WorkItemId>,
    pub scheduled_start: Option<NaiveDateTime>,
    pub expected_start: Option<NaiveDateTime>,
    pub expected_end: Option<NaiveDateTime>,
    pub actual_start: Option<NaiveDateTime>,
    pub actual_end: Option<NaiveDateTime>,
    pub snapshot: Option<CapacitySnapshot>,
    pub modified_by: Option<String>,
}

impl WorkItem {
    pub fn new(id: impl Into<WorkItemId>, subject: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            status: WorkItemStatus::Open,
            priority: 0,
            sequence: 0,
            progress: 0.0,
            planned_effort_minutes: 0,
            assigned_resource: None,
            parent: None,
            predecessors: Vec::new(),
            scheduled_start: None,
            expected_start: None,
            expected_end: None,
            actual_start: None,
            actual_end: None,
            snapshot: None,
            modified_by: None,
        }
    }
}

/// Static information about a resource that owns an availability calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceProfile {
    pub id: ResourceId,
    pub name: Option<String>,
    /// Nominal start of the working day; falls back to the configured default.
    pub workday_start: Option<NaiveTime>,
}

impl ResourceProfile {
    pub fn new(id: impl Into<ResourceId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            workday_start: None,
        }
    }
}
