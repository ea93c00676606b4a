// src/types.rs

//! Shared enums used across the graph engine, allocator and SLA engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a work item.
///
/// `Open` is the entry state; `Completed` and `Canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemStatus {
    Open,
    Working,
    Paused,
    PendingReview,
    Completed,
    Canceled,
}

impl WorkItemStatus {
    /// Statuses that may only be entered once every predecessor is completed.
    pub fn requires_completed_predecessors(self) -> bool {
        matches!(
            self,
            WorkItemStatus::Working | WorkItemStatus::PendingReview | WorkItemStatus::Completed
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, WorkItemStatus::Completed | WorkItemStatus::Canceled)
    }

    /// Statuses the reconciliation sweep treats as still open.
    pub fn is_open(self) -> bool {
        !self.is_terminal()
    }

    pub fn label(self) -> &'static str {
        match self {
            WorkItemStatus::Open => "Open",
            WorkItemStatus::Working => "Working",
            WorkItemStatus::Paused => "Paused",
            WorkItemStatus::PendingReview => "Pending Review",
            WorkItemStatus::Completed => "Completed",
            WorkItemStatus::Canceled => "Canceled",
        }
    }
}

impl Default for WorkItemStatus {
    fn default() -> Self {
        WorkItemStatus::Open
    }
}

impl fmt::Display for WorkItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WorkItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect();

        match normalized.as_str() {
            "open" => Ok(WorkItemStatus::Open),
            "working" => Ok(WorkItemStatus::Working),
            "paused" => Ok(WorkItemStatus::Paused),
            "pendingreview" => Ok(WorkItemStatus::PendingReview),
            "completed" => Ok(WorkItemStatus::Completed),
            "canceled" | "cancelled" => Ok(WorkItemStatus::Canceled),
            _ => Err(format!(
                "invalid status: {s} (expected open, working, paused, pending_review, completed or canceled)"
            )),
        }
    }
}

/// Capacity risk tier derived from utilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        };
        f.write_str(s)
    }
}

/// How parent roll-up work is dispatched.
///
/// - `Inline`: recompute the parent directly inside the triggering call.
/// - `Queued`: hand the recompute to a background worker; if the queue
///   cannot accept it the dispatcher computes inline instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    Inline,
    Queued,
}

impl Default for DispatchMode {
    fn default() -> Self {
        DispatchMode::Inline
    }
}

impl FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inline" => Ok(DispatchMode::Inline),
            "queued" => Ok(DispatchMode::Queued),
            other => Err(format!(
                "invalid dispatch_mode: {other} (expected \"inline\" or \"queued\")"
            )),
        }
    }
}

/// Service-level standing of a job against its turnaround target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SlaStatus {
    OnTrack,
    Warning,
    Critical,
    Breached,
}

impl fmt::Display for SlaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SlaStatus::OnTrack => "On Track",
            SlaStatus::Warning => "Warning",
            SlaStatus::Critical => "Critical",
            SlaStatus::Breached => "Breached",
        };
        f.write_str(s)
    }
}
