// src/store/mod.rs

//! Persistence boundary.
//!
//! The scheduling core never talks to a database directly. It reads and
//! writes through these traits:
//! - [`WorkItemStore`] for work items and their derived fields
//! - [`AvailabilityCalendar`] for read-only resource availability
//! - [`PolicyStore`] for SLA policies
//!
//! [`memory::MemoryStore`] implements all three in memory and backs both the
//! CLI (loaded from a shop file) and the tests.

use std::fmt::Debug;

use chrono::{NaiveDate, NaiveDateTime};

use crate::errors::Result;
use crate::model::{CapacitySnapshot, ResourceProfile, WorkItem};
use crate::sla::SlaPolicy;

pub mod memory;

pub use memory::MemoryStore;

pub trait WorkItemStore: Send + Sync + Debug {
    /// Fetch a work item, failing with `NotFound` if it does not exist.
    fn get_work_item(&self, id: &str) -> Result<WorkItem>;

    fn contains_work_item(&self, id: &str) -> Result<bool>;

    /// Insert or replace a work item wholesale.
    fn save_work_item(&self, item: &WorkItem) -> Result<()>;

    fn delete_work_item(&self, id: &str) -> Result<()>;

    fn list_children(&self, parent_id: &str) -> Result<Vec<WorkItem>>;

    /// Items whose status is not terminal, ordered by priority then sequence.
    fn list_open_work_items(&self) -> Result<Vec<WorkItem>>;

    fn list_work_items(&self) -> Result<Vec<WorkItem>>;

    /// Items that list `id` as one of their predecessors.
    fn list_dependents(&self, id: &str) -> Result<Vec<WorkItem>>;

    /// Overwrite only the derived capacity fields of an item.
    fn write_snapshot(
        &self,
        id: &str,
        scheduled_start: NaiveDateTime,
        snapshot: &CapacitySnapshot,
    ) -> Result<()>;

    /// Overwrite only the progress field of an item.
    fn write_progress(&self, id: &str, progress: f64) -> Result<()>;
}

/// Read-only availability lookup. A missing entry means zero minutes.
pub trait AvailabilityCalendar: Send + Sync + Debug {
    fn resource(&self, id: &str) -> Option<ResourceProfile>;

    fn available_minutes(&self, resource: &str, date: NaiveDate) -> i64;
}

pub trait PolicyStore: Send + Sync + Debug {
    fn list_policies(&self) -> Result<Vec<SlaPolicy>>;

    fn get_policy(&self, name: &str) -> Result<Option<SlaPolicy>>;

    fn save_policy(&self, policy: &SlaPolicy) -> Result<()>;

    /// Clear `is_default` on every policy except `keep`, in one step.
    ///
    /// Returns the names of the policies that were changed.
    fn clear_other_defaults(&self, keep: &str) -> Result<Vec<String>>;
}
