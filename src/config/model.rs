// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::capacity::{AllocatorSettings, DEFAULT_LOOKAHEAD_DAYS};
use crate::errors::Result;
use crate::model::{ResourceId, ResourceProfile, WorkItem};
use crate::sla::SlaPolicy;
use crate::store::MemoryStore;
use crate::types::{DispatchMode, WorkItemStatus};

/// Top-level shop file as read from TOML, before validation.
///
/// ```toml
/// [config]
/// lookahead_days = 30
/// workday_start = "08:00"
/// dispatch_mode = "inline"
///
/// [resource.alice]
/// name = "Alice"
///
/// [[availability]]
/// resource = "alice"
/// date = "2024-03-04"
/// minutes = 240
///
/// [item.overhaul]
/// subject = "Overhaul"
/// planned_effort_minutes = 480
/// assigned_resource = "alice"
/// scheduled_start = "2024-03-04T09:00:00"
///
/// [policy.standard]
/// is_default = true
///
/// [[policy.standard.rule]]
/// service_type = "Overhaul"
/// start_event = "Intake"
/// stop_event = "QC"
/// turnaround_hours = 48
/// ```
///
/// Dates and timestamps are quoted strings. Every section is optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawShopFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// Resources from `[resource.<id>]`, keyed by resource id.
    #[serde(default)]
    pub resource: BTreeMap<String, ResourceConfig>,

    #[serde(default)]
    pub availability: Vec<AvailabilityEntry>,

    /// Work items from `[item.<id>]`, keyed by item id.
    #[serde(default)]
    pub item: BTreeMap<String, ItemConfig>,

    /// SLA policies from `[policy.<name>]`, keyed by policy name.
    #[serde(default)]
    pub policy: BTreeMap<String, SlaPolicy>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// How many days the capacity allocator walks before extrapolating.
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u32,

    /// `"HH:MM"` start of the working day for resources without their own.
    #[serde(default = "default_workday_start")]
    pub workday_start: String,

    /// `"inline"` (default) or `"queued"`.
    #[serde(default)]
    pub dispatch_mode: DispatchMode,

    /// Capacity of the queued roll-up channel.
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,

    /// Seconds between reconciliation passes in `reconcile` mode.
    #[serde(default = "default_reconcile_interval_secs")]
    pub reconcile_interval_secs: u64,
}

fn default_lookahead_days() -> u32 {
    DEFAULT_LOOKAHEAD_DAYS
}

fn default_workday_start() -> String {
    "08:00".to_string()
}

fn default_queue_length() -> usize {
    64
}

fn default_reconcile_interval_secs() -> u64 {
    24 * 60 * 60
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            lookahead_days: default_lookahead_days(),
            workday_start: default_workday_start(),
            dispatch_mode: DispatchMode::default(),
            queue_length: default_queue_length(),
            reconcile_interval_secs: default_reconcile_interval_secs(),
        }
    }
}

/// `[resource.<id>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ResourceConfig {
    #[serde(default)]
    pub name: Option<String>,

    /// Overrides `[config].workday_start` for this resource.
    #[serde(default)]
    pub workday_start: Option<String>,
}

/// One `[[availability]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityEntry {
    pub resource: String,
    /// `"YYYY-MM-DD"`.
    pub date: String,
    pub minutes: i64,
}

/// `[item.<id>]` section: seed data for a work item.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ItemConfig {
    /// Defaults to the item id.
    #[serde(default)]
    pub subject: Option<String>,

    #[serde(default)]
    pub status: WorkItemStatus,

    #[serde(default)]
    pub priority: i32,

    #[serde(default)]
    pub sequence: i32,

    #[serde(default)]
    pub progress: f64,

    #[serde(default)]
    pub planned_effort_minutes: i64,

    #[serde(default)]
    pub assigned_resource: Option<String>,

    #[serde(default)]
    pub parent: Option<String>,

    /// Predecessors: this item may not become active until all of these are
    /// completed.
    #[serde(default)]
    pub after: Vec<String>,

    /// `"YYYY-MM-DDTHH:MM[:SS]"`.
    #[serde(default)]
    pub scheduled_start: Option<String>,

    #[serde(default)]
    pub expected_start: Option<String>,

    #[serde(default)]
    pub expected_end: Option<String>,
}

/// A validated shop file.
///
/// Only obtainable through `TryFrom<RawShopFile>`, so every reference in it
/// resolves and every policy has passed validation.
#[derive(Debug, Clone)]
pub struct ShopFile {
    pub config: ConfigSection,
    workday_start: NaiveTime,
    resources: Vec<ResourceProfile>,
    availability: Vec<(ResourceId, NaiveDate, i64)>,
    items: Vec<WorkItem>,
    policies: Vec<SlaPolicy>,
}

impl ShopFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        workday_start: NaiveTime,
        resources: Vec<ResourceProfile>,
        availability: Vec<(ResourceId, NaiveDate, i64)>,
        items: Vec<WorkItem>,
        policies: Vec<SlaPolicy>,
    ) -> Self {
        Self {
            config,
            workday_start,
            resources,
            availability,
            items,
            policies,
        }
    }

    pub fn resources(&self) -> &[ResourceProfile] {
        &self.resources
    }

    pub fn availability(&self) -> &[(ResourceId, NaiveDate, i64)] {
        &self.availability
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn policies(&self) -> &[SlaPolicy] {
        &self.policies
    }

    pub fn allocator_settings(&self) -> AllocatorSettings {
        AllocatorSettings {
            lookahead_days: self.config.lookahead_days,
            workday_start: self.workday_start,
        }
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.config.reconcile_interval_secs)
    }

    /// Load everything into a fresh in-memory store.
    pub fn build_store(&self) -> Result<MemoryStore> {
        let store = MemoryStore::new();
        for resource in &self.resources {
            store.add_resource(resource.clone())?;
        }
        for (resource, date, minutes) in &self.availability {
            store.set_availability(resource, *date, *minutes)?;
        }
        for item in &self.items {
            store.insert_work_item(item.clone())?;
        }
        for policy in &self.policies {
            store.insert_policy(policy.clone())?;
        }
        Ok(store)
    }
}
