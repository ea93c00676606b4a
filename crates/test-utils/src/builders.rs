#![allow(dead_code)]

use chrono::NaiveDateTime;
use shopsched::config::{AvailabilityEntry, ItemConfig, RawShopFile, ResourceConfig, ShopFile};
use shopsched::errors::Result;
use shopsched::model::WorkItem;
use shopsched::sla::{SlaPolicy, SlaPolicyRule};
use shopsched::types::{DispatchMode, WorkItemStatus};

/// Builder for `WorkItem` to simplify test setup.
pub struct WorkItemBuilder {
    item: WorkItem,
}

impl WorkItemBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            item: WorkItem::new(id, id),
        }
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.item.subject = subject.to_string();
        self
    }

    /// Sets the status directly. `Completed` also sets progress to 100.
    pub fn status(mut self, status: WorkItemStatus) -> Self {
        self.item.status = status;
        if status == WorkItemStatus::Completed {
            self.item.progress = 100.0;
        }
        self
    }

    pub fn progress(mut self, progress: f64) -> Self {
        self.item.progress = progress;
        self
    }

    pub fn effort(mut self, minutes: i64) -> Self {
        self.item.planned_effort_minutes = minutes;
        self
    }

    pub fn resource(mut self, resource: &str) -> Self {
        self.item.assigned_resource = Some(resource.to_string());
        self
    }

    pub fn parent(mut self, parent: &str) -> Self {
        self.item.parent = Some(parent.to_string());
        self
    }

    pub fn after(mut self, predecessor: &str) -> Self {
        self.item.predecessors.push(predecessor.to_string());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.item.priority = priority;
        self
    }

    pub fn sequence(mut self, sequence: i32) -> Self {
        self.item.sequence = sequence;
        self
    }

    pub fn scheduled_start(mut self, start: NaiveDateTime) -> Self {
        self.item.scheduled_start = Some(start);
        self
    }

    pub fn expected(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.item.expected_start = Some(start);
        self.item.expected_end = Some(end);
        self
    }

    pub fn build(self) -> WorkItem {
        self.item
    }
}

/// Builder for `SlaPolicyRule`.
pub struct RuleBuilder {
    rule: SlaPolicyRule,
}

impl RuleBuilder {
    pub fn new(service_type: &str, start_event: &str, stop_event: &str, hours: f64) -> Self {
        Self {
            rule: SlaPolicyRule::new(service_type, start_event, stop_event, hours),
        }
    }

    pub fn workshop(mut self, workshop: &str) -> Self {
        self.rule.workshop = Some(workshop.to_string());
        self
    }

    pub fn escalations(mut self, first: i64, second: i64) -> Self {
        self.rule.escalation_minutes_1 = Some(first);
        self.rule.escalation_minutes_2 = Some(second);
        self
    }

    pub fn build(self) -> SlaPolicyRule {
        self.rule
    }
}

/// Builder for `SlaPolicy`.
pub struct PolicyBuilder {
    policy: SlaPolicy,
}

impl PolicyBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            policy: SlaPolicy::new(name),
        }
    }

    pub fn thresholds(mut self, warn: f64, critical: f64) -> Self {
        self.policy.warn_threshold_pct = warn;
        self.policy.critical_threshold_pct = critical;
        self
    }

    pub fn grace(mut self, minutes: i64) -> Self {
        self.policy.breach_grace_minutes = minutes;
        self
    }

    pub fn enabled(mut self, val: bool) -> Self {
        self.policy.enabled = val;
        self
    }

    pub fn default_policy(mut self) -> Self {
        self.policy.is_default = true;
        self
    }

    pub fn per_workshop(mut self) -> Self {
        self.policy.apply_per_workshop = true;
        self
    }

    pub fn rule(mut self, rule: SlaPolicyRule) -> Self {
        self.policy.rules.push(rule);
        self
    }

    pub fn build(self) -> SlaPolicy {
        self.policy
    }
}

/// Builder for `ShopFile`, going through the same validation as a file on
/// disk.
pub struct ShopFileBuilder {
    raw: RawShopFile,
}

impl ShopFileBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawShopFile::default(),
        }
    }

    pub fn lookahead_days(mut self, days: u32) -> Self {
        self.raw.config.lookahead_days = days;
        self
    }

    pub fn workday_start(mut self, hhmm: &str) -> Self {
        self.raw.config.workday_start = hhmm.to_string();
        self
    }

    pub fn dispatch_mode(mut self, mode: DispatchMode) -> Self {
        self.raw.config.dispatch_mode = mode;
        self
    }

    pub fn with_resource(mut self, id: &str) -> Self {
        self.raw
            .resource
            .insert(id.to_string(), ResourceConfig::default());
        self
    }

    pub fn with_availability(mut self, resource: &str, date: &str, minutes: i64) -> Self {
        self.raw.availability.push(AvailabilityEntry {
            resource: resource.to_string(),
            date: date.to_string(),
            minutes,
        });
        self
    }

    pub fn with_item(mut self, id: &str, item: ItemConfig) -> Self {
        self.raw.item.insert(id.to_string(), item);
        self
    }

    pub fn with_policy(mut self, policy: SlaPolicy) -> Self {
        self.raw.policy.insert(policy.name.clone(), policy);
        self
    }

    pub fn try_build(self) -> Result<ShopFile> {
        ShopFile::try_from(self.raw)
    }

    pub fn build(self) -> ShopFile {
        self.try_build()
            .expect("Failed to build valid shop file from builder")
    }
}

impl Default for ShopFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
