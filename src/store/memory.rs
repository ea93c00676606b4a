// src/store/memory.rs

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use chrono::{NaiveDate, NaiveDateTime};

use super::{AvailabilityCalendar, PolicyStore, WorkItemStore};
use crate::errors::{Result, SchedError};
use crate::model::{CapacitySnapshot, ResourceId, ResourceProfile, WorkItem, WorkItemId};
use crate::sla::SlaPolicy;

#[derive(Debug, Default)]
struct Inner {
    items: BTreeMap<WorkItemId, WorkItem>,
    resources: BTreeMap<ResourceId, ResourceProfile>,
    availability: HashMap<(ResourceId, NaiveDate), i64>,
    policies: BTreeMap<String, SlaPolicy>,
}

/// In-memory store shared by clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| SchedError::Other(anyhow!("memory store lock poisoned: {e}")))
    }

    /// Calendar reads cannot fail; recover the data from a poisoned lock.
    fn lock_for_read(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn add_resource(&self, profile: ResourceProfile) -> Result<()> {
        let mut inner = self.lock()?;
        inner.resources.insert(profile.id.clone(), profile);
        Ok(())
    }

    /// Set the available minutes for a resource on a date, replacing any
    /// previous entry.
    pub fn set_availability(&self, resource: &str, date: NaiveDate, minutes: i64) -> Result<()> {
        let mut inner = self.lock()?;
        inner
            .availability
            .insert((resource.to_string(), date), minutes);
        Ok(())
    }

    pub fn insert_work_item(&self, item: WorkItem) -> Result<()> {
        self.save_work_item(&item)
    }

    pub fn insert_policy(&self, policy: SlaPolicy) -> Result<()> {
        self.save_policy(&policy)
    }
}

fn sort_for_schedule(items: &mut [WorkItem]) {
    items.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(a.sequence.cmp(&b.sequence))
            .then(a.id.cmp(&b.id))
    });
}

impl WorkItemStore for MemoryStore {
    fn get_work_item(&self, id: &str) -> Result<WorkItem> {
        let inner = self.lock()?;
        inner
            .items
            .get(id)
            .cloned()
            .ok_or_else(|| SchedError::item_not_found(id))
    }

    fn contains_work_item(&self, id: &str) -> Result<bool> {
        Ok(self.lock()?.items.contains_key(id))
    }

    fn save_work_item(&self, item: &WorkItem) -> Result<()> {
        let mut inner = self.lock()?;
        inner.items.insert(item.id.clone(), item.clone());
        Ok(())
    }

    fn delete_work_item(&self, id: &str) -> Result<()> {
        let mut inner = self.lock()?;
        inner
            .items
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SchedError::item_not_found(id))
    }

    fn list_children(&self, parent_id: &str) -> Result<Vec<WorkItem>> {
        let inner = self.lock()?;
        let mut children: Vec<WorkItem> = inner
            .items
            .values()
            .filter(|item| item.parent.as_deref() == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.sequence.cmp(&b.sequence).then(a.id.cmp(&b.id)));
        Ok(children)
    }

    fn list_open_work_items(&self) -> Result<Vec<WorkItem>> {
        let inner = self.lock()?;
        let mut open: Vec<WorkItem> = inner
            .items
            .values()
            .filter(|item| item.status.is_open())
            .cloned()
            .collect();
        sort_for_schedule(&mut open);
        Ok(open)
    }

    fn list_work_items(&self) -> Result<Vec<WorkItem>> {
        Ok(self.lock()?.items.values().cloned().collect())
    }

    fn list_dependents(&self, id: &str) -> Result<Vec<WorkItem>> {
        let inner = self.lock()?;
        Ok(inner
            .items
            .values()
            .filter(|item| item.predecessors.iter().any(|p| p == id))
            .cloned()
            .collect())
    }

    fn write_snapshot(
        &self,
        id: &str,
        scheduled_start: NaiveDateTime,
        snapshot: &CapacitySnapshot,
    ) -> Result<()> {
        let mut inner = self.lock()?;
        let item = inner
            .items
            .get_mut(id)
            .ok_or_else(|| SchedError::item_not_found(id))?;
        item.scheduled_start = Some(scheduled_start);
        item.snapshot = Some(snapshot.clone());
        Ok(())
    }

    fn write_progress(&self, id: &str, progress: f64) -> Result<()> {
        let mut inner = self.lock()?;
        let item = inner
            .items
            .get_mut(id)
            .ok_or_else(|| SchedError::item_not_found(id))?;
        item.progress = progress;
        Ok(())
    }
}

impl AvailabilityCalendar for MemoryStore {
    fn resource(&self, id: &str) -> Option<ResourceProfile> {
        self.lock_for_read().resources.get(id).cloned()
    }

    fn available_minutes(&self, resource: &str, date: NaiveDate) -> i64 {
        self.lock_for_read()
            .availability
            .get(&(resource.to_string(), date))
            .copied()
            .unwrap_or(0)
    }
}

impl PolicyStore for MemoryStore {
    fn list_policies(&self) -> Result<Vec<SlaPolicy>> {
        Ok(self.lock()?.policies.values().cloned().collect())
    }

    fn get_policy(&self, name: &str) -> Result<Option<SlaPolicy>> {
        Ok(self.lock()?.policies.get(name).cloned())
    }

    fn save_policy(&self, policy: &SlaPolicy) -> Result<()> {
        let mut inner = self.lock()?;
        inner.policies.insert(policy.name.clone(), policy.clone());
        Ok(())
    }

    fn clear_other_defaults(&self, keep: &str) -> Result<Vec<String>> {
        let mut inner = self.lock()?;
        let mut cleared = Vec::new();
        for (name, policy) in inner.policies.iter_mut() {
            if name != keep && policy.is_default {
                policy.is_default = false;
                cleared.push(name.clone());
            }
        }
        Ok(cleared)
    }
}
