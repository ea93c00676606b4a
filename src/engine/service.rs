// src/engine/service.rs

//! Work item mutations.
//!
//! Every mutation runs the same strict sequence:
//! validate → gate → apply → derive → save → propagate.
//! Nothing is written until validation and gating have passed.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use crate::capacity::{AllocatorSettings, CapacityForecast};
use crate::clock::Clock;
use crate::dispatch::Dispatcher;
use crate::engine::reconcile::{ReconciliationReport, Reconciler};
use crate::errors::{Result, ValidationError};
use crate::graph::{apply_transition, check_transition_legal, gate, validate_item, validate_references};
use crate::model::{Actor, CapacitySnapshot, WorkItem, WorkItemId};
use crate::store::{AvailabilityCalendar, WorkItemStore};
use crate::types::WorkItemStatus;

/// Entry point for everything that changes a work item.
#[derive(Debug, Clone)]
pub struct WorkItemService {
    store: Arc<dyn WorkItemStore>,
    calendar: Arc<dyn AvailabilityCalendar>,
    dispatcher: Arc<dyn Dispatcher>,
    clock: Arc<dyn Clock>,
    reconciler: Reconciler,
}

impl WorkItemService {
    pub fn new(
        store: Arc<dyn WorkItemStore>,
        calendar: Arc<dyn AvailabilityCalendar>,
        dispatcher: Arc<dyn Dispatcher>,
        clock: Arc<dyn Clock>,
        settings: AllocatorSettings,
    ) -> Self {
        let reconciler = Reconciler::new(
            Arc::clone(&store),
            Arc::clone(&calendar),
            Arc::clone(&clock),
            settings,
        );
        Self {
            store,
            calendar,
            dispatcher,
            clock,
            reconciler,
        }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn get(&self, id: &str) -> Result<WorkItem> {
        self.store.get_work_item(id)
    }

    /// Move an item to `target`, refusing with `BlockedByDependency` when the
    /// target is active or terminal and a predecessor is not completed.
    pub fn transition(&self, id: &str, target: WorkItemStatus, actor: &Actor) -> Result<WorkItem> {
        let item = self.store.get_work_item(id)?;
        let previous_parent = item.parent.clone();
        self.commit(item, Some(target), previous_parent, actor)
    }

    /// Set an item's own progress.
    pub fn update_progress(&self, id: &str, progress: f64, actor: &Actor) -> Result<WorkItem> {
        let mut item = self.store.get_work_item(id)?;
        let previous_parent = item.parent.clone();
        item.progress = progress;
        self.commit(item, None, previous_parent, actor)
    }

    /// Create or edit an item. A status different from the stored one goes
    /// through the same gating as [`transition`](Self::transition); new items
    /// start from `Open`.
    pub fn save(&self, mut item: WorkItem, actor: &Actor) -> Result<WorkItem> {
        let (current_status, previous_parent) = if self.store.contains_work_item(&item.id)? {
            let existing = self.store.get_work_item(&item.id)?;
            (existing.status, existing.parent)
        } else {
            (WorkItemStatus::Open, None)
        };

        let requested = item.status;
        item.status = current_status;
        let target = (requested != current_status).then_some(requested);

        self.commit(item, target, previous_parent, actor)
    }

    /// Forecast an item and persist the snapshot (and a defaulted scheduled
    /// start).
    pub fn forecast(&self, id: &str) -> Result<CapacitySnapshot> {
        self.forecast_detail(id).map(|fc| fc.snapshot)
    }

    /// Like [`forecast`](Self::forecast) but returns the day-by-day
    /// allocation too.
    pub fn forecast_detail(&self, id: &str) -> Result<CapacityForecast> {
        let item = self.store.get_work_item(id)?;
        self.reconciler.refresh(&item)
    }

    /// Refresh snapshots for every open item.
    pub fn reconcile_all(&self) -> Result<ReconciliationReport> {
        self.reconciler.reconcile_all()
    }

    /// Remove a leaf item. Refused while another item still lists it as a
    /// predecessor or while it has children of its own.
    pub fn delete(&self, id: &str, actor: &Actor) -> Result<()> {
        let item = self.store.get_work_item(id)?;

        let deleting: HashSet<&str> = [id].into_iter().collect();
        self.ensure_unreferenced(id, &deleting)?;
        if let Some(child) = self.store.list_children(id)?.into_iter().next() {
            return Err(ValidationError::HasChildren {
                item: id.to_string(),
                child: child.id,
            }
            .into());
        }

        self.store.delete_work_item(id)?;
        info!(item = %id, actor = actor.name(), "work item deleted");

        if let Some(parent) = &item.parent {
            self.dispatcher.dispatch_rollup(parent)?;
        }
        Ok(())
    }

    /// Cancel a job: delete every descendant, mark the job `Canceled` and
    /// recompute its progress one final time.
    ///
    /// Returns the ids that were deleted, deepest first.
    pub fn cancel_job(&self, parent_id: &str, actor: &Actor) -> Result<Vec<WorkItemId>> {
        let mut parent = self.store.get_work_item(parent_id)?;
        let descendants = self.descendants_of(parent_id)?;

        let doomed: HashSet<&str> = descendants.iter().map(|s| s.as_str()).collect();
        for id in &descendants {
            self.ensure_unreferenced(id, &doomed)?;
        }

        for id in descendants.iter().rev() {
            self.store.delete_work_item(id)?;
        }

        if !parent.status.is_terminal() {
            apply_transition(&mut parent, WorkItemStatus::Canceled, self.clock.now(), actor);
            self.store.save_work_item(&parent)?;
        }

        info!(
            job = %parent_id,
            deleted = descendants.len(),
            actor = actor.name(),
            "job canceled"
        );

        self.dispatcher.dispatch_rollup(parent_id)?;

        let mut deleted = descendants;
        deleted.reverse();
        Ok(deleted)
    }

    /// Every descendant of `root`, each listed after its own parent.
    fn descendants_of(&self, root: &str) -> Result<Vec<WorkItemId>> {
        let mut out = Vec::new();
        let mut frontier = vec![root.to_string()];
        let mut seen: HashSet<WorkItemId> = HashSet::new();

        while let Some(current) = frontier.pop() {
            for child in self.store.list_children(&current)? {
                if seen.insert(child.id.clone()) {
                    frontier.push(child.id.clone());
                    out.push(child.id);
                }
            }
        }
        Ok(out)
    }

    fn ensure_unreferenced(&self, id: &str, deleting: &HashSet<&str>) -> Result<()> {
        if let Some(dependent) = self
            .store
            .list_dependents(id)?
            .into_iter()
            .find(|d| !deleting.contains(d.id.as_str()))
        {
            return Err(ValidationError::StillReferenced {
                item: id.to_string(),
                dependent: dependent.id,
            }
            .into());
        }
        Ok(())
    }

    /// Check the item's references against the rest of the store.
    fn validate_links(&self, item: &WorkItem) -> Result<()> {
        if let Some(resource) = &item.assigned_resource {
            if self.calendar.resource(resource).is_none() {
                return Err(ValidationError::DanglingResource {
                    item: item.id.clone(),
                    resource: resource.clone(),
                }
                .into());
            }
        }

        let mut all: Vec<WorkItem> = self
            .store
            .list_work_items()?
            .into_iter()
            .filter(|other| other.id != item.id)
            .collect();
        all.push(item.clone());
        validate_references(&all)?;
        Ok(())
    }

    fn commit(
        &self,
        mut item: WorkItem,
        target: Option<WorkItemStatus>,
        previous_parent: Option<WorkItemId>,
        actor: &Actor,
    ) -> Result<WorkItem> {
        // validate
        validate_item(&item)?;
        self.validate_links(&item)?;
        if let Some(target) = target {
            check_transition_legal(&item, target)?;
        }

        // gate
        let now = self.clock.now();
        if let Some(target) = target {
            gate(&item, target, self.store.as_ref())?;
        }

        // apply
        match target {
            Some(target) => apply_transition(&mut item, target, now, actor),
            None => item.modified_by = Some(actor.name().to_string()),
        }

        // derive
        item.scheduled_start.get_or_insert(now);
        let fc = self.reconciler.compute(&item)?;
        item.snapshot = Some(fc.snapshot);
        self.store.save_work_item(&item)?;

        // propagate
        if let Some(parent) = &item.parent {
            self.dispatcher.dispatch_rollup(parent)?;
        }
        if let Some(old) = previous_parent.filter(|old| Some(old) != item.parent.as_ref()) {
            self.dispatcher.dispatch_rollup(&old)?;
        }

        Ok(item)
    }
}
