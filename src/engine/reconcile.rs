// src/engine/reconcile.rs

//! Batch refresh of capacity snapshots for every open work item.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::capacity::{forecast, AllocatorSettings, CapacityForecast};
use crate::clock::Clock;
use crate::errors::Result;
use crate::model::{WorkItem, WorkItemId};
use crate::store::{AvailabilityCalendar, WorkItemStore};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub updated: usize,
    /// Items whose recompute failed, with the reason.
    pub failed: Vec<(WorkItemId, String)>,
}

impl ReconciliationReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Recomputes and persists derived capacity fields.
///
/// Only `scheduled_start` (when still unset) and the snapshot are written;
/// status, progress and dependencies are never touched.
#[derive(Debug, Clone)]
pub struct Reconciler {
    store: Arc<dyn WorkItemStore>,
    calendar: Arc<dyn AvailabilityCalendar>,
    clock: Arc<dyn Clock>,
    settings: AllocatorSettings,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn WorkItemStore>,
        calendar: Arc<dyn AvailabilityCalendar>,
        clock: Arc<dyn Clock>,
        settings: AllocatorSettings,
    ) -> Self {
        Self {
            store,
            calendar,
            clock,
            settings,
        }
    }

    /// Forecast `item` without persisting anything.
    pub fn compute(&self, item: &WorkItem) -> Result<CapacityForecast> {
        let start = item.scheduled_start.unwrap_or_else(|| self.clock.now());
        forecast(item, start, self.calendar.as_ref(), &self.settings)
    }

    /// Forecast `item` and write the derived fields back.
    pub fn refresh(&self, item: &WorkItem) -> Result<CapacityForecast> {
        let start = item.scheduled_start.unwrap_or_else(|| self.clock.now());
        let fc = forecast(item, start, self.calendar.as_ref(), &self.settings)?;
        self.store.write_snapshot(&item.id, start, &fc.snapshot)?;
        Ok(fc)
    }

    /// Refresh every open item. One item failing does not stop the pass; only
    /// failing to enumerate the open items is an error.
    pub fn reconcile_all(&self) -> Result<ReconciliationReport> {
        let items = self.store.list_open_work_items()?;
        let mut report = ReconciliationReport::default();

        for item in &items {
            match self.refresh(item) {
                Ok(fc) => {
                    report.updated += 1;
                    debug!(
                        item = %item.id,
                        risk = %fc.snapshot.risk,
                        "snapshot refreshed"
                    );
                }
                Err(e) => {
                    warn!(item = %item.id, error = %e, "snapshot refresh failed");
                    report.failed.push((item.id.clone(), e.to_string()));
                }
            }
        }

        info!(
            open = items.len(),
            updated = report.updated,
            failed = report.failed.len(),
            "reconciliation pass finished"
        );

        Ok(report)
    }
}
