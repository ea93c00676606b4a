// src/graph/rollup.rs

//! Parent progress roll-up.

use std::collections::HashSet;

use tracing::debug;

use crate::errors::Result;
use crate::model::{WorkItem, WorkItemId};
use crate::store::WorkItemStore;
use crate::types::WorkItemStatus;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean of the children's progress, rounded to two decimals.
/// No children means zero progress.
pub fn mean_progress(children: &[WorkItem]) -> f64 {
    if children.is_empty() {
        return 0.0;
    }
    let sum: f64 = children.iter().map(|c| c.progress).sum();
    round2(sum / children.len() as f64)
}

/// A single parent whose progress was rewritten.
#[derive(Debug, Clone, PartialEq)]
pub struct RollupUpdate {
    pub parent: WorkItemId,
    pub progress: f64,
}

/// Recompute `parent_id`'s progress from its children, then continue with
/// its own parent until the top of the chain.
///
/// Idempotent: repeating the call with unchanged children writes the same
/// values. A `Completed` parent keeps its progress at 100.
pub fn rollup_progress(store: &dyn WorkItemStore, parent_id: &str) -> Result<Vec<RollupUpdate>> {
    let mut updates = Vec::new();
    let mut visited: HashSet<WorkItemId> = HashSet::new();
    let mut next = Some(parent_id.to_string());

    while let Some(current) = next.take() {
        if !visited.insert(current.clone()) {
            break;
        }

        let parent = store.get_work_item(&current)?;
        let children = store.list_children(&current)?;

        let progress = if parent.status == WorkItemStatus::Completed {
            100.0
        } else {
            mean_progress(&children)
        };

        store.write_progress(&current, progress)?;
        debug!(
            parent = %current,
            children = children.len(),
            progress,
            "parent progress rolled up"
        );

        updates.push(RollupUpdate {
            parent: current,
            progress,
        });
        next = parent.parent;
    }

    Ok(updates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn child(id: &str, parent: &str, progress: f64) -> WorkItem {
        let mut item = WorkItem::new(id, id);
        item.parent = Some(parent.to_string());
        item.progress = progress;
        item
    }

    #[test]
    fn mean_is_rounded_to_two_decimals() {
        let children = vec![
            child("a", "p", 10.0),
            child("b", "p", 20.0),
            child("c", "p", 0.0),
        ];
        assert_eq!(mean_progress(&children), 10.0);

        let children = vec![
            child("a", "p", 100.0),
            child("b", "p", 0.0),
            child("c", "p", 0.0),
        ];
        assert_eq!(mean_progress(&children), 33.33);
        assert_eq!(mean_progress(&[]), 0.0);
    }

    #[test]
    fn rollup_walks_up_the_chain_and_is_idempotent() {
        let store = MemoryStore::new();
        store.insert_work_item(WorkItem::new("job", "job")).unwrap();
        store.insert_work_item(child("phase", "job", 0.0)).unwrap();
        store.insert_work_item(child("t1", "phase", 50.0)).unwrap();
        store.insert_work_item(child("t2", "phase", 100.0)).unwrap();

        let first = rollup_progress(&store, "phase").unwrap();
        assert_eq!(
            first,
            vec![
                RollupUpdate {
                    parent: "phase".into(),
                    progress: 75.0
                },
                RollupUpdate {
                    parent: "job".into(),
                    progress: 75.0
                },
            ]
        );

        let second = rollup_progress(&store, "phase").unwrap();
        assert_eq!(first, second);
        assert_eq!(store.get_work_item("job").unwrap().progress, 75.0);
    }

    #[test]
    fn childless_parent_rolls_up_to_zero() {
        let store = MemoryStore::new();
        let mut job = WorkItem::new("job", "job");
        job.progress = 60.0;
        store.insert_work_item(job).unwrap();

        rollup_progress(&store, "job").unwrap();
        assert_eq!(store.get_work_item("job").unwrap().progress, 0.0);
    }

    #[test]
    fn completed_parent_stays_at_100() {
        let store = MemoryStore::new();
        let mut job = WorkItem::new("job", "job");
        job.status = WorkItemStatus::Completed;
        job.progress = 100.0;
        store.insert_work_item(job).unwrap();
        store.insert_work_item(child("t1", "job", 20.0)).unwrap();

        let updates = rollup_progress(&store, "job").unwrap();
        assert_eq!(updates[0].progress, 100.0);
    }
}
