// src/graph/transition.rs

//! Status transition gating and status-derived side effects.
//!
//! The pieces are kept separate so the service can run them in a strict
//! order: validate, gate, then apply.

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::errors::{BlockedByDependency, Blocker, Result, SchedError, ValidationError};
use crate::model::{Actor, WorkItem};
use crate::store::WorkItemStore;
use crate::types::WorkItemStatus;

/// Upper bound on planned effort: ten years of round-the-clock work.
pub const MAX_EFFORT_MINUTES: i64 = 10 * 365 * 24 * 60;

/// Field-level checks that must hold before any mutation is applied.
pub fn validate_item(item: &WorkItem) -> std::result::Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (item.expected_start, item.expected_end) {
        if end < start {
            return Err(ValidationError::InvalidDateRange {
                item: item.id.clone(),
                start: start.to_string(),
                end: end.to_string(),
            });
        }
    }

    if !(0.0..=100.0).contains(&item.progress) {
        return Err(ValidationError::ProgressOutOfRange {
            item: item.id.clone(),
            value: item.progress,
        });
    }

    if item.status == WorkItemStatus::Completed && item.progress != 100.0 {
        return Err(ValidationError::CompletedProgress {
            item: item.id.clone(),
            value: item.progress,
        });
    }

    if item.planned_effort_minutes < 0 {
        return Err(ValidationError::NegativeEffort {
            item: item.id.clone(),
            value: item.planned_effort_minutes,
        });
    }

    if item.planned_effort_minutes > MAX_EFFORT_MINUTES {
        return Err(ValidationError::EffortOutOfRange {
            item: item.id.clone(),
            value: item.planned_effort_minutes,
            max: MAX_EFFORT_MINUTES,
        });
    }

    Ok(())
}

/// Whether moving from the item's current status to `target` is allowed at
/// all, independent of predecessors.
///
/// Terminal statuses cannot be left and `Open` cannot be re-entered. Staying
/// in the same status is always allowed.
pub fn check_transition_legal(
    item: &WorkItem,
    target: WorkItemStatus,
) -> std::result::Result<(), ValidationError> {
    let from = item.status;
    if from == target {
        return Ok(());
    }

    if from.is_terminal() || target == WorkItemStatus::Open {
        return Err(ValidationError::IllegalTransition {
            item: item.id.clone(),
            from,
            to: target,
        });
    }

    Ok(())
}

/// Predecessors of `item` that are not `Completed`, in declaration order,
/// each listed once.
///
/// A predecessor missing from the store is a validation error.
pub fn unsatisfied_predecessors(
    item: &WorkItem,
    store: &dyn WorkItemStore,
) -> Result<Vec<Blocker>> {
    let mut blockers: Vec<Blocker> = Vec::new();

    for pred_id in &item.predecessors {
        if blockers.iter().any(|b| &b.id == pred_id) {
            continue;
        }
        let pred = match store.get_work_item(pred_id) {
            Ok(p) => p,
            Err(SchedError::NotFound { .. }) => {
                return Err(ValidationError::DanglingPredecessor {
                    item: item.id.clone(),
                    predecessor: pred_id.clone(),
                }
                .into());
            }
            Err(e) => return Err(e),
        };

        if pred.status != WorkItemStatus::Completed {
            blockers.push(Blocker {
                id: pred.id,
                status: pred.status,
            });
        }
    }

    Ok(blockers)
}

/// Refuse `target` if it is an active or terminal status and any predecessor
/// is incomplete. Staying in the current status is never gated.
pub fn gate(item: &WorkItem, target: WorkItemStatus, store: &dyn WorkItemStore) -> Result<()> {
    // Predecessor references are resolved even for ungated targets so that
    // dangling links always surface.
    let blockers = unsatisfied_predecessors(item, store)?;

    if target == item.status || !target.requires_completed_predecessors() || blockers.is_empty()
    {
        return Ok(());
    }

    let err = BlockedByDependency {
        item: item.id.clone(),
        target,
        blockers,
    };
    info!(item = %item.id, %target, "{err}");
    Err(err.into())
}

/// Apply `target` and the side effects it implies. Assumes the transition has
/// already been validated and gated.
pub fn apply_transition(
    item: &mut WorkItem,
    target: WorkItemStatus,
    now: NaiveDateTime,
    actor: &Actor,
) {
    let from = item.status;
    item.status = target;

    match target {
        WorkItemStatus::Working => {
            if item.actual_start.is_none() {
                item.actual_start = Some(now);
            }
        }
        WorkItemStatus::Completed => {
            item.progress = 100.0;
            if item.actual_end.is_none() {
                item.actual_end = Some(now);
            }
        }
        _ => {}
    }

    item.modified_by = Some(actor.name().to_string());

    debug!(
        item = %item.id,
        %from,
        to = %target,
        actor = actor.name(),
        "status transition applied"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn with_status(id: &str, status: WorkItemStatus) -> WorkItem {
        let mut item = WorkItem::new(id, id);
        item.status = status;
        if status == WorkItemStatus::Completed {
            item.progress = 100.0;
        }
        item
    }

    #[test]
    fn expected_end_before_start_is_invalid() {
        let mut item = WorkItem::new("a", "a");
        item.expected_start = Some(now());
        item.expected_end = Some(now() - chrono::Duration::hours(1));
        assert!(matches!(
            validate_item(&item),
            Err(ValidationError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn terminal_status_cannot_be_left() {
        let item = with_status("a", WorkItemStatus::Completed);
        assert!(check_transition_legal(&item, WorkItemStatus::Working).is_err());
        let item = with_status("b", WorkItemStatus::Canceled);
        assert!(check_transition_legal(&item, WorkItemStatus::Open).is_err());
        let item = with_status("c", WorkItemStatus::Paused);
        assert!(check_transition_legal(&item, WorkItemStatus::Open).is_err());
        assert!(check_transition_legal(&item, WorkItemStatus::Canceled).is_ok());
    }

    #[test]
    fn gate_lists_exactly_the_incomplete_predecessors() {
        let store = MemoryStore::new();
        store.insert_work_item(with_status("x", WorkItemStatus::Working)).unwrap();
        store.insert_work_item(with_status("y", WorkItemStatus::Paused)).unwrap();
        store.insert_work_item(with_status("z", WorkItemStatus::Completed)).unwrap();

        let mut a = WorkItem::new("a", "a");
        a.predecessors = vec!["x".into(), "z".into(), "y".into()];

        let err = gate(&a, WorkItemStatus::PendingReview, &store).unwrap_err();
        match err {
            SchedError::Blocked(blocked) => {
                assert_eq!(blocked.blocker_ids(), vec!["x", "y"]);
                assert_eq!(blocked.blockers[1].status, WorkItemStatus::Paused);
            }
            other => panic!("expected Blocked, got {other:?}"),
        }

        // Pausing and canceling are never gated.
        assert!(gate(&a, WorkItemStatus::Paused, &store).is_ok());
        assert!(gate(&a, WorkItemStatus::Canceled, &store).is_ok());
    }

    #[test]
    fn effort_above_the_cap_is_invalid() {
        let mut item = WorkItem::new("a", "a");
        item.planned_effort_minutes = MAX_EFFORT_MINUTES;
        assert!(validate_item(&item).is_ok());

        item.planned_effort_minutes = i64::MAX / 2;
        assert!(matches!(
            validate_item(&item),
            Err(ValidationError::EffortOutOfRange { max: MAX_EFFORT_MINUTES, .. })
        ));
    }

    #[test]
    fn repeated_predecessor_is_reported_once() {
        let store = MemoryStore::new();
        store.insert_work_item(with_status("b", WorkItemStatus::Open)).unwrap();

        let mut a = WorkItem::new("a", "a");
        a.predecessors = vec!["b".into(), "b".into()];

        let blockers = unsatisfied_predecessors(&a, &store).unwrap();
        assert_eq!(blockers.len(), 1);
        assert_eq!(blockers[0].id, "b");
    }

    #[test]
    fn staying_in_the_current_status_is_not_gated() {
        let store = MemoryStore::new();
        store.insert_work_item(with_status("b", WorkItemStatus::Open)).unwrap();

        let mut a = with_status("a", WorkItemStatus::Working);
        a.predecessors = vec!["b".into()];

        assert!(check_transition_legal(&a, WorkItemStatus::Working).is_ok());
        assert!(gate(&a, WorkItemStatus::Working, &store).is_ok());
        assert!(gate(&a, WorkItemStatus::Completed, &store).is_err());
    }

    #[test]
    fn gate_reports_dangling_predecessor() {
        let store = MemoryStore::new();
        let mut a = WorkItem::new("a", "a");
        a.predecessors = vec!["ghost".into()];
        let err = gate(&a, WorkItemStatus::Paused, &store).unwrap_err();
        assert!(matches!(
            err,
            SchedError::Validation(ValidationError::DanglingPredecessor { .. })
        ));
    }

    #[test]
    fn completing_forces_progress_and_stamps_end_once() {
        let mut item = WorkItem::new("a", "a");
        item.progress = 40.0;
        let actor = Actor::new("dana");

        apply_transition(&mut item, WorkItemStatus::Working, now(), &actor);
        assert_eq!(item.actual_start, Some(now()));

        let earlier = now() - chrono::Duration::days(1);
        item.actual_end = Some(earlier);
        apply_transition(&mut item, WorkItemStatus::Completed, now(), &actor);
        assert_eq!(item.progress, 100.0);
        assert_eq!(item.actual_end, Some(earlier));
        assert_eq!(item.modified_by.as_deref(), Some("dana"));
    }
}
