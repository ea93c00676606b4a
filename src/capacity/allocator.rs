// src/capacity/allocator.rs

//! Greedy multi-day capacity allocation.
//!
//! Walks a resource's availability one day at a time, consuming minutes
//! toward the planned effort until it is used up or the lookahead window
//! ends. The first day starts at the scheduled start itself; later days start
//! at the resource's workday start.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, warn};

use crate::capacity::risk::risk_for_utilization;
use crate::errors::{Result, SchedError};
use crate::model::{CapacitySnapshot, WorkItem};
use crate::store::AvailabilityCalendar;
use crate::types::RiskTier;

/// Default number of days the allocator looks ahead.
pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 30;

/// Largest lookahead a shop file may configure.
pub const MAX_LOOKAHEAD_DAYS: u32 = 366;

/// Allocator tuning, taken from the `[config]` section of a shop file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorSettings {
    pub lookahead_days: u32,
    /// Anchor for days after the first when the resource has no override.
    pub workday_start: NaiveTime,
}

impl Default for AllocatorSettings {
    fn default() -> Self {
        Self {
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
            workday_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
        }
    }
}

/// Minutes consumed on a single calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayAllocation {
    pub date: NaiveDate,
    pub anchor: NaiveDateTime,
    pub available_minutes: i64,
    pub consumed_minutes: i64,
}

/// Full result of a forecast: the snapshot plus how it was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityForecast {
    pub snapshot: CapacitySnapshot,
    pub total_available_minutes: i64,
    pub allocations: Vec<DayAllocation>,
    /// Effort left over when the lookahead window ran out.
    pub overflow_minutes: i64,
}

impl CapacityForecast {
    fn degenerate(scheduled_start: NaiveDateTime) -> Self {
        Self {
            snapshot: CapacitySnapshot {
                projected_completion: scheduled_start,
                utilization_pct: 0.0,
                risk: RiskTier::Low,
            },
            total_available_minutes: 0,
            allocations: Vec::new(),
            overflow_minutes: 0,
        }
    }

    /// Whether the lookahead window was exhausted before the effort was used up.
    pub fn calendar_exhausted(&self) -> bool {
        self.overflow_minutes > 0
    }
}

/// Forecast completion of `item` starting at `scheduled_start`.
///
/// Fails if the item names a resource the calendar does not know, or if the
/// projected completion cannot be represented. Running out of calendar is not
/// an error: the leftover effort is added on top of the last instant reached.
pub fn forecast(
    item: &WorkItem,
    scheduled_start: NaiveDateTime,
    calendar: &dyn AvailabilityCalendar,
    settings: &AllocatorSettings,
) -> Result<CapacityForecast> {
    let effort = item.planned_effort_minutes;

    let resource_id = match item.assigned_resource.as_deref() {
        Some(r) if effort > 0 => r,
        _ => {
            debug!(
                item = %item.id,
                effort,
                "no effort or no resource; degenerate forecast"
            );
            return Ok(CapacityForecast::degenerate(scheduled_start));
        }
    };

    let profile = calendar
        .resource(resource_id)
        .ok_or_else(|| SchedError::UnknownResource(resource_id.to_string()))?;
    let day_start = profile.workday_start.unwrap_or(settings.workday_start);

    let first_date = scheduled_start.date();
    let mut remaining = effort;
    let mut total_available: i64 = 0;
    let mut cursor = scheduled_start;
    let mut allocations = Vec::new();

    for offset in 0..i64::from(settings.lookahead_days) {
        let Some(date) = Duration::try_days(offset).and_then(|d| first_date.checked_add_signed(d))
        else {
            break;
        };
        let available = calendar.available_minutes(resource_id, date);
        if available <= 0 {
            continue;
        }

        total_available = total_available.saturating_add(available);

        let anchor = if offset == 0 {
            scheduled_start
        } else {
            date.and_time(day_start)
        };
        let consumed = remaining.min(available);
        remaining -= consumed;
        cursor = shift(&item.id, anchor, consumed)?;

        allocations.push(DayAllocation {
            date,
            anchor,
            available_minutes: available,
            consumed_minutes: consumed,
        });

        if remaining == 0 {
            break;
        }
    }

    let projected_completion = if remaining > 0 {
        warn!(
            item = %item.id,
            resource = %resource_id,
            overflow_minutes = remaining,
            lookahead_days = settings.lookahead_days,
            "lookahead exhausted; extrapolating completion past last availability"
        );
        shift(&item.id, cursor, remaining)?
    } else {
        cursor
    };

    let (utilization_pct, risk) = if total_available == 0 {
        (100.0, RiskTier::High)
    } else {
        let pct = effort as f64 / total_available as f64 * 100.0;
        (pct, risk_for_utilization(pct))
    };

    debug!(
        item = %item.id,
        resource = %resource_id,
        %projected_completion,
        utilization_pct,
        ?risk,
        "forecast computed"
    );

    Ok(CapacityForecast {
        snapshot: CapacitySnapshot {
            projected_completion,
            utilization_pct,
            risk,
        },
        total_available_minutes: total_available,
        allocations,
        overflow_minutes: remaining,
    })
}

fn shift(item: &str, from: NaiveDateTime, minutes: i64) -> Result<NaiveDateTime> {
    Duration::try_minutes(minutes)
        .and_then(|d| from.checked_add_signed(d))
        .ok_or_else(|| SchedError::CapacityOverflow {
            item: item.to_string(),
            from: from.to_string(),
            minutes,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResourceProfile;
    use crate::store::MemoryStore;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn store_with_tech() -> MemoryStore {
        let store = MemoryStore::new();
        store.add_resource(ResourceProfile::new("tech")).unwrap();
        store
    }

    fn item(effort: i64, resource: Option<&str>) -> WorkItem {
        let mut item = WorkItem::new("job", "Overhaul");
        item.planned_effort_minutes = effort;
        item.assigned_resource = resource.map(str::to_string);
        item
    }

    #[test]
    fn two_days_of_240_cover_480() {
        let store = store_with_tech();
        for d in 4..=6 {
            store
                .set_availability("tech", at(d, 0, 0).date(), 240)
                .unwrap();
        }

        let fc = forecast(
            &item(480, Some("tech")),
            at(4, 9, 0),
            &store,
            &AllocatorSettings::default(),
        )
        .unwrap();

        assert_eq!(fc.allocations.len(), 2);
        assert_eq!(fc.snapshot.projected_completion, at(5, 12, 0));
        assert_eq!(fc.total_available_minutes, 480);
        assert_eq!(fc.snapshot.utilization_pct, 100.0);
        assert_eq!(fc.snapshot.risk, RiskTier::Medium);
        assert!(!fc.calendar_exhausted());
    }

    #[test]
    fn no_resource_is_degenerate() {
        let store = store_with_tech();
        let fc = forecast(
            &item(100, None),
            at(4, 9, 0),
            &store,
            &AllocatorSettings::default(),
        )
        .unwrap();
        assert_eq!(fc.snapshot.projected_completion, at(4, 9, 0));
        assert_eq!(fc.snapshot.utilization_pct, 0.0);
        assert_eq!(fc.snapshot.risk, RiskTier::Low);
    }

    #[test]
    fn zero_effort_is_degenerate_even_with_unknown_resource() {
        let store = MemoryStore::new();
        let fc = forecast(
            &item(0, Some("ghost")),
            at(4, 9, 0),
            &store,
            &AllocatorSettings::default(),
        )
        .unwrap();
        assert_eq!(fc.snapshot.risk, RiskTier::Low);
    }

    #[test]
    fn unknown_resource_fails() {
        let store = MemoryStore::new();
        let err = forecast(
            &item(60, Some("ghost")),
            at(4, 9, 0),
            &store,
            &AllocatorSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SchedError::UnknownResource(r) if r == "ghost"));
    }

    #[test]
    fn no_availability_forces_high_and_extrapolates() {
        let store = store_with_tech();
        let fc = forecast(
            &item(90, Some("tech")),
            at(4, 9, 0),
            &store,
            &AllocatorSettings::default(),
        )
        .unwrap();
        assert_eq!(fc.snapshot.utilization_pct, 100.0);
        assert_eq!(fc.snapshot.risk, RiskTier::High);
        assert_eq!(fc.snapshot.projected_completion, at(4, 10, 30));
        assert_eq!(fc.overflow_minutes, 90);
    }

    #[test]
    fn overflow_extends_from_last_anchor() {
        let store = store_with_tech();
        store.set_availability("tech", at(5, 0, 0).date(), 60).unwrap();
        let settings = AllocatorSettings {
            lookahead_days: 3,
            ..AllocatorSettings::default()
        };

        let fc = forecast(&item(120, Some("tech")), at(4, 9, 0), &store, &settings).unwrap();

        // 60 minutes on the 5th from 08:00, then 60 leftover minutes.
        assert_eq!(fc.snapshot.projected_completion, at(5, 10, 0));
        assert_eq!(fc.snapshot.utilization_pct, 200.0);
        assert_eq!(fc.snapshot.risk, RiskTier::High);
        assert!(fc.calendar_exhausted());
    }

    #[test]
    fn resource_workday_start_overrides_default() {
        let store = MemoryStore::new();
        let mut profile = ResourceProfile::new("late");
        profile.workday_start = NaiveTime::from_hms_opt(13, 0, 0);
        store.add_resource(profile).unwrap();
        store.set_availability("late", at(6, 0, 0).date(), 300).unwrap();

        let fc = forecast(
            &item(30, Some("late")),
            at(4, 9, 0),
            &store,
            &AllocatorSettings::default(),
        )
        .unwrap();

        assert_eq!(fc.snapshot.projected_completion, at(6, 13, 30));
        assert_eq!(fc.snapshot.utilization_pct, 10.0);
        assert_eq!(fc.snapshot.risk, RiskTier::Low);
    }

    #[test]
    fn unrepresentable_completion_is_an_error() {
        let store = store_with_tech();
        store.set_availability("tech", at(4, 0, 0).date(), 60).unwrap();

        let err = forecast(
            &item(i64::MAX / 2, Some("tech")),
            at(4, 9, 0),
            &store,
            &AllocatorSettings::default(),
        )
        .unwrap_err();

        assert!(matches!(err, SchedError::CapacityOverflow { ref item, .. } if item == "job"));
    }

    #[test]
    fn days_beyond_lookahead_are_ignored() {
        let store = store_with_tech();
        store.set_availability("tech", at(20, 0, 0).date(), 600).unwrap();
        let settings = AllocatorSettings {
            lookahead_days: 10,
            ..AllocatorSettings::default()
        };

        let fc = forecast(&item(60, Some("tech")), at(4, 9, 0), &store, &settings).unwrap();
        assert_eq!(fc.total_available_minutes, 0);
        assert_eq!(fc.snapshot.risk, RiskTier::High);
    }
}
